//! Conversion of raw provider bodies into per-symbol rates.
//!
//! The provider answers a single-symbol request with one quote object and a
//! multi-symbol request with a symbol-keyed mapping. Which shape to expect is
//! decided from the request alone (does the symbol string contain a
//! separator?) and decoded once into a [`QuoteEnvelope`].

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::errors::MarketDataError;
use crate::models::{NormalizedRate, QuoteEnvelope, RawQuote, SymbolSet, PROVIDER_ERROR_STATUS};

/// Decode the provider body into the shape implied by the request.
///
/// A body that is not a JSON object cannot be either shape and is fatal.
pub fn decode_envelope(
    provider: &str,
    symbols: &SymbolSet,
    body: Value,
) -> Result<QuoteEnvelope, MarketDataError> {
    let object = match body {
        Value::Object(object) => object,
        other => {
            return Err(MarketDataError::MalformedResponse {
                provider: provider.to_string(),
                message: format!("expected a JSON object, got {}", json_kind(&other)),
            })
        }
    };

    if symbols.is_batch() {
        Ok(QuoteEnvelope::Batch(object))
    } else {
        Ok(QuoteEnvelope::Single(RawQuote::from_object(object)))
    }
}

/// Reject envelopes that describe a request-level failure.
///
/// - A rate-limit record aborts the request in either shape.
/// - In the batch shape, a body that is itself an error record (rather than
///   a symbol mapping) aborts the request too.
/// - In the single shape any other error record belongs to the one symbol
///   and is left for [`normalize`].
pub fn check_envelope(provider: &str, envelope: &QuoteEnvelope) -> Result<(), MarketDataError> {
    match envelope {
        QuoteEnvelope::Single(quote) => {
            if quote.is_rate_limit() {
                return Err(MarketDataError::RateLimited {
                    provider: provider.to_string(),
                });
            }
            Ok(())
        }
        QuoteEnvelope::Batch(object) => {
            if !is_error_record(object) {
                return Ok(());
            }
            let quote = RawQuote::from_object(object.clone());
            if quote.is_rate_limit() {
                return Err(MarketDataError::RateLimited {
                    provider: provider.to_string(),
                });
            }
            let message = match quote {
                RawQuote::Error { message, .. } => message,
                RawQuote::Success(_) => "Unknown provider error".to_string(),
            };
            Err(MarketDataError::ProviderError {
                provider: provider.to_string(),
                message,
            })
        }
    }
}

/// Map every symbol the provider answered for to a [`NormalizedRate`].
///
/// Entries follow request order. Symbols the provider silently dropped get
/// no entry, so the result may be smaller than the request. Symbols the
/// provider returned without being asked for are ignored.
pub fn normalize(
    symbols: &SymbolSet,
    envelope: QuoteEnvelope,
) -> IndexMap<String, NormalizedRate> {
    let mut rates = IndexMap::new();

    match envelope {
        QuoteEnvelope::Single(quote) => {
            if let Some(symbol) = symbols.symbols().first() {
                rates.insert(symbol.clone(), normalize_quote(symbol, quote));
            }
        }
        QuoteEnvelope::Batch(mut object) => {
            for symbol in symbols.symbols() {
                if rates.contains_key(symbol) {
                    continue;
                }
                let rate = match object.remove(symbol) {
                    Some(Value::Object(record)) => {
                        normalize_quote(symbol, RawQuote::from_object(record))
                    }
                    Some(other) => NormalizedRate::failed(format!(
                        "Unexpected quote format: {}",
                        json_kind(&other)
                    )),
                    None => {
                        debug!("Provider returned no entry for '{}'", symbol);
                        continue;
                    }
                };
                rates.insert(symbol.clone(), rate);
            }
        }
    }

    rates
}

fn normalize_quote(symbol: &str, quote: RawQuote) -> NormalizedRate {
    match quote {
        RawQuote::Error { code, message } => {
            warn!("Provider error for '{}' (code {:?}): {}", symbol, code, message);
            NormalizedRate::failed(message)
        }
        RawQuote::Success(mut fields) => {
            let price = fields.remove("price");
            match price.as_ref().and_then(parse_price) {
                Some(price) => NormalizedRate::Direct { price, fields },
                None => NormalizedRate::failed("Missing or invalid price"),
            }
        }
    }
}

/// Prices arrive as decimal strings; plain JSON numbers are accepted too.
fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    price.is_finite().then_some(price)
}

fn is_error_record(object: &Map<String, Value>) -> bool {
    object
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s == PROVIDER_ERROR_STATUS)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
