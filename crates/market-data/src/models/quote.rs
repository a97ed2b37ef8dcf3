use serde::Deserialize;
use serde_json::{Map, Value};

/// `status` value the provider uses to flag an error record.
pub const PROVIDER_ERROR_STATUS: &str = "error";

/// Error code the provider uses when the request quota is exhausted.
pub const RATE_LIMIT_CODE: i64 = 429;

/// Shape of a provider error record: `{"status": "error", "code": 400, "message": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorRecord {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// The provider's answer for one symbol.
#[derive(Clone, Debug, PartialEq)]
pub enum RawQuote {
    /// Success record; `price` is a decimal string next to other provider fields
    Success(Map<String, Value>),

    /// Error record for this symbol (or for the whole request)
    Error {
        /// Provider error code, when present
        code: Option<i64>,
        /// Human-readable message from the provider
        message: String,
    },
}

impl RawQuote {
    /// Classifies a JSON object as a success or error record.
    pub fn from_object(object: Map<String, Value>) -> Self {
        let is_error = object
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|status| status == PROVIDER_ERROR_STATUS);

        if !is_error {
            return Self::Success(object);
        }

        // A record with an unexpected `code` type still counts as an error.
        let record = serde_json::from_value::<ErrorRecord>(Value::Object(object)).ok();
        let (code, message) = record
            .map(|r| (r.code, r.message))
            .unwrap_or((None, None));

        Self::Error {
            code,
            message: message.unwrap_or_else(|| "Unknown provider error".to_string()),
        }
    }

    /// True for an error record carrying the provider's rate-limit code.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::Error { code: Some(code), .. } if *code == RATE_LIMIT_CODE)
    }
}

/// Top-level provider response, decoded once according to the request shape.
#[derive(Clone, Debug, PartialEq)]
pub enum QuoteEnvelope {
    /// Single-symbol request: the body is the quote of the sole symbol.
    Single(RawQuote),

    /// Multi-symbol request: the body maps each symbol to its quote.
    /// Kept as raw JSON because the body may also be one request-level
    /// error record instead of a mapping.
    Batch(Map<String, Value>),
}
