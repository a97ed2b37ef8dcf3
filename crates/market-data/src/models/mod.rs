//! Market data models
//!
//! This module contains the core data types for price retrieval:
//! - `symbols` - The requested ticker list (SymbolSet) and its cache key
//! - `quote` - Raw provider records (RawQuote) and response shapes (QuoteEnvelope)
//! - `rates` - Normalized per-symbol rates (NormalizedRate) and the returned PriceBundle

mod quote;
mod rates;
mod symbols;

pub use quote::{QuoteEnvelope, RawQuote, PROVIDER_ERROR_STATUS, RATE_LIMIT_CODE};
pub use rates::{NormalizedRate, PriceBundle, DERIVED_PRICE_PRECISION};
pub use symbols::{SymbolSet, DEFAULT_SYMBOLS, SYMBOL_SEPARATOR};
