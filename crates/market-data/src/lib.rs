//! Metals & FX Market Data Crate
//!
//! This crate fetches spot prices for precious metals and currency pairs from
//! a single upstream provider (Twelve Data), normalizes them, derives USD metal
//! prices that the free tier does not serve, and caches the result briefly.
//!
//! # Architecture
//!
//! ```text
//!  symbols?: "XAU/USD,XAG/EUR,EUR/USD"
//!                  |
//!                  v
//!          +------------------+   hit
//!          |   QuoteCache     | ------> Arc<PriceBundle>
//!          +------------------+  (moka, TTL from insertion)
//!                  | miss
//!                  v
//!          +------------------+
//!          |  QuoteProvider   |  (one outbound request, no retry)
//!          +------------------+
//!                  |
//!                  v
//!          +------------------+
//!          |   Normalizer     |  (single vs. batch envelope, per-symbol errors)
//!          +------------------+
//!                  |
//!                  v
//!          +------------------+
//!          |  Cross-rate      |  (XAG/EUR * EUR/USD -> XAG/USD, ...)
//!          +------------------+
//!                  |
//!                  v
//!             PriceBundle  --> cached, returned
//! ```
//!
//! # Core Types
//!
//! - [`SymbolSet`] - The requested ticker list and its cache key
//! - [`NormalizedRate`] - Direct price, derived price, or per-symbol error
//! - [`PriceBundle`] - The cached and returned artifact
//! - [`PriceService`] - The orchestrator, exposed as [`PriceServiceTrait`]

pub mod cache;
pub mod clock;
pub mod cross_rate;
pub mod errors;
pub mod models;
pub mod normalizer;
pub mod provider;
pub mod service;

// Re-export all public types from models
pub use models::{
    NormalizedRate, PriceBundle, QuoteEnvelope, RawQuote, SymbolSet, DEFAULT_SYMBOLS,
};

// Re-export cache types
pub use cache::{QuoteCache, DEFAULT_MAX_CAPACITY, DEFAULT_TTL};
pub use clock::{Clock, SystemClock};

// Re-export provider types
pub use provider::twelve_data::TwelveDataProvider;
pub use provider::QuoteProvider;

// Re-export service types
pub use errors::MarketDataError;
pub use service::{PriceService, PriceServiceTrait};
