//! Quote provider trait definition.
//!
//! This module defines the `QuoteProvider` trait that the upstream client
//! implements and the price service depends on.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::MarketDataError;

/// Trait for upstream quote providers.
///
/// A provider performs exactly one outbound request per call and hands back
/// the raw JSON body. Interpreting that body (single vs. batch shape,
/// per-symbol errors) is left to the normalizer.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use metalfx_market_data::provider::QuoteProvider;
///
/// struct StaticProvider;
///
/// #[async_trait]
/// impl QuoteProvider for StaticProvider {
///     fn id(&self) -> &'static str {
///         "STATIC"
///     }
///
///     fn source_name(&self) -> &'static str {
///         "Static"
///     }
///
///     async fn fetch_prices(&self, _symbols: &str) -> Result<Value, MarketDataError> {
///         Ok(serde_json::json!({"price": "1.0"}))
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "TWELVE_DATA".
    /// Used in error values and logging.
    fn id(&self) -> &'static str;

    /// Human-readable provider name reported as the bundle `source`.
    fn source_name(&self) -> &'static str;

    /// Fetch the latest prices for a comma-separated symbol list.
    ///
    /// # Arguments
    ///
    /// * `symbols` - The symbol string exactly as requested; it is passed to
    ///   the provider without validation
    ///
    /// # Returns
    ///
    /// The provider's JSON body, including provider error envelopes, or a
    /// `MarketDataError` when the provider could not be reached or its
    /// answer could not be decoded.
    async fn fetch_prices(&self, symbols: &str) -> Result<Value, MarketDataError>;
}
