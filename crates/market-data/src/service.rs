//! Price service: cache, fetch, normalize, derive.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::cache::QuoteCache;
use crate::clock::{Clock, SystemClock};
use crate::cross_rate;
use crate::errors::MarketDataError;
use crate::models::{PriceBundle, SymbolSet};
use crate::normalizer;
use crate::provider::QuoteProvider;

/// Note attached to every bundle.
pub const BUNDLE_NOTE: &str = "Prices are cached briefly. XAG/USD, XPT/USD and XPD/USD are \
calculated from their EUR quotes and EUR/USD when those pairs are requested together.";

#[async_trait]
pub trait PriceServiceTrait: Send + Sync {
    /// Latest prices for a comma-separated symbol list, or for the built-in
    /// default list when `symbols` is `None` or blank.
    async fn get_latest_prices(
        &self,
        symbols: Option<&str>,
    ) -> Result<Arc<PriceBundle>, MarketDataError>;
}

/// Fetches prices from one provider and caches the resulting bundles.
///
/// Concurrent misses for the same symbol set are not coalesced; each one
/// calls the provider and the last writer wins the cache slot.
pub struct PriceService {
    provider: Arc<dyn QuoteProvider>,
    cache: Arc<QuoteCache>,
    clock: Arc<dyn Clock>,
}

impl PriceService {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        cache: Arc<QuoteCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            cache,
            clock,
        }
    }

    /// Service stamped with the wall clock.
    pub fn with_system_clock(provider: Arc<dyn QuoteProvider>, cache: Arc<QuoteCache>) -> Self {
        Self::new(provider, cache, Arc::new(SystemClock))
    }

    /// Build a fresh bundle from the provider. Never touches the cache.
    async fn fetch_bundle(&self, symbols: &SymbolSet) -> Result<PriceBundle, MarketDataError> {
        let provider_id = self.provider.id();

        let body = self.provider.fetch_prices(symbols.as_str()).await?;
        let envelope = normalizer::decode_envelope(provider_id, symbols, body)?;
        normalizer::check_envelope(provider_id, &envelope)?;

        let mut rates = normalizer::normalize(symbols, envelope);
        let derived = cross_rate::derive(&rates);
        cross_rate::merge(&mut rates, derived);

        Ok(PriceBundle {
            source: self.provider.source_name().to_string(),
            timestamp: self.clock.now(),
            rates,
            note: BUNDLE_NOTE.to_string(),
        })
    }
}

#[async_trait]
impl PriceServiceTrait for PriceService {
    async fn get_latest_prices(
        &self,
        symbols: Option<&str>,
    ) -> Result<Arc<PriceBundle>, MarketDataError> {
        let symbols = SymbolSet::resolve(symbols);
        let key = symbols.cache_key();

        if let Some(bundle) = self.cache.get(&key) {
            debug!("Returning cached prices for '{}'", symbols);
            return Ok(bundle);
        }

        let bundle = match self.fetch_bundle(&symbols).await {
            Ok(bundle) => Arc::new(bundle),
            Err(e) => {
                warn!("Failed to fetch prices for '{}': {}", symbols, e);
                return Err(e);
            }
        };

        info!(
            "Fetched {} rates for '{}' from {}",
            bundle.rates.len(),
            symbols,
            bundle.source
        );
        self.cache.set(key, Arc::clone(&bundle));
        Ok(bundle)
    }
}
