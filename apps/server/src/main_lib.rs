use std::sync::Arc;

use crate::config::Config;
use metalfx_market_data::{
    PriceService, PriceServiceTrait, QuoteCache, QuoteProvider, TwelveDataProvider,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub price_service: Arc<dyn PriceServiceTrait + Send + Sync>,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider: Arc<dyn QuoteProvider> = Arc::new(TwelveDataProvider::with_base_url(
        config.api_key.clone(),
        config.upstream_base_url.clone(),
    ));
    Ok(state_with_provider(provider, config))
}

/// Wire the service around an arbitrary provider. The cache lives as long
/// as the returned state.
pub fn state_with_provider(provider: Arc<dyn QuoteProvider>, config: &Config) -> Arc<AppState> {
    tracing::info!(
        ttl_secs = config.cache_ttl.as_secs(),
        provider = provider.id(),
        "Price cache configured"
    );
    let cache = Arc::new(QuoteCache::new(config.cache_ttl));
    let price_service: Arc<dyn PriceServiceTrait + Send + Sync> =
        Arc::new(PriceService::with_system_clock(provider, cache));
    Arc::new(AppState { price_service })
}
