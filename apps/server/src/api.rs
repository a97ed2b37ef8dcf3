use std::sync::Arc;

use crate::{config::Config, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Query, State},
    http::HeaderValue,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use metalfx_market_data::{PriceBundle, DEFAULT_SYMBOLS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Display names for the built-in symbols.
fn describe_symbol(symbol: &str) -> String {
    let name = match symbol.split('/').next() {
        Some("XAU") => "Gold",
        Some("XAG") => "Silver",
        Some("XPT") => "Platinum",
        Some("XPD") => "Palladium",
        _ => return symbol.to_string(),
    };
    format!("{} ({})", symbol, name)
}

async fn index() -> Json<Value> {
    let default_symbols: Vec<String> = DEFAULT_SYMBOLS
        .iter()
        .map(|symbol| describe_symbol(symbol))
        .collect();
    Json(json!({
        "message": "Real-time Precious Metals & Forex API",
        "default_symbols": default_symbols,
        "endpoints": {
            "latest": "/api/latest",
            "custom": "/api/latest?symbols=XAU/USD,USD/CNY",
            "health": "/health"
        }
    }))
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    timestamp: String,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "UP",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[derive(Deserialize)]
struct LatestQuery {
    symbols: Option<String>,
}

async fn get_latest_prices(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LatestQuery>,
) -> ApiResult<Json<PriceBundle>> {
    let bundle = state
        .price_service
        .get_latest_prices(q.symbols.as_deref())
        .await?;
    Ok(Json(PriceBundle::clone(&bundle)))
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/latest", get(get_latest_prices))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
