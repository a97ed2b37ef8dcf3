use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metalfx_market_data::MarketDataError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    MarketData(#[from] MarketDataError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::MarketData(e) if e.is_rate_limited() => {
                (StatusCode::TOO_MANY_REQUESTS, e.user_message().to_string())
            }
            ApiError::MarketData(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.user_message().to_string())
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
