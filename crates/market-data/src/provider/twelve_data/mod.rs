//! Twelve Data provider for spot metal and FX prices.
//!
//! Uses the `/price` endpoint, which accepts a comma-separated symbol list:
//! - one symbol: the body is a single quote object (`{"price": "2345.10"}`)
//! - several symbols: the body maps each symbol to its quote object
//!
//! Failures for individual symbols (for example pairs that require a paid
//! plan) come back as `{"status": "error", "code": ..., "message": ...}`
//! records and are passed through for the normalizer to classify.
//!
//! Note: the free tier does not serve XAG/USD, XPT/USD or XPD/USD directly;
//! those are derived from their EUR legs by the cross-rate module.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::PROVIDER_ERROR_STATUS;
use crate::provider::QuoteProvider;

/// Provider ID constant
const PROVIDER_ID: &str = "TWELVE_DATA";

/// Name reported as the bundle source
const SOURCE_NAME: &str = "Twelve Data";

/// Public API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.twelvedata.com";

/// Query parameter carrying the API key
const API_KEY_PARAM: &str = "apikey";

/// Twelve Data provider.
///
/// # Example
///
/// ```ignore
/// use metalfx_market_data::provider::twelve_data::TwelveDataProvider;
///
/// let provider = TwelveDataProvider::new("your_api_key".to_string());
/// let body = provider.fetch_prices("XAU/USD,EUR/USD").await?;
/// ```
pub struct TwelveDataProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TwelveDataProvider {
    /// Create a provider that talks to the public Twelve Data API.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a provider against a custom base URL (proxies, test servers).
    ///
    /// The client keeps reqwest's defaults: no request timeout is imposed.
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key, base_url)
    }

    /// Create a provider around a preconfigured HTTP client.
    pub fn with_client(client: Client, api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Build `<base>/price?symbol=<symbols>&apikey=<key>`.
    fn price_url(&self, symbols: &str) -> Result<Url, MarketDataError> {
        let endpoint = format!("{}/price", self.base_url);
        let params = [("symbol", symbols), (API_KEY_PARAM, self.api_key.as_str())];
        Url::parse_with_params(&endpoint, &params).map_err(|e| MarketDataError::Transport {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to build URL: {}", e),
        })
    }

    /// Turn an HTTP status and body into the provider's JSON body or a
    /// fatal error.
    ///
    /// Twelve Data may report request-level errors (bad key, exhausted
    /// credits) with a non-2xx status *and* a JSON error record. Such bodies
    /// are returned as-is so the normalizer can tell a rate limit from other
    /// failures.
    fn interpret_response(status: StatusCode, body: &str) -> Result<Value, MarketDataError> {
        let parsed = serde_json::from_str::<Value>(body);

        if status.is_success() {
            return parsed.map_err(|e| MarketDataError::MalformedResponse {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            });
        }

        if let Ok(value) = parsed {
            if Self::is_error_record(&value) {
                return Ok(value);
            }
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        Err(MarketDataError::Transport {
            provider: PROVIDER_ID.to_string(),
            message: format!("HTTP {}", status),
        })
    }

    /// Copy of `url` that is safe to log: the API key value is replaced.
    fn redacted(url: &Url) -> String {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == API_KEY_PARAM {
                    "***".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), v)
            })
            .collect();

        let mut redacted = url.clone();
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
        redacted.to_string()
    }

    fn is_error_record(value: &Value) -> bool {
        value
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|s| s == PROVIDER_ERROR_STATUS)
    }
}

#[async_trait]
impl QuoteProvider for TwelveDataProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_prices(&self, symbols: &str) -> Result<Value, MarketDataError> {
        let url = self.price_url(symbols)?;

        debug!("Twelve Data request: {}", Self::redacted(&url));

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::Transport {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::Transport {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        Self::interpret_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_provider_identity() {
        let provider = TwelveDataProvider::new("test_key".to_string());
        assert_eq!(provider.id(), "TWELVE_DATA");
        assert_eq!(provider.source_name(), "Twelve Data");
    }

    #[test]
    fn test_price_url_passes_symbols_through() {
        let provider = TwelveDataProvider::new("test_key".to_string());
        let url = provider.price_url("XAU/USD,USD/CNY").unwrap();

        assert_eq!(url.path(), "/price");
        assert_eq!(url.host_str(), Some("api.twelvedata.com"));
        let params = query(&url);
        assert_eq!(params["symbol"], "XAU/USD,USD/CNY");
        assert_eq!(params["apikey"], "test_key");
    }

    #[test]
    fn test_price_url_with_custom_base() {
        let provider =
            TwelveDataProvider::with_base_url("k".to_string(), "http://127.0.0.1:9000/v1/");
        let url = provider.price_url("not a symbol").unwrap();

        assert_eq!(url.path(), "/v1/price");
        assert_eq!(query(&url)["symbol"], "not a symbol");
    }

    #[test]
    fn test_invalid_base_url_is_transport_error() {
        let provider = TwelveDataProvider::with_base_url("k".to_string(), "not a url");
        assert!(matches!(
            provider.price_url("XAU/USD"),
            Err(MarketDataError::Transport { .. })
        ));
    }

    #[test]
    fn test_success_body_is_returned() {
        let body = r#"{"XAU/USD": {"price": "2345.10"}, "EUR/USD": {"price": "1.08"}}"#;
        let value = TwelveDataProvider::interpret_response(StatusCode::OK, body).unwrap();
        assert_eq!(value["XAU/USD"]["price"], "2345.10");
    }

    #[test]
    fn test_error_envelope_with_ok_status_is_returned() {
        let body = r#"{"status": "error", "code": 429, "message": "out of credits"}"#;
        let value = TwelveDataProvider::interpret_response(StatusCode::OK, body).unwrap();
        assert_eq!(value["code"], json!(429));
    }

    #[test]
    fn test_error_envelope_with_error_status_is_returned() {
        let body = r#"{"status": "error", "code": 401, "message": "invalid api key"}"#;
        let value =
            TwelveDataProvider::interpret_response(StatusCode::UNAUTHORIZED, body).unwrap();
        assert_eq!(value["message"], "invalid api key");
    }

    #[test]
    fn test_bare_429_is_rate_limited() {
        let result =
            TwelveDataProvider::interpret_response(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(result, Err(MarketDataError::RateLimited { .. })));
    }

    #[test]
    fn test_other_http_failure_is_transport_error() {
        let result =
            TwelveDataProvider::interpret_response(StatusCode::BAD_GATEWAY, "<html></html>");
        match result {
            Err(MarketDataError::Transport { message, .. }) => {
                assert_eq!(message, "HTTP 502 Bad Gateway")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_non_json_success_is_malformed() {
        let result = TwelveDataProvider::interpret_response(StatusCode::OK, "not json");
        assert!(matches!(
            result,
            Err(MarketDataError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_redacted_url_hides_key_with_reserved_characters() {
        let key = "a+b/c= d&e";
        let provider = TwelveDataProvider::new(key.to_string());
        let url = provider.price_url("XAU/USD").unwrap();

        let logged = TwelveDataProvider::redacted(&url);
        assert!(!logged.contains("a+b"));
        assert!(!logged.contains("a%2Bb"));
        assert!(logged.contains("apikey=***"));
        assert_eq!(query(&Url::parse(&logged).unwrap())["symbol"], "XAU/USD");
        // The real request still carries the key.
        assert_eq!(query(&url)["apikey"], key);
    }

    async fn mock_price(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/price"))
            .and(query_param("apikey", "test_key"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_prices_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/price"))
            .and(query_param("symbol", "XAU/USD,EUR/USD"))
            .and(query_param("apikey", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "XAU/USD": {"price": "2345.10"},
                "EUR/USD": {"price": "1.08"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = TwelveDataProvider::with_base_url("test_key".to_string(), server.uri());
        let body = provider.fetch_prices("XAU/USD,EUR/USD").await.unwrap();
        assert_eq!(body["EUR/USD"]["price"], "1.08");
    }

    #[tokio::test]
    async fn test_fetch_prices_passes_error_record_through() {
        let server = MockServer::start().await;
        mock_price(
            &server,
            ResponseTemplate::new(401).set_body_json(json!({
                "status": "error",
                "code": 401,
                "message": "invalid api key"
            })),
        )
        .await;

        let provider = TwelveDataProvider::with_base_url("test_key".to_string(), server.uri());
        let body = provider.fetch_prices("XAU/USD").await.unwrap();
        assert_eq!(body["code"], json!(401));
    }

    #[tokio::test]
    async fn test_fetch_prices_maps_bare_429() {
        let server = MockServer::start().await;
        mock_price(&server, ResponseTemplate::new(429).set_body_string("slow down")).await;

        let provider = TwelveDataProvider::with_base_url("test_key".to_string(), server.uri());
        let result = provider.fetch_prices("XAU/USD").await;
        assert!(matches!(result, Err(MarketDataError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_fetch_prices_maps_timeout() {
        let server = MockServer::start().await;
        mock_price(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"price": "2345.10"}))
                .set_delay(Duration::from_secs(2)),
        )
        .await;

        let client = Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let provider =
            TwelveDataProvider::with_client(client, "test_key".to_string(), server.uri());
        let result = provider.fetch_prices("XAU/USD").await;
        assert!(matches!(result, Err(MarketDataError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_fetch_prices_maps_connection_failure() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider =
            TwelveDataProvider::with_base_url("test_key".to_string(), format!("http://{}", addr));
        let result = provider.fetch_prices("XAU/USD").await;
        assert!(matches!(result, Err(MarketDataError::Transport { .. })));
    }
}
