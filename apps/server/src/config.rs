use std::{net::SocketAddr, time::Duration};

use anyhow::{anyhow, Context};
use metalfx_market_data::provider::twelve_data::DEFAULT_BASE_URL;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CACHE_TTL_SECS: u64 = 60;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub api_key: String,
    pub cache_ttl: Duration,
    pub upstream_base_url: String,
    pub cors_allow: Vec<String>,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key =
            var("TWELVE_DATA_KEY").ok_or_else(|| anyhow!("TWELVE_DATA_KEY must be set"))?;

        let listen_addr: SocketAddr = match var("LISTEN_ADDR") {
            Some(addr) => addr
                .trim()
                .parse()
                .with_context(|| format!("Invalid LISTEN_ADDR: {}", addr))?,
            None => {
                let port: u16 = match var("PORT") {
                    Some(port) => port
                        .trim()
                        .parse()
                        .with_context(|| format!("Invalid PORT: {}", port))?,
                    None => DEFAULT_PORT,
                };
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let cache_ttl_secs: u64 = match var("CACHE_TTL") {
            Some(ttl) => ttl
                .trim()
                .parse()
                .with_context(|| format!("Invalid CACHE_TTL: {}", ttl))?,
            None => DEFAULT_CACHE_TTL_SECS,
        };

        let upstream_base_url =
            var("TWELVE_DATA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let cors_allow = var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            listen_addr,
            api_key,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            upstream_base_url,
            cors_allow,
        })
    }
}
