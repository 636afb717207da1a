use crate::{ApiError, ApiResult};
use clout_cache::{ttl, TtlConfig};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_NODE_URL: &str = "https://node.deso.org";
pub const DEFAULT_FEED_API_URL: &str = "https://cloutfeedapi.azurewebsites.net";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the blockchain node API
    pub node_url: String,
    /// Base URL of the feed companion API (pinned post, saved posts)
    pub feed_api_url: String,
    pub http_timeout: Duration,
    pub cache_ttl: TtlConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_string(),
            feed_api_url: DEFAULT_FEED_API_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            cache_ttl: TtlConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load from the process environment, after reading `.env` if present
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(ApiConfig {
            node_url: url("CLOUT_NODE_URL", DEFAULT_NODE_URL),
            feed_api_url: url("CLOUT_FEED_API_URL", DEFAULT_FEED_API_URL),
            http_timeout: Duration::from_secs(parse_or(
                &lookup,
                "CLOUT_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            cache_ttl: TtlConfig {
                user: Duration::from_secs(parse_or(
                    &lookup,
                    "CLOUT_CACHE_USER_TTL_SECS",
                    ttl::USER,
                )?),
                exchange_rate: Duration::from_secs(parse_or(
                    &lookup,
                    "CLOUT_CACHE_EXCHANGE_RATE_TTL_SECS",
                    ttl::EXCHANGE_RATE,
                )?),
                pinned_post: Duration::from_secs(parse_or(
                    &lookup,
                    "CLOUT_CACHE_PINNED_POST_TTL_SECS",
                    ttl::PINNED_POST,
                )?),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> ApiResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ApiError::Config(format!("{} must be a valid number, got {:?}", key, raw))),
        None => Ok(default),
    }
}
