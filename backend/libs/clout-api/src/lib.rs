//! CloutFeed API client
//!
//! REST access to the node and feed APIs, plus the configuration that wires
//! it into a `clout_cache::SessionManager`.

pub mod client;
pub mod config;
pub mod error;
pub mod signer;

pub use client::CloutApiClient;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use signer::{NoTokenSigner, StaticTokenSigner, TokenSigner};

use clout_cache::SessionManager;
use std::sync::Arc;

/// Build a session manager backed by the HTTP client described by `config`
pub fn session_manager(
    config: &ApiConfig,
    signer: Arc<dyn TokenSigner>,
) -> ApiResult<SessionManager> {
    let client = CloutApiClient::new(config, signer)?;
    Ok(SessionManager::new(
        Arc::new(client),
        config.cache_ttl.clone(),
    ))
}
