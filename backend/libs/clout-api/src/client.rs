//! HTTP client for the node and feed APIs
//!
//! Implements `CloutBackend` so a cache session can be fed directly from the
//! network.

use crate::config::ApiConfig;
use crate::signer::TokenSigner;
use crate::{ApiError, ApiResult};
use clout_cache::models::{
    ExchangeRateResponse, GetUsersResponse, PinnedPostResponse, SavedPostsResponse,
};
use clout_cache::{CacheResult, CloutBackend};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetUsersRequest<'a> {
    public_keys_base58_check: &'a [&'a str],
    skip_for_leaderboard: bool,
}

#[derive(Serialize)]
struct SavedPostsRequest<'a> {
    #[serde(rename = "PublicKey")]
    public_key: &'a str,
    #[serde(rename = "JWT")]
    jwt: String,
}

pub struct CloutApiClient {
    client: Client,
    node_url: String,
    feed_api_url: String,
    signer: Arc<dyn TokenSigner>,
}

impl CloutApiClient {
    pub fn new(config: &ApiConfig, signer: Arc<dyn TokenSigner>) -> ApiResult<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;

        Ok(Self {
            client,
            node_url: config.node_url.clone(),
            feed_api_url: config.feed_api_url.clone(),
            signer,
        })
    }

    pub async fn get_users_stateless(&self, public_keys: &[&str]) -> ApiResult<GetUsersResponse> {
        let url = format!("{}/api/v0/get-users-stateless", self.node_url);
        let body = GetUsersRequest {
            public_keys_base58_check: public_keys,
            skip_for_leaderboard: true,
        };

        self.send_json(self.client.post(&url).json(&body), &url)
            .await
    }

    pub async fn get_exchange_rate(&self) -> ApiResult<ExchangeRateResponse> {
        let url = format!("{}/api/v0/get-exchange-rate", self.node_url);
        self.send_json(self.client.get(&url), &url).await
    }

    pub async fn get_pinned_post(&self) -> ApiResult<PinnedPostResponse> {
        let url = format!("{}/pinned-post", self.feed_api_url);
        self.send_json(self.client.get(&url), &url).await
    }

    /// Saved posts of `public_key`; the request carries a freshly signed JWT
    pub async fn get_saved_posts(&self, public_key: &str) -> ApiResult<SavedPostsResponse> {
        let jwt = self.signer.sign_jwt(public_key).await?;
        let url = format!("{}/saved-posts", self.feed_api_url);
        let body = SavedPostsRequest { public_key, jwt };

        self.send_json(self.client.post(&url).json(&body), &url)
            .await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> ApiResult<T> {
        debug!(url = %url, "Calling API");

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(url = %url, status = status.as_u16(), "API call rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait::async_trait]
impl CloutBackend for CloutApiClient {
    async fn user(&self, public_key: &str) -> CacheResult<GetUsersResponse> {
        Ok(self.get_users_stateless(&[public_key]).await?)
    }

    async fn exchange_rate(&self) -> CacheResult<ExchangeRateResponse> {
        Ok(self.get_exchange_rate().await?)
    }

    async fn pinned_post(&self) -> CacheResult<PinnedPostResponse> {
        Ok(self.get_pinned_post().await?)
    }

    async fn saved_post_ids(&self, public_key: &str) -> CacheResult<Vec<String>> {
        Ok(self.get_saved_posts(public_key).await?.saved_posts)
    }
}
