//! CDN Live channel API client
//!
//! Concrete [`ChannelSource`] backed by the public CDN Live REST API.
//! The channel list endpoint takes the account name and subscription plan
//! as query parameters and answers with a JSON channel envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use super::ChannelSource;
use crate::config::ApiConfig;
use crate::errors::{FetchError, FetchResult};
use crate::models::ChannelListResponse;

/// Default API endpoint of the CDN Live service.
pub const DEFAULT_BASE_URL: &str = "https://api.cdn-live.tv/api/v1/";

/// Default account name used when none is configured.
pub const DEFAULT_USER: &str = "cdnlivetv";

/// Default subscription plan used when none is configured.
pub const DEFAULT_PLAN: &str = "free";

/// HTTP client for the CDN Live channel API.
pub struct CdnLiveClient {
    client: Client,
    base_url: String,
}

impl CdnLiveClient {
    /// Create a new client from the API configuration.
    pub fn new(config: &ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("ChannelX/1.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.clone(),
        }
    }

    /// Resolve the channel list endpoint against the configured base URL.
    fn channels_endpoint(&self) -> FetchResult<Url> {
        // Url::join drops the last path segment of a base without a
        // trailing slash, so the default base keeps one.
        Url::parse(&self.base_url)
            .and_then(|base| base.join("channels"))
            .map_err(|e| FetchError::new(format!("Invalid API base URL: {}", e)))
    }
}

#[async_trait]
impl ChannelSource for CdnLiveClient {
    async fn fetch_channels(&self, user: &str, plan: &str) -> FetchResult<ChannelListResponse> {
        let url = self.channels_endpoint()?;
        debug!("Fetching channel list from {} for user: {}", url, user);

        let response = self
            .client
            .get(url)
            .query(&[("user", user), ("plan", plan)])
            .send()
            .await
            .map_err(|e| FetchError::new(format!("Failed to fetch channels: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::http_status(response.status()));
        }

        let body = response
            .json::<ChannelListResponse>()
            .await
            .map_err(|e| FetchError::new(format!("Failed to decode channel list: {}", e)))?;

        info!(
            "Fetched {} of {} channels from remote source",
            body.channels.len(),
            body.total_channels
        );
        Ok(body)
    }
}
