//! Remote channel source collaborators
//!
//! The rest of the crate consumes the channel API through the
//! [`ChannelSource`] trait; transport, timeout and retry policy live
//! behind it.

use async_trait::async_trait;

use crate::errors::FetchResult;
use crate::models::ChannelListResponse;

pub mod cdn_live;

pub use cdn_live::CdnLiveClient;

/// Remote source for the live channel list.
#[async_trait]
pub trait ChannelSource: Send + Sync {
    /// Fetch the channel list for the given account parameters.
    ///
    /// Any transport, timeout or decode problem surfaces as a single
    /// failure value with a readable message.
    async fn fetch_channels(&self, user: &str, plan: &str) -> FetchResult<ChannelListResponse>;
}
