//! In-memory channel repository
//!
//! Owns the single cache of the last fetch outcome and exposes it through
//! a watch channel: new observers immediately see the cached value, then
//! every update, and all observers share the one cache. Each refresh
//! replaces the cache wholesale. A failed refresh replaces it with the
//! failure too; previously fetched channels are not preserved.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::errors::FetchResult;
use crate::models::Channel;
use crate::sources::ChannelSource;

/// Repository holding the last known channel list fetch outcome.
///
/// Cloning is cheap and every clone operates on the same cache.
#[derive(Clone)]
pub struct ChannelRepository {
    inner: Arc<RepositoryInner>,
}

struct RepositoryInner {
    source: Arc<dyn ChannelSource>,
    user: String,
    plan: String,
    channels_tx: watch::Sender<FetchResult<Vec<Channel>>>,
    last_refreshed: Mutex<Option<DateTime<Utc>>>,
}

impl ChannelRepository {
    /// Create a repository fetching with the given account parameters.
    ///
    /// Before the first refresh the cache holds an empty success value;
    /// callers cannot tell "no data yet" from a legitimately empty list.
    pub fn new<U, P>(source: Arc<dyn ChannelSource>, user: U, plan: P) -> Self
    where
        U: Into<String>,
        P: Into<String>,
    {
        let (channels_tx, _) = watch::channel(Ok(Vec::new()));

        Self {
            inner: Arc::new(RepositoryInner {
                source,
                user: user.into(),
                plan: plan.into(),
                channels_tx,
                last_refreshed: Mutex::new(None),
            }),
        }
    }

    /// Observe the cached channel list.
    pub fn channels(&self) -> watch::Receiver<FetchResult<Vec<Channel>>> {
        self.inner.channels_tx.subscribe()
    }

    /// Fetch the channel list and replace the cache with the outcome.
    ///
    /// Concurrent calls are not de-duplicated; whichever call completes
    /// last determines the cached value. Reads of the cache stay available
    /// while a refresh is in flight.
    pub async fn refresh(&self) -> FetchResult<()> {
        match self
            .inner
            .source
            .fetch_channels(&self.inner.user, &self.inner.plan)
            .await
        {
            Ok(response) => {
                let channels: Vec<Channel> =
                    response.channels.into_iter().map(Channel::from).collect();
                info!("Refreshed channel cache with {} channels", channels.len());
                self.inner.channels_tx.send_replace(Ok(channels));
                *self.inner.last_refreshed.lock().unwrap() = Some(Utc::now());
                Ok(())
            }
            Err(err) => {
                warn!("Channel refresh failed: {}", err);
                self.inner.channels_tx.send_replace(Err(err.clone()));
                Err(err)
            }
        }
    }

    /// Completion time of the last successful refresh.
    pub fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refreshed.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::FetchError;
    use crate::models::{ChannelListResponse, ChannelRecord};

    struct ScriptedSource {
        outcomes: Mutex<VecDeque<FetchResult<ChannelListResponse>>>,
    }

    impl ScriptedSource {
        fn new(outcomes: Vec<FetchResult<ChannelListResponse>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes.into()),
            })
        }
    }

    #[async_trait]
    impl ChannelSource for ScriptedSource {
        async fn fetch_channels(
            &self,
            _user: &str,
            _plan: &str,
        ) -> FetchResult<ChannelListResponse> {
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::new("no scripted outcome left")))
        }
    }

    fn record(name: &str, code: &str, status: &str, viewers: u32) -> ChannelRecord {
        ChannelRecord {
            name: name.to_string(),
            country_code: code.to_string(),
            stream_url: "http://streams.example/live".to_string(),
            image_url: "http://logos.example/live.png".to_string(),
            status: status.to_string(),
            viewers,
        }
    }

    fn two_channel_response() -> ChannelListResponse {
        ChannelListResponse {
            total_channels: 2,
            channels: vec![
                record("BBC News", "uk", "online", 120),
                record("RT", "ru", "offline", 0),
            ],
        }
    }

    #[test]
    fn test_initial_cache_is_empty_success() {
        tokio_test::block_on(async {
            let repository =
                ChannelRepository::new(ScriptedSource::new(Vec::new()), "cdnlivetv", "free");
            let rx = repository.channels();
            assert_eq!(*rx.borrow(), Ok(Vec::new()));
            assert_eq!(repository.last_refreshed_at(), None);
        });
    }

    #[tokio::test]
    async fn test_refresh_publishes_mapped_channels() {
        let repository = ChannelRepository::new(
            ScriptedSource::new(vec![Ok(two_channel_response())]),
            "cdnlivetv",
            "free",
        );
        let rx = repository.channels();

        repository.refresh().await.unwrap();

        let cached = rx.borrow().clone().unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].id, "bbc_news_uk");
        assert!(cached[0].is_online);
        assert_eq!(cached[1].id, "rt_ru");
        assert!(!cached[1].is_online);
        assert!(repository.last_refreshed_at().is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_replaces_previous_channels() {
        let repository = ChannelRepository::new(
            ScriptedSource::new(vec![
                Ok(two_channel_response()),
                Err(FetchError::new("server unreachable")),
            ]),
            "cdnlivetv",
            "free",
        );
        let rx = repository.channels();

        repository.refresh().await.unwrap();
        let refreshed_at = repository.last_refreshed_at();
        assert!(refreshed_at.is_some());

        let err = repository.refresh().await.unwrap_err();
        assert_eq!(err.message(), "server unreachable");
        assert_eq!(*rx.borrow(), Err(err));
        // the failure timestamp is not recorded
        assert_eq!(repository.last_refreshed_at(), refreshed_at);
    }

    #[tokio::test]
    async fn test_observers_share_the_same_cache() {
        let repository = ChannelRepository::new(
            ScriptedSource::new(vec![Ok(two_channel_response())]),
            "cdnlivetv",
            "free",
        );
        let first = repository.channels();

        repository.refresh().await.unwrap();

        // a receiver created after the refresh sees the cached value too
        let late = repository.channels();
        assert_eq!(*first.borrow(), *late.borrow());
        assert_eq!(late.borrow().clone().unwrap().len(), 2);
    }
}
