//! Home screen view coordinator
//!
//! Merges the repository's cached fetch outcome with three UI-owned
//! inputs (search text, selected country, selected status) into one
//! derived [`HomeUiState`]. Search text changes are held back by a 300 ms
//! quiet window; every other input change recombines immediately. A
//! single combine task serializes all recombination passes.
//!
//! The derived stream is shared: the combine task starts with the first
//! subscriber and is torn down five seconds after the last one goes away,
//! then restarts from scratch on the next subscriber.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::filtering;
use crate::errors::{FetchError, FetchResult};
use crate::models::{Channel, ChannelStatus};
use crate::repositories::ChannelRepository;
use crate::utils::Debouncer;

/// Quiet window applied to search text changes before recombination.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// How long the combine task keeps running after the last subscriber
/// is gone.
const SHARE_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Shown when a fetch failure carries no text of its own.
const FALLBACK_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Derived state of the home screen.
#[derive(Debug, Clone, PartialEq)]
pub enum HomeUiState {
    /// No recombination has completed yet.
    Loading,
    /// Channel data is available; `channels` reflects the active filters.
    Success {
        channels: Vec<Channel>,
        available_countries: Vec<String>,
        is_empty: bool,
    },
    /// The last fetch failed.
    Error { message: String },
}

impl HomeUiState {
    /// Build a success state; `is_empty` is derived from the list so the
    /// two can never disagree.
    pub fn success(channels: Vec<Channel>, available_countries: Vec<String>) -> Self {
        let is_empty = channels.is_empty();
        Self::Success {
            channels,
            available_countries,
            is_empty,
        }
    }

    fn error(err: &FetchError) -> Self {
        let message = if err.message().trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            err.message().to_string()
        };
        Self::Error { message }
    }
}

/// Coordinates the home screen's inputs into one observable UI state.
///
/// Cloning is cheap; every clone drives the same shared state.
#[derive(Clone)]
pub struct HomeService {
    inner: Arc<HomeInner>,
}

struct HomeInner {
    repository: ChannelRepository,
    search_tx: watch::Sender<String>,
    country_tx: watch::Sender<Option<String>>,
    status_tx: watch::Sender<ChannelStatus>,
    refreshing_tx: watch::Sender<bool>,
    ui_tx: watch::Sender<HomeUiState>,
    share: Mutex<ShareState>,
}

/// Bookkeeping for the shared combine task.
///
/// `epoch` bumps on every subscriber change; a scheduled teardown only
/// fires if the epoch it captured is still current, so a stale teardown
/// can never kill a combine task that has found new subscribers.
struct ShareState {
    subscribers: usize,
    epoch: u64,
    combine: Option<JoinHandle<()>>,
    teardown: Option<JoinHandle<()>>,
}

/// Handle to the shared UI state stream.
///
/// Holding it keeps the combine task alive; dropping the last one starts
/// the teardown grace period.
pub struct UiStateSubscription {
    rx: watch::Receiver<HomeUiState>,
    _guard: SubscriberGuard,
}

impl UiStateSubscription {
    /// Latest derived state, marking it as seen.
    pub fn current(&mut self) -> HomeUiState {
        self.rx.borrow_and_update().clone()
    }

    /// Wait until a new state is published.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }

    /// Whether a state was published since the last `changed` call.
    pub fn has_changed(&self) -> Result<bool, watch::error::RecvError> {
        self.rx.has_changed()
    }
}

struct SubscriberGuard {
    inner: Arc<HomeInner>,
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        unsubscribe(&self.inner);
    }
}

impl HomeService {
    /// Create a coordinator on top of the given repository.
    ///
    /// Nothing is fetched here; call [`HomeService::load_initial`] once at
    /// startup.
    pub fn new(repository: ChannelRepository) -> Self {
        let (search_tx, _) = watch::channel(String::new());
        let (country_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(ChannelStatus::All);
        let (refreshing_tx, _) = watch::channel(false);
        let (ui_tx, _) = watch::channel(HomeUiState::Loading);

        Self {
            inner: Arc::new(HomeInner {
                repository,
                search_tx,
                country_tx,
                status_tx,
                refreshing_tx,
                ui_tx,
                share: Mutex::new(ShareState {
                    subscribers: 0,
                    epoch: 0,
                    combine: None,
                    teardown: None,
                }),
            }),
        }
    }

    /// Subscribe to the derived UI state.
    ///
    /// The first subscription starts the shared combine task; until its
    /// first recombination completes the subscription observes
    /// [`HomeUiState::Loading`]. Must be called from within a Tokio
    /// runtime.
    pub fn ui_state(&self) -> UiStateSubscription {
        subscribe(&self.inner)
    }

    /// Observe whether an explicit refresh is in flight.
    pub fn is_refreshing(&self) -> watch::Receiver<bool> {
        self.inner.refreshing_tx.subscribe()
    }

    /// Observe the raw (undebounced) search text.
    pub fn search_query(&self) -> watch::Receiver<String> {
        self.inner.search_tx.subscribe()
    }

    /// Observe the selected country filter.
    pub fn selected_country(&self) -> watch::Receiver<Option<String>> {
        self.inner.country_tx.subscribe()
    }

    /// Observe the selected status filter.
    pub fn selected_status(&self) -> watch::Receiver<ChannelStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Update the search text; recombination follows once the quiet
    /// window elapses.
    pub fn set_search_query<S: Into<String>>(&self, query: S) {
        self.inner.search_tx.send_replace(query.into());
    }

    /// Select a country filter, or clear it with `None`. Takes effect on
    /// the next recombination, without debounce.
    pub fn set_country(&self, country_code: Option<String>) {
        self.inner.country_tx.send_replace(country_code);
    }

    /// Select a status filter. Takes effect on the next recombination,
    /// without debounce.
    pub fn set_status(&self, status: ChannelStatus) {
        self.inner.status_tx.send_replace(status);
    }

    /// Reset status, country and search text in one go.
    pub fn clear_all_filters(&self) {
        self.inner.status_tx.send_replace(ChannelStatus::All);
        self.inner.country_tx.send_replace(None);
        self.inner.search_tx.send_replace(String::new());
    }

    /// Refresh the channel list, tracking the in-flight flag.
    ///
    /// Fetch failures are not returned; they surface through the
    /// recombined UI state only.
    pub async fn refresh(&self) {
        self.inner.refreshing_tx.send_replace(true);
        let _ = self.inner.repository.refresh().await;
        self.inner.refreshing_tx.send_replace(false);
    }

    /// Startup fetch. The outcome flows through the UI state only; the
    /// refresh flag belongs to the explicit pull-to-refresh gesture and
    /// is left alone here.
    pub async fn load_initial(&self) {
        let _ = self.inner.repository.refresh().await;
    }
}

fn subscribe(inner: &Arc<HomeInner>) -> UiStateSubscription {
    let rx = inner.ui_tx.subscribe();
    let mut share = inner.share.lock().unwrap();
    share.subscribers += 1;
    share.epoch += 1;
    if let Some(teardown) = share.teardown.take() {
        teardown.abort();
    }
    if share.combine.is_none() {
        share.combine = Some(spawn_combine(Arc::clone(inner)));
    }
    drop(share);

    UiStateSubscription {
        rx,
        _guard: SubscriberGuard {
            inner: Arc::clone(inner),
        },
    }
}

fn unsubscribe(inner: &Arc<HomeInner>) {
    let mut share = inner.share.lock().unwrap();
    share.subscribers -= 1;
    share.epoch += 1;
    if share.subscribers > 0 {
        return;
    }

    let epoch = share.epoch;
    let inner = Arc::clone(inner);
    share.teardown = Some(tokio::spawn(async move {
        tokio::time::sleep(SHARE_GRACE_PERIOD).await;
        let mut share = inner.share.lock().unwrap();
        if share.epoch == epoch {
            if let Some(combine) = share.combine.take() {
                combine.abort();
                debug!("Stopped home state recombination after grace period");
            }
            share.teardown = None;
        }
    }));
}

/// Run the recombination loop until aborted.
///
/// Each input change is applied as one serialized event; the search input
/// goes through the debouncer while the others recombine directly.
fn spawn_combine(inner: Arc<HomeInner>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut channels_rx = inner.repository.channels();
        let mut search_rx = inner.search_tx.subscribe();
        let mut country_rx = inner.country_tx.subscribe();
        let mut status_rx = inner.status_tx.subscribe();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);

        // The search text active at startup is committed as-is; only
        // changes wait out the quiet window.
        let mut search = search_rx.borrow_and_update().clone();
        recombine(
            &inner.ui_tx,
            &mut channels_rx,
            &mut country_rx,
            &mut status_rx,
            &search,
        );

        loop {
            tokio::select! {
                changed = channels_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    recombine(&inner.ui_tx, &mut channels_rx, &mut country_rx, &mut status_rx, &search);
                }
                changed = country_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    recombine(&inner.ui_tx, &mut channels_rx, &mut country_rx, &mut status_rx, &search);
                }
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    recombine(&inner.ui_tx, &mut channels_rx, &mut country_rx, &mut status_rx, &search);
                }
                changed = search_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debouncer.push(search_rx.borrow_and_update().clone());
                }
                query = debouncer.ready() => {
                    search = query;
                    recombine(&inner.ui_tx, &mut channels_rx, &mut country_rx, &mut status_rx, &search);
                }
            }
        }
    })
}

/// One recombination pass: read the latest inputs, derive the UI state,
/// publish it. Pending change notifications for the inputs read here are
/// consumed, so one pass can absorb several queued changes.
fn recombine(
    ui_tx: &watch::Sender<HomeUiState>,
    channels_rx: &mut watch::Receiver<FetchResult<Vec<Channel>>>,
    country_rx: &mut watch::Receiver<Option<String>>,
    status_rx: &mut watch::Receiver<ChannelStatus>,
    search: &str,
) {
    let fetched = channels_rx.borrow_and_update().clone();
    let country = country_rx.borrow_and_update().clone();
    let status = *status_rx.borrow_and_update();

    let state = match fetched {
        Ok(channels) => {
            let filtered = filtering::filter_channels(&channels, country.as_deref(), status);
            let searched = filtering::search_channels(&filtered, search);
            let countries = filtering::available_countries(&channels);
            HomeUiState::success(searched, countries)
        }
        Err(err) => HomeUiState::error(&err),
    };

    ui_tx.send_replace(state);
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::time::advance;

    use super::*;
    use crate::models::{ChannelListResponse, ChannelRecord};
    use crate::sources::ChannelSource;

    struct EmptySource;

    #[async_trait]
    impl ChannelSource for EmptySource {
        async fn fetch_channels(
            &self,
            _user: &str,
            _plan: &str,
        ) -> FetchResult<ChannelListResponse> {
            Ok(ChannelListResponse {
                total_channels: 0,
                channels: Vec::new(),
            })
        }
    }

    fn home() -> HomeService {
        HomeService::new(ChannelRepository::new(
            Arc::new(EmptySource),
            "cdnlivetv",
            "free",
        ))
    }

    fn combine_running(home: &HomeService) -> bool {
        home.inner.share.lock().unwrap().combine.is_some()
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_subscriber_starts_combine_task() {
        let home = home();
        assert!(!combine_running(&home));
        let _sub = home.ui_state();
        assert!(combine_running(&home));
    }

    #[tokio::test(start_paused = true)]
    async fn test_combine_survives_within_grace_period() {
        let home = home();
        let sub = home.ui_state();
        drop(sub);

        advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(combine_running(&home));

        // resubscribing inside the window cancels the pending teardown
        let _sub = home.ui_state();
        advance(Duration::from_secs(10)).await;
        settle().await;
        assert!(combine_running(&home));
    }

    #[tokio::test(start_paused = true)]
    async fn test_combine_stops_after_grace_period_and_restarts() {
        let home = home();
        let sub = home.ui_state();
        drop(sub);

        // let the spawned teardown task register its grace-period timer
        // before the paused clock jumps past it
        settle().await;
        advance(Duration::from_secs(6)).await;
        settle().await;
        assert!(!combine_running(&home));

        let _sub = home.ui_state();
        assert!(combine_running(&home));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_waits_for_the_last_subscriber() {
        let home = home();
        let first = home.ui_state();
        let second = home.ui_state();

        drop(first);
        advance(Duration::from_secs(10)).await;
        settle().await;
        assert!(combine_running(&home));

        drop(second);
        // let the spawned teardown task register its grace-period timer
        // before the paused clock jumps past it
        settle().await;
        advance(Duration::from_secs(6)).await;
        settle().await;
        assert!(!combine_running(&home));
    }

    #[test]
    fn test_success_state_derives_is_empty() {
        let state = HomeUiState::success(Vec::new(), vec!["uk".to_string()]);
        assert_eq!(
            state,
            HomeUiState::Success {
                channels: Vec::new(),
                available_countries: vec!["uk".to_string()],
                is_empty: true,
            }
        );
    }

    #[test]
    fn test_error_state_falls_back_when_message_is_blank() {
        let state = HomeUiState::error(&FetchError::new("  "));
        assert_eq!(
            state,
            HomeUiState::Error {
                message: FALLBACK_ERROR_MESSAGE.to_string(),
            }
        );

        let state = HomeUiState::error(&FetchError::new("timeout"));
        assert_eq!(
            state,
            HomeUiState::Error {
                message: "timeout".to_string(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_text_set_before_first_subscriber_is_not_debounced() {
        let record = ChannelRecord {
            name: "BBC News".to_string(),
            country_code: "uk".to_string(),
            stream_url: "u1".to_string(),
            image_url: "i1".to_string(),
            status: "online".to_string(),
            viewers: 120,
        };

        struct OneChannel(ChannelRecord);

        #[async_trait]
        impl ChannelSource for OneChannel {
            async fn fetch_channels(
                &self,
                _user: &str,
                _plan: &str,
            ) -> FetchResult<ChannelListResponse> {
                Ok(ChannelListResponse {
                    total_channels: 1,
                    channels: vec![self.0.clone()],
                })
            }
        }

        let home = HomeService::new(ChannelRepository::new(
            Arc::new(OneChannel(record)),
            "cdnlivetv",
            "free",
        ));

        home.load_initial().await;
        home.set_search_query("xyz");

        // no clock advance: the startup pass applies the query directly
        let mut sub = home.ui_state();
        sub.changed().await.unwrap();
        assert_eq!(
            sub.current(),
            HomeUiState::success(Vec::new(), vec!["uk".to_string()])
        );
    }
}
