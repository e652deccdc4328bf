//! Playback screen state
//!
//! Observable flags backing the stream player screen. The embedded web
//! player itself lives outside this crate; these flags only track what it
//! reports back.

use std::sync::Arc;

use tokio::sync::watch;

/// Play/pause, loading and error flags for the player screen.
///
/// Playback starts in the playing and loading state with no error.
#[derive(Clone)]
pub struct PlayerService {
    inner: Arc<PlayerInner>,
}

struct PlayerInner {
    playing_tx: watch::Sender<bool>,
    loading_tx: watch::Sender<bool>,
    error_tx: watch::Sender<bool>,
}

impl PlayerService {
    pub fn new() -> Self {
        let (playing_tx, _) = watch::channel(true);
        let (loading_tx, _) = watch::channel(true);
        let (error_tx, _) = watch::channel(false);

        Self {
            inner: Arc::new(PlayerInner {
                playing_tx,
                loading_tx,
                error_tx,
            }),
        }
    }

    pub fn toggle_play_pause(&self) {
        self.inner
            .playing_tx
            .send_modify(|playing| *playing = !*playing);
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.loading_tx.send_replace(loading);
    }

    pub fn set_error(&self, has_error: bool) {
        self.inner.error_tx.send_replace(has_error);
    }

    pub fn is_playing(&self) -> watch::Receiver<bool> {
        self.inner.playing_tx.subscribe()
    }

    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.inner.loading_tx.subscribe()
    }

    pub fn has_error(&self) -> watch::Receiver<bool> {
        self.inner.error_tx.subscribe()
    }
}

impl Default for PlayerService {
    fn default() -> Self {
        Self::new()
    }
}
