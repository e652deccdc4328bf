//! Timer-based coalescing buffer for noisy input streams
//!
//! Every pushed value restarts a fixed countdown; the latest value is
//! released only once the countdown elapses uninterrupted.

use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{self, Instant, Sleep};

/// Coalesces rapid-fire values, releasing only the latest one after a
/// quiet window of the configured length.
pub struct Debouncer<T> {
    window: Duration,
    deadline: Pin<Box<Sleep>>,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: Box::pin(time::sleep(window)),
            pending: None,
        }
    }

    /// Stash a value and restart the countdown.
    pub fn push(&mut self, value: T) {
        self.pending = Some(value);
        self.deadline.as_mut().reset(Instant::now() + self.window);
    }

    /// Wait for the quiet window to elapse and release the latest value.
    ///
    /// Pends forever while nothing is buffered, so it can sit in a
    /// `select!` arm without a guard. Cancellation-safe: a value pushed
    /// but not yet released stays buffered.
    pub async fn ready(&mut self) -> T {
        loop {
            if self.pending.is_some() {
                self.deadline.as_mut().await;
                if let Some(value) = self.pending.take() {
                    return value;
                }
            } else {
                future::pending::<()>().await;
            }
        }
    }
}
