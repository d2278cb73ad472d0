//! Sliding window rate limiting.
//!
//! A [`SlidingWindow`] records the time of every completed call and makes new
//! callers wait while the window is full.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use topstats::rate_limit::SlidingWindow;
//!
//! # tokio_test::block_on(async {
//! let window = SlidingWindow::new(2, Duration::from_secs(1));
//!
//! window.acquire().await;
//! // ... perform the request ...
//! window.release().await;
//!
//! assert_eq!(window.len().await, 1);
//! # });
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// A sliding window rate limiter.
///
/// `acquire` waits until fewer than `max_calls` calls are on record, and
/// `release` records a call. Old calls are only pruned on `release`, from the
/// head, while the recorded span is at least one `period` wide.
///
/// The limiter uses tokio's clock, so tests can drive it with a paused runtime.
#[derive(Debug)]
pub struct SlidingWindow {
    /// Completed call timestamps, oldest first
    calls: Mutex<VecDeque<Instant>>,
    /// Maximum calls per window
    max_calls: usize,
    /// Window duration
    period: Duration,
}

impl SlidingWindow {
    /// Create a new sliding window limiter.
    ///
    /// # Arguments
    ///
    /// * `max_calls` - Maximum number of calls allowed per window
    /// * `period` - The sliding window duration
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self {
            calls: Mutex::new(VecDeque::with_capacity(max_calls + 1)),
            max_calls,
            period,
        }
    }

    /// Wait until the window has room for another call.
    ///
    /// The wait is computed once: if the window is full the caller sleeps for
    /// `period` minus the recorded span and then proceeds. The call itself is
    /// not recorded until [`release`](Self::release).
    pub async fn acquire(&self) {
        let calls = self.calls.lock().await;

        if calls.len() >= self.max_calls {
            let wait = self.period.saturating_sub(timespan(&calls));

            if !wait.is_zero() {
                tracing::debug!(
                    max_calls = self.max_calls,
                    wait_ms = wait.as_millis() as u64,
                    "sliding window full, waiting"
                );
                sleep(wait).await;
            }
        }
    }

    /// Record a completed call and prune calls that fell out of the window.
    pub async fn release(&self) {
        let mut calls = self.calls.lock().await;
        calls.push_back(Instant::now());

        while !calls.is_empty() && timespan(&calls) >= self.period {
            calls.pop_front();
        }
    }

    /// Number of calls currently on record.
    pub async fn len(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Check if no calls are on record.
    pub async fn is_empty(&self) -> bool {
        self.calls.lock().await.is_empty()
    }

    /// Maximum calls per window.
    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Window duration.
    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Span between the oldest and the newest recorded call.
fn timespan(calls: &VecDeque<Instant>) -> Duration {
    match (calls.front(), calls.back()) {
        (Some(oldest), Some(newest)) => newest.saturating_duration_since(*oldest),
        _ => Duration::ZERO,
    }
}
