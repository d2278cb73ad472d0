//! Composite rate limiting across several sliding windows.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::rate_limit::SlidingWindow;

/// A group of [`SlidingWindow`] limiters entered and exited together.
///
/// The windows are shared, not owned: the client's global window sits at the
/// front of every endpoint's group. Acquisition always walks the windows in
/// the same order, so two groups sharing the global window cannot deadlock.
#[derive(Debug, Clone)]
pub struct RateLimiters {
    windows: Vec<Arc<SlidingWindow>>,
}

impl RateLimiters {
    /// Create a group from windows in acquisition order.
    pub fn new(windows: Vec<Arc<SlidingWindow>>) -> Self {
        Self { windows }
    }

    /// Wait until every window in the group grants entry, in order.
    pub async fn acquire(&self) {
        for window in &self.windows {
            window.acquire().await;
        }
    }

    /// Record the call in every window.
    ///
    /// Windows are released independently; a window that is busy does not
    /// hold back the others.
    pub async fn release(&self) {
        join_all(self.windows.iter().map(|window| window.release())).await;
    }

    /// The windows in acquisition order.
    pub fn windows(&self) -> &[Arc<SlidingWindow>] {
        &self.windows
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;

    async fn fill(limiters: &RateLimiters, calls: usize) {
        for _ in 0..calls {
            limiters.acquire().await;
            limiters.release().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_records_in_every_window() {
        let a = Arc::new(SlidingWindow::new(5, Duration::from_secs(1)));
        let b = Arc::new(SlidingWindow::new(5, Duration::from_secs(1)));
        let limiters = RateLimiters::new(vec![a.clone(), b.clone()]);

        fill(&limiters, 2).await;

        assert_eq!(a.len().await, 2);
        assert_eq!(b.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_at_least_as_long_as_stricter_window() {
        let loose = Arc::new(SlidingWindow::new(10, Duration::from_secs(1)));
        let strict = Arc::new(SlidingWindow::new(1, Duration::from_secs(2)));
        let limiters = RateLimiters::new(vec![loose.clone(), strict.clone()]);

        fill(&limiters, 1).await;

        let start = Instant::now();
        limiters.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_window_limits_both_groups() {
        let global = Arc::new(SlidingWindow::new(2, Duration::from_secs(1)));
        let first = RateLimiters::new(vec![
            global.clone(),
            Arc::new(SlidingWindow::new(10, Duration::from_secs(1))),
        ]);
        let second = RateLimiters::new(vec![
            global.clone(),
            Arc::new(SlidingWindow::new(10, Duration::from_secs(1))),
        ]);

        fill(&first, 1).await;
        fill(&second, 1).await;

        let start = Instant::now();
        first.acquire().await;
        assert!(start.elapsed() > Duration::ZERO);
        assert_eq!(global.len().await, 2);
    }
}
