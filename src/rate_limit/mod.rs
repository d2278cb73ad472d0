//! Client-side rate limiting for the topstats API.
//!
//! Every request passes through two sliding windows: a global window shared by
//! the whole client, and a window for the endpoint being called. Endpoints are
//! identified by their path with numeric IDs removed, so `/bots/1/recent` and
//! `/bots/2/recent` share one budget.
//!
//! When the API answers `429 Too Many Requests` with a long wait, the endpoint
//! is put on cooldown and further calls fail locally until it expires.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use topstats::rate_limit::{endpoint_key, RateLimitConfig, WindowLimit};
//!
//! let config = RateLimitConfig {
//!     per_endpoint: WindowLimit::new(30, Duration::from_secs(60)),
//!     ..RateLimitConfig::default()
//! };
//! assert!(config.validate().is_ok());
//!
//! assert_eq!(endpoint_key("/bots/432610292342587392/historical"), "/bots/historical");
//! ```

mod composite;
mod cooldown;
mod registry;
mod window;

pub use composite::RateLimiters;
pub use cooldown::Cooldowns;
pub use registry::EndpointRegistry;
pub use window::SlidingWindow;

use std::collections::HashMap;
use std::time::Duration;

use crate::error::TopStatsError;

/// A `max_calls` per `period` budget for one sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimit {
    /// Maximum calls per window.
    pub max_calls: usize,
    /// Window duration.
    pub period: Duration,
}

impl WindowLimit {
    /// Create a new window budget.
    pub const fn new(max_calls: usize, period: Duration) -> Self {
        Self { max_calls, period }
    }
}

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether to apply the local sliding windows. Cooldowns from server
    /// rate limits are honoured either way.
    pub enabled: bool,
    /// Budget shared by every endpoint.
    pub global: WindowLimit,
    /// Budget for each endpoint key without an override.
    pub per_endpoint: WindowLimit,
    /// Budgets for specific endpoint keys.
    pub overrides: HashMap<String, WindowLimit>,
    /// Longest server-requested wait the client sleeps through before retrying.
    pub max_retry_wait: Duration,
    /// How many short 429 waits a single call sleeps through.
    pub max_ratelimit_retries: u32,
}

impl RateLimitConfig {
    /// Set a budget for one endpoint key.
    pub fn with_override(mut self, key: impl AsRef<str>, limit: WindowLimit) -> Self {
        self.overrides.insert(endpoint_key(key.as_ref()), limit);
        self
    }

    /// Budget that applies to an endpoint key.
    pub fn limit_for(&self, key: &str) -> WindowLimit {
        self.overrides
            .get(key)
            .copied()
            .unwrap_or(self.per_endpoint)
    }

    /// Check that every window can admit at least one call.
    pub fn validate(&self) -> Result<(), TopStatsError> {
        let windows = std::iter::once(("global", &self.global))
            .chain(std::iter::once(("per_endpoint", &self.per_endpoint)))
            .chain(self.overrides.iter().map(|(key, limit)| (key.as_str(), limit)));

        for (name, limit) in windows {
            if limit.max_calls == 0 || limit.period.is_zero() {
                return Err(TopStatsError::InvalidArgument(format!(
                    "Rate limit window {name} must allow at least one call per non-zero period."
                )));
            }
        }

        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            global: limits::GLOBAL,
            per_endpoint: limits::PER_ENDPOINT,
            overrides: HashMap::new(),
            max_retry_wait: limits::MAX_RETRY_WAIT,
            max_ratelimit_retries: limits::MAX_RATELIMIT_RETRIES,
        }
    }
}

/// Default rate limit constants.
pub mod limits {
    use std::time::Duration;

    use super::WindowLimit;

    /// Requests per minute across the whole client.
    pub const GLOBAL: WindowLimit = WindowLimit::new(120, Duration::from_secs(60));
    /// Requests per minute for a single endpoint key.
    pub const PER_ENDPOINT: WindowLimit = WindowLimit::new(60, Duration::from_secs(60));
    /// Server-requested waits up to this long are slept through.
    pub const MAX_RETRY_WAIT: Duration = Duration::from_secs(5);
    /// Short 429 waits slept through by one call.
    pub const MAX_RATELIMIT_RETRIES: u32 = 3;
}

/// Normalize a request path into the endpoint key used for rate limiting.
///
/// Query strings, empty segments and all-digit segments are dropped, so every
/// ID of the same resource shares a key.
///
/// ```rust
/// use topstats::rate_limit::endpoint_key;
///
/// assert_eq!(endpoint_key("/bots/123/historical"), endpoint_key("/bots/456/historical"));
/// assert_ne!(endpoint_key("/bots/123/recent"), endpoint_key("/bots/123/historical"));
/// assert_eq!(endpoint_key("//compare/1/2?type=monthly_votes"), "/compare");
/// ```
pub fn endpoint_key(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| !segment.bytes().all(|b| b.is_ascii_digit()))
        .collect();

    format!("/{}", segments.join("/"))
}
