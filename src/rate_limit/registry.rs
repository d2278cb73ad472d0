//! Per-endpoint rate limit bookkeeping.
//!
//! Every request path maps to an endpoint key (see [`endpoint_key`]). Each key
//! gets its own [`RateLimiters`] group, headed by the client-wide global
//! window, and may carry a cooldown set after a long server-side rate limit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::rate_limit::{Cooldowns, RateLimitConfig, RateLimiters, SlidingWindow};

/// Rate limiters and cooldowns for every endpoint key a client has used.
///
/// Limiters for a key are created lazily on first use. The registry belongs to
/// one client; separate clients never share state.
#[derive(Debug)]
pub struct EndpointRegistry {
    config: RateLimitConfig,
    /// Window shared by every endpoint
    global: Arc<SlidingWindow>,
    limiters: Mutex<HashMap<String, Arc<RateLimiters>>>,
    cooldowns: Mutex<Cooldowns<String>>,
}

impl EndpointRegistry {
    /// Create a registry from a rate limit configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        let global = Arc::new(SlidingWindow::new(
            config.global.max_calls,
            config.global.period,
        ));

        Self {
            config,
            global,
            limiters: Mutex::new(HashMap::new()),
            cooldowns: Mutex::new(Cooldowns::new()),
        }
    }

    /// Get the limiter group for an endpoint key, creating it on first use.
    pub async fn limiters_for(&self, key: &str) -> Arc<RateLimiters> {
        let mut limiters = self.limiters.lock().await;

        if let Some(existing) = limiters.get(key) {
            return existing.clone();
        }

        let limit = self.config.limit_for(key);
        let group = Arc::new(RateLimiters::new(vec![
            self.global.clone(),
            Arc::new(SlidingWindow::new(limit.max_calls, limit.period)),
        ]));
        limiters.insert(key.to_string(), group.clone());
        group
    }

    /// Remaining cooldown for an endpoint key, if it is still cooling down.
    pub async fn cooldown_for(&self, key: &str) -> Option<Duration> {
        self.cooldowns.lock().await.remaining(&key.to_string())
    }

    /// Put an endpoint key on cooldown until `until`.
    ///
    /// Expired cooldowns of other keys are dropped at the same time.
    pub async fn set_cooldown(&self, key: &str, until: Instant) {
        tracing::warn!(
            endpoint = key,
            cooldown_ms = until.saturating_duration_since(Instant::now()).as_millis() as u64,
            "endpoint put on cooldown"
        );
        let mut cooldowns = self.cooldowns.lock().await;
        cooldowns.purge_expired();
        cooldowns.set(key.to_string(), until);
    }

    /// Number of endpoint keys with a cooldown on record, expired or not.
    pub async fn cooldown_count(&self) -> usize {
        self.cooldowns.lock().await.len()
    }

    /// The global window shared by every endpoint.
    pub fn global(&self) -> &Arc<SlidingWindow> {
        &self.global
    }

    /// The configuration this registry was built from.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Number of endpoint keys with a limiter group.
    pub async fn tracked_keys(&self) -> usize {
        self.limiters.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::WindowLimit;

    #[tokio::test]
    async fn test_same_key_shares_limiters() {
        let registry = EndpointRegistry::new(RateLimitConfig::default());

        let first = registry.limiters_for("/bots/historical").await;
        let second = registry.limiters_for("/bots/historical").await;
        let other = registry.limiters_for("/bots/recent").await;

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(registry.tracked_keys().await, 2);
    }

    #[tokio::test]
    async fn test_global_window_leads_every_group() {
        let registry = EndpointRegistry::new(RateLimitConfig::default());

        let bots = registry.limiters_for("/bots").await;
        let rankings = registry.limiters_for("/rankings/bots").await;

        assert!(Arc::ptr_eq(&bots.windows()[0], registry.global()));
        assert!(Arc::ptr_eq(&rankings.windows()[0], registry.global()));
        assert!(!Arc::ptr_eq(&bots.windows()[1], &rankings.windows()[1]));
    }

    #[tokio::test]
    async fn test_override_applies_to_key() {
        let config = RateLimitConfig::default()
            .with_override("/search", WindowLimit::new(5, Duration::from_secs(10)));
        let registry = EndpointRegistry::new(config);

        let search = registry.limiters_for("/search").await;
        assert_eq!(search.windows()[1].max_calls(), 5);
        assert_eq!(search.windows()[1].period(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_lifecycle() {
        let registry = EndpointRegistry::new(RateLimitConfig::default());
        registry
            .set_cooldown("/bots", Instant::now() + Duration::from_secs(6))
            .await;

        assert_eq!(
            registry.cooldown_for("/bots").await,
            Some(Duration::from_secs(6))
        );
        assert!(registry.cooldown_for("/bots/recent").await.is_none());

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(registry.cooldown_for("/bots").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_setting_cooldown_drops_expired_ones() {
        let registry = EndpointRegistry::new(RateLimitConfig::default());
        registry
            .set_cooldown("/bots", Instant::now() + Duration::from_secs(1))
            .await;
        registry
            .set_cooldown("/search", Instant::now() + Duration::from_secs(30))
            .await;
        assert_eq!(registry.cooldown_count().await, 2);

        tokio::time::advance(Duration::from_secs(2)).await;
        registry
            .set_cooldown("/rankings/bots", Instant::now() + Duration::from_secs(10))
            .await;

        assert_eq!(registry.cooldown_count().await, 2);
        assert!(registry.cooldown_for("/search").await.is_some());
    }
}
