//! Cooldown deadlines per key.
//!
//! When the API reports that an endpoint is rate limited for longer than the
//! client is willing to sleep, the endpoint is put on cooldown. Until the
//! deadline passes, calls are rejected locally without touching the network.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use tokio::time::Instant;
//! use topstats::rate_limit::Cooldowns;
//!
//! let mut cooldowns: Cooldowns<String> = Cooldowns::new();
//! cooldowns.set("/bots".to_string(), Instant::now() + Duration::from_secs(6));
//!
//! assert!(cooldowns.remaining(&"/bots".to_string()).is_some());
//! assert!(cooldowns.remaining(&"/rankings/bots".to_string()).is_none());
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

/// A map from key to the instant after which the key may be used again.
///
/// Expired deadlines are cleared lazily when looked up.
#[derive(Debug)]
pub struct Cooldowns<K> {
    deadlines: HashMap<K, Instant>,
}

impl<K> Cooldowns<K>
where
    K: Hash + Eq,
{
    /// Create an empty cooldown map.
    pub fn new() -> Self {
        Self {
            deadlines: HashMap::new(),
        }
    }

    /// Put a key on cooldown until `until`.
    ///
    /// A later deadline replaces an earlier one; an earlier deadline never
    /// shortens an active cooldown.
    pub fn set(&mut self, key: K, until: Instant) {
        let deadline = self.deadlines.entry(key).or_insert(until);
        if until > *deadline {
            *deadline = until;
        }
    }

    /// Remaining cooldown for a key.
    ///
    /// Returns `None` if the key is not cooling down. An expired deadline is
    /// removed on lookup.
    pub fn remaining(&mut self, key: &K) -> Option<Duration> {
        let until = *self.deadlines.get(key)?;
        let now = Instant::now();

        if until > now {
            Some(until - now)
        } else {
            self.deadlines.remove(key);
            None
        }
    }

    /// Remove every expired deadline.
    pub fn purge_expired(&mut self) {
        let now = Instant::now();
        self.deadlines.retain(|_, until| *until > now);
    }

    /// Number of tracked deadlines, expired or not.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Check if no deadlines are tracked.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

impl<K> Default for Cooldowns<K>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}
