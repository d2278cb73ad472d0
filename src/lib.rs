//! # topstats
//!
//! An async Rust client for the [topstats.gg](https://topstats.gg) Discord bot
//! statistics API.
//!
//! ## Features
//!
//! - Bot lookups, search, rankings and side-by-side comparisons
//! - Historical and recent time series for votes, servers, reviews and shards
//! - Client-side sliding window rate limiting, global and per endpoint
//! - Transparent retries of short server-side rate limits and network failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use topstats::TopStatsClient;
//! use topstats::types::Period;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TopStatsClient::new("your-topstats-token")?;
//!
//!     if let Some(series) = client
//!         .get_historical_bot_server_count(432610292342587392, Period::LastWeek)
//!         .await?
//!     {
//!         for point in series {
//!             println!("{}: {}", point.timestamp, point.value);
//!         }
//!     }
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod rest;
pub mod types;

// Re-export commonly used types at crate root
pub use auth::ApiToken;
pub use error::TopStatsError;
pub use rest::{Bot, TopStatsClient};
pub use types::common::{Metric, Period, SortBy, SortMethod};

/// Result type alias using TopStatsError
pub type Result<T> = std::result::Result<T, TopStatsError>;
