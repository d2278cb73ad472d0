//! topstats.gg REST API client.
//!
//! All endpoints are methods on [`TopStatsClient`]. Lookups that hit a
//! missing bot or user return `Ok(None)` rather than an error.
//!
//! ```rust,no_run
//! use topstats::rest::{TopBotsRequest, TopStatsClient};
//! use topstats::types::SortBy;
//!
//! # async fn run() -> Result<(), topstats::TopStatsError> {
//! let client = TopStatsClient::from_env()?;
//! let request = TopBotsRequest::new(SortBy::server_count()).limit(10);
//! if let Some(top) = client.get_top_bots(&request).await? {
//!     for bot in top.bots {
//!         println!("#{:?} {}", bot.server_count.rank, bot.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod bots;
mod client;
mod endpoints;
mod types;

pub use client::{TopStatsClient, TopStatsClientBuilder};
pub use endpoints::TOPSTATS_BASE_URL;
pub use types::{
    Bot, PartialBot, Ranked, RecentBotStats, SearchBotsRequest, SearchResults, Timestamped,
    TimestampedBotStats, TopBots, TopBotsRequest, avatar_url, snowflake_created_at,
};
