//! Types for the topstats REST endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use time::OffsetDateTime;

use crate::types::serde_helpers::{empty_string_as_none, unix_millis};
use crate::types::{Metric, SortBy};

/// Discord epoch (2015-01-01T00:00:00Z) in milliseconds.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// A statistic together with its rank among all bots and its change since the
/// previous data point. Either extra may be missing depending on the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ranked {
    /// The statistic's value.
    pub value: i64,
    /// Position compared to other bots (1 is the highest).
    pub rank: Option<u64>,
    /// Change compared to the previous data point.
    pub difference: Option<i64>,
}

impl std::fmt::Display for Ranked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.rank {
            Some(rank) => write!(f, "{} (#{})", self.value, rank),
            None => write!(f, "{}", self.value),
        }
    }
}

impl From<Ranked> for i64 {
    fn from(ranked: Ranked) -> Self {
        ranked.value
    }
}

/// The flat `<metric>`, `<metric>_rank`, `<metric>_change` fields shared by
/// bot records.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RankedFields {
    monthly_votes: i64,
    monthly_votes_rank: Option<u64>,
    monthly_votes_change: Option<i64>,
    total_votes: i64,
    total_votes_rank: Option<u64>,
    total_votes_change: Option<i64>,
    server_count: i64,
    server_count_rank: Option<u64>,
    server_count_change: Option<i64>,
    review_count: i64,
    review_count_rank: Option<u64>,
    review_count_change: Option<i64>,
    shard_count: i64,
    shard_count_rank: Option<u64>,
    shard_count_change: Option<i64>,
}

impl RankedFields {
    fn get(&self, metric: Metric) -> Ranked {
        let (value, rank, difference) = match metric {
            Metric::MonthlyVotes => (
                self.monthly_votes,
                self.monthly_votes_rank,
                self.monthly_votes_change,
            ),
            Metric::TotalVotes => (
                self.total_votes,
                self.total_votes_rank,
                self.total_votes_change,
            ),
            Metric::ServerCount => (
                self.server_count,
                self.server_count_rank,
                self.server_count_change,
            ),
            Metric::ReviewCount => (
                self.review_count,
                self.review_count_rank,
                self.review_count_change,
            ),
            Metric::ShardCount => (
                self.shard_count,
                self.shard_count_rank,
                self.shard_count_change,
            ),
        };

        Ranked {
            value,
            rank,
            difference,
        }
    }
}

/// Avatar URL for a bot: its custom avatar if set, otherwise Discord's default.
pub fn avatar_url(id: u64, avatar: Option<&str>) -> String {
    match avatar {
        Some(hash) => {
            let ext = if hash.starts_with("a_") { "gif" } else { "png" };
            format!("https://cdn.discordapp.com/avatars/{id}/{hash}.{ext}?size=1024")
        }
        None => format!(
            "https://cdn.discordapp.com/embed/avatars/{}.png",
            (id >> 22) % 6
        ),
    }
}

/// Creation time encoded in a Discord snowflake ID.
pub fn snowflake_created_at(id: u64) -> OffsetDateTime {
    let millis = (id >> 22) + DISCORD_EPOCH_MS;
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// A bot listed on topstats.gg.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawBot")]
pub struct Bot {
    /// The bot's Discord ID.
    pub id: u64,
    /// The bot's username.
    pub name: String,
    /// The bot's avatar hash, if it has a custom avatar.
    pub avatar: Option<String>,
    /// Short description shown on Top.gg.
    pub short_description: String,
    /// The bot's prefix.
    pub prefix: Option<String>,
    /// The bot's website.
    pub website: Option<String>,
    /// When the bot was approved on Top.gg.
    pub approved_at: OffsetDateTime,
    /// Discord IDs of the bot's owners.
    pub owners: Vec<u64>,
    /// Whether the bot was removed from Top.gg.
    pub is_deleted: bool,
    /// Whether the bot is certified on Top.gg.
    pub certified: bool,
    /// Tags the bot is listed under.
    pub tags: Vec<String>,
    /// Upvotes this month.
    pub monthly_votes: Ranked,
    /// Upvotes of all time.
    pub total_votes: Ranked,
    /// Server count, as posted by the bot.
    pub server_count: Ranked,
    /// Shard count, as posted by the bot.
    pub shard_count: Ranked,
    /// Number of reviews.
    pub review_count: Ranked,
    /// When topstats.gg last updated this record.
    pub updated_at: OffsetDateTime,
}

impl Bot {
    /// Full avatar URL.
    pub fn avatar_url(&self) -> String {
        avatar_url(self.id, self.avatar.as_deref())
    }

    /// When the bot's Discord account was created.
    pub fn created_at(&self) -> OffsetDateTime {
        snowflake_created_at(self.id)
    }

    /// A statistic by metric.
    pub fn stat(&self, metric: Metric) -> Ranked {
        match metric {
            Metric::MonthlyVotes => self.monthly_votes,
            Metric::TotalVotes => self.total_votes,
            Metric::ServerCount => self.server_count,
            Metric::ReviewCount => self.review_count,
            Metric::ShardCount => self.shard_count,
        }
    }
}

impl PartialEq for Bot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[serde_as]
#[derive(Deserialize)]
struct RawBot {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    id: u64,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none::deserialize")]
    avatar: Option<String>,
    #[serde(default)]
    short_desc: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none::deserialize")]
    prefix: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none::deserialize")]
    website: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    approved_at: OffsetDateTime,
    #[serde_as(as = "Option<Vec<PickFirst<(_, DisplayFromStr)>>>")]
    owners: Option<Vec<u64>>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    certified: bool,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(deserialize_with = "unix_millis::deserialize")]
    unix_timestamp: OffsetDateTime,
    #[serde(flatten)]
    stats: RankedFields,
}

impl From<RawBot> for Bot {
    fn from(raw: RawBot) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            avatar: raw.avatar,
            short_description: raw.short_desc.unwrap_or_default(),
            prefix: raw.prefix,
            website: raw.website,
            approved_at: raw.approved_at,
            owners: raw.owners.unwrap_or_default(),
            is_deleted: raw.deleted,
            certified: raw.certified,
            tags: raw.tags.unwrap_or_default(),
            monthly_votes: raw.stats.get(Metric::MonthlyVotes),
            total_votes: raw.stats.get(Metric::TotalVotes),
            server_count: raw.stats.get(Metric::ServerCount),
            shard_count: raw.stats.get(Metric::ShardCount),
            review_count: raw.stats.get(Metric::ReviewCount),
            updated_at: raw.unix_timestamp,
        }
    }
}

/// A bot entry in rankings and search results.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawPartialBot")]
pub struct PartialBot {
    /// The bot's Discord ID.
    pub id: u64,
    /// The bot's username.
    pub name: String,
    /// The bot's avatar hash, if it has a custom avatar.
    pub avatar: Option<String>,
    /// Upvotes this month.
    pub monthly_votes: Ranked,
    /// Upvotes of all time.
    pub total_votes: Ranked,
    /// Server count, as posted by the bot.
    pub server_count: Ranked,
    /// Shard count, as posted by the bot.
    pub shard_count: Ranked,
    /// Number of reviews.
    pub review_count: Ranked,
}

impl PartialBot {
    /// Full avatar URL.
    pub fn avatar_url(&self) -> String {
        avatar_url(self.id, self.avatar.as_deref())
    }
}

#[serde_as]
#[derive(Deserialize)]
struct RawPartialBot {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    id: u64,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none::deserialize")]
    avatar: Option<String>,
    #[serde(flatten)]
    stats: RankedFields,
}

impl From<RawPartialBot> for PartialBot {
    fn from(raw: RawPartialBot) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            avatar: raw.avatar,
            monthly_votes: raw.stats.get(Metric::MonthlyVotes),
            total_votes: raw.stats.get(Metric::TotalVotes),
            server_count: raw.stats.get(Metric::ServerCount),
            shard_count: raw.stats.get(Metric::ShardCount),
            review_count: raw.stats.get(Metric::ReviewCount),
        }
    }
}

/// A single value of a historical series.
///
/// The API names the value after the requested metric (`monthly_votes`,
/// `server_count`, ...); any of them is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Timestamped {
    /// When the value was recorded.
    #[serde(rename = "time", with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// The recorded value.
    #[serde(
        alias = "monthly_votes",
        alias = "total_votes",
        alias = "server_count",
        alias = "review_count",
        alias = "shard_count"
    )]
    pub value: i64,
}

/// A bot's stats at one point in time, with changes since the previous point.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawTimestampedBotStats")]
pub struct TimestampedBotStats {
    /// When the stats were recorded.
    pub timestamp: OffsetDateTime,
    /// Upvotes this month.
    pub monthly_votes: Ranked,
    /// Upvotes of all time.
    pub total_votes: Ranked,
    /// Server count, as posted by the bot.
    pub server_count: Ranked,
    /// Number of reviews.
    pub review_count: Ranked,
}

#[derive(Deserialize)]
struct RawTimestampedBotStats {
    #[serde(with = "time::serde::rfc3339")]
    time: OffsetDateTime,
    #[serde(flatten)]
    stats: RankedFields,
}

impl From<RawTimestampedBotStats> for TimestampedBotStats {
    fn from(raw: RawTimestampedBotStats) -> Self {
        Self {
            timestamp: raw.time,
            monthly_votes: raw.stats.get(Metric::MonthlyVotes),
            total_votes: raw.stats.get(Metric::TotalVotes),
            server_count: raw.stats.get(Metric::ServerCount),
            review_count: raw.stats.get(Metric::ReviewCount),
        }
    }
}

/// A bot's recent stats.
#[derive(Debug, Clone, Deserialize)]
pub struct RecentBotStats {
    /// Hourly stats for the past 30 hours.
    #[serde(rename = "hourlyData", default)]
    pub hourly: Vec<TimestampedBotStats>,
    /// Daily stats for the past month.
    #[serde(rename = "dailyData", default)]
    pub daily: Vec<TimestampedBotStats>,
}

/// A page of ranked bots.
#[derive(Debug, Clone, Deserialize)]
pub struct TopBots {
    /// Number of ranked bots on topstats.gg.
    #[serde(rename = "totalBotCount", default)]
    pub total: Option<u64>,
    /// The ranked bots on this page.
    #[serde(rename = "data", default)]
    pub bots: Vec<PartialBot>,
}

/// A page of bot search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    /// Number of bots matching the search.
    #[serde(rename = "totalResults", default)]
    pub total: Option<u64>,
    /// The matching bots on this page.
    #[serde(rename = "results", alias = "data", default)]
    pub bots: Vec<PartialBot>,
}

/// `{"bots": [...]}` wrapper of the user's bots endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct UserBots {
    pub bots: Vec<Bot>,
}

/// `{"data": ...}` wrapper used by most list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Historical series keyed by bot ID.
pub(crate) type ComparedSeries = HashMap<String, Vec<Timestamped>>;

/// Request parameters for ranked bots.
///
/// # Example
///
/// ```rust
/// use topstats::rest::TopBotsRequest;
/// use topstats::types::SortBy;
///
/// let request = TopBotsRequest::new(SortBy::server_count()).limit(25).offset(50);
/// assert_eq!(request.limit, Some(25));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TopBotsRequest {
    /// Sorting criteria.
    pub sort_by: SortBy,
    /// Page size, clamped to 1..=500. Defaults to 100.
    pub limit: Option<u32>,
    /// Number of ranked bots to skip.
    pub offset: Option<u32>,
}

impl TopBotsRequest {
    /// Create a new request.
    pub fn new(sort_by: SortBy) -> Self {
        Self {
            sort_by,
            limit: None,
            offset: None,
        }
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the number of ranked bots to skip.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Request parameters for a bot search.
///
/// Exactly one of `name` or `tag` is used; `name` wins when both are set.
#[derive(Debug, Clone, Default)]
pub struct SearchBotsRequest {
    /// Bot name to search for.
    pub name: Option<String>,
    /// Tag to search for.
    pub tag: Option<String>,
    /// Number of results to skip.
    pub offset: Option<u32>,
    /// Page size, clamped to 1..=100. Defaults to 100.
    pub limit: Option<u32>,
    /// Include bots removed from Top.gg.
    pub include_deleted: bool,
}

impl SearchBotsRequest {
    /// Search bots by name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Search bots by tag.
    pub fn by_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// Set the number of results to skip.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Include bots removed from Top.gg.
    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }
}

/// Query string of the ranked bots endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct TopBotsParams {
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(rename = "sortBy")]
    pub sort_by: Metric,
    #[serde(rename = "sortMethod")]
    pub sort_method: crate::types::SortMethod,
}

/// Query string of the search endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct SearchParams<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<&'a str>,
    pub offset: u32,
    pub limit: u32,
    #[serde(rename = "includeDeleted")]
    pub include_deleted: bool,
}

/// Query string of the historical endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct HistoricalParams {
    #[serde(rename = "timeFrame")]
    pub time_frame: &'static str,
    #[serde(rename = "type")]
    pub kind: Metric,
}
