//! Common domain types for the topstats API.

use serde::{Deserialize, Serialize};

/// Time frame for historical bot stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// Every recorded data point
    #[default]
    #[serde(rename = "alltime")]
    AllTime,
    /// Last five years
    #[serde(rename = "5y")]
    Last5Years,
    /// Last three years
    #[serde(rename = "3y")]
    Last3Years,
    /// Last year
    #[serde(rename = "1y")]
    LastYear,
    /// Last 90 days
    #[serde(rename = "90d")]
    Last90Days,
    /// Last 30 days
    #[serde(rename = "30d")]
    LastMonth,
    /// Last seven days
    #[serde(rename = "7d")]
    LastWeek,
    /// Last three days
    #[serde(rename = "3d")]
    Last3Days,
    /// Last day
    #[serde(rename = "1d")]
    LastDay,
    /// Last twelve hours
    #[serde(rename = "12h")]
    Last12Hours,
    /// Last six hours
    #[serde(rename = "6h")]
    Last6Hours,
}

impl Period {
    /// The `timeFrame` query value for this period.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::AllTime => "alltime",
            Period::Last5Years => "5y",
            Period::Last3Years => "3y",
            Period::LastYear => "1y",
            Period::Last90Days => "90d",
            Period::LastMonth => "30d",
            Period::LastWeek => "7d",
            Period::Last3Days => "3d",
            Period::LastDay => "1d",
            Period::Last12Hours => "12h",
            Period::Last6Hours => "6h",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Period::AllTime => "All Time",
            Period::Last5Years => "Last 5 Years",
            Period::Last3Years => "Last 3 Years",
            Period::LastYear => "Last Year",
            Period::Last90Days => "Last 90 Days",
            Period::LastMonth => "Last Month",
            Period::LastWeek => "Last Week",
            Period::Last3Days => "Last 3 Days",
            Period::LastDay => "Last Day",
            Period::Last12Hours => "Last 12 Hours",
            Period::Last6Hours => "Last 6 Hours",
        };
        write!(f, "{}", s)
    }
}

/// A statistic tracked by topstats.gg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Upvotes this month
    MonthlyVotes,
    /// Upvotes of all time
    TotalVotes,
    /// Servers the bot is in, as posted by the bot
    ServerCount,
    /// Reviews left on the bot's page
    ReviewCount,
    /// Shards the bot runs, as posted by the bot
    ShardCount,
}

impl Metric {
    /// The field / `type` query value for this metric.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::MonthlyVotes => "monthly_votes",
            Metric::TotalVotes => "total_votes",
            Metric::ServerCount => "server_count",
            Metric::ReviewCount => "review_count",
            Metric::ShardCount => "shard_count",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMethod {
    /// Smallest first
    Asc,
    /// Largest first (default)
    #[default]
    Desc,
}

/// Sorting criteria for ranked bots.
///
/// # Example
///
/// ```rust
/// use topstats::types::{Metric, SortBy, SortMethod};
///
/// let sort = SortBy::server_count().ascending();
/// assert_eq!(sort.metric, Metric::ServerCount);
/// assert_eq!(sort.method, SortMethod::Asc);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortBy {
    /// The statistic to sort by.
    pub metric: Metric,
    /// The sort direction.
    pub method: SortMethod,
}

impl SortBy {
    /// Sort by a metric, largest first.
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            method: SortMethod::Desc,
        }
    }

    /// Sort by monthly votes.
    pub fn monthly_votes() -> Self {
        Self::new(Metric::MonthlyVotes)
    }

    /// Sort by total votes.
    pub fn total_votes() -> Self {
        Self::new(Metric::TotalVotes)
    }

    /// Sort by server count.
    pub fn server_count() -> Self {
        Self::new(Metric::ServerCount)
    }

    /// Sort by review count.
    pub fn review_count() -> Self {
        Self::new(Metric::ReviewCount)
    }

    /// Sort by shard count.
    pub fn shard_count() -> Self {
        Self::new(Metric::ShardCount)
    }

    /// Smallest first.
    pub fn ascending(mut self) -> Self {
        self.method = SortMethod::Asc;
        self
    }

    /// Largest first.
    pub fn descending(mut self) -> Self {
        self.method = SortMethod::Desc;
        self
    }
}

impl Default for SortBy {
    fn default() -> Self {
        Self::monthly_votes()
    }
}
