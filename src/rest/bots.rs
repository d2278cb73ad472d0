//! Bot endpoints.

use crate::error::TopStatsError;
use crate::rest::endpoints::{self, SEARCH, TOP_BOTS};
use crate::rest::types::{
    Bot, ComparedSeries, DataEnvelope, HistoricalParams, RecentBotStats, SearchBotsRequest,
    SearchParams, SearchResults, Timestamped, TopBots, TopBotsParams, TopBotsRequest, UserBots,
};
use crate::rest::TopStatsClient;
use crate::types::{Metric, Period};

const DEFAULT_LIMIT: u32 = 100;
const MAX_SEARCH_LIMIT: u32 = 100;
const MAX_TOP_BOTS_LIMIT: u32 = 500;

impl TopStatsClient {
    /// Get a bot by its Discord ID.
    ///
    /// Returns `None` if topstats.gg does not track the bot.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use topstats::TopStatsClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = TopStatsClient::from_env()?;
    ///     if let Some(bot) = client.get_bot(432610292342587392).await? {
    ///         println!("{} has {} monthly votes", bot.name, bot.monthly_votes);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn get_bot(&self, id: u64) -> Result<Option<Bot>, TopStatsError> {
        self.get(&endpoints::bot(id)).await
    }

    /// Get the bots owned by a Discord user.
    pub async fn get_users_bot(&self, id: u64) -> Result<Option<Vec<Bot>>, TopStatsError> {
        let response: Option<UserBots> = self.get(&endpoints::users_bots(id)).await?;
        Ok(response.map(|r| r.bots))
    }

    /// Search bots by name or tag.
    ///
    /// When both are set, the name is used.
    ///
    /// # Errors
    ///
    /// Returns [`TopStatsError::InvalidArgument`] if neither a name nor a tag
    /// is given.
    pub async fn search_bots(
        &self,
        request: &SearchBotsRequest,
    ) -> Result<Option<SearchResults>, TopStatsError> {
        let name = request.name.as_deref().filter(|name| !name.is_empty());
        let tag = request.tag.as_deref().filter(|tag| !tag.is_empty());

        let (name, tag) = match (name, tag) {
            (Some(name), _) => (Some(name), None),
            (None, Some(tag)) => (None, Some(tag)),
            (None, None) => {
                return Err(TopStatsError::InvalidArgument(
                    "Either a bot name or tag must be specified.".to_string(),
                ));
            }
        };

        let params = SearchParams {
            kind: "bots",
            name,
            tag,
            offset: request.offset.unwrap_or(0),
            limit: clamp_limit(request.limit, MAX_SEARCH_LIMIT),
            include_deleted: request.include_deleted,
        };
        self.get_with_params(SEARCH, &params).await
    }

    /// Get the records of 2 to 4 bots side by side.
    ///
    /// Duplicate IDs are dropped, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`TopStatsError::InvalidArgument`] if fewer than 2 or more than
    /// 4 unique IDs are given.
    pub async fn compare_bots(&self, ids: &[u64]) -> Result<Option<Vec<Bot>>, TopStatsError> {
        let ids = unique_ids(ids)?;
        let response: Option<DataEnvelope<Vec<Bot>>> = self.get(&endpoints::compare(&ids)).await?;
        Ok(response.map(|r| r.data))
    }

    /// Get the historical series of one metric for a bot.
    pub async fn get_historical_bot_stats(
        &self,
        id: u64,
        metric: Metric,
        period: Period,
    ) -> Result<Option<Vec<Timestamped>>, TopStatsError> {
        let params = HistoricalParams {
            time_frame: period.as_str(),
            kind: metric,
        };
        let response: Option<DataEnvelope<Vec<Timestamped>>> = self
            .get_with_params(&endpoints::bot_historical(id), &params)
            .await?;
        Ok(response.map(|r| r.data))
    }

    /// Get a bot's historical monthly votes.
    pub async fn get_historical_bot_monthly_votes(
        &self,
        id: u64,
        period: Period,
    ) -> Result<Option<Vec<Timestamped>>, TopStatsError> {
        self.get_historical_bot_stats(id, Metric::MonthlyVotes, period)
            .await
    }

    /// Get a bot's historical total votes.
    pub async fn get_historical_bot_total_votes(
        &self,
        id: u64,
        period: Period,
    ) -> Result<Option<Vec<Timestamped>>, TopStatsError> {
        self.get_historical_bot_stats(id, Metric::TotalVotes, period)
            .await
    }

    /// Get a bot's historical server count.
    pub async fn get_historical_bot_server_count(
        &self,
        id: u64,
        period: Period,
    ) -> Result<Option<Vec<Timestamped>>, TopStatsError> {
        self.get_historical_bot_stats(id, Metric::ServerCount, period)
            .await
    }

    /// Get a bot's historical review count.
    pub async fn get_historical_bot_review_count(
        &self,
        id: u64,
        period: Period,
    ) -> Result<Option<Vec<Timestamped>>, TopStatsError> {
        self.get_historical_bot_stats(id, Metric::ReviewCount, period)
            .await
    }

    /// Get a bot's historical shard count.
    pub async fn get_historical_bot_shard_count(
        &self,
        id: u64,
        period: Period,
    ) -> Result<Option<Vec<Timestamped>>, TopStatsError> {
        self.get_historical_bot_stats(id, Metric::ShardCount, period)
            .await
    }

    /// Compare the historical series of one metric for 2 to 4 bots.
    ///
    /// Row `i` of the result holds entry `i` of every bot's series, in the
    /// order the IDs were given. Rows stop at the shortest series.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use topstats::TopStatsClient;
    /// use topstats::types::{Metric, Period};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = TopStatsClient::from_env()?;
    ///     let ids = [432610292342587392, 437808476106784770];
    ///     if let Some(rows) = client
    ///         .compare_bot_stats(Metric::ServerCount, Period::LastWeek, &ids)
    ///         .await?
    ///     {
    ///         for row in rows {
    ///             println!("{}: {} vs {}", row[0].timestamp, row[0].value, row[1].value);
    ///         }
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn compare_bot_stats(
        &self,
        metric: Metric,
        period: Period,
        ids: &[u64],
    ) -> Result<Option<Vec<Vec<Timestamped>>>, TopStatsError> {
        let ids = unique_ids(ids)?;
        let params = HistoricalParams {
            time_frame: period.as_str(),
            kind: metric,
        };
        let response: Option<DataEnvelope<ComparedSeries>> = self
            .get_with_params(&endpoints::compare_historical(&ids), &params)
            .await?;
        Ok(response.map(|r| zip_series(&ids, r.data)))
    }

    /// Compare the historical monthly votes of 2 to 4 bots.
    pub async fn compare_bot_monthly_votes(
        &self,
        period: Period,
        ids: &[u64],
    ) -> Result<Option<Vec<Vec<Timestamped>>>, TopStatsError> {
        self.compare_bot_stats(Metric::MonthlyVotes, period, ids)
            .await
    }

    /// Compare the historical total votes of 2 to 4 bots.
    pub async fn compare_bot_total_votes(
        &self,
        period: Period,
        ids: &[u64],
    ) -> Result<Option<Vec<Vec<Timestamped>>>, TopStatsError> {
        self.compare_bot_stats(Metric::TotalVotes, period, ids)
            .await
    }

    /// Compare the historical server count of 2 to 4 bots.
    pub async fn compare_bot_server_count(
        &self,
        period: Period,
        ids: &[u64],
    ) -> Result<Option<Vec<Vec<Timestamped>>>, TopStatsError> {
        self.compare_bot_stats(Metric::ServerCount, period, ids)
            .await
    }

    /// Compare the historical review count of 2 to 4 bots.
    pub async fn compare_bot_review_count(
        &self,
        period: Period,
        ids: &[u64],
    ) -> Result<Option<Vec<Vec<Timestamped>>>, TopStatsError> {
        self.compare_bot_stats(Metric::ReviewCount, period, ids)
            .await
    }

    /// Get a bot's hourly stats for the past 30 hours and daily stats for the
    /// past month.
    pub async fn get_recent_bot_stats(
        &self,
        id: u64,
    ) -> Result<Option<RecentBotStats>, TopStatsError> {
        self.get(&endpoints::bot_recent(id)).await
    }

    /// Get a page of ranked bots.
    pub async fn get_top_bots(
        &self,
        request: &TopBotsRequest,
    ) -> Result<Option<TopBots>, TopStatsError> {
        let params = TopBotsParams {
            limit: clamp_limit(request.limit, MAX_TOP_BOTS_LIMIT),
            offset: request.offset,
            sort_by: request.sort_by.metric,
            sort_method: request.sort_by.method,
        };
        self.get_with_params(TOP_BOTS, &params).await
    }
}

fn clamp_limit(limit: Option<u32>, max: u32) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, max)
}

/// Drop duplicate IDs, keeping first occurrences, and check the 2..=4 bound.
fn unique_ids(ids: &[u64]) -> Result<Vec<u64>, TopStatsError> {
    let mut unique = Vec::with_capacity(ids.len());
    for &id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }

    if !(2..=4).contains(&unique.len()) {
        return Err(TopStatsError::InvalidArgument(format!(
            "Expected 2 to 4 unique bot IDs to compare, but got {}.",
            unique.len()
        )));
    }

    Ok(unique)
}

/// Turn per-bot series into rows, one entry per bot in `ids` order.
fn zip_series(ids: &[u64], mut series: ComparedSeries) -> Vec<Vec<Timestamped>> {
    let columns: Vec<Vec<Timestamped>> = ids
        .iter()
        .map(|id| series.remove(&id.to_string()).unwrap_or_default())
        .collect();
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);

    (0..rows)
        .map(|i| columns.iter().map(|column| column[i]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn entry(secs: i64, value: i64) -> Timestamped {
        Timestamped {
            timestamp: OffsetDateTime::from_unix_timestamp(secs).unwrap(),
            value,
        }
    }

    #[test]
    fn test_unique_ids_keeps_first_occurrence() {
        assert_eq!(unique_ids(&[3, 1, 3, 2]).unwrap(), vec![3, 1, 2]);
    }

    #[test]
    fn test_unique_ids_bounds() {
        let err = unique_ids(&[1, 1]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected 2 to 4 unique bot IDs to compare, but got 1."
        );
        assert!(unique_ids(&[1, 2, 3, 4, 5]).is_err());
        assert!(unique_ids(&[]).is_err());
        assert!(unique_ids(&[1, 2, 3, 4, 4]).is_ok());
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, MAX_SEARCH_LIMIT), 100);
        assert_eq!(clamp_limit(Some(0), MAX_SEARCH_LIMIT), 1);
        assert_eq!(clamp_limit(Some(250), MAX_SEARCH_LIMIT), 100);
        assert_eq!(clamp_limit(Some(250), MAX_TOP_BOTS_LIMIT), 250);
        assert_eq!(clamp_limit(Some(9000), MAX_TOP_BOTS_LIMIT), 500);
    }

    #[test]
    fn test_zip_series_truncates_to_shortest() {
        let mut series = ComparedSeries::new();
        series.insert("1".to_string(), vec![entry(0, 10), entry(60, 11), entry(120, 12)]);
        series.insert("2".to_string(), vec![entry(0, 20), entry(60, 21)]);

        let rows = zip_series(&[2, 1], series);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].iter().map(|e| e.value).collect::<Vec<_>>(), vec![20, 10]);
        assert_eq!(rows[1].iter().map(|e| e.value).collect::<Vec<_>>(), vec![21, 11]);
    }

    #[test]
    fn test_zip_series_missing_bot_yields_no_rows() {
        let mut series = ComparedSeries::new();
        series.insert("1".to_string(), vec![entry(0, 10)]);

        assert!(zip_series(&[1, 2], series).is_empty());
    }
}
