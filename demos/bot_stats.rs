//! Example: Fetching bot stats.
//!
//! Reads the API token from `TOPSTATS_TOKEN` (a `.env` file works too).
//!
//! Run with: cargo run --example bot_stats

use topstats::rest::{SearchBotsRequest, TopBotsRequest};
use topstats::types::{Period, SortBy};
use topstats::{TopStatsClient, TopStatsError};

const MUDAE: u64 = 432610292342587392;
const DANK_MEMER: u64 = 270904126974590976;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt::init();

    let client = TopStatsClient::from_env()?;

    match client.get_bot(MUDAE).await? {
        Some(bot) => {
            println!("{} ({})", bot.name, bot.avatar_url());
            println!("  created:  {}", bot.created_at());
            println!("  servers:  {}", bot.server_count);
            println!("  monthly:  {}", bot.monthly_votes);
        }
        None => println!("Bot {MUDAE} is not tracked"),
    }

    if let Some(series) = client
        .get_historical_bot_server_count(MUDAE, Period::LastWeek)
        .await?
    {
        for point in series.iter().take(5) {
            println!("{}: {}", point.timestamp, point.value);
        }
    }

    if let Some(rows) = client
        .compare_bot_monthly_votes(Period::LastMonth, &[MUDAE, DANK_MEMER])
        .await?
    {
        for row in rows.iter().take(3) {
            println!("{}: {} vs {}", row[0].timestamp, row[0].value, row[1].value);
        }
    }

    let top = TopBotsRequest::new(SortBy::monthly_votes()).limit(5);
    if let Some(top) = client.get_top_bots(&top).await? {
        for bot in top.bots {
            println!("#{:?} {}", bot.monthly_votes.rank, bot.name);
        }
    }

    match client.search_bots(&SearchBotsRequest::by_tag("music").limit(3)).await {
        Ok(Some(results)) => println!("{:?} music bots", results.total),
        Ok(None) => println!("No search results"),
        Err(TopStatsError::RateLimited { retry_after }) => {
            println!("Search is rate limited, retry in {retry_after:?}")
        }
        Err(e) => return Err(e.into()),
    }

    client.close();
    Ok(())
}
