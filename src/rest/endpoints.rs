//! topstats.gg REST API endpoint paths.

/// Base URL for the topstats.gg Discord API.
pub const TOPSTATS_BASE_URL: &str = "https://api.topstats.gg/discord";

/// Search bots by name or tag.
pub const SEARCH: &str = "/search";
/// Ranked bots.
pub const TOP_BOTS: &str = "/rankings/bots";

/// A single bot.
pub fn bot(id: u64) -> String {
    format!("/bots/{id}")
}

/// Bots owned by a user.
pub fn users_bots(id: u64) -> String {
    format!("/users/{id}/bots")
}

/// Historical series of a bot.
pub fn bot_historical(id: u64) -> String {
    format!("/bots/{id}/historical")
}

/// Recent hourly and daily stats of a bot.
pub fn bot_recent(id: u64) -> String {
    format!("/bots/{id}/recent")
}

/// Side-by-side bot records.
pub fn compare(ids: &[u64]) -> String {
    format!("/compare/{}", join_ids(ids))
}

/// Side-by-side historical series.
pub fn compare_historical(ids: &[u64]) -> String {
    format!("/compare/historical/{}", join_ids(ids))
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("/")
}
