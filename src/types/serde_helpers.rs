//! Custom serde helpers for the topstats API's serialization quirks.
//!
//! Snowflake IDs arrive as strings or numbers depending on the endpoint; those
//! fields use `serde_with`'s `PickFirst<(_, DisplayFromStr)>` directly. The
//! modules here cover the remaining cases.

use serde::{Deserialize, Deserializer, de};
use time::OffsetDateTime;

/// Deserialize a string, returning None if empty or null.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use topstats::types::serde_helpers::empty_string_as_none;
///
/// #[derive(Deserialize, Debug)]
/// struct Bot {
///     #[serde(deserialize_with = "empty_string_as_none::deserialize", default)]
///     website: Option<String>,
/// }
///
/// let bot: Bot = serde_json::from_str(r#"{"website":""}"#).unwrap();
/// assert!(bot.website.is_none());
/// ```
pub mod empty_string_as_none {
    use super::*;

    /// Deserialize a string, returning None if empty.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.filter(|s| !s.is_empty()))
    }
}

/// Deserialize a Unix timestamp in milliseconds, given as a number or a string.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use time::OffsetDateTime;
/// use topstats::types::serde_helpers::unix_millis;
///
/// #[derive(Deserialize, Debug)]
/// struct Stamp {
///     #[serde(deserialize_with = "unix_millis::deserialize")]
///     at: OffsetDateTime,
/// }
///
/// let stamp: Stamp = serde_json::from_str(r#"{"at":"1700000000000"}"#).unwrap();
/// assert_eq!(stamp.at.unix_timestamp(), 1_700_000_000);
/// ```
pub mod unix_millis {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Number(i64),
        Text(String),
    }

    /// Deserialize milliseconds since the Unix epoch.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = match Millis::deserialize(deserializer)? {
            Millis::Number(n) => n,
            Millis::Text(s) => s.trim().parse::<i64>().map_err(de::Error::custom)?,
        };

        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .map_err(de::Error::custom)
    }
}
