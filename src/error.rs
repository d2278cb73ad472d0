//! Error types for the topstats client library.

use std::time::Duration;

use thiserror::Error;

/// The main error type for all topstats client operations.
///
/// A missing entity is not an error: typed client methods return `Ok(None)`
/// when the API answers with `404 Not Found`.
#[derive(Error, Debug)]
pub enum TopStatsError {
    /// No API token was configured
    #[error("An API token is required to use this API.")]
    MissingToken,

    /// The client was closed with [`TopStatsClient::close`](crate::rest::TopStatsClient::close)
    #[error("Client session is already closed.")]
    ClientClosed,

    /// The caller passed an invalid argument combination
    #[error("{0}")]
    InvalidArgument(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered with a non-success status, or the request could not be sent
    #[error("Got {}: {:?}", status.map_or_else(|| "no status".to_string(), |s| s.to_string()), message)]
    Request {
        /// HTTP status code, `None` for network-level failures
        status: Option<u16>,
        /// Message returned by the API (or the transport error)
        message: Option<String>,
    },

    /// The endpoint is rate limited for longer than the client is willing to wait
    #[error(
        "The client is blocked by the API. Please try again in {:.3} seconds.",
        retry_after.as_secs_f64()
    )]
    RateLimited {
        /// How long to wait before calling this endpoint again
        retry_after: Duration,
    },

    /// A successful response did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TopStatsError {
    /// Build a [`TopStatsError::Request`] from a status and optional message.
    pub fn request(status: Option<u16>, message: Option<impl Into<String>>) -> Self {
        Self::Request {
            status,
            message: message.map(Into::into),
        }
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Suggested wait before retrying, if this is a rate limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// HTTP status code attached to a request error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Check if this error was caused by the caller rather than the API.
    pub fn is_client_misuse(&self) -> bool {
        matches!(
            self,
            Self::MissingToken | Self::ClientClosed | Self::InvalidArgument(_) | Self::Url(_)
        )
    }
}
