//! API token management for topstats.gg authentication.

use secrecy::{ExposeSecret, SecretString};

use crate::error::TopStatsError;

/// Default environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "TOPSTATS_TOKEN";

/// A topstats.gg API token.
///
/// The token is sent verbatim in the `Authorization` header. It is kept in a
/// [`SecretString`] so it never shows up in `Debug` output or logs.
#[derive(Clone)]
pub struct ApiToken {
    token: SecretString,
}

impl ApiToken {
    /// Create a token from its string form.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }

    /// Read the token from `TOPSTATS_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`TopStatsError::MissingToken`] if the variable is unset or empty.
    pub fn from_env() -> Result<Self, TopStatsError> {
        Self::try_from_env().ok_or(TopStatsError::MissingToken)
    }

    /// Read the token from `TOPSTATS_TOKEN`, if set.
    ///
    /// Returns `None` if the variable is unset or empty.
    pub fn try_from_env() -> Option<Self> {
        Self::try_from_env_var(TOKEN_ENV_VAR)
    }

    /// Read the token from a custom environment variable.
    ///
    /// Returns `None` if the variable is unset or empty.
    pub fn try_from_env_var(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(Self::new)
    }

    /// Check if the token is blank.
    pub fn is_empty(&self) -> bool {
        self.token.expose_secret().trim().is_empty()
    }

    /// Get the raw token for the `Authorization` header.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_secret(&self) -> &str {
        self.token.expose_secret()
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiToken")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl From<&str> for ApiToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for ApiToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}
