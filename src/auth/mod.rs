//! Authentication for the topstats.gg API.
//!
//! topstats.gg authenticates with a single API token passed in the
//! `Authorization` header.

mod token;

pub use token::{ApiToken, TOKEN_ENV_VAR};
