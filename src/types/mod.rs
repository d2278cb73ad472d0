//! Common types used across the topstats client library.

pub mod common;
pub mod serde_helpers;

pub use common::*;
