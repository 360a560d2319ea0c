//! Shared types and process helpers used by the server crates.

pub mod types;
pub mod utils;
