//! Entity definitions and entity-level persistence helpers.

pub mod errors;
pub mod db;
pub mod user;
pub mod post;

#[cfg(test)]
mod tests;
