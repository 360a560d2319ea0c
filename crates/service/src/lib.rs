//! Service layer holding the account business logic on top of `models`.
//! - Auth resolvers (`register`, `login`, `me`) independent of the web framework.
//! - Repository and session traits at the persistence/transport seams, each with
//!   a SeaORM or in-memory implementation.
//! - Read-only post queries.

pub mod errors;
pub mod auth;
pub mod posts;
#[cfg(test)]
pub mod test_support;
