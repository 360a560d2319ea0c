//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and session identity lookup. Persistence goes through
//! [`repository::AuthRepository`], session state through
//! [`session::SessionState`]; both arrive per request in a [`RequestContext`].

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod repo;
pub mod session;
pub mod service;

pub use service::AuthService;

use repository::AuthRepository;
use session::SessionState;

/// Request-scoped handles an auth operation works against.
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    pub users: &'a dyn AuthRepository,
    pub session: &'a dyn SessionState,
}

impl<'a> RequestContext<'a> {
    pub fn new(users: &'a dyn AuthRepository, session: &'a dyn SessionState) -> Self {
        Self { users, session }
    }
}
