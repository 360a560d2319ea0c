use std::sync::Arc;

use service::auth::repository::AuthRepository;
use service::auth::AuthService;
use service::posts::PostRepository;

/// Shared handles every request is served with.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService>,
    pub users: Arc<dyn AuthRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl ServerState {
    pub fn new(auth: AuthService, users: Arc<dyn AuthRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { auth: Arc::new(auth), users, posts }
    }
}
