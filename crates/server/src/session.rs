//! Session transport wiring.
//!
//! Resolvers only see [`SessionState`]; this module adapts the cookie-backed
//! `tower_sessions::Session` to it and builds the session layer.

use async_trait::async_trait;
use configs::SessionConfig;
use service::auth::errors::AuthError;
use service::auth::session::{SessionState, SESSION_USER_ID_KEY};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, Session, SessionManagerLayer};

/// Newtype wrapper exposing the user-id operations of a request's session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }
}

#[async_trait]
impl SessionState for SessionContext {
    async fn user_id(&self) -> Result<Option<i32>, AuthError> {
        self.0
            .get::<i32>(SESSION_USER_ID_KEY)
            .await
            .map_err(|e| AuthError::Session(format!("failed to read session: {e}")))
    }

    async fn set_user_id(&self, user_id: i32) -> Result<(), AuthError> {
        self.0
            .insert(SESSION_USER_ID_KEY, user_id)
            .await
            .map_err(|e| AuthError::Session(format!("failed to persist session: {e}")))
    }

    async fn cycle_id(&self) -> Result<(), AuthError> {
        self.0
            .cycle_id()
            .await
            .map_err(|e| AuthError::Session(format!("failed to cycle session id: {e}")))
    }
}

/// HttpOnly, SameSite=Lax session cookie expiring after a period of inactivity.
pub fn session_layer(cfg: &SessionConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(cfg.cookie_name.clone())
        .with_secure(cfg.secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(cfg.inactivity_secs)))
}
