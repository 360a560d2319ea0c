//! Session abstraction so resolvers never touch the HTTP transport directly.

use async_trait::async_trait;

use super::errors::AuthError;

/// Key the authenticated user's id is stored under.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Per-request view of the caller's session.
#[async_trait]
pub trait SessionState: Send + Sync {
    async fn user_id(&self) -> Result<Option<i32>, AuthError>;
    async fn set_user_id(&self, user_id: i32) -> Result<(), AuthError>;
    /// Issue a fresh session id and drop the old one, keeping the data.
    async fn cycle_id(&self) -> Result<(), AuthError>;
}

/// In-memory session for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemorySession {
        user_id: Mutex<Option<i32>>,
        cycles: AtomicUsize,
    }

    impl MemorySession {
        pub fn with_user(user_id: i32) -> Self {
            Self { user_id: Mutex::new(Some(user_id)), cycles: AtomicUsize::new(0) }
        }

        /// Number of times the id was cycled.
        pub fn cycles(&self) -> usize {
            self.cycles.load(Ordering::SeqCst)
        }

        pub fn current(&self) -> Option<i32> {
            *self.user_id.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    #[async_trait]
    impl SessionState for MemorySession {
        async fn user_id(&self) -> Result<Option<i32>, AuthError> {
            Ok(self.current())
        }

        async fn set_user_id(&self, user_id: i32) -> Result<(), AuthError> {
            *self.user_id.lock().unwrap_or_else(|e| e.into_inner()) = Some(user_id);
            Ok(())
        }

        async fn cycle_id(&self) -> Result<(), AuthError> {
            self.cycles.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
