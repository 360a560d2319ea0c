use async_trait::async_trait;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for user persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<Credentials>, AuthError>;
    async fn find_user_by_id(&self, id: i32) -> Result<Option<AuthUser>, AuthError>;
    /// Insert a user; a taken username is [`AuthError::Conflict`].
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<AuthUser, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<Vec<Credentials>>,
        fail_writes: AtomicBool,
    }

    impl MockAuthRepository {
        /// Make every subsequent insert fail with a repository error.
        pub fn fail_writes(&self) {
            self.fail_writes.store(true, Ordering::SeqCst);
        }

        pub fn len(&self) -> usize {
            self.users.lock().unwrap_or_else(|e| e.into_inner()).len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Stored hash for `username`, for asserting nothing is kept in plaintext.
        pub fn stored_hash(&self, username: &str) -> Option<String> {
            let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
            users.iter().find(|c| c.user.username == username).map(|c| c.password_hash.clone())
        }

        pub fn remove(&self, id: i32) {
            self.users.lock().unwrap_or_else(|e| e.into_inner()).retain(|c| c.user.id != id);
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_username(&self, username: &str) -> Result<Option<Credentials>, AuthError> {
            let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
            Ok(users.iter().find(|c| c.user.username == username).cloned())
        }

        async fn find_user_by_id(&self, id: i32) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
            Ok(users.iter().find(|c| c.user.id == id).map(|c| c.user.clone()))
        }

        async fn create_user(&self, username: &str, password_hash: &str) -> Result<AuthUser, AuthError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AuthError::Repository("connection reset".into()));
            }
            let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
            if users.iter().any(|c| c.user.username == username) {
                return Err(AuthError::Conflict);
            }
            let id = users.iter().map(|c| c.user.id).max().unwrap_or(0) + 1;
            let now = Utc::now();
            let user = AuthUser { id, username: username.to_string(), created_at: now, updated_at: now };
            users.push(Credentials { user: user.clone(), password_hash: password_hash.to_string() });
            Ok(user)
        }
    }
}
