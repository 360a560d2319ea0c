use async_trait::async_trait;
use models::errors::ModelError;
use sea_orm::DatabaseConnection;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

#[derive(Clone)]
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<Credentials>, AuthError> {
        let res = models::user::find_by_username(&self.db, username)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(Credentials::from))
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_id(&self.db, id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(AuthUser::from))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<AuthUser, AuthError> {
        match models::user::create(&self.db, username, password_hash).await {
            Ok(created) => Ok(created.into()),
            Err(ModelError::Duplicate(_)) => Err(AuthError::Conflict),
            Err(e) => Err(AuthError::Repository(e.to_string())),
        }
    }
}
