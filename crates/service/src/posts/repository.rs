use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use super::Post;
use crate::errors::ServiceError;

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts ordered by id.
    async fn list_posts(&self) -> Result<Vec<Post>, ServiceError>;
    async fn find_post(&self, id: i32) -> Result<Option<Post>, ServiceError>;
}

#[derive(Clone)]
pub struct SeaOrmPostRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmPostRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn list_posts(&self) -> Result<Vec<Post>, ServiceError> {
        let rows = models::post::find_all(&self.db).await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_post(&self, id: i32) -> Result<Option<Post>, ServiceError> {
        Ok(models::post::find_by_id(&self.db, id).await?.map(Post::from))
    }
}

/// Fixed in-memory post list for tests
pub mod mock {
    use super::*;

    #[derive(Default)]
    pub struct MockPostRepository {
        posts: Vec<Post>,
    }

    impl MockPostRepository {
        pub fn with_posts(mut posts: Vec<Post>) -> Self {
            posts.sort_by_key(|p| p.id);
            Self { posts }
        }
    }

    #[async_trait]
    impl PostRepository for MockPostRepository {
        async fn list_posts(&self) -> Result<Vec<Post>, ServiceError> {
            Ok(self.posts.clone())
        }

        async fn find_post(&self, id: i32) -> Result<Option<Post>, ServiceError> {
            Ok(self.posts.iter().find(|p| p.id == id).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use sea_orm::EntityTrait;

    #[tokio::test]
    async fn seaorm_lists_created_post() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let repo = SeaOrmPostRepository::new(db.clone());

        let created = models::post::create(&db, "hello from tests").await?;
        let listed = repo.list_posts().await?;
        assert!(listed.iter().any(|p| p.id == created.id));
        assert_eq!(repo.find_post(created.id).await?.map(|p| p.title), Some("hello from tests".to_string()));

        models::post::Entity::delete_by_id(created.id).exec(&db).await?;
        assert!(repo.find_post(created.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn mock_orders_by_id() {
        let now = chrono::Utc::now();
        let post = |id| Post { id, title: format!("p{id}"), created_at: now, updated_at: now };
        let repo = mock::MockPostRepository::with_posts(vec![post(3), post(1), post(2)]);
        let ids: Vec<i32> = repo.list_posts().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(repo.find_post(9).await.unwrap().is_none());
    }
}
