//! Read-only post queries.

pub mod repository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use repository::{PostRepository, SeaOrmPostRepository};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::post::Model> for Post {
    fn from(m: models::post::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

/// Options of the single-post query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PostIdInput {
    pub id: i32,
}
