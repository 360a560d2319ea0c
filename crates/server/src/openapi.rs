use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct UsernamePasswordInputDoc { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct FieldErrorDoc { pub field: String, pub message: String }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct UserDoc { pub id: i32, pub username: String, pub createdAt: String, pub updatedAt: String }

#[derive(ToSchema)]
pub struct UserResponseDoc { pub user: Option<UserDoc>, pub errors: Option<Vec<FieldErrorDoc>> }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct PostDoc { pub id: i32, pub title: String, pub createdAt: String, pub updatedAt: String }

/// `options` shape depends on the operation, see `GET /api/schema`.
#[derive(ToSchema)]
pub struct OperationRequestDoc {
    /// `register`, `login`, `me`, `posts` or `post`
    pub operation: String,
    pub options: Option<UsernamePasswordInputDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::dispatch,
        crate::routes::list_schema,
    ),
    components(
        schemas(
            HealthResponse,
            UsernamePasswordInputDoc,
            FieldErrorDoc,
            UserDoc,
            UserResponseDoc,
            PostDoc,
            OperationRequestDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "api")
    )
)]
pub struct ApiDoc;
