use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};
use tracing::{debug, Level};
use utoipa::OpenApi;

use common::types::Health;
use service::auth::domain::UsernamePasswordInput;
use service::auth::RequestContext;
use service::posts::PostIdInput;

use crate::errors::ApiError;
use crate::openapi::ApiDoc;
use crate::schema::{self, Operation, OperationDescriptor};
use crate::session::SessionContext;
use crate::state::ServerState;

/// Body of `POST /api`.
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationRequest {
    pub operation: String,
    #[serde(default)]
    pub options: Option<Value>,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

#[utoipa::path(get, path = "/api/schema", tag = "api", responses((status = 200, description = "Registered operations")))]
pub async fn list_schema() -> Result<Json<Value>, ApiError> {
    let schema = schema::installed().ok_or(ApiError::SchemaNotInstalled)?;
    let ops: Vec<&OperationDescriptor> = schema.operations().collect();
    Ok(Json(serde_json::json!({ "operations": ops })))
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn parse_options<T: DeserializeOwned>(op: &OperationDescriptor, options: Option<Value>) -> Result<T, ApiError> {
    serde_json::from_value(options.unwrap_or(Value::Null)).map_err(|e| ApiError::InvalidOptions {
        operation: op.name,
        reason: e.to_string(),
    })
}

/// Run one registered operation against the caller's session.
#[utoipa::path(
    post,
    path = "/api",
    tag = "api",
    request_body = crate::openapi::OperationRequestDoc,
    responses(
        (status = 200, description = "Operation result under data.<operation>"),
        (status = 400, description = "Malformed body, unknown operation or invalid options"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn dispatch(
    State(state): State<ServerState>,
    session: Session,
    body: Result<Json<OperationRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let schema = schema::installed().ok_or(ApiError::SchemaNotInstalled)?;
    let op = schema
        .lookup(&req.operation)
        .ok_or_else(|| ApiError::UnknownOperation(req.operation.clone()))?;
    debug!(operation = op.name, kind = ?op.kind, "dispatch");

    let session = SessionContext::new(session);
    let ctx = RequestContext::new(state.users.as_ref(), &session);

    let result = match op.operation {
        Operation::Register => {
            let input: UsernamePasswordInput = parse_options(op, req.options)?;
            serde_json::to_value(state.auth.register(ctx, input).await?)?
        }
        Operation::Login => {
            let input: UsernamePasswordInput = parse_options(op, req.options)?;
            serde_json::to_value(state.auth.login(ctx, input).await?)?
        }
        Operation::Me => serde_json::to_value(state.auth.me(ctx).await?)?,
        Operation::Posts => serde_json::to_value(state.posts.list_posts().await?)?,
        Operation::Post => {
            let input: PostIdInput = parse_options(op, req.options)?;
            serde_json::to_value(state.posts.find_post(input.id).await?)?
        }
    };

    let mut data = Map::new();
    data.insert(op.name.to_string(), result);
    Ok(Json(serde_json::json!({ "data": data })))
}

/// Build the full application router: health, docs and the operation endpoint.
pub fn build_router(state: ServerState, cors: CorsLayer, sessions: SessionManagerLayer<MemoryStore>) -> Router {
    let docs = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json));

    let api = Router::new()
        .route("/api", post(dispatch))
        .route("/api/schema", get(list_schema))
        .with_state(state);

    docs
        .merge(api)
        .layer(sessions)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx 以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
