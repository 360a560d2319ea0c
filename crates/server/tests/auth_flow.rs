use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes;
use server::state::ServerState;
use service::auth::password::Argon2Hasher;
use service::auth::repository::mock::MockAuthRepository;
use service::auth::AuthService;
use service::posts::repository::mock::MockPostRepository;
use service::posts::Post;

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

fn build_app_with(users: Arc<MockAuthRepository>, posts: MockPostRepository) -> Router {
    server::schema::install().expect("schema installs");
    let hasher = Argon2Hasher::new(&configs::AuthConfig { memory_kib: 64, iterations: 1, parallelism: 1 })
        .expect("argon2 params");
    let state = ServerState::new(AuthService::new(hasher), users, Arc::new(posts));
    routes::build_router(state, cors(), server::session::session_layer(&configs::SessionConfig::default()))
}

fn build_app() -> Router {
    build_app_with(Arc::new(MockAuthRepository::default()), MockPostRepository::default())
}

struct Reply {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn call(app: &Router, body: Value, cookie: Option<&str>) -> anyhow::Result<Reply> {
    let mut req = Request::builder()
        .method("POST")
        .uri("/api")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    let resp = app.clone().oneshot(req.body(Body::from(serde_json::to_vec(&body)?))?).await?;
    let status = resp.status();
    // keep only `name=value`
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body = serde_json::from_slice(&bytes)?;
    Ok(Reply { status, cookie, body })
}

fn op(name: &str, options: Value) -> Value {
    json!({ "operation": name, "options": options })
}

fn creds(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

#[tokio::test]
async fn test_register_login_me_flow() -> anyhow::Result<()> {
    let app = build_app();

    let r = call(&app, op("register", creds("alice", "Str0ngPW")), None).await?;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["data"]["register"]["user"]["username"], "alice");
    assert!(r.body["data"]["register"].get("errors").is_none());
    assert!(r.body["data"]["register"]["user"].get("password").is_none());
    // registering does not start a session
    assert!(r.cookie.is_none());

    let r = call(&app, op("login", creds("alice", "Str0ngPW")), None).await?;
    assert_eq!(r.status, StatusCode::OK);
    let user_id = r.body["data"]["login"]["user"]["id"].clone();
    let cookie = r.cookie.expect("login sets the session cookie");
    assert!(cookie.starts_with("qid="));

    let r = call(&app, json!({ "operation": "me" }), Some(&cookie)).await?;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["data"]["me"]["id"], user_id);
    assert_eq!(r.body["data"]["me"]["username"], "alice");
    Ok(())
}

#[tokio::test]
async fn test_me_without_session_is_null() -> anyhow::Result<()> {
    let app = build_app();
    let r = call(&app, json!({ "operation": "me" }), None).await?;
    assert_eq!(r.status, StatusCode::OK);
    assert!(r.body["data"]["me"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_register_validation_errors_are_data() -> anyhow::Result<()> {
    let users = Arc::new(MockAuthRepository::default());
    let app = build_app_with(users.clone(), MockPostRepository::default());

    let r = call(&app, op("register", creds("ab", "Abc123")), None).await?;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["data"]["register"]["errors"][0]["field"], "username");
    assert!(r.body["data"]["register"].get("user").is_none());

    let r = call(&app, op("register", creds("alice", "weak")), None).await?;
    assert_eq!(r.body["data"]["register"]["errors"][0]["field"], "password");

    assert!(users.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_duplicate_register() -> anyhow::Result<()> {
    let users = Arc::new(MockAuthRepository::default());
    let app = build_app_with(users.clone(), MockPostRepository::default());

    call(&app, op("register", creds("alice", "Str0ngPW")), None).await?;
    let r = call(&app, op("register", creds("alice", "Str0ngPW")), None).await?;
    assert_eq!(r.body["data"]["register"]["errors"][0]["field"], "username");
    assert_eq!(r.body["data"]["register"]["errors"][0]["message"], "username already exists");
    assert_eq!(users.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_logins_do_not_start_session() -> anyhow::Result<()> {
    let app = build_app();
    call(&app, op("register", creds("alice", "Str0ngPW")), None).await?;

    let r = call(&app, op("login", creds("bob", "Str0ngPW")), None).await?;
    assert_eq!(r.body["data"]["login"]["errors"][0]["field"], "username");
    assert!(r.cookie.is_none());

    let r = call(&app, op("login", creds("alice", "Wr0ngPW")), None).await?;
    assert_eq!(r.body["data"]["login"]["errors"][0]["field"], "password");
    assert!(r.cookie.is_none());
    Ok(())
}

#[tokio::test]
async fn test_unknown_operation_rejected() -> anyhow::Result<()> {
    let app = build_app();
    let r = call(&app, json!({ "operation": "logout" }), None).await?;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    assert!(r.body["errors"][0]["message"].as_str().unwrap_or_default().contains("logout"));
    Ok(())
}

#[tokio::test]
async fn test_invalid_options_rejected() -> anyhow::Result<()> {
    let app = build_app();
    let r = call(&app, op("login", json!({ "username": "alice" })), None).await?;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);

    let r = call(&app, json!({ "operation": "register" }), None).await?;
    assert_eq!(r.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_register_insert_failure_is_generic_error() -> anyhow::Result<()> {
    let users = Arc::new(MockAuthRepository::default());
    users.fail_writes();
    let app = build_app_with(users, MockPostRepository::default());

    // a failed insert surfaces as a generic field error, not a 500
    let r = call(&app, op("register", creds("alice", "Str0ngPW")), None).await?;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["data"]["register"]["errors"][0]["field"], "general");
    assert_eq!(r.body["data"]["register"]["errors"][0]["message"], "registration failed");
    Ok(())
}

#[tokio::test]
async fn test_post_queries() -> anyhow::Result<()> {
    let now = chrono::Utc::now();
    let posts = MockPostRepository::with_posts(vec![
        Post { id: 2, title: "second".into(), created_at: now, updated_at: now },
        Post { id: 1, title: "first".into(), created_at: now, updated_at: now },
    ]);
    let app = build_app_with(Arc::new(MockAuthRepository::default()), posts);

    let r = call(&app, json!({ "operation": "posts" }), None).await?;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["data"]["posts"][0]["title"], "first");
    assert_eq!(r.body["data"]["posts"].as_array().map(Vec::len), Some(2));

    let r = call(&app, op("post", json!({ "id": 2 })), None).await?;
    assert_eq!(r.body["data"]["post"]["title"], "second");

    let r = call(&app, op("post", json!({ "id": 42 })), None).await?;
    assert!(r.body["data"]["post"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_schema_and_health_routes() -> anyhow::Result<()> {
    let app = build_app();

    let resp = app.clone().oneshot(Request::builder().uri("/health").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.clone().oneshot(Request::builder().uri("/api/schema").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    let ops = body["operations"].as_array().cloned().unwrap_or_default();
    assert!(ops.iter().any(|o| o["name"] == "register" && o["kind"] == "mutation"));
    assert!(ops.iter().any(|o| o["name"] == "me" && o["kind"] == "query"));

    let resp = app.oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_login_rotates_existing_session_cookie() -> anyhow::Result<()> {
    let app = build_app();
    call(&app, op("register", creds("mallory", "Str0ngPW")), None).await?;
    call(&app, op("register", creds("alice", "Str0ngPW")), None).await?;

    let r = call(&app, op("login", creds("mallory", "Str0ngPW")), None).await?;
    let planted = r.cookie.expect("login sets the session cookie");

    // alice logs in on a browser that already carries mallory's cookie
    let r = call(&app, op("login", creds("alice", "Str0ngPW")), Some(&planted)).await?;
    assert_eq!(r.body["data"]["login"]["user"]["username"], "alice");
    let fresh = r.cookie.expect("login reissues the session cookie");
    assert_ne!(fresh, planted);

    let r = call(&app, json!({ "operation": "me" }), Some(&planted)).await?;
    assert_ne!(r.body["data"]["me"]["username"], "alice");

    let r = call(&app, json!({ "operation": "me" }), Some(&fresh)).await?;
    assert_eq!(r.body["data"]["me"]["username"], "alice");
    Ok(())
}

async fn raw_post(app: &Router, content_type: Option<&str>, body: &str) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method("POST").uri("/api");
    if let Some(ct) = content_type {
        req = req.header(header::CONTENT_TYPE, ct);
    }
    let resp = app.clone().oneshot(req.body(Body::from(body.to_string()))?).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn test_malformed_request_bodies_use_error_envelope() -> anyhow::Result<()> {
    let app = build_app();
    let cases = [
        (Some("application/json"), r#"{"options":{}}"#),
        (Some("application/json"), "not json"),
        (None, r#"{"operation":"me"}"#),
    ];
    for (content_type, body) in cases {
        let (status, json) = raw_post(&app, content_type, body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(json["errors"][0]["message"].is_string(), "{body}");
    }
    Ok(())
}
