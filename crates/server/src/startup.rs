use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, ServerConfig};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use service::auth::password::Argon2Hasher;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::AuthService;
use service::posts::SeaOrmPostRepository;

use crate::errors::StartupError;
use crate::{routes, schema, session, state::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(server: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Startup sanity read: log what the post table holds.
async fn diagnostic_read(db: &DatabaseConnection) -> anyhow::Result<()> {
    let posts = models::post::find_all(db).await?;
    info!(count = posts.len(), "diagnostic read: posts");
    debug!(?posts, "posts");
    Ok(())
}

/// Wire repositories and sessions into the router.
pub fn build_app(cfg: &AppConfig, db: DatabaseConnection) -> anyhow::Result<Router> {
    let hasher = Argon2Hasher::new(&cfg.auth)?;
    let state = ServerState::new(
        AuthService::new(hasher),
        Arc::new(SeaOrmAuthRepository::new(db.clone())),
        Arc::new(SeaOrmPostRepository::new(db)),
    );
    Ok(routes::build_router(state, build_cors(), session::session_layer(&cfg.session)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: store init, migrations, diagnostic read, then serve HTTP
/// until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let schema = schema::install()?;
    info!(operations = schema.len(), "schema installed");

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Migration(e.to_string()))?;
    info!("migrations applied");

    diagnostic_read(&db).await?;

    let app = build_app(&cfg, db)?;

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}
