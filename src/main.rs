mod agent;
mod config;
mod db;
mod errors;
mod geo;
mod models;
mod routes;
mod service;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::GeminiAgentService;
use crate::config::AppConfig;
use crate::db::access_log_repository::AccessLogRepository;
use crate::db::session_repository::SessionRepository;
use crate::db::Database;
use crate::geo::IpApiClient;
use crate::routes::{build_router, AppState};
use crate::service::analytics_service::AnalyticsService;
use crate::service::chat_service::ChatService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "topizio_bot=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    // ── Database (connected lazily, warmed in the background) ─────────────────
    let db = Database::new(
        &config.database_url,
        config.database_max_connections,
        config.outbound_timeout,
    );
    let warm = db.clone();
    tokio::spawn(async move {
        if let Err(e) = warm.pool().await {
            warn!("Initial database connection failed, will retry on demand: {e}");
        }
    });

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let agent = GeminiAgentService::new(
        &config.gemini_api_key,
        &config.gemini_model,
        &config.gemini_base_url,
    )?;
    let geo = IpApiClient::new(&config.geolocation_base_url, config.outbound_timeout)?;

    let state = AppState {
        chat: ChatService::new(Arc::new(agent)),
        analytics: AnalyticsService::new(
            Arc::new(SessionRepository::new(db.clone())),
            Arc::new(AccessLogRepository::new(db)),
            Arc::new(geo),
        ),
    };

    let app = build_router(state, &config.static_dir);

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Serving {} on http://{addr}/ (model {})", config.static_dir, config.gemini_model);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
