pub mod api_routes;

use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::service::analytics_service::AnalyticsService;
use crate::service::chat_service::ChatService;
use api_routes::{chat_handler, list_sessions_handler, log_connection_handler, user_info_handler};

#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    pub analytics: AnalyticsService,
}

impl FromRef<AppState> for ChatService {
    fn from_ref(state: &AppState) -> Self {
        state.chat.clone()
    }
}

impl FromRef<AppState> for AnalyticsService {
    fn from_ref(state: &AppState) -> Self {
        state.analytics.clone()
    }
}

/// API routes plus the frontend bundle served from `static_dir`.
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/api/chat/historicos", get(list_sessions_handler))
        .route("/api/user-info", get(user_info_handler))
        .route("/api/log-connection", post(log_connection_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
