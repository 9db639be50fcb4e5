use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use crate::errors::AppError;
use crate::models::{
    ChatRequest, ChatResponse, ChatSession, GeoInfo, LogConnectionRequest, LogConnectionResponse,
};
use crate::service::analytics_service::AnalyticsService;
use crate::service::chat_service::ChatService;

/// Unwraps a JSON body, turning axum's rejection into our 400 shape.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {rejection}");
        AppError::MalformedBody(rejection.body_text())
    })
}

/// First `X-Forwarded-For` entry, else the socket peer address.
pub fn client_ip(request: &Request) -> Option<String> {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string);

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_canonical().to_string())
    })
}

/// POST `/chat` — one conversation turn
pub async fn chat_handler(
    State(svc): State<ChatService>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let request = json_body(payload)?;
    svc.chat(request).await.map(Json)
}

/// GET `/api/chat/historicos` — newest recorded sessions
pub async fn list_sessions_handler(
    State(svc): State<AnalyticsService>,
) -> Result<Json<Vec<ChatSession>>, AppError> {
    svc.recent_sessions().await.map(Json)
}

/// GET `/api/user-info` — location of the calling client
pub async fn user_info_handler(
    State(svc): State<AnalyticsService>,
    request: Request,
) -> Result<Json<GeoInfo>, AppError> {
    svc.user_info(client_ip(&request)).await.map(Json)
}

/// POST `/api/log-connection` — append one visit to the access log
pub async fn log_connection_handler(
    State(svc): State<AnalyticsService>,
    payload: Result<Json<LogConnectionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LogConnectionResponse>), AppError> {
    let request = json_body(payload)?;
    let entry = svc.log_connection(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(LogConnectionResponse { message: "Log salvo".to_string(), log_id: entry.id }),
    ))
}
