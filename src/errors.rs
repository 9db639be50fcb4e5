use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Top-level application error. Every collaborator failure is mapped into one
/// of these variants before it reaches a route handler.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Database errors ──────────────────────────────────────────────────────
    #[error("Database connection failed: {0}")]
    DatabaseConnectionFailed(String),

    #[error("Database query failed: {message}")]
    DatabaseQueryFailed {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    // ── Conversation provider errors ─────────────────────────────────────────
    #[error("Gemini API key is invalid or not configured correctly")]
    Authentication,

    #[error("Response blocked by safety filtering{}", block_suffix(.reason))]
    ContentBlocked { reason: Option<String> },

    #[error("Upstream provider error: {message}")]
    Upstream { message: String },

    // ── Geolocation errors ───────────────────────────────────────────────────
    #[error("Could not identify the client IP address")]
    UnidentifiableClient,

    #[error("{message}")]
    GeolocationFailed { message: String },

    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Field '{field_name}' is required")]
    EmptyField { field_name: String },

    #[error("Field '{field_name}' is invalid: {reason}")]
    InvalidField { field_name: String, reason: String },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

fn block_suffix(reason: &Option<String>) -> String {
    reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default()
}

const INTERNAL_ERROR_MESSAGE: &str = "Ocorreu um erro interno no servidor.";

/// JSON error shape shared by every route.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    pub fn db_query(message: impl Into<String>, source: sqlx::Error) -> Self {
        AppError::DatabaseQueryFailed { message: message.into(), source }
    }

    pub fn empty_field(field_name: &str) -> Self {
        AppError::EmptyField { field_name: field_name.to_string() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyField { .. }
                | AppError::InvalidField { .. }
                | AppError::MalformedBody(_)
                | AppError::UnidentifiableClient
        )
    }

    /// Whether the message may be shown to the client as-is.
    pub fn is_client_safe(&self) -> bool {
        self.is_validation()
            || matches!(
                self,
                AppError::Authentication
                    | AppError::ContentBlocked { .. }
                    | AppError::GeolocationFailed { .. }
            )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            AppError::ContentBlocked { .. } => StatusCode::BAD_REQUEST,
            AppError::Authentication => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing text, in the same language as the chat persona.
    fn client_message(&self) -> String {
        match self {
            AppError::EmptyField { field_name } => format!("O campo '{field_name}' é obrigatório."),
            AppError::InvalidField { field_name, reason } => {
                format!("O campo '{field_name}' é inválido: {reason}")
            }
            AppError::MalformedBody(detail) => format!("Corpo da requisição inválido: {detail}"),
            AppError::UnidentifiableClient => "IP não identificado.".to_string(),
            AppError::Authentication => {
                "Chave de API do Gemini inválida ou não configurada corretamente.".to_string()
            }
            AppError::ContentBlocked { reason: Some(reason) } => {
                format!("A resposta foi bloqueada: {reason}")
            }
            AppError::ContentBlocked { reason: None } => {
                "A resposta foi bloqueada devido às configurações de segurança. \
                 Tente uma pergunta diferente."
                    .to_string()
            }
            AppError::GeolocationFailed { message } => message.clone(),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Builds the client-facing body. Provider failures add the raw text as
    /// `details`; other server-side causes stay in the logs.
    pub fn body(&self) -> ErrorBody {
        match self {
            AppError::Upstream { message } => ErrorBody {
                error: INTERNAL_ERROR_MESSAGE.to_string(),
                details: Some(message.clone()),
            },
            e if e.is_client_safe() => ErrorBody { error: e.client_message(), details: None },
            _ => ErrorBody { error: INTERNAL_ERROR_MESSAGE.to_string(), details: None },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed with {status}: {self}");
        }
        (status, Json(self.body())).into_response()
    }
}
