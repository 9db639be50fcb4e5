use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::db::{AccessLogStore, SessionStore};
use crate::errors::AppError;
use crate::geo::GeoLocator;
use crate::models::{AccessLogEntry, ChatSession, GeoInfo, LogConnectionRequest, NewAccessLog};

/// Upper bound on sessions returned by the history listing.
pub const HISTORY_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct AnalyticsService {
    sessions: Arc<dyn SessionStore>,
    access_logs: Arc<dyn AccessLogStore>,
    geo: Arc<dyn GeoLocator>,
}

impl AnalyticsService {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        access_logs: Arc<dyn AccessLogStore>,
        geo: Arc<dyn GeoLocator>,
    ) -> Self {
        Self { sessions, access_logs, geo }
    }

    pub async fn recent_sessions(&self) -> Result<Vec<ChatSession>, AppError> {
        self.sessions.list_recent(HISTORY_LIMIT).await
    }

    /// Validates the visit and appends it to the access log. Incomplete input
    /// is rejected before storage is touched.
    pub async fn log_connection(
        &self,
        request: LogConnectionRequest,
    ) -> Result<AccessLogEntry, AppError> {
        let ip_address = required(request.ip, "ip")?;
        let city = required(request.city, "city")?;
        let timestamp = required(request.timestamp, "timestamp")?;
        let connection_time = parse_timestamp(&timestamp)?;

        let entry = self
            .access_logs
            .insert(NewAccessLog { ip_address, city, connection_time })
            .await?;
        info!("Access log {} saved for {}", entry.id, entry.ip_address);
        Ok(entry)
    }

    pub async fn user_info(&self, client_ip: Option<String>) -> Result<GeoInfo, AppError> {
        let ip = client_ip
            .filter(|ip| !ip.trim().is_empty())
            .ok_or(AppError::UnidentifiableClient)?;
        self.geo.lookup(&ip).await
    }
}

fn required(value: Option<String>, field_name: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::empty_field(field_name))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AppError::InvalidField {
            field_name: "timestamp".to_string(),
            reason: e.to_string(),
        })
}
