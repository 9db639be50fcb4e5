use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;
use tracing::error;

use super::{Database, SessionStore, StoreFuture};
use crate::errors::AppError;
use crate::models::ChatSession;

#[derive(Clone)]
pub struct SessionRepository {
    db: Database,
}

impl SessionRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_recent(&self, limit: i64) -> Result<Vec<ChatSession>, AppError> {
        let pool = self.db.pool().await?;
        let rows = sqlx::query(
            "SELECT id, session_id, bot_id, start_time, end_time, messages, extra
             FROM chat_sessions
             ORDER BY start_time DESC NULLS LAST
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch recent chat sessions: {e}");
            AppError::db_query("Failed to fetch chat sessions", e)
        })?;

        rows.iter().map(session_from_row).collect()
    }
}

impl SessionStore for SessionRepository {
    fn list_recent(&self, limit: i64) -> StoreFuture<'_, Vec<ChatSession>> {
        Box::pin(self.find_recent(limit))
    }
}

/// Keys `ChatSession` serializes itself; the flattened `extra` must not repeat them.
const KNOWN_FIELDS: [&str; 6] = ["id", "sessionId", "botId", "startTime", "endTime", "messages"];

fn without_known_fields(mut extra: Map<String, Value>) -> Map<String, Value> {
    extra.retain(|key, _| !KNOWN_FIELDS.contains(&key.as_str()));
    extra
}

fn session_from_row(row: &PgRow) -> Result<ChatSession, AppError> {
    let read = |column: &str, e: sqlx::Error| AppError::db_query(format!("Failed to read {column}"), e);

    let Json(messages): Json<Vec<Value>> =
        row.try_get("messages").map_err(|e| read("messages", e))?;
    let Json(extra): Json<Map<String, Value>> =
        row.try_get("extra").map_err(|e| read("extra", e))?;

    Ok(ChatSession {
        id: row.try_get("id").map_err(|e| read("id", e))?,
        session_id: row.try_get("session_id").map_err(|e| read("session_id", e))?,
        bot_id: row.try_get("bot_id").map_err(|e| read("bot_id", e))?,
        start_time: row.try_get("start_time").map_err(|e| read("start_time", e))?,
        end_time: row.try_get("end_time").map_err(|e| read("end_time", e))?,
        messages,
        extra: without_known_fields(extra),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn extra_keys_clashing_with_known_fields_are_dropped() {
        let stored = json!({
            "id": "shadow",
            "sessionId": "shadow-sid",
            "startTime": "1999-01-01T00:00:00Z",
            "messages": [],
            "channel": "web"
        });
        let Value::Object(extra) = stored else { unreachable!() };

        let session = ChatSession {
            id: "session-1".to_string(),
            session_id: Some("sid-1".to_string()),
            bot_id: None,
            start_time: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
            end_time: None,
            messages: vec![],
            extra: without_known_fields(extra),
        };

        let out = serde_json::to_string(&session).expect("serialize");
        assert_eq!(out.matches(r#""id":"#).count(), 1);
        assert_eq!(out.matches(r#""sessionId":"#).count(), 1);
        assert_eq!(out.matches(r#""startTime":"#).count(), 1);

        let value: Value = serde_json::from_str(&out).expect("parse");
        assert_eq!(value["id"], "session-1");
        assert_eq!(value["channel"], "web");
    }
}
