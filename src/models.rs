use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Who wrote a chat message. Anything other than `"model"` is the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum Author {
    #[default]
    User,
    Model,
}

impl Author {
    pub fn as_str(&self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Model => "model",
        }
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Author {
    fn from(s: &str) -> Self {
        match s {
            "model" => Author::Model,
            _ => Author::User,
        }
    }
}

impl From<Option<String>> for Author {
    fn from(s: Option<String>) -> Self {
        s.as_deref().map(Author::from).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub content: String,
}

#[cfg(test)]
impl ChatMessage {
    pub fn new(author: Author, content: impl Into<String>) -> Self {
        Self { author, content: content.into() }
    }
}

/// A recorded conversation, written by an external process. Fields this
/// service does not know about are kept in `extra` and flattened on output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub session_id: Option<String>,
    pub bot_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A validated visit, ready to be appended to the access log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccessLog {
    pub ip_address: String,
    pub city: String,
    pub connection_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogEntry {
    pub id: String,
    pub ip_address: String,
    pub city: String,
    pub connection_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AccessLogEntry {
    pub fn new(log: NewAccessLog) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ip_address: log.ip_address,
            city: log.city,
            connection_time: log.connection_time,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoInfo {
    pub ip: String,
    pub city: String,
    pub country: String,
}

// ── Request / response bodies ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct LogConnectionRequest {
    pub ip: Option<String>,
    pub city: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConnectionResponse {
    pub message: String,
    pub log_id: String,
}
