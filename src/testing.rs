//! In-memory collaborators for service and router tests.

use std::sync::Mutex;

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Map};

use crate::agent::{CompletionFuture, ConversationModel};
use crate::db::{AccessLogStore, SessionStore, StoreFuture};
use crate::errors::AppError;
use crate::geo::{GeoFuture, GeoLocator};
use crate::models::{AccessLogEntry, ChatMessage, ChatSession, GeoInfo, NewAccessLog};

type ErrorFactory = Box<dyn Fn() -> AppError + Send + Sync>;

pub struct FakeModel {
    reply: Result<String, ErrorFactory>,
    calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

impl FakeModel {
    pub fn replying(text: &str) -> Self {
        Self { reply: Ok(text.to_string()), calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(make_error: impl Fn() -> AppError + Send + Sync + 'static) -> Self {
        Self { reply: Err(Box::new(make_error)), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<(String, Vec<ChatMessage>)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl ConversationModel for FakeModel {
    fn complete<'a>(&'a self, message: &'a str, history: &'a [ChatMessage]) -> CompletionFuture<'a> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((message.to_string(), history.to_vec()));
        let result = match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make_error) => Err(make_error()),
        };
        Box::pin(async move { result })
    }
}

/// Behaves like the `chat_sessions` query: newest `start_time` first, capped.
#[derive(Default)]
pub struct FakeSessions {
    sessions: Vec<ChatSession>,
    fail: bool,
    limits: Mutex<Vec<i64>>,
}

impl FakeSessions {
    /// `count` sessions, one hour apart, inserted oldest first.
    pub fn seeded(count: usize) -> Self {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let sessions = (0..count)
            .map(|i| ChatSession {
                id: format!("session-{i}"),
                session_id: Some(format!("sid-{i}")),
                bot_id: Some("topizio".to_string()),
                start_time: Some(base + Duration::hours(i as i64)),
                end_time: Some(base + Duration::hours(i as i64) + Duration::minutes(5)),
                messages: vec![json!({ "author": "user", "content": format!("mensagem {i}") })],
                extra: Map::new(),
            })
            .collect();
        Self { sessions, ..Self::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn requested_limits(&self) -> Vec<i64> {
        self.limits.lock().expect("limits lock").clone()
    }
}

impl SessionStore for FakeSessions {
    fn list_recent(&self, limit: i64) -> StoreFuture<'_, Vec<ChatSession>> {
        self.limits.lock().expect("limits lock").push(limit);
        let result = if self.fail {
            Err(AppError::DatabaseConnectionFailed("connection refused".to_string()))
        } else {
            let mut sorted = self.sessions.clone();
            sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time));
            sorted.truncate(limit.max(0) as usize);
            Ok(sorted)
        };
        Box::pin(async move { result })
    }
}

#[derive(Default)]
pub struct FakeAccessLogs {
    rows: Mutex<Vec<AccessLogEntry>>,
    fail: bool,
}

impl FakeAccessLogs {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn count(&self) -> usize {
        self.rows.lock().expect("rows lock").len()
    }

    pub fn rows(&self) -> Vec<AccessLogEntry> {
        self.rows.lock().expect("rows lock").clone()
    }
}

impl AccessLogStore for FakeAccessLogs {
    fn insert(&self, log: NewAccessLog) -> StoreFuture<'_, AccessLogEntry> {
        let result = if self.fail {
            Err(AppError::Unexpected("disk full".to_string()))
        } else {
            let entry = AccessLogEntry::new(log);
            self.rows.lock().expect("rows lock").push(entry.clone());
            Ok(entry)
        };
        Box::pin(async move { result })
    }
}

pub struct FakeGeo {
    result: Result<GeoInfo, String>,
    lookups: Mutex<Vec<String>>,
}

impl FakeGeo {
    pub fn locating(city: &str, country: &str) -> Self {
        Self {
            result: Ok(GeoInfo {
                ip: String::new(),
                city: city.to_string(),
                country: country.to_string(),
            }),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self { result: Err("Geolocalização falhou".to_string()), lookups: Mutex::new(Vec::new()) }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("lookups lock").clone()
    }
}

impl GeoLocator for FakeGeo {
    fn lookup<'a>(&'a self, ip: &'a str) -> GeoFuture<'a> {
        self.lookups.lock().expect("lookups lock").push(ip.to_string());
        let result = match &self.result {
            Ok(info) => Ok(GeoInfo { ip: ip.to_string(), ..info.clone() }),
            Err(message) => Err(AppError::GeolocationFailed { message: message.clone() }),
        };
        Box::pin(async move { result })
    }
}
