use serde::{Deserialize, Serialize};

/// One entry of the running conversation, as the backend expects it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ChatMessage {
    pub author: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { author: "user".to_string(), content: content.into() }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self { author: "model".to_string(), content: content.into() }
    }

    pub fn is_user(&self) -> bool {
        self.author == "user"
    }
}

/// Request body for `POST /chat`.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatMessage>,
}

/// Response from `POST /chat`.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Error body shared by every backend route.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A recorded session. Only the fields the history view renders.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub messages: Vec<SessionMessage>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SessionMessage {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserInfo {
    pub ip: String,
    pub city: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LogConnectionRequest {
    pub ip: String,
    pub city: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_list_tolerates_null_and_missing_message_fields() {
        let raw = r#"[
            {
                "id": "s1",
                "startTime": "2026-03-01T12:00:00Z",
                "messages": [
                    { "author": "user", "content": null },
                    { "author": "model" },
                    { "content": "Olá!" }
                ]
            },
            { "id": "s2", "startTime": null }
        ]"#;

        let sessions: Vec<ChatSession> = serde_json::from_str(raw).expect("list parses");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].messages[0].content, None);
        assert_eq!(sessions[0].messages[1].content, None);
        assert_eq!(sessions[0].messages[2].content.as_deref(), Some("Olá!"));
        assert!(sessions[1].messages.is_empty());
    }
}
