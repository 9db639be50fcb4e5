use gloo_net::http::{Request, Response};

use crate::models::{
    ChatMessage, ChatRequest, ChatResponse, ChatSession, ErrorResponse, LogConnectionRequest,
    UserInfo,
};

/// The bundle is served by the backend itself, so paths are same-origin.
const API_BASE: &str = "";

/// Turns a non-2xx response into the backend's error text when it has one.
async fn error_text(resp: Response) -> String {
    match resp.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => format!("Server error: {}", resp.status()),
    }
}

/// Sends one chat turn with the full running history.
pub async fn send_chat(message: &str, history: &[ChatMessage]) -> Result<String, String> {
    let body = ChatRequest {
        message: message.to_string(),
        history: history.to_vec(),
    };

    let resp = Request::post(&format!("{API_BASE}/chat"))
        .json(&body)
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        return Err(error_text(resp).await);
    }

    resp.json::<ChatResponse>()
        .await
        .map(|r| r.response)
        .map_err(|e| format!("Parse error: {e}"))
}

/// Fetches the most recent recorded sessions, newest first.
pub async fn fetch_sessions() -> Result<Vec<ChatSession>, String> {
    let resp = Request::get(&format!("{API_BASE}/api/chat/historicos"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        return Err(error_text(resp).await);
    }

    resp.json::<Vec<ChatSession>>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

pub async fn fetch_user_info() -> Result<UserInfo, String> {
    let resp = Request::get(&format!("{API_BASE}/api/user-info"))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        return Err(error_text(resp).await);
    }

    resp.json::<UserInfo>()
        .await
        .map_err(|e| format!("Parse error: {e}"))
}

pub async fn log_connection(body: &LogConnectionRequest) -> Result<(), String> {
    let resp = Request::post(&format!("{API_BASE}/api/log-connection"))
        .json(body)
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        return Err(error_text(resp).await);
    }
    Ok(())
}
