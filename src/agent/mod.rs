pub mod tools;

use std::future::Future;
use std::pin::Pin;

use rig::completion::Chat;
use rig::message::Message as RigMessage;
use rig::prelude::CompletionClient;
use rig::providers::gemini;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::errors::AppError;
use crate::models::{Author, ChatMessage};
use tools::CurrentTime;

/// Tool rounds allowed before the model must answer in text.
const MAX_TOOL_ROUNDS: usize = 2;

const PREAMBLE: &str = "Você é o TopizioBot, um personal stylist que entende tudo sobre moda, \
                        tendências e as novas coleções de marcas de grife e alta-costura. \
                        Sempre responda de forma educada, clara e em português do Brasil. \
                        Se perguntarem sobre você, diga que foi desenvolvido em Rust com a API Gemini do Google. \
                        Seja simpático, evite respostas muito longas e sempre tente ajudar de forma objetiva.";

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AppError>> + Send + 'a>>;

/// Produces the next model reply for a stateless conversation.
pub trait ConversationModel: Send + Sync {
    fn complete<'a>(&'a self, message: &'a str, history: &'a [ChatMessage]) -> CompletionFuture<'a>;
}

/// Builds the rig history from client-supplied messages. `Model` replays as
/// the assistant turn, every other author as the user.
pub fn to_rig_history(history: &[ChatMessage]) -> Vec<RigMessage> {
    history
        .iter()
        .map(|m| match m.author {
            Author::Model => RigMessage::assistant(&m.content),
            Author::User => RigMessage::user(&m.content),
        })
        .collect()
}

/// Per-deployment harm thresholds sent with every request.
fn safety_params() -> Value {
    json!({
        "generationConfig": {},
        "safetySettings": [
            { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
            { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE" }
        ]
    })
}

/// Finish reasons that mean the candidate was withheld rather than cut short.
const BLOCKING_FINISH_REASONS: &[&str] =
    &["Safety", "Blocklist", "ProhibitedContent", "Spii", "Recitation"];

/// Maps a raw provider failure onto the outward error taxonomy.
pub fn classify_provider_error(message: String) -> AppError {
    if message.contains("API key not valid") || message.contains("API_KEY_INVALID") {
        return AppError::Authentication;
    }
    // A blocked prompt comes back without candidates. rig drops the
    // `promptFeedback` that names the reason, so none can be reported.
    if message.contains("No response candidates") {
        return AppError::ContentBlocked { reason: None };
    }
    if let Some(reason) = blocking_finish_reason(&message) {
        return AppError::ContentBlocked { reason: Some(reason) };
    }
    AppError::Upstream { message }
}

/// Reads the `finish_reason=..` of rig's missing-content error and returns it
/// in Gemini's wire spelling when it denotes a block.
fn blocking_finish_reason(message: &str) -> Option<String> {
    let (_, rest) = message.split_once("finish_reason=")?;
    let reason: String = rest.chars().take_while(|c| c.is_ascii_alphanumeric()).collect();
    BLOCKING_FINISH_REASONS
        .contains(&reason.as_str())
        .then(|| screaming_snake(&reason))
}

fn screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// Conversation client backed by the rig [`gemini::Client`].
/// A fresh agent is built per request and the full history is replayed.
#[derive(Clone)]
pub struct GeminiAgentService {
    client: gemini::Client,
    model: String,
}

impl GeminiAgentService {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self, AppError> {
        let client = gemini::Client::builder()
            .api_key(api_key)
            .base_url(base_url.trim_end_matches('/'))
            .build()
            .map_err(|e| AppError::Unexpected(format!("Failed to build Gemini client: {e}")))?;
        Ok(Self { client, model: model.to_string() })
    }

    pub async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, AppError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(PREAMBLE)
            .additional_params(safety_params())
            .default_max_turns(MAX_TOOL_ROUNDS)
            .tool(CurrentTime)
            .build();

        debug!("Sending message to Gemini with {} history entries", history.len());

        let reply = agent
            .chat(message, to_rig_history(history))
            .await
            .map_err(|e| {
                error!("Gemini completion failed: {e}");
                classify_provider_error(e.to_string())
            })?;

        debug!("Gemini replied with {} characters", reply.chars().count());
        Ok(reply)
    }
}

impl ConversationModel for GeminiAgentService {
    fn complete<'a>(&'a self, message: &'a str, history: &'a [ChatMessage]) -> CompletionFuture<'a> {
        Box::pin(self.chat(message, history))
    }
}
