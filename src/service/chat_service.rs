use std::sync::Arc;

use tracing::info;

use crate::agent::ConversationModel;
use crate::errors::AppError;
use crate::models::{ChatRequest, ChatResponse};

#[derive(Clone)]
pub struct ChatService {
    model: Arc<dyn ConversationModel>,
}

impl ChatService {
    pub fn new(model: Arc<dyn ConversationModel>) -> Self {
        Self { model }
    }

    /// Runs one turn. The caller owns the history; nothing is persisted here.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AppError> {
        let message = request
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AppError::empty_field("message"))?;
        let history = request.history.unwrap_or_default();

        info!("Chat turn received ({} history entries)", history.len());
        let response = self.model.complete(&message, &history).await?;

        Ok(ChatResponse { response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, ChatMessage};
    use crate::testing::FakeModel;

    #[tokio::test]
    async fn returns_the_model_reply_verbatim() {
        let model = Arc::new(FakeModel::replying("  Use um blazer bege.\n"));
        let svc = ChatService::new(model.clone());

        let response = svc
            .chat(ChatRequest {
                message: Some("O que vestir hoje?".into()),
                history: Some(vec![ChatMessage::new(Author::Model, "Oi!")]),
            })
            .await
            .expect("chat should succeed");

        assert_eq!(response.response, "  Use um blazer bege.\n");
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "O que vestir hoje?");
        assert_eq!(calls[0].1, vec![ChatMessage::new(Author::Model, "Oi!")]);
    }

    #[tokio::test]
    async fn missing_or_blank_message_never_reaches_the_model() {
        let model = Arc::new(FakeModel::replying("unused"));
        let svc = ChatService::new(model.clone());

        for message in [None, Some(String::new()), Some("   ".to_string())] {
            let err = svc
                .chat(ChatRequest { message, history: None })
                .await
                .expect_err("message is required");
            assert!(matches!(err, AppError::EmptyField { ref field_name } if field_name == "message"));
        }
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn absent_history_is_sent_as_empty() {
        let model = Arc::new(FakeModel::replying("ok"));
        let svc = ChatService::new(model.clone());

        svc.chat(ChatRequest { message: Some("oi".into()), history: None })
            .await
            .expect("chat should succeed");

        assert!(model.calls()[0].1.is_empty());
    }

    #[tokio::test]
    async fn provider_errors_propagate_unchanged() {
        let svc = ChatService::new(Arc::new(FakeModel::failing(|| AppError::Authentication)));
        let err = svc
            .chat(ChatRequest { message: Some("oi".into()), history: None })
            .await
            .expect_err("provider failed");
        assert!(matches!(err, AppError::Authentication));
    }
}
