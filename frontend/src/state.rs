use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::models::{ChatMessage, ChatSession, LogConnectionRequest};

/// Shared application state, provided via Leptos context. Every field is a
/// signal handle, so the whole struct is `Copy`.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Chat widget ---
    pub messages: ReadSignal<Vec<ChatMessage>>,
    pub history: ReadSignal<Vec<ChatMessage>>,
    pub is_sending: ReadSignal<bool>,
    pub error: ReadSignal<Option<String>>,

    // --- History browser ---
    pub sessions: ReadSignal<Option<Result<Vec<ChatSession>, String>>>,
    pub selected_session: ReadSignal<Option<ChatSession>>,

    pub set_messages: WriteSignal<Vec<ChatMessage>>,
    pub set_history: WriteSignal<Vec<ChatMessage>>,
    pub set_is_sending: WriteSignal<bool>,
    pub set_error: WriteSignal<Option<String>>,
    pub set_sessions: WriteSignal<Option<Result<Vec<ChatSession>, String>>>,
    pub set_selected_session: WriteSignal<Option<ChatSession>>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let (messages, set_messages) = signal(Vec::<ChatMessage>::new());
        let (history, set_history) = signal(Vec::<ChatMessage>::new());
        let (is_sending, set_is_sending) = signal(false);
        let (error, set_error) = signal(None::<String>);
        let (sessions, set_sessions) = signal(None::<Result<Vec<ChatSession>, String>>);
        let (selected_session, set_selected_session) = signal(None::<ChatSession>);

        let state = Self {
            messages,
            history,
            is_sending,
            error,
            sessions,
            selected_session,
            set_messages,
            set_history,
            set_is_sending,
            set_error,
            set_sessions,
            set_selected_session,
        };

        provide_context(state);
        state
    }

    /// Records this visit: look up the caller's location, then log it.
    /// Failures are only logged to the console.
    pub fn register_connection(&self) {
        spawn_local(async move {
            let result = async {
                let info = api::fetch_user_info().await?;
                let timestamp: String = js_sys::Date::new_0().to_iso_string().into();
                api::log_connection(&LogConnectionRequest {
                    ip: info.ip,
                    city: info.city,
                    timestamp,
                })
                .await
            }
            .await;

            match result {
                Ok(()) => log::info!("Connection logged"),
                Err(e) => log::error!("Failed to register connection: {e}"),
            }
        });
    }

    /// Load recorded sessions for the history browser.
    pub fn load_sessions(&self) {
        let set_sessions = self.set_sessions;
        spawn_local(async move {
            let result = api::fetch_sessions().await;
            if let Err(e) = &result {
                log::error!("Failed to load chat history: {e}");
            }
            set_sessions.set(Some(result));
        });
    }

    pub fn select_session(&self, session: ChatSession) {
        self.set_selected_session.set(Some(session));
    }

    /// Send a message with the running history and append the reply.
    pub fn send_message(&self, text: String) {
        let history = self.history.get_untracked();
        let set_messages = self.set_messages;
        let set_history = self.set_history;
        let set_is_sending = self.set_is_sending;
        let set_error = self.set_error;

        // Show the user message right away
        set_messages.update(|msgs| msgs.push(ChatMessage::user(text.clone())));
        set_is_sending.set(true);
        set_error.set(None);

        spawn_local(async move {
            match api::send_chat(&text, &history).await {
                Ok(reply) => {
                    set_messages.update(|msgs| msgs.push(ChatMessage::model(reply.clone())));
                    set_history.update(|h| {
                        h.push(ChatMessage::user(text));
                        h.push(ChatMessage::model(reply));
                    });
                }
                Err(e) => {
                    log::error!("Chat request failed: {e}");
                    set_error.set(Some(e));
                }
            }
            set_is_sending.set(false);
        });
    }
}
