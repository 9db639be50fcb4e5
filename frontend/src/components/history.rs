use leptos::prelude::*;
use wasm_bindgen::JsValue;

use crate::models::ChatSession;
use crate::state::AppState;

/// Renders an ISO timestamp the way a pt-BR browser locale would.
fn format_start_time(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => {
            let date = js_sys::Date::new(&JsValue::from_str(raw));
            date.to_locale_string("pt-BR", &JsValue::UNDEFINED).into()
        }
        None => "data desconhecida".to_string(),
    }
}

/// History browser: recorded sessions and the transcript of the selected one.
#[component]
pub fn HistoryPanel() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <aside class="sidebar">
            <div class="sidebar-header">
                <h2>"Histórico de conversas"</h2>
            </div>
            <ul class="conversation-list">
                {
                    move || match state.sessions.get() {
                        None => view! { <li>"Carregando…"</li> }.into_any(),
                        Some(Err(_)) => view! {
                            <li>"Erro ao carregar o histórico. Verifique o console para mais detalhes."</li>
                        }.into_any(),
                        Some(Ok(sessions)) if sessions.is_empty() => view! {
                            <li>"Nenhum histórico de conversa encontrado."</li>
                        }.into_any(),
                        Some(Ok(sessions)) => sessions
                            .into_iter()
                            .map(|session| view! { <SessionItem session=session /> })
                            .collect_view()
                            .into_any(),
                    }
                }
            </ul>
            <SessionTranscript />
        </aside>
    }
}

#[component]
fn SessionItem(session: ChatSession) -> impl IntoView {
    let state = expect_context::<AppState>();
    let label = format!("Conversa de {}", format_start_time(session.start_time.as_deref()));
    let id = session.id.clone();

    view! {
        <li
            class="conversation-item"
            class:active=move || {
                state.selected_session.get().is_some_and(|s| s.id == id)
            }
            title="Clique para ver os detalhes"
            on:click=move |_| state.select_session(session.clone())
        >
            {label}
        </li>
    }
}

#[component]
fn SessionTranscript() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div class="session-detail">
            {move || state.selected_session.get().map(|session| {
                if session.messages.is_empty() {
                    view! { <p>"Esta sessão não possui mensagens."</p> }.into_any()
                } else {
                    session
                        .messages
                        .into_iter()
                        .map(|msg| {
                            let is_user = msg.author.as_deref() == Some("user");
                            let (class, prefix) = if is_user {
                                ("mensagem-usuario", "Você")
                            } else {
                                ("mensagem-bot", "TopizioBot")
                            };
                            let text = msg.content.unwrap_or_default();
                            view! { <p class=class>{format!("{prefix}: {text}")}</p> }
                        })
                        .collect_view()
                        .into_any()
                }
            })}
        </div>
    }
}
