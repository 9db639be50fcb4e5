use leptos::ev;
use leptos::html::Div;
use leptos::prelude::*;

use crate::state::AppState;

/// Chat widget: running transcript plus the input form.
#[component]
pub fn ChatArea() -> impl IntoView {
    let state = expect_context::<AppState>();
    let container = NodeRef::<Div>::new();

    // Keep the newest message in view
    Effect::new(move |_| {
        state.messages.track();
        if let Some(el) = container.get() {
            el.set_scroll_top(el.scroll_height());
        }
    });

    view! {
        <main class="chat-area">
            {move || {
                state.error.get().map(|err| {
                    view! {
                        <div class="error-banner">{err}</div>
                    }
                })
            }}

            <div class="chat-header">"TopizioBot"</div>

            <div class="messages-container" node_ref=container>
                {move || {
                    if state.messages.get().is_empty() {
                        view! {
                            <div class="empty-state">
                                "Pergunte sobre moda, tendências ou coleções"
                            </div>
                        }.into_any()
                    } else {
                        state
                            .messages
                            .get()
                            .into_iter()
                            .map(|msg| {
                                let is_user = msg.is_user();
                                view! { <MessageBubble is_user=is_user content=msg.content /> }
                            })
                            .collect_view()
                            .into_any()
                    }
                }}
                {move || state.is_sending.get().then(|| view! {
                    <div class="message bot typing">"TopizioBot está digitando…"</div>
                })}
            </div>

            <ChatInput />
        </main>
    }
}

/// A single chat message bubble.
#[component]
fn MessageBubble(is_user: bool, content: String) -> impl IntoView {
    let (css_class, label) = if is_user {
        ("message user", "Você")
    } else {
        ("message bot", "Bot")
    };

    view! {
        <div class=css_class>
            <strong>{label}":"</strong>" "{content}
        </div>
    }
}

/// Chat input form with textarea and send button.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (input, set_input) = signal(String::new());

    let is_sending = move || state.is_sending.get();

    let send = move || {
        let text = input.get().trim().to_string();
        if text.is_empty() || state.is_sending.get_untracked() {
            return;
        }
        set_input.set(String::new());
        state.send_message(text);
    };

    let send_clone = send;
    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send_clone();
        }
    };

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        send();
    };

    view! {
        <form class="input-area" on:submit=on_submit>
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Digite sua mensagem… (Enter para enviar)"
                    prop:value=input
                    on:input=move |ev| {
                        set_input.set(event_target_value(&ev));
                    }
                    on:keydown=on_keydown
                    disabled=is_sending
                />
                <button
                    type="submit"
                    class="send-btn"
                    disabled=move || is_sending() || input.get().trim().is_empty()
                >
                    {move || if is_sending() { "Enviando…" } else { "Enviar" }}
                </button>
            </div>
        </form>
    }
}
