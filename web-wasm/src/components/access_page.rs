//! 入場画面（合言葉）

use crate::app::{Auth, Navigator};
use event_gallery_common::{AccessDecision, Page};
use leptos::ev;
use leptos::prelude::*;

#[component]
pub fn AccessPage() -> impl IntoView {
    let auth = expect_context::<Auth>();
    let nav = expect_context::<Navigator>();

    let (answer, set_answer) = signal(String::new());
    let (error, set_error) = signal(None::<&'static str>);
    let question = auth.question();

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        match auth.check(&answer.get_untracked()) {
            AccessDecision::Granted => {
                set_error.set(None);
                nav.go(Page::Gallery);
            }
            denied => {
                set_error.set(denied.message());
                set_answer.set(String::new());
            }
        }
    };

    view! {
        <div class="access-container">
            <div class="access-card">
                <h1 class="access-title">"🔒 Private Gallery"</h1>
                <p class="access-description">
                    "This gallery is only for invited guests. Please answer the security question to continue."
                </p>

                <div class="access-question">
                    <h3>"Security Question:"</h3>
                    <p><strong>{question}</strong></p>
                </div>

                <form class="access-form" on:submit=on_submit>
                    <input
                        type="text"
                        class="access-input"
                        placeholder="Enter answer here..."
                        required=true
                        prop:value=move || answer.get()
                        on:input=move |ev| set_answer.set(event_target_value(&ev))
                    />

                    {move || error.get().map(|msg| view! { <p class="access-error">{msg}</p> })}

                    <div class="access-buttons">
                        <button
                            type="button"
                            class="access-btn back-btn"
                            on:click=move |_| nav.go(Page::Upload)
                        >
                            "← Back to Upload"
                        </button>
                        <button type="submit" class="access-btn submit-btn">
                            "Unlock Gallery"
                        </button>
                    </div>
                </form>

                <div class="access-hint">
                    <p>"💡 Hint: Check your wedding invitation for the secret code!"</p>
                </div>
            </div>
        </div>
    }
}
