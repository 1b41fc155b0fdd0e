//! エラーパネルコンポーネント

use leptos::prelude::*;

use crate::app::use_app;

#[component]
pub fn ErrorPanel() -> impl IntoView {
    let session = use_app().session;
    let error = move || session.with(|s| s.error().map(str::to_string));

    view! {
        {move || error().map(|message| view! {
            <div class="error-section">
                <i class="fas fa-exclamation-circle"></i>
                <p class="error-message">{message}</p>
            </div>
        })}
    }
}
