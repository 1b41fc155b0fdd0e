//! 進捗パネルコンポーネント

use leptos::prelude::*;

use crate::app::use_app;

#[component]
pub fn ProgressPanel() -> impl IntoView {
    let ctx = use_app();
    let session = ctx.session;

    let visible = move || session.with(|s| s.is_submitting());
    let percent = move || session.with(|s| s.progress().percent());
    let message = move || session.with(|s| s.progress().message().to_string());
    let cached = move || session.with(|s| s.progress().is_cached());

    view! {
        <Show when=visible>
            <div class=move || if cached() { "progress-container cached" } else { "progress-container" }>
                <div class="progress-header">
                    <span class="progress-info">{message}</span>
                    <span class="progress-percentage">{move || format!("{}%", percent())}</span>
                </div>
                <div class="progress-bar">
                    <div class="progress-fill" style=move || format!("width: {}%", percent()) />
                </div>
                <Show when=cached>
                    <p class="cache-hint"><i class="fas fa-bolt"></i>" Hasil diambil dari cache"</p>
                </Show>
                <ul class="progress-steps">
                    {move || {
                        session
                            .with(|s| s.progress().phase_states())
                            .into_iter()
                            .map(|(phase, state)| {
                                view! {
                                    <li id=phase.id class=format!("progress-step {}", state.class())>
                                        {phase.label}
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                </ul>
            </div>
        </Show>
    }
}
