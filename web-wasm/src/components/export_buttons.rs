//! エクスポートボタンコンポーネント
//!
//! レポートはファイル送信のときだけ、全件BibTeXは対象が1件以上あるときだけ表示

use leptos::prelude::*;

use crate::actions;
use crate::app::use_app;

#[component]
pub fn ExportButtons() -> impl IntoView {
    let ctx = use_app();
    let session = ctx.session;

    let report_available = move || session.with(|s| s.report_available());
    let bundle_available = move || session.with(|s| s.bundle_available());
    let report_busy = move || session.with(|s| s.report().is_busy());
    let report_label = move || session.with(|s| s.report().label().to_string());
    let export_error = move || session.with(|s| s.export_error().map(str::to_string));

    view! {
        <div class="export-buttons">
            <Show when=report_available>
                <button
                    class="btn btn-secondary"
                    disabled=report_busy
                    on:click=move |_| actions::download_report(ctx)
                >
                    <i class=move || if report_busy() { "fas fa-spinner fa-spin" } else { "fas fa-file-pdf" }></i>
                    " "
                    {report_label}
                </button>
            </Show>

            <Show when=bundle_available>
                <button class="btn btn-secondary" on:click=move |_| actions::download_bundle(ctx)>
                    <i class="fas fa-quote-right"></i>
                    " Unduh Semua BibTeX"
                </button>
            </Show>

            {move || export_error().map(|message| view! {
                <p class="export-error"><i class="fas fa-exclamation-triangle"></i>" " {message}</p>
            })}
        </div>
    }
}
