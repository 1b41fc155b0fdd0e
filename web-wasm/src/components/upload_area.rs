//! アップロードフォームコンポーネント
//!
//! ファイル（ドラッグ&ドロップ / クリック選択）か貼り付けテキストのどちらか一方。
//! スタイル・年数・ジャーナル比率のオプションも送信に載せる

use leptos::html;
use leptos::prelude::*;
use reference_validator_common::input::{CITATION_STYLES, DEFAULT_MAX_FILE_SIZE};
use reference_validator_common::FileSelection;
use web_sys::{DragEvent, File};

use crate::actions;
use crate::app::{use_app, AppContext};

/// 受理できなければフォームとinputの両方を空にする
fn pick_file(ctx: AppContext, file: File, input: Option<web_sys::HtmlInputElement>) -> Result<(), String> {
    match FileSelection::accept(&file.name(), file.size() as u64, DEFAULT_MAX_FILE_SIZE) {
        Ok(selection) => {
            ctx.form.update(|f| f.select_file(selection));
            ctx.selected_file.set_value(Some(file));
            Ok(())
        }
        Err(e) => {
            ctx.form.update(|f| f.clear_file());
            ctx.selected_file.set_value(None);
            if let Some(input) = input {
                input.set_value("");
            }
            Err(e.to_string())
        }
    }
}

#[component]
pub fn UploadForm() -> impl IntoView {
    let ctx = use_app();
    let file_input = NodeRef::<html::Input>::new();
    let (is_dragover, set_is_dragover) = signal(false);
    let (file_error, set_file_error) = signal(None::<String>);

    let handle_file = move |file: File| {
        set_file_error.set(pick_file(ctx, file, file_input.get_untracked()).err());
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(false);
        if let Some(file) = ev
            .data_transfer()
            .and_then(|dt| dt.files())
            .and_then(|files| files.get(0))
        {
            handle_file(file);
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(true);
    };

    let on_dragleave = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(false);
    };

    let on_click = move |_| {
        if let Some(input) = file_input.get_untracked() {
            input.click();
        }
    };

    let on_change = move |_| {
        let file = file_input
            .get_untracked()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        if let Some(file) = file {
            handle_file(file);
        }
    };

    let on_text_input = move |ev| {
        let text = event_target_value(&ev);
        ctx.form.update(|f| f.set_text(text));
        if ctx.form.with_untracked(|f| f.file.is_none()) {
            ctx.selected_file.set_value(None);
            if let Some(input) = file_input.get_untracked() {
                input.set_value("");
            }
        }
        set_file_error.set(None);
    };

    let on_style = move |ev| {
        let style = event_target_value(&ev);
        ctx.form.maybe_update(|f| f.options.set_style(&style));
    };
    let on_year_range = move |ev| {
        let value = event_target_value(&ev);
        ctx.form.maybe_update(|f| f.options.set_year_range(&value));
    };
    let on_journal_percent = move |ev| {
        let value = event_target_value(&ev);
        ctx.form.maybe_update(|f| f.options.set_journal_percent(&value));
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        actions::submit(ctx);
    };

    let readout = move || ctx.form.with(|f| f.file.as_ref().map(FileSelection::readout));
    let is_submitting = move || ctx.session.with(|s| s.is_submitting());

    view! {
        <form class="reference-form" on:submit=on_submit>
            <div
                class=move || if is_dragover.get() { "file-upload-area dragover" } else { "file-upload-area" }
                on:drop=on_drop
                on:dragover=on_dragover
                on:dragleave=on_dragleave
                on:click=on_click
            >
                <div class="upload-icon"><i class="fas fa-cloud-upload-alt"></i></div>
                <p>"Seret & lepas file di sini atau klik untuk memilih"</p>
                <p class="text-muted">"Format: PDF, DOCX (maksimal 16MB)"</p>
            </div>
            <input
                type="file"
                accept=".pdf,.docx"
                style="display: none"
                node_ref=file_input
                on:change=on_change
            />

            {move || match (file_error.get(), readout()) {
                (Some(error), _) => view! {
                    <p class="file-name error"><i class="fas fa-exclamation-triangle"></i>" " {error}</p>
                }.into_any(),
                (None, Some(readout)) => view! {
                    <p class="file-name success"><i class="fas fa-file-check"></i>" " {readout}</p>
                }.into_any(),
                (None, None) => ().into_any(),
            }}

            <div class="divider">"ATAU"</div>

            <textarea
                class="text-input"
                rows="10"
                placeholder="Tempelkan daftar referensi di sini..."
                prop:value=move || ctx.form.with(|f| f.text.clone())
                on:input=on_text_input
            />

            <div class="form-options">
                <label>
                    "Gaya Sitasi"
                    <select
                        class="form-control"
                        prop:value=move || ctx.form.with(|f| f.options.style.clone())
                        on:change=on_style
                    >
                        {CITATION_STYLES
                            .iter()
                            .map(|style| view! { <option value=*style>{*style}</option> })
                            .collect_view()}
                    </select>
                </label>
                <label>
                    "Rentang Tahun"
                    <input
                        type="number"
                        class="form-control"
                        min="1"
                        prop:value=move || ctx.form.with(|f| f.options.year_range.to_string())
                        on:change=on_year_range
                    />
                </label>
                <label>
                    "Minimal Jurnal (%)"
                    <input
                        type="number"
                        class="form-control"
                        min="0"
                        max="100"
                        step="0.1"
                        prop:value=move || ctx.form.with(|f| f.options.journal_percent.to_string())
                        on:change=on_journal_percent
                    />
                </label>
            </div>

            <button type="submit" class="btn btn-primary" disabled=is_submitting>
                {move || if is_submitting() { "Memvalidasi..." } else { "Validasi Referensi" }}
            </button>
        </form>
    }
}
