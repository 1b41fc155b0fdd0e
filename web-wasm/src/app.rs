//! メインアプリケーションコンポーネント
//!
//! 画面の状態は `RendererSession` 1つにまとめ、マウント時に作ってコンテキストで配る。
//! プッシュ購読もここで持ち、アンマウントで閉じる。

use leptos::prelude::*;
use reference_validator_common::{PushEvent, RendererSession, SubmissionInput};

use crate::api::push::PushSubscription;
use crate::components::{
    error_panel::ErrorPanel, export_buttons::ExportButtons, header::Header,
    progress_bar::ProgressPanel, result_list::ResultList, summary::{Recommendations, SummaryGrid},
    upload_area::UploadForm,
};

/// 画面全体で共有するハンドル
#[derive(Clone, Copy)]
pub struct AppContext {
    pub session: RwSignal<RendererSession>,
    pub form: RwSignal<SubmissionInput>,
    /// フォームで受理した実ファイル（multipartに載せる）
    pub selected_file: StoredValue<Option<web_sys::File>, LocalStorage>,
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext {
        session: RwSignal::new(RendererSession::new()),
        form: RwSignal::new(SubmissionInput::default()),
        selected_file: StoredValue::new_local(None),
    };
    provide_context(ctx);

    let session = ctx.session;
    let subscription = PushSubscription::connect(move |event| match event {
        PushEvent::ValidationProgress(progress) => {
            session.maybe_update(|s| s.apply_progress(&progress));
        }
        PushEvent::PdfGenerationProgress(progress) => {
            session.maybe_update(|s| s.apply_pdf_progress(&progress));
        }
    });
    let subscription = match subscription {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            // プッシュなしでもタイマー表示で動く
            gloo::console::warn!(format!("push channel unavailable: {}", e));
            None
        }
    };
    let _subscription = StoredValue::new_local(subscription);

    let results_visible = move || session.with(|s| s.results_visible());

    view! {
        <div class="container">
            <Header />
            <UploadForm />
            <ProgressPanel />
            <ErrorPanel />

            <Show when=results_visible>
                <section id="results" class="results-section">
                    <SummaryGrid />
                    <Recommendations />
                    <ExportButtons />
                    <ResultList />
                </section>
            </Show>
        </div>
    }
}
