//! ボタン操作から呼ばれる処理
//!
//! 状態の変更は必ず `RendererSession` を経由する

use chrono::NaiveDate;
use gloo::timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;
use reference_validator_common::{RendererSession, SubmissionTicket, TIMED_PHASES};
use web_sys::{ScrollBehavior, ScrollIntoViewOptions};

use crate::api::{download, validate};
use crate::app::AppContext;

const REPORT_FALLBACK_NAME: &str = "laporan_validasi.pdf";

/// 検証の送信
///
/// 入力エラーはセッションに記録され、通信は発生しない
pub fn submit(ctx: AppContext) {
    let input = ctx.form.get_untracked();
    let ticket = match ctx.session.try_update(|s| s.begin_submission(&input)) {
        Some(Ok(ticket)) => ticket,
        Some(Err(e)) => {
            if !e.is_local_validation() {
                gloo::console::warn!(format!("submission rejected: {}", e));
            }
            return;
        }
        None => return,
    };
    schedule_timed_phases(ctx.session, ticket);

    let file = ctx.selected_file.get_value();
    spawn_local(async move {
        match validate::submit(&input, file.as_ref(), ticket).await {
            Ok(response) => {
                let outcome = ctx.session.try_update(|s| s.finish_submission(ticket, response));
                match outcome {
                    Some(Ok(())) => scroll_to_results(),
                    Some(Err(e)) => gloo::console::warn!(format!("validation failed: {}", e)),
                    None => {}
                }
            }
            Err(e) => {
                gloo::console::error!(format!("validation request failed: {}", e));
                ctx.session.update(|s| s.fail_submission(ticket, None));
            }
        }
    });
}

/// プッシュが来るまでの段階表示
///
/// 古い送信のタイマーはセッション側で無視される
fn schedule_timed_phases(session: RwSignal<RendererSession>, ticket: SubmissionTicket) {
    let mut delay = 0;
    for (index, phase) in TIMED_PHASES.iter().enumerate() {
        Timeout::new(delay, move || {
            session.maybe_update(|s| s.apply_timed_phase(ticket, index));
        })
        .forget();
        delay += phase.duration_ms;
    }
}

fn scroll_to_results() {
    // 描画が終わってから
    Timeout::new(0, || {
        let Some(element) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("results"))
        else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    })
    .forget();
}

/// レポートのダウンロード（実行中はボタンが busy）
pub fn download_report(ctx: AppContext) {
    let Some(url) = ctx.session.try_update(|s| s.begin_report_download()).flatten() else {
        return;
    };
    spawn_local(async move {
        let outcome = download::fetch_and_save(&url, REPORT_FALLBACK_NAME).await;
        if let Err(e) = &outcome {
            gloo::console::error!(format!("report download failed: {}", e));
        }
        ctx.session.update(|s| s.finish_report_download(outcome));
    });
}

/// 1件分のBibTeX
///
/// 失敗はその行のボタンの横に出す
pub fn download_citation(ctx: AppContext, reference_number: u32) {
    let Some(url) = ctx
        .session
        .try_update(|s| s.begin_citation_download(reference_number))
        .flatten()
    else {
        return;
    };
    let fallback = format!("reference_{}.bib", reference_number);
    spawn_local(async move {
        if let Err(e) = download::fetch_and_save(&url, &fallback).await {
            gloo::console::error!(format!("citation download failed: {}", e));
            ctx.session.update(|s| s.record_citation_error(reference_number, e));
        }
    });
}

/// 全件BibTeX（対象がなければアラート）
pub fn download_bundle(ctx: AppContext) {
    let Some(date) = today() else {
        gloo::console::error!("could not read the current date");
        return;
    };
    match ctx.session.with_untracked(|s| s.citation_bundle(date)) {
        Ok(bundle) => {
            if let Err(e) = download::save_bundle(&bundle) {
                ctx.session.update(|s| s.record_export_error(e));
            }
        }
        Err(e) => gloo::dialogs::alert(&e.to_string()),
    }
}

/// ブラウザのローカル日付
fn today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_today_matches_js_date() {
        let date = today().expect("日付を取得できません");
        let now = js_sys::Date::new_0();
        assert_eq!(date.format("%Y").to_string(), now.get_full_year().to_string());
    }
}
