//! 結果画面の状態（1画面 = 1セッション）
//!
//! Idle → Submitting → (Succeeded | Failed) → Idle
//!
//! 現在の結果セット・フィルタ・セッションID・進捗をまとめて保持し、
//! イベントハンドラには参照で渡す。

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{Error, Result, TRANSPORT_FAILURE_MESSAGE};
use crate::export::{citation_download_path, report_download_path, CitationBundle};
use crate::filter::{ResultFilter, TabCounts};
use crate::input::{SubmissionInput, SubmissionKind};
use crate::progress::ProgressTracker;
use crate::types::{
    PdfGenerationProgress, ProgressEvent, ReferenceResult, ResultSet, ValidationResponse,
};
use crate::view::ReferenceView;

/// 送信の状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// 送信1回分の相関ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket {
    id: u64,
    kind: SubmissionKind,
}

impl SubmissionTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    /// multipartに載せる相関ID
    pub fn request_id(&self) -> String {
        format!("req-{}", self.id)
    }
}

pub const REPORT_IDLE_LABEL: &str = "Unduh Laporan PDF";
pub const REPORT_BUSY_LABEL: &str = "Membuat laporan...";

/// レポートボタンの状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportControl {
    #[default]
    Idle,
    Busy { label: String },
}

impl ReportControl {
    pub fn is_busy(&self) -> bool {
        matches!(self, ReportControl::Busy { .. })
    }

    pub fn label(&self) -> &str {
        match self {
            ReportControl::Idle => REPORT_IDLE_LABEL,
            ReportControl::Busy { label } => label,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RendererSession {
    phase: Phase,
    next_ticket: u64,
    active: Option<SubmissionTicket>,
    /// 直近に成功した送信の種別
    result_kind: Option<SubmissionKind>,
    results: Option<ResultSet>,
    filter: ResultFilter,
    progress: ProgressTracker,
    error: Option<String>,
    report: ReportControl,
    export_error: Option<String>,
    /// 行ごとのBibTeXダウンロード失敗（参考文献番号 → メッセージ）
    citation_errors: BTreeMap<u32, String>,
}

impl RendererSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn export_error(&self) -> Option<&str> {
        self.export_error.as_deref()
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn filter(&self) -> ResultFilter {
        self.filter
    }

    pub fn session_id(&self) -> Option<&str> {
        self.results.as_ref().and_then(|r| r.session_id.as_deref())
    }

    pub fn active_ticket(&self) -> Option<SubmissionTicket> {
        self.active
    }

    /// 送信開始
    ///
    /// 入力エラーの場合はネットワークに出ずにエラー表示する
    pub fn begin_submission(&mut self, input: &SubmissionInput) -> Result<SubmissionTicket> {
        if self.is_submitting() {
            return Err(Error::SubmissionInFlight);
        }

        let kind = match input.validate() {
            Ok(kind) => kind,
            Err(e) => {
                self.error = Some(e.to_string());
                self.phase = Phase::Failed;
                return Err(e);
            }
        };

        self.next_ticket += 1;
        let ticket = SubmissionTicket {
            id: self.next_ticket,
            kind,
        };
        self.active = Some(ticket);
        self.phase = Phase::Submitting;
        self.error = None;
        self.export_error = None;
        self.citation_errors.clear();
        self.progress.start();
        Ok(ticket)
    }

    fn is_current(&self, ticket: SubmissionTicket) -> bool {
        self.phase == Phase::Submitting && self.active == Some(ticket)
    }

    /// タイマー段階の反映（古い送信のタイマーは無視）
    pub fn apply_timed_phase(&mut self, ticket: SubmissionTicket, index: usize) -> bool {
        self.is_current(ticket) && self.progress.enter_timed_phase(index)
    }

    /// `validation_progress` の反映
    ///
    /// 送信中でなければ無視。相関IDが付いていて一致しない場合も無視。
    pub fn apply_progress(&mut self, event: &ProgressEvent) -> bool {
        let Some(active) = self.active.filter(|_| self.is_submitting()) else {
            return false;
        };
        if let Some(request_id) = &event.request_id {
            if *request_id != active.request_id() {
                return false;
            }
        }
        self.progress.apply_event(event)
    }

    /// レスポンス受信
    ///
    /// `error` フィールドがあれば失敗として扱う
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        response: ValidationResponse,
    ) -> Result<()> {
        if !self.is_current(ticket) {
            return Ok(());
        }

        match response.into_outcome() {
            Ok(result_set) => {
                self.active = None;
                self.phase = Phase::Succeeded;
                self.progress.complete();
                self.result_kind = Some(ticket.kind);
                self.results = Some(result_set);
                self.report = ReportControl::Idle;
                Ok(())
            }
            Err(message) => {
                self.fail(message.clone());
                Err(Error::Application(message))
            }
        }
    }

    /// 通信エラー
    pub fn fail_submission(&mut self, ticket: SubmissionTicket, message: Option<String>) {
        if !self.is_current(ticket) {
            return;
        }
        self.fail(message.unwrap_or_else(|| TRANSPORT_FAILURE_MESSAGE.to_string()));
    }

    fn fail(&mut self, message: String) {
        self.active = None;
        self.phase = Phase::Failed;
        self.error = Some(message);
        self.progress.reset();
    }

    /// 結果エリアを表示するか
    pub fn results_visible(&self) -> bool {
        self.phase == Phase::Succeeded && self.results.is_some()
    }

    /// レポートボタン（ファイル送信のときだけ。`has_file` は見ない）
    pub fn report_available(&self) -> bool {
        self.results_visible() && self.result_kind == Some(SubmissionKind::File)
    }

    /// 全件BibTeXボタン
    pub fn bundle_available(&self) -> bool {
        self.results_visible() && self.results.as_ref().is_some_and(|r| r.exportable_count() > 0)
    }

    pub fn set_filter(&mut self, filter: ResultFilter) {
        self.filter = filter;
    }

    fn all_results(&self) -> &[ReferenceResult] {
        self.results.as_ref().map(|r| r.results.as_slice()).unwrap_or(&[])
    }

    /// 現在のフィルタで絞り込んだビューモデル
    pub fn visible_results(&self) -> Vec<ReferenceView> {
        self.filter
            .apply(self.all_results())
            .into_iter()
            .map(|(position, result)| ReferenceView::from_result(result, position))
            .collect()
    }

    pub fn tab_counts(&self) -> TabCounts {
        TabCounts::from_results(self.all_results())
    }

    pub fn report(&self) -> &ReportControl {
        &self.report
    }

    /// レポートのダウンロード開始。URLを返す（実行中ならNone）
    pub fn begin_report_download(&mut self) -> Option<String> {
        if self.report.is_busy() || !self.report_available() {
            return None;
        }
        self.export_error = None;
        self.report = ReportControl::Busy {
            label: REPORT_BUSY_LABEL.to_string(),
        };
        Some(report_download_path(self.session_id()))
    }

    /// `pdf_generation_progress` の反映（ダウンロード中のみ）
    pub fn apply_pdf_progress(&mut self, event: &PdfGenerationProgress) -> bool {
        if !self.report.is_busy() || event.message.trim().is_empty() {
            return false;
        }
        self.report = ReportControl::Busy {
            label: event.message.clone(),
        };
        true
    }

    /// ダウンロード完了。成否にかかわらずボタンは元に戻す
    pub fn finish_report_download(&mut self, outcome: std::result::Result<(), String>) {
        self.report = ReportControl::Idle;
        if let Err(message) = outcome {
            self.export_error = Some(message);
        }
    }

    /// 1件分のBibTeXダウンロード開始。URLを返す
    ///
    /// サーバーが付けた番号を持つ結果がなければNone。同じ行の前回のエラーは消す
    pub fn begin_citation_download(&mut self, reference_number: u32) -> Option<String> {
        let known = reference_number > 0
            && self
                .all_results()
                .iter()
                .any(|r| r.reference_number == Some(reference_number));
        if !known {
            return None;
        }
        self.citation_errors.remove(&reference_number);
        Some(citation_download_path(reference_number, self.session_id()))
    }

    pub fn record_citation_error(&mut self, reference_number: u32, message: impl Into<String>) {
        self.citation_errors.insert(reference_number, message.into());
    }

    pub fn citation_error(&self, reference_number: u32) -> Option<&str> {
        self.citation_errors.get(&reference_number).map(String::as_str)
    }

    pub fn record_export_error(&mut self, message: impl Into<String>) {
        self.export_error = Some(message.into());
    }

    /// 全件BibTeX（クライアント側で生成）
    pub fn citation_bundle(&self, date: NaiveDate) -> Result<CitationBundle> {
        CitationBundle::build(self.all_results(), date)
    }
}
