//! レポート / BibTeX のダウンロード補助

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::ReferenceResult;

pub const VALIDATE_PATH: &str = "/api/validate";
const REPORT_PATH: &str = "/api/download_report";
const BIBTEX_PATH: &str = "/api/download_bibtex";

/// レポートのダウンロードURL
///
/// セッションIDがなければクッキーによる相関に任せる
pub fn report_download_path(session_id: Option<&str>) -> String {
    with_session(REPORT_PATH.to_string(), session_id)
}

/// 1件分のBibTeXダウンロードURL
pub fn citation_download_path(reference_number: u32, session_id: Option<&str>) -> String {
    with_session(format!("{}/{}", BIBTEX_PATH, reference_number), session_id)
}

fn with_session(path: String, session_id: Option<&str>) -> String {
    match session_id.filter(|s| !s.is_empty()) {
        Some(id) => format!("{}?session_id={}", path, urlencoding::encode(id)),
        None => path,
    }
}

/// Content-Disposition からファイル名を取り出す
///
/// `filename*=UTF-8''...` を優先し、なければ `filename=...`
pub fn content_disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;

    for part in header.split(';').map(str::trim) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = value
                    .trim()
                    .split_once("''")
                    .map(|(_, v)| v)
                    .unwrap_or(value.trim());
                if let Ok(decoded) = urlencoding::decode(encoded.trim_matches('"')) {
                    if !decoded.is_empty() {
                        return Some(decoded.into_owned());
                    }
                }
            }
            "filename" => {
                let name = value.trim().trim_matches('"');
                if !name.is_empty() {
                    plain = Some(name.to_string());
                }
            }
            _ => {}
        }
    }

    plain
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// 失敗レスポンスの本文からエラーメッセージを取り出す
pub fn error_message_from_body(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| format!("Gagal mengunduh file (HTTP {}).", status))
}

/// 全件BibTeXの書き出し内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationBundle {
    pub file_name: String,
    pub content: String,
    pub entries: usize,
}

impl CitationBundle {
    pub const MIME_TYPE: &'static str = "application/x-bibtex";

    /// 書き出し可能なエントリを空行1行区切りで連結
    pub fn build(results: &[ReferenceResult], date: NaiveDate) -> Result<Self> {
        let entries: Vec<&str> = results
            .iter()
            .filter_map(ReferenceResult::exportable_bibtex)
            .collect();

        if entries.is_empty() {
            return Err(Error::NoExportableCitations);
        }

        Ok(Self {
            file_name: format!("references_{}.bib", date.format("%Y-%m-%d")),
            content: entries.join("\n\n"),
            entries: entries.len(),
        })
    }
}
