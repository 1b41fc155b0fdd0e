//! 表示用ビューモデル
//!
//! DOMに依存しない純粋関数で、レコード → 表示構造 へ変換する

use crate::types::{ReferenceResult, Summary};

const NOT_DETECTED: &str = "Tidak terdeteksi";
const QUARTILE_UNAVAILABLE: &str = "Tidak Tersedia";
const NO_RECOMMENDATIONS: &str = "Tidak ada rekomendasi khusus.";

/// 見た目のトーン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Success,
    Warning,
    Error,
}

impl Tone {
    pub fn class(&self) -> &'static str {
        match self {
            Tone::Neutral => "",
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Error => "error",
        }
    }
}

/// チェック結果バッジ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub ok: bool,
}

impl Badge {
    fn check(name: &str, ok: bool) -> Self {
        Self {
            label: format!("{}: {}", name, if ok { "✓" } else { "✗" }),
            ok,
        }
    }

    pub fn class(&self) -> &'static str {
        if self.ok { "badge-valid" } else { "badge-invalid" }
    }
}

/// 外部検証リンク
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationLink {
    pub label: &'static str,
    pub text: &'static str,
    pub url: String,
}

/// 四分位の表示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuartileView {
    Tag { label: String, class: String },
    Unavailable(&'static str),
}

/// BibTeXの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationState {
    Unavailable,
    Complete,
    Partial { warning: Option<String> },
}

/// 参考文献1件分のビューモデル
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceView {
    pub number: u32,
    /// `number` がサーバー採番か（位置からの補完ならfalse）
    pub numbered_by_server: bool,
    pub heading: String,
    pub status_class: &'static str,
    pub status_icon: &'static str,
    pub text: String,
    pub badges: Vec<Badge>,
    pub source: String,
    pub reference_type: String,
    pub links: Vec<VerificationLink>,
    pub quartile: Option<QuartileView>,
    pub citation: CitationState,
    pub feedback: String,
}

impl ReferenceView {
    /// # Arguments
    /// * `result` - 検証結果
    /// * `position` - 結果セット内の位置（番号がない場合に使用）
    pub fn from_result(result: &ReferenceResult, position: usize) -> Self {
        let server_number = result.reference_number.filter(|n| *n > 0);
        let number = server_number.unwrap_or(position as u32 + 1);
        let valid = result.status.is_valid();

        let mut badges = Vec::new();
        if let Some(details) = &result.validation_details {
            badges.push(Badge::check("Format", details.format_correct));
            badges.push(Badge::check("Lengkap", details.complete));
            badges.push(Badge::check("Tahun", details.year_recent));
        }
        if result.indexed_in_scimago() {
            badges.push(Badge::check("Terindeks Scimago", true));
        }
        if result.is_indexed_scopus {
            badges.push(Badge::check("Terindeks Scopus", true));
        }

        let mut links = Vec::new();
        if let Some(url) = non_blank(result.scimago_link.as_deref()) {
            links.push(VerificationLink {
                label: "Link Scimago",
                text: "Verifikasi di ScimagoJR",
                url: url.to_string(),
            });
        }
        if let Some(url) = non_blank(result.scopus_link.as_deref()) {
            links.push(VerificationLink {
                label: "Link Scopus",
                text: "Verifikasi di Scopus",
                url: url.to_string(),
            });
        }

        let quartile = result.is_indexed().then(|| {
            match non_blank(result.quartile.as_deref()).filter(|q| *q != "-") {
                Some(q) => QuartileView::Tag {
                    label: q.to_string(),
                    class: format!("quartile-tag quartile-{}", q.to_lowercase()),
                },
                None => QuartileView::Unavailable(QUARTILE_UNAVAILABLE),
            }
        });

        let citation = match result.exportable_bibtex() {
            None => CitationState::Unavailable,
            Some(_) if result.bibtex_partial => CitationState::Partial {
                warning: non_blank(result.bibtex_warning.as_deref()).map(str::to_string),
            },
            Some(_) => CitationState::Complete,
        };

        Self {
            number,
            numbered_by_server: server_number.is_some(),
            heading: format!(
                "Referensi #{} - {}",
                number,
                result.status.as_str().to_uppercase()
            ),
            status_class: if valid { "valid" } else { "invalid" },
            status_icon: if valid { "fas fa-check-circle" } else { "fas fa-times-circle" },
            text: result.reference_text.clone(),
            badges,
            source: non_blank(result.parsed_journal.as_deref())
                .unwrap_or(NOT_DETECTED)
                .to_string(),
            reference_type: non_blank(result.reference_type.as_deref())
                .unwrap_or(NOT_DETECTED)
                .to_string(),
            links,
            quartile,
            citation,
            feedback: result.feedback.clone(),
        }
    }

    /// 行ごとのダウンロードはサーバー採番の番号でしか要求できない
    pub fn can_download_citation(&self) -> bool {
        self.numbered_by_server && !matches!(self.citation, CitationState::Unavailable)
    }
}

/// 集計タイル
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTile {
    pub value: String,
    pub label: &'static str,
    pub tone: Tone,
}

/// 集計表示
pub fn summary_tiles(summary: &Summary) -> Vec<SummaryTile> {
    let mut tiles = vec![
        SummaryTile {
            value: summary.total_references.to_string(),
            label: "Total Referensi",
            tone: Tone::Neutral,
        },
        SummaryTile {
            value: summary.valid_references.to_string(),
            label: "Referensi Valid",
            tone: Tone::Success,
        },
        SummaryTile {
            value: summary.invalid_references.to_string(),
            label: "Referensi Invalid",
            tone: Tone::Error,
        },
        SummaryTile {
            value: format!("{}%", format_percent(summary.validation_rate)),
            label: "Tingkat Validitas",
            tone: Tone::Neutral,
        },
    ];

    if let Some(distribution) = &summary.distribution_analysis {
        tiles.push(SummaryTile {
            value: format!("{}%", format_percent(distribution.journal_percentage)),
            label: "Artikel Jurnal",
            tone: if distribution.meets_journal_requirement { Tone::Success } else { Tone::Warning },
        });
    }

    if let Some(count) = &summary.count_validation {
        tiles.push(SummaryTile {
            value: if count.is_count_appropriate { "✓".into() } else { "✗".into() },
            label: "Jumlah Referensi",
            tone: if count.is_count_appropriate { Tone::Success } else { Tone::Warning },
        });
    }

    tiles
}

/// 推奨事項（空ならプレースホルダ1件）
pub fn recommendation_items(recommendations: &[String]) -> Vec<String> {
    if recommendations.is_empty() {
        return vec![NO_RECOMMENDATIONS.to_string()];
    }
    recommendations.to_vec()
}

/// 小数1桁まで、整数なら小数なし
fn format_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
