//! バックエンドAPIの型定義
//!
//! `/api/validate` のレスポンスと、プッシュチャネルで届くイベント:
//! - ValidationResponse: 検証リクエスト1回分の結果
//! - ReferenceResult: 参考文献1件の検証結果
//! - ProgressEvent / PdfGenerationProgress: 進捗イベント

use serde::{Deserialize, Deserializer, Serialize};

/// `null` を既定値として読む
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 参考文献の判定ステータス（valid / invalid の2値）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceStatus {
    Valid,
    #[default]
    Invalid,
}

impl ReferenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceStatus::Valid => "valid",
            ReferenceStatus::Invalid => "invalid",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ReferenceStatus::Valid)
    }
}

/// 形式・完全性・発行年の個別チェック
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationDetails {
    pub format_correct: bool,
    pub complete: bool,
    pub year_recent: bool,
}

/// 参考文献1件の検証結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceResult {
    pub reference_number: Option<u32>,
    #[serde(deserialize_with = "nullable")]
    pub reference_text: String,
    pub status: ReferenceStatus,
    pub validation_details: Option<ValidationDetails>,

    /// ScimagoJR 収録
    pub is_indexed_scimago: bool,
    /// Scopus 収録
    pub is_indexed_scopus: bool,
    /// 旧レスポンスの単一フラグ（ScimagoJR 扱い）
    #[serde(rename = "is_indexed")]
    pub is_indexed_legacy: bool,

    pub quartile: Option<String>,
    pub scimago_link: Option<String>,
    pub scopus_link: Option<String>,

    pub parsed_journal: Option<String>,
    pub reference_type: Option<String>,

    pub bibtex_available: bool,
    pub bibtex_partial: bool,
    pub bibtex_warning: Option<String>,
    pub bibtex_string: Option<String>,

    #[serde(deserialize_with = "nullable")]
    pub feedback: String,
}

impl ReferenceResult {
    /// いずれかの索引データベースに収録されているか
    pub fn is_indexed(&self) -> bool {
        self.indexed_in_scimago() || self.is_indexed_scopus
    }

    /// ScimagoJR 収録（旧フラグを含む）
    pub fn indexed_in_scimago(&self) -> bool {
        self.is_indexed_scimago || self.is_indexed_legacy
    }

    /// BibTeXとして書き出せる内容を持つか
    pub fn exportable_bibtex(&self) -> Option<&str> {
        if !self.bibtex_available {
            return None;
        }
        self.bibtex_string
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// 参考文献数チェック
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountValidation {
    pub is_count_appropriate: bool,
    pub count_message: String,
}

/// 文献種別の分布
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionAnalysis {
    pub journal_percentage: f64,
    pub meets_journal_requirement: bool,
}

/// 集計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub total_references: u32,
    pub valid_references: u32,
    pub invalid_references: u32,
    pub processing_errors: u32,
    pub validation_rate: f64,
    pub count_validation: Option<CountValidation>,
    pub distribution_analysis: Option<DistributionAnalysis>,
    pub style_used: Option<String>,
    pub journal_percent_threshold: Option<f64>,
}

/// `/api/validate` のレスポンス
///
/// `error` が存在する場合は他のフィールドより優先される
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationResponse {
    pub error: Option<String>,
    pub summary: Option<Summary>,
    #[serde(deserialize_with = "nullable")]
    pub detailed_results: Vec<ReferenceResult>,
    #[serde(deserialize_with = "nullable")]
    pub recommendations: Vec<String>,
    pub session_id: Option<String>,
    pub has_file: bool,
    pub from_cache: bool,
}

impl ValidationResponse {
    /// アプリケーションレベルのエラーを取り出して結果セットに変換
    pub fn into_outcome(self) -> std::result::Result<ResultSet, String> {
        if let Some(error) = self.error {
            return Err(error);
        }

        Ok(ResultSet {
            summary: self.summary.unwrap_or_default(),
            results: self.detailed_results,
            recommendations: self.recommendations,
            session_id: self.session_id.filter(|s| !s.is_empty()),
            has_file: self.has_file,
            from_cache: self.from_cache,
        })
    }
}

/// 現在表示中の検証結果セット
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub summary: Summary,
    pub results: Vec<ReferenceResult>,
    pub recommendations: Vec<String>,
    pub session_id: Option<String>,
    pub has_file: bool,
    pub from_cache: bool,
}

impl ResultSet {
    /// BibTeXを書き出せる件数
    pub fn exportable_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.exportable_bibtex().is_some())
            .count()
    }
}

/// `validation_progress` イベント
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressEvent {
    pub progress: f64,
    #[serde(deserialize_with = "nullable")]
    pub message: String,
    pub cached: Option<bool>,
    /// 送信時に付けた相関ID（バックエンドが返す場合のみ）
    pub request_id: Option<String>,
}

impl ProgressEvent {
    /// キャッシュからの高速応答か
    pub fn is_cache_hit(&self) -> bool {
        self.cached.unwrap_or(false) || self.message.to_lowercase().contains("cache")
    }

    /// 0〜100に丸めた進捗
    pub fn percent(&self) -> u8 {
        if self.progress.is_nan() {
            return 0;
        }
        self.progress.round().clamp(0.0, 100.0) as u8
    }
}

/// `pdf_generation_progress` イベント
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfGenerationProgress {
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_result_default() {
        let result = ReferenceResult::default();
        assert_eq!(result.status, ReferenceStatus::Invalid);
        assert!(!result.is_indexed());
        assert!(result.exportable_bibtex().is_none());
    }

    #[test]
    fn test_reference_result_deserialize() {
        let json = r#"{
            "reference_number": 3,
            "reference_text": "Smith, J. (2021). Title. Journal, 1(2), 3-4.",
            "status": "valid",
            "validation_details": {"format_correct": true, "complete": true, "year_recent": false},
            "is_indexed_scimago": true,
            "is_indexed_scopus": false,
            "quartile": "Q2",
            "scimago_link": "https://www.scimagojr.com/journalsearch.php?q=1",
            "parsed_journal": "Journal",
            "reference_type": "journal",
            "bibtex_available": true,
            "bibtex_string": "@article{smith2021title,\n}",
            "feedback": "OK"
        }"#;

        let result: ReferenceResult = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(result.reference_number, Some(3));
        assert!(result.status.is_valid());
        assert!(result.is_indexed());
        assert_eq!(result.quartile.as_deref(), Some("Q2"));
        assert!(!result.validation_details.as_ref().unwrap().year_recent);
        assert_eq!(result.exportable_bibtex(), Some("@article{smith2021title,\n}"));
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let json = r#"{
            "detailed_results": [{"reference_text": null, "feedback": null, "status": "valid"}],
            "recommendations": null
        }"#;
        let response: ValidationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.detailed_results.len(), 1);
        assert_eq!(response.detailed_results[0].feedback, "");
        assert!(response.recommendations.is_empty());
    }

    #[test]
    fn test_legacy_is_indexed_flag() {
        let json = r#"{"reference_text": "x", "status": "invalid", "is_indexed": true}"#;
        let result: ReferenceResult = serde_json::from_str(json).unwrap();
        assert!(!result.is_indexed_scimago);
        assert!(result.indexed_in_scimago());
        assert!(result.is_indexed());
    }

    #[test]
    fn test_legacy_and_dual_index_keys_together() {
        let json = r#"{
            "detailed_results": [{
                "status": "valid",
                "is_indexed": true,
                "is_indexed_scimago": false,
                "is_indexed_scopus": true
            }]
        }"#;
        let response: ValidationResponse = serde_json::from_str(json).expect("両方のキーを受け付ける");
        let result = &response.detailed_results[0];
        assert!(result.indexed_in_scimago());
        assert!(result.is_indexed_scopus);
    }

    #[test]
    fn test_index_flags_are_independent() {
        let both = ReferenceResult {
            is_indexed_scimago: true,
            is_indexed_scopus: true,
            ..Default::default()
        };
        let scopus_only = ReferenceResult {
            is_indexed_scopus: true,
            ..Default::default()
        };
        assert!(both.is_indexed());
        assert!(scopus_only.is_indexed());
    }

    #[test]
    fn test_bibtex_requires_available_flag() {
        let result = ReferenceResult {
            bibtex_available: false,
            bibtex_string: Some("@misc{a,}".into()),
            ..Default::default()
        };
        assert!(result.exportable_bibtex().is_none());

        let blank = ReferenceResult {
            bibtex_available: true,
            bibtex_string: Some("   ".into()),
            ..Default::default()
        };
        assert!(blank.exportable_bibtex().is_none());
    }

    #[test]
    fn test_error_field_overrides_everything() {
        let json = r#"{"error": "X", "detailed_results": [{"reference_text": "a", "status": "valid"}]}"#;
        let response: ValidationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_outcome(), Err("X".to_string()));
    }

    #[test]
    fn test_success_outcome() {
        let json = r#"{
            "summary": {"total_references": 2, "valid_references": 1, "invalid_references": 1, "validation_rate": 50.0},
            "detailed_results": [
                {"reference_text": "a", "status": "valid"},
                {"reference_text": "b", "status": "invalid"}
            ],
            "recommendations": ["Perbaiki format."],
            "session_id": "abc",
            "has_file": true
        }"#;
        let response: ValidationResponse = serde_json::from_str(json).unwrap();
        let set = response.into_outcome().expect("成功のはず");
        assert_eq!(set.summary.total_references, 2);
        assert_eq!(set.results.len(), 2);
        assert_eq!(set.session_id.as_deref(), Some("abc"));
        assert!(set.has_file);
        assert!(!set.from_cache);
    }

    #[test]
    fn test_empty_session_id_is_dropped() {
        let response = ValidationResponse {
            session_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(response.into_outcome().unwrap().session_id, None);
    }

    #[test]
    fn test_progress_event_cache_hit() {
        let flagged = ProgressEvent { cached: Some(true), ..Default::default() };
        assert!(flagged.is_cache_hit());

        let by_message = ProgressEvent {
            message: "Loading results from Cache".into(),
            ..Default::default()
        };
        assert!(by_message.is_cache_hit());

        let normal = ProgressEvent { message: "Menganalisis".into(), ..Default::default() };
        assert!(!normal.is_cache_hit());
    }

    #[test]
    fn test_progress_event_percent_is_clamped() {
        let over = ProgressEvent { progress: 140.0, ..Default::default() };
        let under = ProgressEvent { progress: -3.0, ..Default::default() };
        let fractional = ProgressEvent { progress: 42.6, ..Default::default() };
        assert_eq!(over.percent(), 100);
        assert_eq!(under.percent(), 0);
        assert_eq!(fractional.percent(), 43);
    }
}
