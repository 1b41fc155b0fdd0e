//! フォーム入力（ファイル / 貼り付けテキスト）の検証

use crate::error::{Error, Result};

/// アップロード上限（16 MiB）
pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// 受け付ける拡張子
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx"];

/// 受理済みのファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub name: String,
    pub size: u64,
}

impl FileSelection {
    /// サイズと拡張子をチェックしてファイルを受理
    ///
    /// # Arguments
    /// * `name` - ファイル名
    /// * `size` - バイト数
    /// * `limit` - 上限バイト数（ちょうど上限は受理）
    pub fn accept(name: &str, size: u64, limit: u64) -> Result<Self> {
        if size > limit {
            return Err(Error::FileTooLarge {
                size,
                limit,
                limit_mb: limit / (1024 * 1024),
            });
        }

        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::UnsupportedFileType(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            size,
        })
    }

    /// 表示用 "name (1.23 MB)"
    pub fn readout(&self) -> String {
        format!("{} ({:.2} MB)", self.name, self.size as f64 / 1024.0 / 1024.0)
    }
}

/// 選択できる引用スタイル
pub const CITATION_STYLES: &[&str] = &["APA", "Harvard", "IEEE", "MLA", "Chicago"];

/// バックエンドが読むフォームオプション
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOptions {
    pub style: String,
    pub year_range: u32,
    pub journal_percent: f64,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        Self {
            style: "APA".into(),
            year_range: 5,
            journal_percent: 80.0,
        }
    }
}

impl SubmissionOptions {
    /// multipartに追加するフィールド
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("style", self.style.clone()),
            ("year_range", self.year_range.to_string()),
            ("journal_percent", self.journal_percent.to_string()),
        ]
    }

    /// 一覧にないスタイルは無視
    pub fn set_style(&mut self, style: &str) -> bool {
        if !CITATION_STYLES.contains(&style) {
            return false;
        }
        self.style = style.to_string();
        true
    }

    /// 入力欄の値を反映。数値でなければ前の値のまま
    pub fn set_year_range(&mut self, value: &str) -> bool {
        match value.trim().parse::<u32>() {
            Ok(years) if years > 0 => {
                self.year_range = years;
                true
            }
            _ => false,
        }
    }

    /// 0〜100に丸める
    pub fn set_journal_percent(&mut self, value: &str) -> bool {
        match value.trim().parse::<f64>() {
            Ok(percent) if percent.is_finite() => {
                self.journal_percent = percent.clamp(0.0, 100.0);
                true
            }
            _ => false,
        }
    }
}

/// 送信内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionInput {
    pub file: Option<FileSelection>,
    pub text: String,
    pub options: SubmissionOptions,
}

/// 送信ペイロードの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionKind {
    File,
    Text,
}

impl SubmissionInput {
    /// ファイル選択時はテキストをクリア
    pub fn select_file(&mut self, file: FileSelection) {
        self.file = Some(file);
        self.text.clear();
    }

    /// 空白以外のテキスト入力時はファイルをクリア
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        if !self.text.trim().is_empty() {
            self.file = None;
        }
    }

    pub fn clear_file(&mut self) {
        self.file = None;
    }

    /// 送信可能か検証
    ///
    /// ファイルを優先し、なければ空白以外のテキスト
    pub fn validate(&self) -> Result<SubmissionKind> {
        if self.file.is_some() {
            return Ok(SubmissionKind::File);
        }
        if !self.text.trim().is_empty() {
            return Ok(SubmissionKind::Text);
        }
        Err(Error::EmptySubmission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_exactly_at_limit() {
        let file = FileSelection::accept("paper.pdf", DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_FILE_SIZE);
        assert!(file.is_ok());
    }

    #[test]
    fn test_reject_one_byte_over_limit() {
        let result =
            FileSelection::accept("paper.pdf", DEFAULT_MAX_FILE_SIZE + 1, DEFAULT_MAX_FILE_SIZE);
        assert!(matches!(result, Err(Error::FileTooLarge { limit_mb: 16, .. })));
    }

    #[test]
    fn test_reject_unsupported_extension() {
        let result = FileSelection::accept("notes.txt", 10, DEFAULT_MAX_FILE_SIZE);
        assert!(matches!(result, Err(Error::UnsupportedFileType(_))));

        let no_ext = FileSelection::accept("README", 10, DEFAULT_MAX_FILE_SIZE);
        assert!(no_ext.is_err());
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(FileSelection::accept("Thesis.DOCX", 10, DEFAULT_MAX_FILE_SIZE).is_ok());
    }

    #[test]
    fn test_readout() {
        let file = FileSelection { name: "a.pdf".into(), size: 1024 * 1024 * 3 / 2 };
        assert_eq!(file.readout(), "a.pdf (1.50 MB)");
    }

    #[test]
    fn test_empty_submission_rejected() {
        let input = SubmissionInput {
            text: "   \n\t".into(),
            ..Default::default()
        };
        assert!(matches!(input.validate(), Err(Error::EmptySubmission)));
    }

    #[test]
    fn test_file_and_text_are_mutually_exclusive() {
        let mut input = SubmissionInput::default();
        input.set_text("Smith (2020)");
        assert_eq!(input.validate().unwrap(), SubmissionKind::Text);

        input.select_file(FileSelection { name: "a.pdf".into(), size: 1 });
        assert!(input.text.is_empty());
        assert_eq!(input.validate().unwrap(), SubmissionKind::File);

        input.set_text("Doe (2019)");
        assert!(input.file.is_none());
    }

    #[test]
    fn test_blank_text_keeps_file() {
        let mut input = SubmissionInput::default();
        input.select_file(FileSelection { name: "a.pdf".into(), size: 1 });
        input.set_text("  ");
        assert!(input.file.is_some());
    }

    #[test]
    fn test_default_options_fields() {
        let fields = SubmissionOptions::default().form_fields();
        assert_eq!(fields[0], ("style", "APA".to_string()));
        assert_eq!(fields[1], ("year_range", "5".to_string()));
        assert_eq!(fields[2], ("journal_percent", "80".to_string()));
    }

    #[test]
    fn test_edited_options_reach_form_fields() {
        let mut options = SubmissionOptions::default();
        assert!(options.set_style("IEEE"));
        assert!(options.set_year_range(" 10 "));
        assert!(options.set_journal_percent("65.5"));

        let fields = options.form_fields();
        assert_eq!(fields[0], ("style", "IEEE".to_string()));
        assert_eq!(fields[1], ("year_range", "10".to_string()));
        assert_eq!(fields[2], ("journal_percent", "65.5".to_string()));
    }

    #[test]
    fn test_invalid_option_input_keeps_previous_value() {
        let mut options = SubmissionOptions::default();
        assert!(!options.set_style("Vancouver"));
        assert!(!options.set_year_range("abc"));
        assert!(!options.set_year_range("0"));
        assert!(!options.set_journal_percent(""));
        assert_eq!(options, SubmissionOptions::default());

        assert!(options.set_journal_percent("150"));
        assert_eq!(options.journal_percent, 100.0);
    }
}
