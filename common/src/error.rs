//! エラー型定義

use thiserror::Error;

/// ファイル未選択かつテキスト空のときの入力エラー文言
pub const EMPTY_SUBMISSION_MESSAGE: &str = "Mohon unggah file atau masukkan teks referensi.";

/// サーバーに接続できなかったときの文言
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Terjadi kesalahan dalam menghubungi server. Silakan coba lagi.";

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}", EMPTY_SUBMISSION_MESSAGE)]
    EmptySubmission,

    #[error("File terlalu besar (maksimal {limit_mb}MB)")]
    FileTooLarge { size: u64, limit: u64, limit_mb: u64 },

    #[error("Format file tidak didukung: {0} (hanya PDF atau DOCX)")]
    UnsupportedFileType(String),

    #[error("Validasi sedang berjalan, mohon tunggu.")]
    SubmissionInFlight,

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Application(String),

    #[error("Tidak ada entri BibTeX yang tersedia untuk diunduh.")]
    NoExportableCitations,

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// ネットワークに出る前に検出される入力エラーか
    pub fn is_local_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptySubmission | Error::FileTooLarge { .. } | Error::UnsupportedFileType(_)
        )
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
