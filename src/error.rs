use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("ポート確認エラー: {0}")]
    PortProbe(String),

    #[error("バックエンドの起動に失敗: {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("インタプリタが見つかりません: {0}")]
    InterpreterMissing(String),

    #[error("サーバーが応答しません（{attempts}回試行）")]
    ReadinessTimeout { attempts: u32 },

    #[error("起動確認が中断されました")]
    Cancelled,

    #[error("HTTPクライアントエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ウィンドウ作成エラー: {0}")]
    Window(String),
}

impl LauncherError {
    /// ダイアログのタイトル
    pub fn dialog_title(&self) -> &'static str {
        match self {
            LauncherError::Spawn { .. } | LauncherError::InterpreterMissing(_) => "Server Error",
            LauncherError::ReadinessTimeout { .. } | LauncherError::Cancelled => "Startup Failed",
            _ => "Error",
        }
    }

    /// ダイアログの本文
    pub fn user_message(&self) -> String {
        match self {
            LauncherError::InterpreterMissing(_) => {
                "Failed to start the application server. Please make sure Python is installed."
                    .to_string()
            }
            LauncherError::Spawn { source, .. } => {
                format!("Failed to start the application: {}", source)
            }
            LauncherError::ReadinessTimeout { attempts } => format!(
                "The application server could not be started (no response after {} attempts). Please try again.",
                attempts
            ),
            LauncherError::Cancelled => {
                "The application failed to start. Please try again.".to_string()
            }
            LauncherError::Window(message) => format!("An error occurred: {}", message),
            other => format!("An error occurred: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
