//! エラー表示のテスト
//!
//! ダイアログに出すタイトルと本文を検証

use reference_validator::error::LauncherError;

/// Python が見つからない場合の案内
#[test]
fn test_missing_interpreter_message() {
    let err = LauncherError::InterpreterMissing("python3".to_string());
    assert_eq!(err.dialog_title(), "Server Error");
    assert_eq!(
        err.user_message(),
        "Failed to start the application server. Please make sure Python is installed."
    );
}

/// 起動コマンドの失敗
#[test]
fn test_spawn_failure_message() {
    let err = LauncherError::Spawn {
        program: "python3".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
    };
    assert_eq!(err.dialog_title(), "Server Error");
    assert!(err.user_message().contains("permission denied"));
}

/// 応答なし
#[test]
fn test_readiness_timeout_message() {
    let err = LauncherError::ReadinessTimeout { attempts: 30 };
    assert_eq!(err.dialog_title(), "Startup Failed");
    assert!(err.user_message().contains("30"));
}

/// Display実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        LauncherError::Config("テスト設定エラー".to_string()),
        LauncherError::PortProbe("timed out".to_string()),
        LauncherError::Window("no display".to_string()),
        LauncherError::Cancelled,
    ];

    for err in errors {
        let msg = err.to_string();
        assert!(!msg.is_empty());
        assert!(!err.dialog_title().is_empty());
    }
}

/// ウィンドウ作成失敗は元のメッセージをそのまま出す
#[test]
fn test_window_failure_message() {
    let err = LauncherError::Window("webview unavailable".to_string());
    assert_eq!(err.dialog_title(), "Error");
    assert_eq!(err.user_message(), "An error occurred: webview unavailable");
}
