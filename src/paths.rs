//! アプリケーションリソースのルート解決
//!
//! 開発時はチェックアウトのルート、配布時は実行ファイル横の resources

use std::path::{Path, PathBuf};

const ENV_MODE: &str = "REFERENCE_VALIDATOR_ENV";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Packaged,
}

impl RunMode {
    pub fn detect() -> Self {
        let env_dev = std::env::var(ENV_MODE)
            .map(|v| v.eq_ignore_ascii_case("development"))
            .unwrap_or(false);
        if env_dev || cfg!(debug_assertions) {
            RunMode::Development
        } else {
            RunMode::Packaged
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, RunMode::Development)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoot {
    pub path: PathBuf,
    pub mode: RunMode,
}

impl ResourceRoot {
    /// 設定で明示されていればそれを使う
    pub fn resolve(explicit: Option<&Path>, mode: RunMode) -> Self {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match mode {
                RunMode::Development => PathBuf::from(env!("CARGO_MANIFEST_DIR")),
                RunMode::Packaged => packaged_root(),
            },
        };
        Self { path, mode }
    }
}

fn packaged_root() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    if cfg!(target_os = "macos") {
        // Foo.app/Contents/MacOS/foo → Foo.app/Contents/Resources
        if let Some(contents) = exe_dir.parent() {
            return contents.join("Resources");
        }
    }
    exe_dir.join("resources")
}
