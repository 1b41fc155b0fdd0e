use crate::error::{LauncherError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const PORT_ENV: &str = "REFERENCE_VALIDATOR_PORT";

/// バックエンドの起動コマンド
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub program: String,
    pub script: Option<String>,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        let program = if cfg!(windows) { "python" } else { "python3" };
        Self {
            program: program.into(),
            script: Some("run.py".into()),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}

/// ウィンドウ設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Reference Validator".into(),
            width: 1400,
            height: 900,
            min_width: 1000,
            min_height: 700,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
    pub probe_timeout_ms: u64,
    pub shutdown_grace_ms: u64,
    pub resource_root: Option<PathBuf>,
    pub backend: BackendConfig,
    pub window: WindowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            max_attempts: 30,
            poll_interval_ms: 1000,
            probe_timeout_ms: 1000,
            shutdown_grace_ms: 3000,
            resource_root: None,
            backend: BackendConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env()?;
        Ok(config)
    }

    /// 指定パスから読み込み（存在しなければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LauncherError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("reference-validator").join("config.json"))
    }

    /// 環境変数を優先
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var(PORT_ENV) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| LauncherError::Config(format!("{}が不正です: {}", PORT_ENV, port)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(LauncherError::Config("max_attempts は1以上にしてください".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(LauncherError::Config("poll_interval_ms は1以上にしてください".into()));
        }
        if self.backend.program.trim().is_empty() {
            return Err(LauncherError::Config("backend.program が空です".into()));
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}", self.address())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
