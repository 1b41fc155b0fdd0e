//! バックエンドの起動管理
//!
//! 1. ポート使用中チェック
//! 2. 使用中なら起動済みとみなし、未使用なら子プロセスを起動
//! 3. 応答があるまでポーリング
//! 4. 終了時、自分で起動した子プロセスだけを停止

mod backend;
mod port;
mod readiness;

pub use backend::{
    BackendChild, BackendLauncher, CommandLauncher, OutputLog, ShutdownOutcome, TerminateFuture,
};
pub use port::port_in_use;
pub use readiness::{wait_until_ready, HttpReadinessProbe, ReadinessProbe, RetryPolicy};

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Result;

/// 起動シーケンスの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    /// 既存のサーバーに接続する
    AssumedRunning,
    Spawned,
    Polling,
    Ready,
    Failed,
}

/// 起動管理の設定
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub address: String,
    pub port_check_timeout: Duration,
    pub retry: RetryPolicy,
    pub shutdown_grace: Duration,
    /// 子プロセスを起動せず接続だけする
    pub attach_only: bool,
}

impl LaunchSettings {
    pub fn from_config(config: &Config, attach_only: bool) -> Self {
        Self {
            address: config.address(),
            port_check_timeout: config.probe_timeout(),
            retry: RetryPolicy {
                max_attempts: config.max_attempts,
                interval: config.poll_interval(),
            },
            shutdown_grace: config.shutdown_grace(),
            attach_only,
        }
    }
}

/// 起動完了の情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub attempts: u32,
    pub spawned: bool,
}

pub struct Supervisor<L, P> {
    settings: LaunchSettings,
    launcher: L,
    probe: P,
    state: SupervisorState,
    backend: Option<Box<dyn BackendChild>>,
    cancel: CancellationToken,
}

impl<L, P> Supervisor<L, P>
where
    L: BackendLauncher,
    P: ReadinessProbe,
{
    pub fn new(settings: LaunchSettings, launcher: L, probe: P) -> Self {
        Self {
            settings,
            launcher,
            probe,
            state: SupervisorState::Idle,
            backend: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// このランで子プロセスを起動したか
    pub fn owns_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_pid(&self) -> Option<u32> {
        self.backend.as_ref().and_then(|b| b.id())
    }

    /// ポーリングを止めるためのトークン
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 起動シーケンスを実行
    pub async fn start(&mut self) -> Result<Readiness> {
        let address = self.settings.address.clone();

        let spawned = if self.settings.attach_only {
            tracing::info!(%address, "attach-only mode, not starting backend");
            self.state = SupervisorState::AssumedRunning;
            false
        } else if port_in_use(&address, self.settings.port_check_timeout).await {
            tracing::info!(%address, "port already in use, skipping backend start");
            self.state = SupervisorState::AssumedRunning;
            false
        } else {
            match self.launcher.launch() {
                Ok(child) => {
                    self.backend = Some(child);
                    self.state = SupervisorState::Spawned;
                    true
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to start backend");
                    self.state = SupervisorState::Failed;
                    return Err(e);
                }
            }
        };

        self.state = SupervisorState::Polling;
        match wait_until_ready(&self.probe, &self.settings.retry, &self.cancel).await {
            Ok(attempts) => {
                self.state = SupervisorState::Ready;
                Ok(Readiness { attempts, spawned })
            }
            Err(e) => {
                self.state = SupervisorState::Failed;
                if let Some(backend) = &self.backend {
                    for line in backend.output_tail(20) {
                        tracing::error!(target: "backend", "{}", line);
                    }
                }
                tracing::error!(error = %e, "backend did not become ready");
                Err(e)
            }
        }
    }

    /// 自分で起動した子プロセスを停止
    ///
    /// 何度呼んでもよい
    pub async fn shutdown(&mut self) -> Result<ShutdownOutcome> {
        self.cancel.cancel();
        let Some(mut backend) = self.backend.take() else {
            return Ok(ShutdownOutcome::NotOwned);
        };
        backend.terminate(self.settings.shutdown_grace).await
    }
}
