//! バックエンド子プロセスの起動と停止

use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use crate::config::BackendConfig;
use crate::error::{LauncherError, Result};

/// 診断用に保持する出力行数
const OUTPUT_LOG_LINES: usize = 200;

pub type TerminateFuture<'a> = Pin<Box<dyn Future<Output = Result<ShutdownOutcome>> + Send + 'a>>;

/// 停止処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// このランで起動したプロセスではない
    NotOwned,
    AlreadyExited,
    Terminated,
}

/// 子プロセスの出力（末尾のみ）
#[derive(Debug, Default)]
pub struct OutputLog {
    lines: VecDeque<String>,
}

impl OutputLog {
    pub fn push(&mut self, line: String) {
        if self.lines.len() == OUTPUT_LOG_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn tail(&self, n: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// 起動した子プロセスの操作
pub trait BackendChild: Send {
    fn id(&self) -> Option<u32>;

    fn is_running(&mut self) -> bool;

    /// 終了シグナルを送り、猶予時間だけ終了を待つ
    fn terminate(&mut self, grace: Duration) -> TerminateFuture<'_>;

    fn output_tail(&self, n: usize) -> Vec<String>;
}

/// バックエンドの起動方法
pub trait BackendLauncher {
    fn launch(&self) -> Result<Box<dyn BackendChild>>;
}

/// 設定のコマンドで子プロセスを起動
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    config: BackendConfig,
    working_dir: PathBuf,
}

impl CommandLauncher {
    pub fn new(config: BackendConfig, working_dir: PathBuf) -> Self {
        Self { config, working_dir }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.program);
        if let Some(script) = &self.config.script {
            cmd.arg(self.working_dir.join(script));
        }
        cmd.args(&self.config.args)
            .current_dir(&self.working_dir)
            .env("FLASK_ENV", "production")
            .env("PYTHONUNBUFFERED", "1")
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl BackendLauncher for CommandLauncher {
    fn launch(&self) -> Result<Box<dyn BackendChild>> {
        tracing::info!(
            program = %self.config.program,
            cwd = %self.working_dir.display(),
            "starting backend"
        );

        let mut child = self.command().spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LauncherError::InterpreterMissing(self.config.program.clone())
            } else {
                LauncherError::Spawn {
                    program: self.config.program.clone(),
                    source: e,
                }
            }
        })?;

        let output = Arc::new(Mutex::new(OutputLog::default()));
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(drain(stdout, Stream::Stdout, Arc::clone(&output)));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain(stderr, Stream::Stderr, Arc::clone(&output)));
        }

        tracing::info!(pid = ?child.id(), "backend started");
        Ok(Box::new(ProcessChild { child, output }))
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// 出力を1行ずつログへ流す
async fn drain<R>(reader: R, stream: Stream, output: Arc<Mutex<OutputLog>>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                match stream {
                    Stream::Stdout => tracing::info!(target: "backend", "{}", line),
                    Stream::Stderr => tracing::warn!(target: "backend", "{}", line),
                }
                if let Ok(mut log) = output.lock() {
                    log.push(line);
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "backend output stream closed");
                break;
            }
        }
    }
}

/// 実プロセス
struct ProcessChild {
    child: Child,
    output: Arc<Mutex<OutputLog>>,
}

impl BackendChild for ProcessChild {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn terminate(&mut self, grace: Duration) -> TerminateFuture<'_> {
        Box::pin(async move {
            if let Some(status) = self.child.try_wait()? {
                tracing::info!(%status, "backend already exited");
                return Ok(ShutdownOutcome::AlreadyExited);
            }

            tracing::info!(pid = ?self.child.id(), "stopping backend");
            self.child.start_kill()?;
            match tokio::time::timeout(grace, self.child.wait()).await {
                Ok(Ok(status)) => tracing::info!(%status, "backend exited"),
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => tracing::warn!(?grace, "backend did not exit within grace period"),
            }
            Ok(ShutdownOutcome::Terminated)
        })
    }

    fn output_tail(&self, n: usize) -> Vec<String> {
        self.output.lock().map(|log| log.tail(n)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_log_is_bounded() {
        let mut log = OutputLog::default();
        for i in 0..(OUTPUT_LOG_LINES + 5) {
            log.push(format!("line {}", i));
        }
        assert_eq!(log.len(), OUTPUT_LOG_LINES);
        assert_eq!(log.tail(2), vec!["line 203".to_string(), "line 204".to_string()]);
    }

    #[test]
    fn test_command_sets_backend_environment() {
        let launcher = CommandLauncher::new(BackendConfig::default(), PathBuf::from("/srv/app"));
        let cmd = launcher.command();
        let std_cmd = cmd.as_std();
        let envs: Vec<(String, Option<String>)> = std_cmd
            .get_envs()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.map(|v| v.to_string_lossy().into_owned()),
                )
            })
            .collect();
        assert!(envs.contains(&("FLASK_ENV".into(), Some("production".into()))));
        assert!(envs.contains(&("PYTHONUNBUFFERED".into(), Some("1".into()))));
        assert_eq!(std_cmd.get_current_dir(), Some(std::path::Path::new("/srv/app")));
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let config = BackendConfig {
            program: "definitely-not-an-interpreter-0xfe".into(),
            script: None,
            ..Default::default()
        };
        let launcher = CommandLauncher::new(config, std::env::temp_dir());
        let result = launcher.launch();
        assert!(matches!(result, Err(LauncherError::InterpreterMissing(_))));
    }
}
