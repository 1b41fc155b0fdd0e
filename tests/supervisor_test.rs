//! 起動管理のテスト
//!
//! 子プロセスとプローブはモックで差し替え

use reference_validator::error::{LauncherError, Result};
use reference_validator::supervisor::{
    BackendChild, BackendLauncher, LaunchSettings, ReadinessProbe, RetryPolicy, ShutdownOutcome,
    Supervisor, SupervisorState, TerminateFuture,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct MockChild {
    terminated: Arc<AtomicBool>,
}

impl BackendChild for MockChild {
    fn id(&self) -> Option<u32> {
        Some(4242)
    }

    fn is_running(&mut self) -> bool {
        !self.terminated.load(Ordering::SeqCst)
    }

    fn terminate(&mut self, _grace: Duration) -> TerminateFuture<'_> {
        let terminated = self.terminated.clone();
        Box::pin(async move {
            terminated.store(true, Ordering::SeqCst);
            Ok(ShutdownOutcome::Terminated)
        })
    }

    fn output_tail(&self, _n: usize) -> Vec<String> {
        vec!["Traceback (most recent call last):".to_string()]
    }
}

#[derive(Clone, Default)]
struct MockLauncher {
    launches: Arc<AtomicU32>,
    terminated: Arc<AtomicBool>,
    fail: bool,
}

impl BackendLauncher for MockLauncher {
    fn launch(&self) -> Result<Box<dyn BackendChild>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LauncherError::InterpreterMissing("python3".to_string()));
        }
        Ok(Box::new(MockChild { terminated: self.terminated.clone() }))
    }
}

struct StaticProbe {
    ready: bool,
}

impl ReadinessProbe for StaticProbe {
    fn check(&self) -> impl Future<Output = std::result::Result<(), String>> + Send {
        let ready = self.ready;
        async move {
            if ready {
                Ok(())
            } else {
                Err("connection refused".to_string())
            }
        }
    }
}

fn settings(address: String, attach_only: bool) -> LaunchSettings {
    LaunchSettings {
        address,
        port_check_timeout: Duration::from_millis(500),
        retry: RetryPolicy { max_attempts: 3, interval: Duration::from_millis(10) },
        shutdown_grace: Duration::from_millis(100),
        attach_only,
    }
}

/// 空いているポート（バインドしてすぐ閉じる）
async fn free_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().to_string()
}

/// 何でも200を返す最小のHTTPサーバー
async fn spawn_http_responder() -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let handle = tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
                    .await;
            });
        }
    });
    (address, handle)
}

/// ポート使用中なら起動しない、停止もしない
#[tokio::test]
async fn test_occupied_port_reuses_existing_server() {
    let (address, server) = spawn_http_responder().await;
    let launcher = MockLauncher::default();
    let mut supervisor = Supervisor::new(settings(address, false), launcher.clone(), StaticProbe { ready: true });

    let ready = supervisor.start().await.expect("起動失敗");

    assert!(!ready.spawned);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    assert_eq!(supervisor.state(), SupervisorState::Ready);
    assert!(!supervisor.owns_backend());

    let outcome = supervisor.shutdown().await.unwrap();
    assert_eq!(outcome, ShutdownOutcome::NotOwned);
    assert!(!launcher.terminated.load(Ordering::SeqCst));
    server.abort();
}

/// 空きポートなら起動し、終了時に停止する
#[tokio::test]
async fn test_free_port_spawns_and_terminates_backend() {
    let launcher = MockLauncher::default();
    let mut supervisor =
        Supervisor::new(settings(free_address().await, false), launcher.clone(), StaticProbe { ready: true });

    let ready = supervisor.start().await.expect("起動失敗");

    assert!(ready.spawned);
    assert_eq!(ready.attempts, 1);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    assert_eq!(supervisor.backend_pid(), Some(4242));

    let outcome = supervisor.shutdown().await.unwrap();
    assert_eq!(outcome, ShutdownOutcome::Terminated);
    assert!(launcher.terminated.load(Ordering::SeqCst));

    // 2回目は何もしない
    let outcome = supervisor.shutdown().await.unwrap();
    assert_eq!(outcome, ShutdownOutcome::NotOwned);
}

/// 起動できなければ Failed
#[tokio::test]
async fn test_spawn_error_fails_startup() {
    let launcher = MockLauncher { fail: true, ..Default::default() };
    let mut supervisor =
        Supervisor::new(settings(free_address().await, false), launcher, StaticProbe { ready: true });

    let err = supervisor.start().await.unwrap_err();

    assert!(matches!(err, LauncherError::InterpreterMissing(_)));
    assert_eq!(err.dialog_title(), "Server Error");
    assert_eq!(supervisor.state(), SupervisorState::Failed);
}

/// 応答がなければタイムアウト、起動した子プロセスは停止できる
#[tokio::test]
async fn test_unresponsive_backend_times_out() {
    let launcher = MockLauncher::default();
    let mut supervisor =
        Supervisor::new(settings(free_address().await, false), launcher.clone(), StaticProbe { ready: false });

    let err = supervisor.start().await.unwrap_err();

    assert!(matches!(err, LauncherError::ReadinessTimeout { attempts: 3 }));
    assert_eq!(supervisor.state(), SupervisorState::Failed);
    assert!(supervisor.owns_backend());

    assert_eq!(supervisor.shutdown().await.unwrap(), ShutdownOutcome::Terminated);
}

/// attach-only では起動しない
#[tokio::test]
async fn test_attach_only_never_spawns() {
    let launcher = MockLauncher::default();
    let mut supervisor =
        Supervisor::new(settings(free_address().await, true), launcher.clone(), StaticProbe { ready: true });

    let ready = supervisor.start().await.expect("起動失敗");

    assert!(!ready.spawned);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
}
