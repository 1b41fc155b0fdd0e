//! 起動確認ポーリングのテスト
//!
//! 仮想時間で試行回数と間隔を検証

use reference_validator::error::LauncherError;
use reference_validator::supervisor::{wait_until_ready, ReadinessProbe, RetryPolicy};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// n回目から応答するプローブ
struct CountingProbe {
    calls: AtomicU32,
    ready_at: Option<u32>,
}

impl CountingProbe {
    fn never() -> Self {
        Self { calls: AtomicU32::new(0), ready_at: None }
    }

    fn ready_at(n: u32) -> Self {
        Self { calls: AtomicU32::new(0), ready_at: Some(n) }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReadinessProbe for CountingProbe {
    fn check(&self) -> impl Future<Output = Result<(), String>> + Send {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let ready = self.ready_at.is_some_and(|n| call >= n);
        async move {
            if ready {
                Ok(())
            } else {
                Err("connection refused".to_string())
            }
        }
    }
}

/// 上限回数で打ち切り、それ以上は確認しない
#[tokio::test(start_paused = true)]
async fn test_gives_up_after_max_attempts() {
    let probe = CountingProbe::never();
    let policy = RetryPolicy::default();
    let started = Instant::now();

    let result = wait_until_ready(&probe, &policy, &CancellationToken::new()).await;

    assert!(matches!(result, Err(LauncherError::ReadinessTimeout { attempts: 30 })));
    assert_eq!(probe.calls(), 30);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(30) && elapsed < Duration::from_secs(31));
}

/// 5回目で応答すればその時点で完了
#[tokio::test(start_paused = true)]
async fn test_ready_on_fifth_attempt() {
    let probe = CountingProbe::ready_at(5);
    let policy = RetryPolicy::default();
    let started = Instant::now();

    let attempts = wait_until_ready(&probe, &policy, &CancellationToken::new())
        .await
        .expect("起動確認失敗");

    assert_eq!(attempts, 5);
    assert_eq!(probe.calls(), 5);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
}

/// 最初の確認も1間隔待ってから
#[tokio::test(start_paused = true)]
async fn test_first_check_waits_one_interval() {
    let probe = CountingProbe::ready_at(1);
    let policy = RetryPolicy { max_attempts: 3, interval: Duration::from_millis(250) };
    let started = Instant::now();

    let attempts = wait_until_ready(&probe, &policy, &CancellationToken::new())
        .await
        .expect("起動確認失敗");

    assert_eq!(attempts, 1);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(250) && elapsed < Duration::from_millis(500));
}

/// 中断するとそれ以降確認しない
#[tokio::test(start_paused = true)]
async fn test_cancel_stops_polling() {
    let probe = CountingProbe::never();
    let policy = RetryPolicy::default();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(3500)).await;
        trigger.cancel();
    });

    let result = wait_until_ready(&probe, &policy, &cancel).await;

    assert!(matches!(result, Err(LauncherError::Cancelled)));
    assert_eq!(probe.calls(), 3);
}
