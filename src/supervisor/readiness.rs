//! 起動確認ポーリング
//!
//! 一定間隔で最大 `max_attempts` 回だけ確認する。
//! 同時に走る確認は常に1つ。

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{LauncherError, Result};

/// リトライ方針
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(1),
        }
    }
}

/// 1回分の確認
pub trait ReadinessProbe {
    /// 応答があれば Ok（ステータスコードは問わない）
    fn check(&self) -> impl Future<Output = std::result::Result<(), String>> + Send;
}

/// `GET /` による確認
#[derive(Debug, Clone)]
pub struct HttpReadinessProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpReadinessProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReadinessProbe for HttpReadinessProbe {
    fn check(&self) -> impl Future<Output = std::result::Result<(), String>> + Send {
        let request = self.client.get(&self.url).send();
        async move {
            let response = request.await.map_err(|e| e.to_string())?;
            tracing::debug!(status = %response.status(), "backend answered");
            Ok(())
        }
    }
}

/// 応答が得られるまで待つ
///
/// # Returns
/// * `Ok(n)` - n回目で応答
/// * `Err(ReadinessTimeout)` - 上限回数まで応答なし
/// * `Err(Cancelled)` - 中断
pub async fn wait_until_ready<P: ReadinessProbe>(
    probe: &P,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<u32> {
    for attempt in 1..=policy.max_attempts {
        tokio::select! {
            _ = cancel.cancelled() => return Err(LauncherError::Cancelled),
            _ = tokio::time::sleep(policy.interval) => {}
        }

        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(LauncherError::Cancelled),
            outcome = probe.check() => outcome,
        };

        match outcome {
            Ok(()) => {
                tracing::info!(attempt, "backend is ready");
                return Ok(attempt);
            }
            Err(e) => {
                tracing::debug!(attempt, max = policy.max_attempts, error = %e, "backend not ready yet");
            }
        }
    }

    Err(LauncherError::ReadinessTimeout {
        attempts: policy.max_attempts,
    })
}
