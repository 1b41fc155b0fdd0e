//! ポート使用中チェック
//!
//! 失敗時は「未使用」とみなす（起動を止めない）

use std::time::Duration;
use tokio::net::TcpStream;

use crate::error::LauncherError;

/// 既に何かがリッスンしているか
pub async fn port_in_use(address: &str, timeout: Duration) -> bool {
    match check(address, timeout).await {
        Ok(in_use) => in_use,
        Err(e) => {
            tracing::warn!(address, error = %e, "port check failed, assuming free");
            false
        }
    }
}

async fn check(address: &str, timeout: Duration) -> Result<bool, LauncherError> {
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(_stream)) => Ok(true),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => Ok(false),
        Ok(Err(e)) => Err(LauncherError::PortProbe(e.to_string())),
        Err(_) => Err(LauncherError::PortProbe(format!("timed out after {:?}", timeout))),
    }
}
