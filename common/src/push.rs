//! プッシュチャネル（Socket.IO v4 / Engine.IO v4）のテキストフレーム
//!
//! WebSocketトランスポートのみ対応。バイナリ添付は扱わない。

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{PdfGenerationProgress, ProgressEvent};

pub const VALIDATION_PROGRESS: &str = "validation_progress";
pub const PDF_GENERATION_PROGRESS: &str = "pdf_generation_progress";

/// Engine.IO ハンドシェイク
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Handshake {
    pub sid: String,
    pub ping_interval: u64,
    pub ping_timeout: u64,
}

/// 受信フレーム
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Connect,
    Disconnect,
    Event { name: String, payload: Value },
    ConnectError(String),
    Noop,
}

/// クライアントから送るフレーム
pub const CONNECT_FRAME: &str = "40";
pub const PONG_FRAME: &str = "3";

/// テキストフレームをデコード
pub fn decode(frame: &str) -> Result<Packet> {
    let mut chars = frame.chars();
    let engine_type = chars
        .next()
        .ok_or_else(|| Error::Protocol("empty frame".into()))?;
    let rest = chars.as_str();

    match engine_type {
        '0' => Ok(Packet::Open(serde_json::from_str(rest)?)),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket(rest),
        '6' => Ok(Packet::Noop),
        other => Err(Error::Protocol(format!("unknown engine packet type: {}", other))),
    }
}

/// Socket.IO層（"4"の後ろ）
fn decode_socket(body: &str) -> Result<Packet> {
    let mut chars = body.chars();
    let socket_type = chars
        .next()
        .ok_or_else(|| Error::Protocol("empty socket packet".into()))?;
    let rest = strip_namespace(chars.as_str());

    match socket_type {
        '0' => Ok(Packet::Connect),
        '1' => Ok(Packet::Disconnect),
        '2' => {
            // ack id の数字を読み飛ばす
            let json = rest.trim_start_matches(|c: char| c.is_ascii_digit());
            let items: Vec<Value> = serde_json::from_str(json)?;
            let mut items = items.into_iter();
            let name = match items.next() {
                Some(Value::String(name)) => name,
                _ => return Err(Error::Protocol("event without name".into())),
            };
            let payload = items.next().unwrap_or(Value::Null);
            Ok(Packet::Event { name, payload })
        }
        '4' => {
            let message = serde_json::from_str::<Value>(rest)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| rest.to_string());
            Ok(Packet::ConnectError(message))
        }
        other => Err(Error::Protocol(format!("unsupported socket packet type: {}", other))),
    }
}

/// "/ns," 形式の名前空間を除去
fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        if let Some((_, rest)) = body.split_once(',') {
            return rest;
        }
        return "";
    }
    body
}

/// アプリケーションで扱うイベント
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    ValidationProgress(ProgressEvent),
    PdfGenerationProgress(PdfGenerationProgress),
}

impl PushEvent {
    /// 未知のイベントは None
    pub fn from_packet(packet: &Packet) -> Result<Option<Self>> {
        let Packet::Event { name, payload } = packet else {
            return Ok(None);
        };

        let event = match name.as_str() {
            VALIDATION_PROGRESS => {
                PushEvent::ValidationProgress(serde_json::from_value(payload.clone())?)
            }
            PDF_GENERATION_PROGRESS => {
                PushEvent::PdfGenerationProgress(serde_json::from_value(payload.clone())?)
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// ページのオリジンからWebSocketエンドポイントを組み立てる
///
/// # Examples
/// ```
/// use reference_validator_common::push::socket_url;
///
/// assert_eq!(
///     socket_url("http://127.0.0.1:5000"),
///     "ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket"
/// );
/// ```
pub fn socket_url(origin: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let ws_origin = if let Some(rest) = origin.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = origin.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        origin.to_string()
    };
    format!("{}/socket.io/?EIO=4&transport=websocket", ws_origin)
}
