//! バックエンドとの通信（fetch / WebSocket）

pub mod download;
pub mod push;
pub mod validate;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

/// JsValue のエラーを表示用文字列へ
pub(crate) fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

pub(crate) fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))
}

/// リクエストを送ってレスポンスを得る（HTTPステータスは問わない）
pub(crate) async fn send(url: &str, init: &RequestInit) -> Result<Response, JsValue> {
    let request = Request::new_with_str_and_init(url, init)?;
    let value = JsFuture::from(window()?.fetch_with_request(&request)).await?;
    value.dyn_into()
}
