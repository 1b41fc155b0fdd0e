//! レポート / BibTeX のダウンロード
//!
//! fetch → Blob → オブジェクトURL → `<a download>` をクリック

use reference_validator_common::export::{content_disposition_filename, error_message_from_body};
use reference_validator_common::CitationBundle;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, RequestInit, Url};

use super::{js_error, send, window};

/// サーバーからファイルを取得して保存させる
///
/// 失敗時は本文の `error` を優先したメッセージを返す
pub async fn fetch_and_save(url: &str, fallback_name: &str) -> Result<(), String> {
    let init = RequestInit::new();
    init.set_method("GET");

    let response = send(url, &init).await.map_err(js_error)?;

    if !response.ok() {
        let status = response.status();
        let body = match response.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };
        return Err(error_message_from_body(status, &body));
    }

    let file_name = response
        .headers()
        .get("Content-Disposition")
        .ok()
        .flatten()
        .and_then(|header| content_disposition_filename(&header))
        .unwrap_or_else(|| fallback_name.to_string());

    let blob: Blob = JsFuture::from(response.blob().map_err(js_error)?)
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;

    save_blob(&blob, &file_name).map_err(js_error)
}

/// 全件BibTeXをその場で作って保存させる
pub fn save_bundle(bundle: &CitationBundle) -> Result<(), String> {
    let parts = js_sys::Array::of1(&JsValue::from_str(&bundle.content));
    let options = BlobPropertyBag::new();
    options.set_type(CitationBundle::MIME_TYPE);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_error)?;
    save_blob(&blob, &bundle.file_name).map_err(js_error)
}

fn save_blob(blob: &Blob, file_name: &str) -> Result<(), JsValue> {
    let document = window()?
        .document()
        .ok_or_else(|| JsValue::from_str("document is not available"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("body is not available"))?;

    let url = Url::create_object_url_with_blob(blob)?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);

    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    Url::revoke_object_url(&url)?;

    gloo::console::log!(format!("download started: {}", file_name));
    Ok(())
}
