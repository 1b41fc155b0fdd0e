//! `POST /api/validate`

use reference_validator_common::export::VALIDATE_PATH;
use reference_validator_common::{
    Error, SubmissionInput, SubmissionKind, SubmissionTicket, ValidationResponse,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, RequestInit};

use super::{js_error, send};

/// multipartの本文を組み立てる
///
/// ファイル送信なら `file`、テキスト送信なら `text` のどちらか一方だけを載せる
fn build_form(
    input: &SubmissionInput,
    file: Option<&web_sys::File>,
    ticket: SubmissionTicket,
) -> Result<FormData, JsValue> {
    let form = FormData::new()?;
    match (ticket.kind(), file) {
        (SubmissionKind::File, Some(file)) => {
            form.append_with_blob_and_filename("file", file, &file.name())?;
        }
        (SubmissionKind::File, None) => {
            return Err(JsValue::from_str("selected file is no longer available"));
        }
        (SubmissionKind::Text, _) => {
            form.append_with_str("text", &input.text)?;
        }
    }
    for (name, value) in input.options.form_fields() {
        form.append_with_str(name, &value)?;
    }
    form.append_with_str("request_id", &ticket.request_id())?;
    Ok(form)
}

/// 検証を依頼する
///
/// HTTPステータスに関係なく本文をJSONとして読む（`error` フィールドの判定は呼び出し側）
///
/// # Returns
/// * `Err` - 通信エラー / JSONでない応答
pub async fn submit(
    input: &SubmissionInput,
    file: Option<&web_sys::File>,
    ticket: SubmissionTicket,
) -> Result<ValidationResponse, Error> {
    let transport = |e: JsValue| Error::Transport(js_error(e));
    let form = build_form(input, file, ticket).map_err(transport)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&form.into());

    let response = send(VALIDATE_PATH, &init).await.map_err(transport)?;
    let json = JsFuture::from(response.json().map_err(transport)?)
        .await
        .map_err(transport)?;

    serde_wasm_bindgen::from_value(json).map_err(|e| Error::Transport(e.to_string()))
}
