//! バックエンドAPI（fetch）
//!
//! - GET    /api/upload       一覧
//! - POST   /api/upload       multipart: files（複数）, name
//! - DELETE /api/upload/{id}

use event_gallery_common::{classify_response, display_name_or_default, MediaAsset, SubmitError};
use futures::future::{select, Either};
use gloo::timers::future::TimeoutFuture;
use leptos::logging;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, File, FormData, Request, RequestInit, RequestMode, Response};

pub const API_BASE_URL: &str = "http://localhost:5000";

/// アップロードの上限時間
pub const UPLOAD_TIMEOUT_MS: u32 = 120_000;

fn endpoint(path: &str) -> String {
    format!("{}{}", API_BASE_URL, path)
}

fn describe(err: JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .unwrap_or_else(|| format!("{:?}", err))
}

async fn send(request: &Request) -> Result<Response, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(request)).await?;
    resp_value.dyn_into()
}

async fn read_text(resp: &Response) -> Result<String, JsValue> {
    let text = JsFuture::from(resp.text()?).await?;
    Ok(text.as_string().unwrap_or_default())
}

/// メディア一覧を取得
pub async fn fetch_listing() -> Result<Vec<MediaAsset>, String> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(&endpoint("/api/upload"), &opts).map_err(describe)?;
    let resp = send(&request).await.map_err(describe)?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    let body = read_text(&resp).await.map_err(describe)?;
    serde_json::from_str(&body).map_err(|e| format!("JSON parse error: {}", e))
}

/// ファイルをまとめて送信
///
/// fetch の失敗は到達不能、上限時間を超えたら中断してタイムアウト扱い。
pub async fn upload(files: &[File], name: &str) -> Result<(), SubmitError> {
    let unknown = |err: JsValue| {
        logging::error!("upload request could not be built: {}", describe(err));
        SubmitError::Unknown
    };

    let form = FormData::new().map_err(unknown)?;
    for file in files {
        form.append_with_blob_and_filename("files", file, &file.name())
            .map_err(unknown)?;
    }
    form.append_with_str("name", display_name_or_default(name))
        .map_err(unknown)?;

    let controller = AbortController::new().map_err(unknown)?;
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&form);
    opts.set_signal(Some(&controller.signal()));
    let request = Request::new_with_str_and_init(&endpoint("/api/upload"), &opts).map_err(unknown)?;

    // request は exchange が所有する
    let exchange = async move {
        let resp = send(&request).await.map_err(|err| {
            logging::warn!("upload fetch failed: {}", describe(err));
            SubmitError::NetworkUnreachable
        })?;
        let body = read_text(&resp).await.map_err(|err| {
            logging::warn!("upload response unreadable: {}", describe(err));
            SubmitError::Unknown
        })?;
        classify_response(resp.status(), &body)
    };

    match select(Box::pin(exchange), TimeoutFuture::new(UPLOAD_TIMEOUT_MS)).await {
        Either::Left((outcome, _)) => outcome,
        Either::Right(_) => {
            controller.abort();
            Err(SubmitError::Timeout)
        }
    }
}

/// 1件削除
pub async fn delete(id: &str) -> Result<(), String> {
    let path = format!("/api/upload/{}", String::from(js_sys::encode_uri_component(id)));

    let opts = RequestInit::new();
    opts.set_method("DELETE");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(&endpoint(&path), &opts).map_err(describe)?;
    let resp = send(&request).await.map_err(describe)?;
    if !resp.ok() {
        return Err(format!("Delete failed (HTTP {})", resp.status()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(endpoint("/api/upload"), "http://localhost:5000/api/upload");
    }

    #[test]
    fn test_upload_timeout_is_two_minutes() {
        assert_eq!(UPLOAD_TIMEOUT_MS, 120_000);
    }
}
