//! テスト用の偽バックエンド
//!
//! `/api/upload` の一覧・multipart受付・削除と、`/media/:name` の配信を行う。
//! `Mode` で失敗応答を切り替えられる。

#![allow(dead_code)]

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Mode {
    #[default]
    Normal,
    RejectUpload,
    PayloadTooLarge,
    UploadServerError,
    SlowUpload(Duration),
    FailList,
    FailDelete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedFile {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedUpload {
    pub name: String,
    pub files: Vec<ReceivedFile>,
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub base_url: String,
    pub mode: Mode,
    pub assets: Vec<Value>,
    pub uploads: Vec<ReceivedUpload>,
    pub delete_calls: usize,
}

type Shared = Arc<Mutex<BackendState>>;

pub struct FakeBackend {
    pub url: String,
    state: Shared,
    handle: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start(assets: Vec<Value>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let url = format!("http://{}", listener.local_addr().expect("addr"));
        let state: Shared = Arc::new(Mutex::new(BackendState {
            base_url: url.clone(),
            assets,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/upload", get(list).post(upload))
            .route("/api/upload/:id", delete(remove))
            .route("/media/:name", get(media))
            .layer(DefaultBodyLimit::disable())
            .with_state(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self { url, state, handle }
    }

    pub fn set_mode(&self, mode: Mode) {
        self.state.lock().unwrap().mode = mode;
    }

    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn asset_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .assets
            .iter()
            .filter_map(|a| a["_id"].as_str().map(str::to_string))
            .collect()
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// 一覧用のアセットJSON
pub fn asset(id: &str, file_type: &str, uploader: Option<&str>) -> Value {
    let ext = if file_type == "video" { "mp4" } else { "jpg" };
    let mut value = json!({
        "_id": id,
        "url": format!("/media/{}.{}", id, ext),
        "fileType": file_type,
    });
    if let Some(name) = uploader {
        value["uploaderName"] = json!(name);
    }
    value
}

async fn list(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    if state.mode == Mode::FailList {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "db down" }))).into_response();
    }
    Json(Value::Array(state.assets.clone())).into_response()
}

async fn upload(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    // 応答の前にボディを読み切る
    let mut received = ReceivedUpload {
        name: String::new(),
        files: Vec::new(),
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or_default() {
            "files" => {
                let file_name = field.file_name().unwrap_or("unknown").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                received.files.push(ReceivedFile {
                    file_name,
                    content_type,
                    size,
                });
            }
            "name" => received.name = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }

    let mode = state.lock().unwrap().mode;
    match mode {
        Mode::RejectUpload => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": "No files uploaded" })))
                .into_response()
        }
        Mode::PayloadTooLarge => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
        Mode::UploadServerError => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Upload failed", "details": "storage quota exceeded" })),
            )
                .into_response()
        }
        Mode::SlowUpload(delay) => tokio::time::sleep(delay).await,
        _ => {}
    }

    let mut state = state.lock().unwrap();
    for file in &received.files {
        let id = format!("up-{}", state.assets.len() + 1);
        let file_type = if file.content_type.starts_with("video/") { "video" } else { "image" };
        let mut value = asset(&id, file_type, Some(&received.name));
        value["url"] = json!(format!("/media/{}", file.file_name));
        state.assets.push(value);
    }
    state.uploads.push(received);
    Json(json!({ "message": "Files uploaded successfully" })).into_response()
}

async fn remove(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    state.delete_calls += 1;
    if state.mode == Mode::FailDelete {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let before = state.assets.len();
    state.assets.retain(|a| a["_id"].as_str() != Some(id.as_str()));
    if state.assets.len() == before {
        StatusCode::NOT_FOUND.into_response()
    } else {
        Json(json!({ "message": "Deleted" })).into_response()
    }
}

async fn media(Path(name): Path<String>) -> Response {
    format!("media:{}", name).into_response()
}
