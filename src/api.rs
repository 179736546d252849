//! バックエンドAPIクライアント
//!
//! - `GET    /api/upload`      一覧
//! - `POST   /api/upload`      multipart（`files` を複数 + `name`）
//! - `DELETE /api/upload/:id`  削除

use crate::config::Config;
use crate::error::{GalleryError, Result};
use event_gallery_common::{classify_response, MediaAsset, SubmitError};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Url};
use std::time::Duration;

const UPLOAD_PATH: &str = "/api/upload";

/// 送信する1ファイル
///
/// ファイルは読み込まずにストリームで送る。
#[derive(Debug)]
pub struct UploadPart {
    pub file_name: String,
    pub mime_type: String,
    body: Body,
    len: u64,
}

impl UploadPart {
    pub fn from_file(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        file: tokio::fs::File,
        len: u64,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            body: Body::from(file),
            len,
        }
    }

    pub fn from_bytes(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let len = bytes.len() as u64;
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            body: Body::from(bytes),
            len,
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, UPLOAD_PATH)
    }

    fn asset_url(&self, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.upload_url())
            .map_err(|e| GalleryError::Config(format!("APIのURLが不正です: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| GalleryError::Config(format!("APIのURLが不正です: {}", self.base_url)))?
            .push(id);
        Ok(url)
    }

    /// 一覧を取得
    pub async fn list(&self) -> Result<Vec<MediaAsset>> {
        tracing::debug!("GET {}", self.upload_url());
        let assets = self
            .http
            .get(self.upload_url())
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<MediaAsset>>()
            .await?;
        Ok(assets)
    }

    /// 全ファイルを1回の multipart リクエストで送信する
    ///
    /// `timeout` を過ぎたら応答を待たずに `Timeout` を返す。
    pub async fn upload(
        &self,
        parts: Vec<UploadPart>,
        name: &str,
        timeout: Duration,
    ) -> std::result::Result<(), SubmitError> {
        let count = parts.len();
        let mut form = Form::new();
        for part in parts {
            let file_part =
                Part::stream_with_length(part.body, part.len).file_name(part.file_name.clone());
            let file_part = match file_part.mime_str(&part.mime_type) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("MIMEタイプを付与できません ({}): {}", part.file_name, e);
                    return Err(SubmitError::Unknown);
                }
            };
            form = form.part("files", file_part);
        }
        form = form.text("name", name.to_string());

        tracing::debug!("POST {} ({} files, name={})", self.upload_url(), count, name);
        let request = async {
            let response = self.http.post(self.upload_url()).multipart(form).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(timeout, request).await {
            Err(_) => return Err(SubmitError::Timeout),
            Ok(Err(e)) => return Err(transport_error(&e)),
            Ok(Ok(response)) => response,
        };

        tracing::debug!("upload response: HTTP {}", status);
        classify_response(status, &body)
    }

    /// 削除（2xx 以外は失敗）
    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = self.asset_url(id)?;
        tracing::debug!("DELETE {}", url);
        let response = self.http.delete(url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(GalleryError::DeleteFailed(response.status().as_u16()))
        }
    }

    /// アセット本体を取得（相対URLはAPIのベースURLから解決）
    pub async fn fetch_media(&self, asset_url: &str) -> Result<Vec<u8>> {
        let url = if asset_url.starts_with("http://") || asset_url.starts_with("https://") {
            asset_url.to_string()
        } else {
            format!("{}/{}", self.base_url, asset_url.trim_start_matches('/'))
        };
        tracing::debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(GalleryError::DownloadFailed(response.status().as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn transport_error(e: &reqwest::Error) -> SubmitError {
    if e.is_timeout() {
        SubmitError::Timeout
    } else if e.is_connect() {
        SubmitError::NetworkUnreachable
    } else {
        tracing::error!("Upload error: {}", e);
        SubmitError::Unknown
    }
}
