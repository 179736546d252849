//! ギャラリー一覧の保持と削除・ダウンロード

use crate::api::ApiClient;
use crate::error::{GalleryError, Result};
use event_gallery_common::MediaAsset;
use std::path::{Path, PathBuf};

pub use event_gallery_common::DELETE_PROMPT;

/// 削除の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// 確認で「いいえ」（エラーではない）
    Declined,
}

pub struct GalleryStore {
    client: ApiClient,
    assets: Vec<MediaAsset>,
}

impl GalleryStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            assets: Vec::new(),
        }
    }

    pub fn assets(&self) -> &[MediaAsset] {
        &self.assets
    }

    pub fn get(&self, id: &str) -> Option<&MediaAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// 一覧を取得し直す
    ///
    /// 失敗時はログを出して一覧を空にする（再試行・部分マージはしない）。
    pub async fn fetch_all(&mut self) -> &[MediaAsset] {
        match self.client.list().await {
            Ok(assets) => {
                tracing::debug!("fetched {} assets", assets.len());
                self.assets = assets;
            }
            Err(e) => {
                tracing::error!("failed to fetch gallery: {}", e);
                self.assets.clear();
            }
        }
        &self.assets
    }

    /// 確認のうえで削除する
    ///
    /// `confirm` が false を返したらリクエストを出さない。
    /// バックエンドが成功を返したときだけ一覧から外す。
    pub async fn remove<F>(&mut self, id: &str, confirm: F) -> Result<RemoveOutcome>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_PROMPT) {
            return Ok(RemoveOutcome::Declined);
        }

        if let Err(e) = self.client.delete(id).await {
            tracing::error!("delete {} failed: {}", id, e);
            return Err(e);
        }

        self.assets.retain(|a| a.id != id);
        tracing::info!("deleted {}", id);
        Ok(RemoveOutcome::Removed)
    }

    /// アセットを `dir` に保存する
    pub async fn download(&self, id: &str, dir: &Path) -> Result<PathBuf> {
        let asset = self
            .get(id)
            .ok_or_else(|| GalleryError::AssetNotFound(id.to_string()))?;

        let bytes = self.client.fetch_media(&asset.url).await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(asset.file_name());
        tokio::fs::write(&path, bytes).await?;
        tracing::info!("saved {} to {}", id, path.display());
        Ok(path)
    }
}
