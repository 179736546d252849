use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("アセットが見つかりません: {0}")]
    AssetNotFound(String),

    #[error("ギャラリーはロックされています。`event-gallery access` で合言葉を入力してください")]
    Locked,

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Delete failed (HTTP {0})")]
    DeleteFailed(u16),

    #[error("Download failed (HTTP {0})")]
    DownloadFailed(u16),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] event_gallery_common::Error),
}

pub type Result<T> = std::result::Result<T, GalleryError>;
