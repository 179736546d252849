//! ギャラリーの型定義
//!
//! - MediaAsset: バックエンドが返す一覧の1件
//! - UploadCandidate: 送信前にクライアント側だけで保持する選択ファイル

use serde::{Deserialize, Deserializer, Serialize};

/// 投稿者名が空のときの表示名
pub const ANONYMOUS: &str = "Anonymous";

/// 削除確認のメッセージ
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this file?";

/// メディア種別
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    /// MIMEタイプから種別を判定（`video/` 始まり以外はすべて画像扱い）
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    /// バックエンドの `fileType` 値から判定
    pub fn from_file_type(file_type: &str) -> Self {
        if file_type.eq_ignore_ascii_case("video") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

fn deserialize_kind<'de, D>(deserializer: D) -> std::result::Result<MediaKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .as_deref()
        .map(MediaKind::from_file_type)
        .unwrap_or_default())
}

/// 一覧に並ぶアップロード済みアセット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    #[serde(rename = "_id")]
    pub id: String,

    pub url: String,

    #[serde(rename = "fileType", default, deserialize_with = "deserialize_kind")]
    pub kind: MediaKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_name: Option<String>,
}

impl MediaAsset {
    /// 表示用の投稿者名（未設定・空白なら "Anonymous"）
    pub fn uploader_display(&self) -> &str {
        match self.uploader_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => ANONYMOUS,
        }
    }

    /// URL末尾のファイル名（ダウンロード時の保存名）
    ///
    /// 常にパス区切りを含まない1要素を返す。URLから取れなければ id の末尾要素、
    /// それも使えなければ `download`。
    pub fn file_name(&self) -> &str {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        last_component(path)
            .or_else(|| last_component(&self.id))
            .unwrap_or(DOWNLOAD_FALLBACK)
    }
}

const DOWNLOAD_FALLBACK: &str = "download";

fn last_component(path: &str) -> Option<&str> {
    match path.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => Some(name),
        _ => None,
    }
}

/// 送信前の選択ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub kind: MediaKind,
}

impl UploadCandidate {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        let mime_type = mime_type.into();
        let kind = MediaKind::from_mime(&mime_type);
        Self {
            file_name: file_name.into(),
            mime_type,
            size,
            kind,
        }
    }
}

impl AsRef<UploadCandidate> for UploadCandidate {
    fn as_ref(&self) -> &UploadCandidate {
        self
    }
}
