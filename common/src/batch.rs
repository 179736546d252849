//! アップロードのバッチ判定
//!
//! - select_files: 選択時の一括検証（1件でも不正ならすべて破棄）
//! - check_submittable: 送信直前の再検証
//! - classify_response: バックエンド応答を結果分類に変換
//! - UploadStatus: 画面に出すステータス文言

use crate::media::{format_size, validate, Verdict};
use crate::types::{MediaKind, ANONYMOUS};
use crate::UploadCandidate;
use std::fmt;
use thiserror::Error;

/// 上限を超えたファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub file_name: String,
    pub size: u64,
    pub kind: MediaKind,
    pub limit_bytes: u64,
}

/// 選択を拒否した理由の一覧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionReport {
    pub files: Vec<RejectedFile>,
}

impl fmt::Display for RejectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .files
            .iter()
            .map(|r| format!("{} ({})", r.file_name, format_size(r.size)))
            .collect::<Vec<_>>()
            .join(", ");

        // 上限の文言は実際の種別から（重複除去、出現順）
        let mut kinds: Vec<MediaKind> = Vec::new();
        for r in &self.files {
            if !kinds.contains(&r.kind) {
                kinds.push(r.kind);
            }
        }
        let limits = kinds
            .iter()
            .map(MediaKind::limit_label)
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "Files too large: {}. Max size: {}", names, limits)
    }
}

/// 選択されたファイルを一括検証する
///
/// 1件でも上限を超えていれば選択全体を拒否し、超過したファイルをすべて報告する。
/// 空の選択は `Ok(vec![])`（選択解除）。
pub fn select_files<T>(files: Vec<T>) -> Result<Vec<T>, RejectionReport>
where
    T: AsRef<UploadCandidate>,
{
    let rejected: Vec<RejectedFile> = files
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|c| match validate(c) {
            Verdict::Valid => None,
            Verdict::Rejected { limit_bytes, .. } => Some(RejectedFile {
                file_name: c.file_name.clone(),
                size: c.size,
                kind: c.kind,
                limit_bytes,
            }),
        })
        .collect();

    if rejected.is_empty() {
        Ok(files)
    } else {
        Err(RejectionReport { files: rejected })
    }
}

/// 送信直前の検証
pub fn check_submittable<T>(files: &[T]) -> Result<(), SubmitError>
where
    T: AsRef<UploadCandidate>,
{
    if files.is_empty() {
        return Err(SubmitError::EmptyBatch);
    }
    let rejected: Vec<RejectedFile> = files
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| !validate(c).is_valid())
        .map(|c| RejectedFile {
            file_name: c.file_name.clone(),
            size: c.size,
            kind: c.kind,
            limit_bytes: c.kind.size_limit(),
        })
        .collect();

    if rejected.is_empty() {
        Ok(())
    } else {
        Err(SubmitError::Invalid(RejectionReport { files: rejected }))
    }
}

/// 送信する投稿者名（空白のみなら "Anonymous"）
pub fn display_name_or_default(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        ANONYMOUS
    } else {
        trimmed
    }
}

/// 送信失敗の分類
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Please select at least one file.")]
    EmptyBatch,

    #[error("{0}")]
    Invalid(RejectionReport),

    #[error("Network error. Check your connection.")]
    NetworkUnreachable,

    #[error("{0}")]
    ServerRejected(String),

    #[error("File too large for server.")]
    PayloadTooLarge,

    #[error("Upload failed: {0}")]
    ServerError(String),

    #[error("Upload timeout. Try smaller files.")]
    Timeout,

    #[error("Upload failed. Try again.")]
    Unknown,
}

impl SubmitError {
    /// 通信系（再試行で回復しうる）
    pub fn is_transport(&self) -> bool {
        matches!(self, SubmitError::NetworkUnreachable | SubmitError::Timeout)
    }
}

/// 送信結果: 成功ならアップロード件数
pub type SubmitOutcome = Result<usize, SubmitError>;

fn json_field(body: &serde_json::Value, key: &str) -> Option<String> {
    body.get(key).and_then(|v| match v {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    })
}

/// バックエンドの応答を分類する
///
/// - 2xx + `{ message }` → 成功
/// - 400 + `{ error }` → ServerRejected
/// - 413 → PayloadTooLarge
/// - その他の非2xx + `{ details }` → ServerError
/// - 5xx で詳細なし → ServerError("HTTP nnn")
/// - それ以外 → Unknown
pub fn classify_response(status: u16, body: &str) -> Result<(), SubmitError> {
    let json: serde_json::Value = serde_json::from_str(body).unwrap_or(serde_json::Value::Null);

    if (200..300).contains(&status) {
        return match json_field(&json, "message") {
            Some(_) => Ok(()),
            None => Err(SubmitError::Unknown),
        };
    }

    if status == 400 {
        if let Some(error) = json_field(&json, "error") {
            return Err(SubmitError::ServerRejected(error));
        }
    }
    if status == 413 {
        return Err(SubmitError::PayloadTooLarge);
    }
    if let Some(details) = json_field(&json, "details") {
        return Err(SubmitError::ServerError(details));
    }
    if status >= 500 {
        return Err(SubmitError::ServerError(format!("HTTP {}", status)));
    }
    Err(SubmitError::Unknown)
}

/// アップロード画面のステータス表示
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    Selected { count: usize, first_name: String },
    Rejected(RejectionReport),
    Uploading,
    Succeeded(usize),
    Failed(SubmitError),
    ReadyForMore,
}

impl UploadStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, UploadStatus::Uploading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadStatus::Selected { .. } | UploadStatus::Succeeded(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, UploadStatus::Rejected(_) | UploadStatus::Failed(_))
    }

    /// CSSクラス名
    pub fn tone(&self) -> &'static str {
        if self.is_success() {
            "success"
        } else if self.is_error() {
            "error"
        } else {
            ""
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStatus::Idle => Ok(()),
            UploadStatus::Selected { count: 1, first_name } => {
                write!(f, "✅ Ready to upload: {}", first_name)
            }
            UploadStatus::Selected { count, .. } => write!(f, "✅ Ready to upload {} files", count),
            UploadStatus::Rejected(report) => write!(f, "❌ {}", report),
            UploadStatus::Uploading => write!(f, "⏳ Uploading... Please wait."),
            UploadStatus::Succeeded(n) => {
                write!(f, "✅ Upload successful! {} file(s) uploaded.", n)
            }
            UploadStatus::Failed(err) => write!(f, "❌ {}", err),
            UploadStatus::ReadyForMore => write!(f, "Ready to upload more files!"),
        }
    }
}
