//! メディア検証
//!
//! 種別ごとのサイズ上限で選択ファイルを判定する。純粋関数なので、
//! 選択時と送信直前のどちらで呼んでも同じ入力には同じ判定を返す。

use crate::types::{MediaKind, UploadCandidate};

const MIB: u64 = 1024 * 1024;

/// 画像の上限: 10MB
pub const MAX_IMAGE_SIZE: u64 = 10 * MIB;

/// 動画の上限: 100MB
pub const MAX_VIDEO_SIZE: u64 = 100 * MIB;

/// 検証結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Rejected { reason: String, limit_bytes: u64 },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

impl MediaKind {
    /// 種別ごとのサイズ上限
    pub fn size_limit(&self) -> u64 {
        match self {
            MediaKind::Image => MAX_IMAGE_SIZE,
            MediaKind::Video => MAX_VIDEO_SIZE,
        }
    }

    /// 上限の表示文言（例: "10MB for images"）
    pub fn limit_label(&self) -> String {
        let plural = match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        };
        format!("{}MB for {}", self.size_limit() / MIB, plural)
    }
}

/// 上限ちょうどは許可
pub fn validate(candidate: &UploadCandidate) -> Verdict {
    let limit = candidate.kind.size_limit();
    if candidate.size > limit {
        Verdict::Rejected {
            reason: format!(
                "{} is too large ({}). Max size: {}",
                candidate.file_name,
                format_size(candidate.size),
                candidate.kind.limit_label()
            ),
            limit_bytes: limit,
        }
    } else {
        Verdict::Valid
    }
}

/// バイト数をMB表記に（小数1桁）
pub fn format_size(bytes: u64) -> String {
    format!("{:.1}MB", bytes as f64 / MIB as f64)
}
