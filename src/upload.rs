//! アップロードセッション
//!
//! 選択 → 検証 → 送信 → ステータス表示 の一連を管理する。
//! ステータスは watch チャネルで配信し、成功後は一定時間で
//! "Ready to upload more files!" に戻す。

use crate::api::{ApiClient, UploadPart};
use crate::config::Config;
use crate::error::{GalleryError, Result};
use event_gallery_common::{
    check_submittable, display_name_or_default, select_files, RejectionReport, SubmitError,
    SubmitOutcome, UploadCandidate, UploadStatus,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// ディスク上の選択ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub candidate: UploadCandidate,
}

impl LocalFile {
    /// メタデータと拡張子から候補を作る
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .map_err(|_| GalleryError::FileNotFound(path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(GalleryError::FileNotFound(path.display().to_string()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            candidate: UploadCandidate::new(file_name, mime_type, metadata.len()),
        })
    }
}

async fn open_for_upload(path: &Path) -> std::io::Result<(tokio::fs::File, u64)> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    Ok((file, len))
}

impl AsRef<UploadCandidate> for LocalFile {
    fn as_ref(&self) -> &UploadCandidate {
        &self.candidate
    }
}

pub struct UploadSession {
    client: ApiClient,
    files: Vec<LocalFile>,
    display_name: String,
    status: Arc<watch::Sender<UploadStatus>>,
    reset_task: Option<JoinHandle<()>>,
    timeout: Duration,
    reset_delay: Duration,
}

impl UploadSession {
    pub fn new(client: ApiClient, timeout: Duration, reset_delay: Duration) -> Self {
        let (status, _) = watch::channel(UploadStatus::Idle);
        Self {
            client,
            files: Vec::new(),
            display_name: String::new(),
            status: Arc::new(status),
            reset_task: None,
            timeout,
            reset_delay,
        }
    }

    pub fn from_config(client: ApiClient, config: &Config) -> Self {
        Self::new(client, config.upload_timeout(), config.status_reset_delay())
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> UploadStatus {
        self.status.borrow().clone()
    }

    pub fn files(&self) -> &[LocalFile] {
        &self.files
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    /// ファイルを選択する
    ///
    /// 1件でも上限を超えていれば選択全体を破棄する。空の選択は選択解除。
    pub fn select(&mut self, files: Vec<LocalFile>) -> std::result::Result<usize, RejectionReport> {
        self.cancel_reset();
        match select_files(files) {
            Ok(files) if files.is_empty() => {
                self.files.clear();
                self.set_status(UploadStatus::Idle);
                Ok(0)
            }
            Ok(files) => {
                let count = files.len();
                let first_name = files[0].candidate.file_name.clone();
                self.files = files;
                self.set_status(UploadStatus::Selected { count, first_name });
                Ok(count)
            }
            Err(report) => {
                tracing::warn!("selection rejected: {}", report);
                self.files.clear();
                self.set_status(UploadStatus::Rejected(report.clone()));
                Err(report)
            }
        }
    }

    /// 選択中のファイルを送信する
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.cancel_reset();

        if let Err(e) = check_submittable(&self.files) {
            return self.fail(e);
        }

        self.set_status(UploadStatus::Uploading);

        let parts = match self.read_parts().await {
            Ok(parts) => parts,
            Err(e) => return self.fail(e),
        };

        let name = display_name_or_default(&self.display_name).to_string();
        let count = parts.len();
        match self.client.upload(parts, &name, self.timeout).await {
            Ok(()) => {
                tracing::info!("uploaded {} file(s) as {}", count, name);
                self.files.clear();
                self.display_name.clear();
                self.set_status(UploadStatus::Succeeded(count));
                self.schedule_reset();
                Ok(count)
            }
            Err(e) => self.fail(e),
        }
    }

    /// ファイルを開き、実際のバイト数で再検証する
    ///
    /// 中身はメモリに読み込まず、送信時にストリームで流す。
    async fn read_parts(&self) -> std::result::Result<Vec<UploadPart>, SubmitError> {
        let mut parts = Vec::with_capacity(self.files.len());
        let mut fresh = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let (handle, len) = open_for_upload(&file.path).await.map_err(|e| {
                tracing::error!("cannot read {}: {}", file.path.display(), e);
                SubmitError::Unknown
            })?;
            fresh.push(UploadCandidate::new(
                file.candidate.file_name.clone(),
                file.candidate.mime_type.clone(),
                len,
            ));
            parts.push(UploadPart::from_file(
                file.candidate.file_name.clone(),
                file.candidate.mime_type.clone(),
                handle,
                len,
            ));
        }
        check_submittable(&fresh)?;
        Ok(parts)
    }

    fn fail(&mut self, error: SubmitError) -> SubmitOutcome {
        tracing::warn!("upload failed: {}", error);
        self.set_status(UploadStatus::Failed(error.clone()));
        Err(error)
    }

    fn set_status(&self, status: UploadStatus) {
        self.status.send_replace(status);
    }

    fn schedule_reset(&mut self) {
        let status = Arc::clone(&self.status);
        let delay = self.reset_delay;
        self.reset_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            status.send_if_modified(|current| {
                if matches!(current, UploadStatus::Succeeded(_)) {
                    *current = UploadStatus::ReadyForMore;
                    true
                } else {
                    false
                }
            });
        }));
    }

    fn cancel_reset(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        self.cancel_reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_gallery_common::{MediaKind, MAX_IMAGE_SIZE};
    use tempfile::tempdir;

    fn session() -> UploadSession {
        UploadSession::new(
            ApiClient::new("http://127.0.0.1:1"),
            Duration::from_secs(1),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_local_file_mime() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("clip.MP4");
        std::fs::write(&video, b"1234").unwrap();
        let file = LocalFile::from_path(&video).unwrap();
        assert_eq!(file.candidate.kind, MediaKind::Video);
        assert_eq!(file.candidate.size, 4);
        assert_eq!(file.candidate.file_name, "clip.MP4");
    }

    /// 画像・動画以外の種別は画像の上限で扱う
    #[test]
    fn test_unmapped_extension_uses_image_limit() {
        let dir = tempdir().unwrap();
        for name in ["notes.zzqq", "notes.xyz", "README"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"x").unwrap();
            let file = LocalFile::from_path(&path).unwrap();
            assert_eq!(file.candidate.kind, MediaKind::Image, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_parts_carry_on_disk_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::File::create(&path).unwrap().set_len(3 * 1024 * 1024).unwrap();

        let mut session = session();
        session.select(vec![LocalFile::from_path(&path).unwrap()]).unwrap();
        let parts = session.read_parts().await.unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 3 * 1024 * 1024);
        assert_eq!(parts[0].mime_type, "video/mp4");
    }

    #[test]
    fn test_local_file_missing() {
        let err = LocalFile::from_path(Path::new("/nonexistent/photo.jpg")).unwrap_err();
        assert!(matches!(err, GalleryError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_select_rejects_whole_selection() {
        let dir = tempdir().unwrap();
        let small = dir.path().join("small.jpg");
        std::fs::write(&small, b"tiny").unwrap();
        let big = dir.path().join("big.jpg");
        std::fs::File::create(&big).unwrap().set_len(MAX_IMAGE_SIZE + 1).unwrap();

        let mut session = session();
        let files = vec![
            LocalFile::from_path(&small).unwrap(),
            LocalFile::from_path(&big).unwrap(),
        ];
        let report = session.select(files).unwrap_err();
        assert_eq!(report.files.len(), 1);
        assert!(session.files().is_empty());
        assert!(matches!(session.status(), UploadStatus::Rejected(_)));
    }

    #[tokio::test]
    async fn test_submit_empty_batch_is_local() {
        let mut session = session();
        assert_eq!(session.submit().await, Err(SubmitError::EmptyBatch));
        assert_eq!(session.status(), UploadStatus::Failed(SubmitError::EmptyBatch));
    }

    #[tokio::test]
    async fn test_submit_revalidates_grown_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"small").unwrap();

        let mut session = session();
        session.select(vec![LocalFile::from_path(&path).unwrap()]).unwrap();

        // 選択後にファイルが上限を超えた
        std::fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .unwrap()
            .set_len(MAX_IMAGE_SIZE + 1)
            .unwrap();

        let outcome = session.submit().await;
        assert!(matches!(outcome, Err(SubmitError::Invalid(_))), "{:?}", outcome);
        // 選択はそのまま（ユーザーが選び直す）
        assert_eq!(session.files().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_returns_to_ready_after_delay() {
        let mut session = session();
        session.set_status(UploadStatus::Succeeded(2));
        session.schedule_reset();

        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert_eq!(session.status(), UploadStatus::Succeeded(2));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(session.status(), UploadStatus::ReadyForMore);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_selection_cancels_pending_reset() {
        let mut session = session();
        session.set_status(UploadStatus::Succeeded(1));
        session.schedule_reset();

        session.select(Vec::new()).unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(session.status(), UploadStatus::Idle);
    }

    #[tokio::test]
    async fn test_empty_selection_clears() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"img").unwrap();

        let mut session = session();
        assert_eq!(session.select(vec![LocalFile::from_path(&path).unwrap()]), Ok(1));
        assert_eq!(session.select(Vec::new()), Ok(0));
        assert!(session.files().is_empty());
        assert_eq!(session.status(), UploadStatus::Idle);
    }
}
