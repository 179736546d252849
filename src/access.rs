//! 入場ゲート（ネイティブ側）
//!
//! 認可フラグをJSONファイルに保存し、プロセスを再起動しても維持する。

use crate::config::Config;
use crate::error::{GalleryError, Result};
use event_gallery_common::{AccessDecision, AccessGate, SessionStore};
use dialoguer::Input;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// ファイルに保存するセッションストア
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> event_gallery_common::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(storage_error)?;
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // 壊れたファイルは未認可として扱う
                tracing::warn!("セッションファイルを読めません ({}): {}", self.path.display(), e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> event_gallery_common::Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).map_err(storage_error)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(storage_error)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content).map_err(storage_error)
    }
}

fn storage_error(e: std::io::Error) -> event_gallery_common::Error {
    event_gallery_common::Error::Storage(e.to_string())
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> event_gallery_common::Result<Option<String>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> event_gallery_common::Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> event_gallery_common::Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

pub type Gate = AccessGate<FileSessionStore>;

/// 設定に従ってゲートを開く
pub fn open_gate(config: &Config) -> Result<Gate> {
    let store = FileSessionStore::new(config.session_path()?);
    Ok(AccessGate::open(store, config.challenge())?)
}

/// 対話式で合言葉を入力する
///
/// 正解するまで何度でも聞き直す。空入力で中断（`Ok(false)`）。
pub fn run_interactive_challenge<S: SessionStore>(gate: &mut AccessGate<S>) -> Result<bool> {
    if gate.is_authorized() {
        return Ok(true);
    }

    println!("🔒 Private Gallery");
    println!("This gallery is only for invited guests. Please answer the security question to continue.\n");
    println!("Security Question: {}", gate.question());
    println!("💡 Hint: Check your wedding invitation for the secret code! (empty input to go back)\n");

    loop {
        let answer: String = Input::new()
            .with_prompt("Answer")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| GalleryError::Config(format!("入力エラー: {}", e)))?;

        if answer.trim().is_empty() {
            return Ok(false);
        }

        let decision = gate.check(&answer)?;
        match decision {
            AccessDecision::Granted => {
                tracing::info!("gallery access granted");
                println!("✔ Gallery unlocked");
                return Ok(true);
            }
            AccessDecision::Denied => {
                if let Some(message) = decision.message() {
                    println!("❌ {}", message);
                }
            }
        }
    }
}

/// ギャラリー系コマンドの前に認可を確認する
pub fn require_access(gate: &mut Gate) -> Result<()> {
    if run_interactive_challenge(gate)? {
        Ok(())
    } else {
        Err(GalleryError::Locked)
    }
}
