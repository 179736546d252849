use crate::error::{GalleryError, Result};
use event_gallery_common::Challenge;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const API_URL_ENV: &str = "EVENT_GALLERY_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub upload_timeout_seconds: u64,
    pub status_reset_seconds: u64,
    pub autoplay_interval_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".into(),
            upload_timeout_seconds: 120, // 大きな動画向け
            status_reset_seconds: 5,
            autoplay_interval_ms: 3000,
            challenge_question: None,
            challenge_answer: None,
            session_file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GalleryError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("event-gallery"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 認可フラグの保存先
    pub fn session_path(&self) -> Result<PathBuf> {
        match &self.session_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("session.json")),
        }
    }

    pub fn api_base_url(&self) -> String {
        // 環境変数を優先
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.api_base_url.clone(),
        }
    }

    pub fn set_api_base_url(&mut self, url: String) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(GalleryError::Config(format!("URLが不正です: {}", url)));
        }
        self.api_base_url = url.trim_end_matches('/').to_string();
        self.save()
    }

    pub fn challenge(&self) -> Challenge {
        let default = Challenge::default();
        Challenge::new(
            self.challenge_question.clone().unwrap_or(default.question),
            self.challenge_answer.clone().unwrap_or(default.answer),
        )
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_seconds)
    }

    pub fn status_reset_delay(&self) -> Duration {
        Duration::from_secs(self.status_reset_seconds)
    }

    pub fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.autoplay_interval_ms.max(1))
    }
}
