//! Event Gallery クライアント
//!
//! バックエンドAPIへのアップロード、合言葉による入場ゲート、
//! ギャラリー一覧とスライドショーを提供する。

pub mod access;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod gallery;
pub mod lightbox;
pub mod upload;
pub mod viewer;

pub use event_gallery_common as common;
