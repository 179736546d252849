//! Event Gallery Common Library
//!
//! CLIとWeb(WASM)で共有される型とロジック。I/Oと非同期ランタイムには依存しない。

pub mod types;
pub mod error;
pub mod media;
pub mod batch;
pub mod access;
pub mod route;
pub mod slideshow;

pub use types::{MediaAsset, MediaKind, UploadCandidate, ANONYMOUS, DELETE_PROMPT};
pub use error::{Error, Result};
pub use media::{validate, Verdict, MAX_IMAGE_SIZE, MAX_VIDEO_SIZE};
pub use batch::{
    check_submittable, classify_response, display_name_or_default, select_files,
    RejectedFile, RejectionReport, SubmitError, SubmitOutcome, UploadStatus,
};
pub use access::{AccessDecision, AccessGate, Challenge, MemorySessionStore, SessionStore};
pub use route::{resolve, Page};
pub use slideshow::{AutoplayToken, LightboxState, Slideshow, SlideshowState, TimerAction};
