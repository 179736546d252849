//! ブラウザの localStorage を使ったセッションストア
//!
//! 値は JSON にせず生の文字列で保存する（`galleryAccess` = `granted`）。

use event_gallery_common::{Error, Result, SessionStore};
use gloo::storage::{LocalStorage, Storage};

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSessionStore;

impl BrowserSessionStore {
    fn raw() -> web_sys::Storage {
        LocalStorage::raw()
    }
}

fn storage_error(err: wasm_bindgen::JsValue) -> Error {
    Error::Storage(format!("{:?}", err))
}

impl SessionStore for BrowserSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::raw().get_item(key).map_err(storage_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::raw().set_item(key, value).map_err(storage_error)
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::raw().remove_item(key).map_err(storage_error)
    }
}
