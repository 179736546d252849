//! メインアプリケーションコンポーネント

use crate::components::{access_page::AccessPage, gallery_page::GalleryPage, upload_page::UploadPage};
use crate::storage::BrowserSessionStore;
use event_gallery_common::{resolve, AccessDecision, AccessGate, Challenge, Page};
use leptos::ev;
use leptos::logging;
use leptos::prelude::*;
use wasm_bindgen::JsValue;

/// 入場状態（localStorage と同期）
#[derive(Clone, Copy)]
pub struct Auth {
    gate: StoredValue<AccessGate<BrowserSessionStore>>,
    authorized: RwSignal<bool>,
}

impl Auth {
    fn new() -> Self {
        let gate = AccessGate::open_or_locked(BrowserSessionStore, Challenge::default());
        let authorized = RwSignal::new(gate.is_authorized());
        Self {
            gate: StoredValue::new(gate),
            authorized,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized.get()
    }

    pub fn question(&self) -> String {
        self.gate.with_value(|g| g.question().to_string())
    }

    /// 回答を判定する。保存に失敗したら認可しない
    pub fn check(&self, answer: &str) -> AccessDecision {
        let result = self.gate.try_update_value(|g| g.check(answer));
        let decision = match result {
            Some(Ok(decision)) => decision,
            Some(Err(e)) => {
                logging::error!("could not persist access: {}", e);
                AccessDecision::Denied
            }
            None => AccessDecision::Denied,
        };
        if decision.is_granted() {
            self.authorized.set(true);
        }
        decision
    }

    pub fn lock(&self) {
        if let Some(Err(e)) = self.gate.try_update_value(|g| g.revoke()) {
            logging::error!("could not clear access: {}", e);
        }
        self.authorized.set(false);
    }
}

/// 画面遷移
#[derive(Clone, Copy)]
pub struct Navigator {
    requested: RwSignal<Page>,
}

impl Navigator {
    fn new(initial: Page) -> Self {
        Self {
            requested: RwSignal::new(initial),
        }
    }

    pub fn go(&self, page: Page) {
        if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
            if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(page.path())) {
                logging::warn!("could not update history: {:?}", e);
            }
        }
        self.requested.set(page);
    }

    /// 戻る・進むのあと、アドレスバーの URL に画面を合わせる
    fn sync_with_location(&self) {
        self.requested.set(current_page());
    }

    fn requested(&self) -> Page {
        self.requested.get()
    }
}

fn current_page() -> Page {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .map(|path| Page::from_path(&path))
        .unwrap_or_default()
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let auth = Auth::new();
    let nav = Navigator::new(current_page());
    provide_context(auth);
    provide_context(nav);

    let popstate = window_event_listener(ev::popstate, move |_| nav.sync_with_location());
    on_cleanup(move || popstate.remove());

    // ギャラリーは未認可なら入場画面へ
    let page = move || resolve(nav.requested(), auth.is_authorized());

    view! {
        <div class="container">
            {move || match page() {
                Page::Upload => view! { <UploadPage /> }.into_any(),
                Page::Access => view! { <AccessPage /> }.into_any(),
                Page::Gallery => view! { <GalleryPage /> }.into_any(),
            }}
        </div>
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn push(path: &str) {
        let history = web_sys::window().unwrap().history().unwrap();
        history.push_state_with_url(&JsValue::NULL, "", Some(path)).unwrap();
    }

    #[wasm_bindgen_test]
    fn test_go_updates_address_bar() {
        let nav = Navigator::new(Page::Upload);
        nav.go(Page::Gallery);
        assert_eq!(current_page(), Page::Gallery);
        assert_eq!(nav.requested(), Page::Gallery);
    }

    /// 戻るで URL が "/" に戻ったらアップロード画面に戻る
    #[wasm_bindgen_test]
    fn test_history_back_follows_location() {
        let nav = Navigator::new(Page::Upload);
        nav.go(Page::Gallery);

        push("/");
        nav.sync_with_location();
        assert_eq!(nav.requested(), Page::Upload);

        push("/access");
        nav.sync_with_location();
        assert_eq!(nav.requested(), Page::Access);
    }
}
