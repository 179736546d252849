//! ギャラリー画面

use crate::api;
use crate::app::{Auth, Navigator};
use crate::components::lightbox::{Lightbox, LightboxController};
use event_gallery_common::{MediaAsset, MediaKind, Page, DELETE_PROMPT};
use leptos::logging;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 一覧の位置つき。位置が変われば別の行として描き直す
fn indexed(assets: Vec<MediaAsset>) -> Vec<(usize, MediaAsset)> {
    assets.into_iter().enumerate().collect()
}

#[component]
pub fn GalleryPage() -> impl IntoView {
    let auth = expect_context::<Auth>();
    let nav = expect_context::<Navigator>();

    let assets = RwSignal::new(Vec::<MediaAsset>::new());
    let lightbox = LightboxController::new(0);

    // 表示時に一度だけ取得。失敗したら空のまま
    spawn_local(async move {
        match api::fetch_listing().await {
            Ok(list) => {
                let len = list.len();
                assets.try_set(list);
                lightbox.set_len(len);
            }
            Err(e) => logging::error!("failed to load gallery: {}", e),
        }
    });

    // 楽観的には消さず、成功してから一覧から外す
    let on_delete = move |id: String| {
        if !gloo::dialogs::confirm(DELETE_PROMPT) {
            return;
        }
        spawn_local(async move {
            match api::delete(&id).await {
                Ok(()) => {
                    assets.try_update(|list| list.retain(|a| a.id != id));
                    if let Some(len) = assets.try_with_untracked(|list| list.len()) {
                        lightbox.set_len(len);
                    }
                }
                Err(e) => {
                    logging::error!("{}", e);
                    gloo::dialogs::alert("Delete failed");
                }
            }
        });
    };

    let on_lock = move |_| {
        lightbox.close();
        auth.lock();
        nav.go(Page::Upload);
    };

    on_cleanup(move || lightbox.stop());

    view! {
        <div class="gallery-container">
            <div class="gallery-header">
                <h1>"Wedding Gallery"</h1>
                <button class="lock-btn" on:click=on_lock>"🔒 Lock Gallery"</button>
            </div>

            <div class="gallery-grid">
                <For
                    each=move || { indexed(assets.get()) }
                    key=|(index, asset)| (*index, asset.id.clone())
                    children=move |(index, asset)| {
                        let id = asset.id.clone();
                        let media = match asset.kind {
                            MediaKind::Video => view! {
                                <video
                                    src=asset.url.clone()
                                    class="gallery-media"
                                    controls=true
                                    on:click=move |_| lightbox.open(index)
                                />
                            }.into_any(),
                            MediaKind::Image => view! {
                                <img
                                    src=asset.url.clone()
                                    alt=""
                                    class="gallery-media"
                                    on:click=move |_| lightbox.open(index)
                                />
                            }.into_any(),
                        };
                        view! {
                            <div class="gallery-item">
                                {media}
                                <p class="uploader-name">{asset.uploader_display().to_string()}</p>
                                <div class="gallery-actions">
                                    <a href=asset.url.clone() download=asset.file_name().to_string()>"⬇"</a>
                                    <button class="delete-btn" on:click=move |_| on_delete(id.clone())>
                                        "🗑"
                                    </button>
                                </div>
                            </div>
                        }
                    }
                />
            </div>

            <Lightbox assets=assets controller=lightbox />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str) -> MediaAsset {
        MediaAsset {
            id: id.into(),
            url: format!("http://cdn/{}.jpg", id),
            kind: MediaKind::Image,
            uploader_name: None,
        }
    }

    #[test]
    fn test_indexed_follows_listing_order() {
        let rows = indexed(vec![asset("a"), asset("b"), asset("c")]);
        let keys: Vec<_> = rows.iter().map(|(i, a)| (*i, a.id.as_str())).collect();
        assert_eq!(keys, vec![(0, "a"), (1, "b"), (2, "c")]);
    }

    /// 削除後は後ろの行の位置が詰まる
    #[test]
    fn test_indexed_after_removal() {
        let mut list = vec![asset("a"), asset("b"), asset("c")];
        list.retain(|a| a.id != "a");
        let rows = indexed(list);
        assert_eq!(rows[0].0, 0);
        assert_eq!(rows[0].1.id, "b");
        assert_eq!(rows[1].0, 1);
    }
}
