//! ライトボックスとスライドショー

use event_gallery_common::{MediaAsset, MediaKind, Slideshow, SlideshowState, TimerAction};
use gloo::timers::callback::Interval;
use leptos::logging;
use leptos::prelude::*;

/// 自動再生の間隔
pub const AUTOPLAY_INTERVAL_MS: u32 = 3_000;

/// スライドショーの状態と自動再生タイマー
///
/// タイマーは高々1つ。遷移が返す `TimerAction` に従って張り替え、
/// 古いタイマーは drop で止まる。
#[derive(Clone, Copy)]
pub struct LightboxController {
    slideshow: RwSignal<Slideshow>,
    timer: StoredValue<Option<Interval>, LocalStorage>,
}

impl LightboxController {
    pub fn new(len: usize) -> Self {
        Self {
            slideshow: RwSignal::new(Slideshow::new(len)),
            timer: StoredValue::new_local(None),
        }
    }

    pub fn state(&self) -> SlideshowState {
        self.slideshow.with(|s| s.snapshot())
    }

    pub fn open(&self, index: usize) {
        match self.slideshow.try_update(|s| s.open(index)) {
            Some(Ok(action)) => self.apply(action),
            Some(Err(e)) => logging::warn!("cannot open lightbox: {}", e),
            None => {}
        }
    }

    pub fn next(&self) {
        self.slideshow.try_update(|s| s.next());
    }

    pub fn prev(&self) {
        self.slideshow.try_update(|s| s.prev());
    }

    pub fn toggle_play(&self) {
        if let Some(action) = self.slideshow.try_update(|s| s.toggle_play()) {
            self.apply(action);
        }
    }

    pub fn close(&self) {
        if let Some(action) = self.slideshow.try_update(|s| s.close()) {
            self.apply(action);
        }
    }

    /// 一覧の件数が変わったとき
    pub fn set_len(&self, len: usize) {
        if let Some(action) = self.slideshow.try_update(|s| s.set_len(len)) {
            self.apply(action);
        }
    }

    /// 画面を離れるときにタイマーだけ止める
    pub fn stop(&self) {
        self.timer.try_update_value(|t| {
            t.take();
        });
    }

    fn apply(&self, action: TimerAction) {
        match action {
            TimerAction::None => {}
            TimerAction::Cancel => self.stop(),
            TimerAction::Start(token) => {
                let slideshow = self.slideshow;
                let interval = Interval::new(AUTOPLAY_INTERVAL_MS, move || {
                    if slideshow.try_update_untracked(|s| s.tick(token)) == Some(true) {
                        slideshow.notify();
                    }
                });
                self.timer.try_update_value(|t| *t = Some(interval));
            }
        }
    }
}

#[component]
pub fn Lightbox(assets: RwSignal<Vec<MediaAsset>>, controller: LightboxController) -> impl IntoView {
    let current = move || {
        let index = controller.state().open_index?;
        assets.with(|list| list.get(index).cloned())
    };

    view! {
        {move || current().map(|asset| {
            let playing = controller.state().is_playing;
            let media = match asset.kind {
                MediaKind::Video => view! {
                    <video src=asset.url.clone() controls=true autoplay=true class="lightbox-media" />
                }.into_any(),
                MediaKind::Image => view! {
                    <img src=asset.url.clone() alt="" class="lightbox-media" />
                }.into_any(),
            };
            view! {
                <div class="lightbox">
                    <button class="close-btn" on:click=move |_| controller.close()>"X"</button>
                    <button class="nav-btn left" on:click=move |_| controller.prev()>"←"</button>
                    <button class="nav-btn right" on:click=move |_| controller.next()>"→"</button>
                    {media}
                    <p class="lightbox-uploader">{asset.uploader_display().to_string()}</p>
                    <button class="play-btn" on:click=move |_| controller.toggle_play()>
                        {if playing { "⏸" } else { "▶" }}
                    </button>
                </div>
            }
        })}
    }
}
