//! ライトボックス（自動再生つき）
//!
//! 状態遷移は `Slideshow` に任せ、自動再生は tokio タスク1本で回す。
//! 再生停止・クローズ・破棄の各遷移の中でタスクを abort するので、
//! 閉じたあとにインデックスが動くことはない。

use crate::error::Result;
use event_gallery_common::{AutoplayToken, Slideshow, SlideshowState, TimerAction};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub struct Lightbox {
    slideshow: Arc<Mutex<Slideshow>>,
    events: Arc<watch::Sender<SlideshowState>>,
    autoplay: Option<JoinHandle<()>>,
    interval: Duration,
}

fn lock(slideshow: &Mutex<Slideshow>) -> MutexGuard<'_, Slideshow> {
    slideshow.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Lightbox {
    pub fn new(len: usize, interval: Duration) -> Self {
        let (events, _) = watch::channel(SlideshowState::default());
        Self {
            slideshow: Arc::new(Mutex::new(Slideshow::new(len))),
            events: Arc::new(events),
            autoplay: None,
            interval,
        }
    }

    /// 状態の変化を購読する（自動再生による前進も含む）
    pub fn subscribe(&self) -> watch::Receiver<SlideshowState> {
        self.events.subscribe()
    }

    pub fn state(&self) -> SlideshowState {
        lock(&self.slideshow).snapshot()
    }

    pub fn len(&self) -> usize {
        lock(&self.slideshow).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 自動再生タスクが生きているか
    pub fn has_active_timer(&self) -> bool {
        self.autoplay.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn open(&mut self, index: usize) -> Result<()> {
        let action = self.transition(|s| s.open(index))?;
        self.apply(action);
        Ok(())
    }

    pub fn next(&mut self) {
        self.update(|s| {
            s.next();
            TimerAction::None
        });
    }

    pub fn prev(&mut self) {
        self.update(|s| {
            s.prev();
            TimerAction::None
        });
    }

    /// 再生/停止の切り替え（自動再生は tokio ランタイム上で動く）
    pub fn toggle_play(&mut self) {
        self.update(Slideshow::toggle_play);
    }

    pub fn close(&mut self) {
        self.update(Slideshow::close);
    }

    /// 一覧の件数が変わったとき
    pub fn set_len(&mut self, len: usize) {
        self.update(|s| s.set_len(len));
    }

    fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Slideshow) -> TimerAction,
    {
        let action = {
            let mut slideshow = lock(&self.slideshow);
            let action = f(&mut slideshow);
            self.events.send_replace(slideshow.snapshot());
            action
        };
        self.apply(action);
    }

    fn transition<F>(&mut self, f: F) -> Result<TimerAction>
    where
        F: FnOnce(&mut Slideshow) -> event_gallery_common::Result<TimerAction>,
    {
        let mut slideshow = lock(&self.slideshow);
        let action = f(&mut slideshow)?;
        self.events.send_replace(slideshow.snapshot());
        Ok(action)
    }

    fn apply(&mut self, action: TimerAction) {
        match action {
            TimerAction::None => {}
            TimerAction::Start(token) => {
                self.cancel_autoplay();
                self.autoplay = Some(self.spawn_autoplay(token));
            }
            TimerAction::Cancel => self.cancel_autoplay(),
        }
    }

    fn spawn_autoplay(&self, token: AutoplayToken) -> JoinHandle<()> {
        let slideshow = Arc::clone(&self.slideshow);
        let events = Arc::clone(&self.events);
        let period = self.interval;
        tracing::debug!("autoplay started ({:?})", period);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let snapshot = {
                    let mut slideshow = lock(&slideshow);
                    if !slideshow.tick(token) {
                        break;
                    }
                    slideshow.snapshot()
                };
                events.send_replace(snapshot);
            }
        })
    }

    fn cancel_autoplay(&mut self) {
        if let Some(task) = self.autoplay.take() {
            task.abort();
            tracing::debug!("autoplay cancelled");
        }
    }
}

impl Drop for Lightbox {
    fn drop(&mut self) {
        self.cancel_autoplay();
    }
}
