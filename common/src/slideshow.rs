//! ライトボックスの状態機械
//!
//! 状態は `Closed` / `Viewing(i)` / `Playing(i)` の3つ。自動再生タイマーそのものは
//! 呼び出し側（tokio タスクやブラウザの interval）が持ち、この型は
//! 「いつ開始・停止するか」を `TimerAction` で指示する。
//!
//! 自動再生のたびに世代番号を進め、タイマーには `AutoplayToken` を渡す。
//! 停止やクローズで世代が変わるので、取り消し損ねたタイマーの tick は無視される。

use crate::error::{Error, Result};

/// ライトボックスの状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LightboxState {
    #[default]
    Closed,
    Viewing(usize),
    Playing(usize),
}

impl LightboxState {
    pub fn index(&self) -> Option<usize> {
        match *self {
            LightboxState::Closed => None,
            LightboxState::Viewing(i) | LightboxState::Playing(i) => Some(i),
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, LightboxState::Playing(_))
    }
}

/// 画面に渡すスナップショット
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlideshowState {
    pub open_index: Option<usize>,
    pub is_playing: bool,
}

impl From<LightboxState> for SlideshowState {
    fn from(state: LightboxState) -> Self {
        Self {
            open_index: state.index(),
            is_playing: state.is_playing(),
        }
    }
}

/// 自動再生タイマーの世代
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoplayToken(u64);

/// タイマーへの指示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    None,
    Start(AutoplayToken),
    Cancel,
}

/// 一覧の上でのスライドショー
#[derive(Debug, Clone, Default)]
pub struct Slideshow {
    state: LightboxState,
    len: usize,
    generation: u64,
}

impl Slideshow {
    pub fn new(len: usize) -> Self {
        Self {
            state: LightboxState::Closed,
            len,
            generation: 0,
        }
    }

    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn snapshot(&self) -> SlideshowState {
        self.state.into()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// i番目を開く（再生中なら停止してから）
    pub fn open(&mut self, index: usize) -> Result<TimerAction> {
        if index >= self.len {
            return Err(Error::IndexOutOfRange { index, len: self.len });
        }
        let action = self.stop_autoplay();
        self.state = LightboxState::Viewing(index);
        Ok(action)
    }

    /// 次へ（末尾から先頭へ回り込む）。再生中でもタイマーはそのまま。
    pub fn next(&mut self) {
        self.step(true);
    }

    /// 前へ（先頭から末尾へ回り込む）
    pub fn prev(&mut self) {
        self.step(false);
    }

    fn step(&mut self, forward: bool) {
        let len = self.len;
        if len == 0 {
            return;
        }
        let advance = |i: usize| {
            if forward {
                (i + 1) % len
            } else {
                (i + len - 1) % len
            }
        };
        self.state = match self.state {
            LightboxState::Closed => LightboxState::Closed,
            LightboxState::Viewing(i) => LightboxState::Viewing(advance(i)),
            LightboxState::Playing(i) => LightboxState::Playing(advance(i)),
        };
    }

    /// 再生/停止の切り替え。閉じている間は何もしない。
    pub fn toggle_play(&mut self) -> TimerAction {
        match self.state {
            LightboxState::Closed => TimerAction::None,
            LightboxState::Viewing(i) => {
                self.generation += 1;
                self.state = LightboxState::Playing(i);
                TimerAction::Start(AutoplayToken(self.generation))
            }
            LightboxState::Playing(_) => self.stop_autoplay(),
        }
    }

    /// 閉じる。再生中ならタイマー停止を指示する。
    pub fn close(&mut self) -> TimerAction {
        let action = self.stop_autoplay();
        self.state = LightboxState::Closed;
        action
    }

    /// タイマーからの tick。現在の世代で再生中のときだけ1つ進める。
    pub fn tick(&mut self, token: AutoplayToken) -> bool {
        if token.0 != self.generation || !self.state.is_playing() {
            return false;
        }
        self.next();
        true
    }

    /// 一覧の件数が変わったとき
    ///
    /// 0件になれば閉じ、範囲外のインデックスは末尾に寄せる。
    pub fn set_len(&mut self, len: usize) -> TimerAction {
        self.len = len;
        if len == 0 {
            return self.close();
        }
        let last = len - 1;
        self.state = match self.state {
            LightboxState::Viewing(i) if i > last => LightboxState::Viewing(last),
            LightboxState::Playing(i) if i > last => LightboxState::Playing(last),
            other => other,
        };
        TimerAction::None
    }

    fn stop_autoplay(&mut self) -> TimerAction {
        if let LightboxState::Playing(i) = self.state {
            self.generation += 1;
            self.state = LightboxState::Viewing(i);
            TimerAction::Cancel
        } else {
            TimerAction::None
        }
    }
}
