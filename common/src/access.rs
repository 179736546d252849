//! 共有合言葉によるギャラリーの入場チェック
//!
//! 認可状態は `SessionStore` に1つのフラグとして永続化する。
//! 試行回数の制限やロックアウトは行わない。

use crate::error::Result;
use std::cell::RefCell;
use std::collections::HashMap;

/// 永続化キー
pub const ACCESS_KEY: &str = "galleryAccess";

/// 認可済みを表す値
pub const ACCESS_GRANTED: &str = "granted";

/// 不正解時のメッセージ（正解は含めない）
pub const RETRY_MESSAGE: &str = "Incorrect answer. Please try again!";

const DEFAULT_QUESTION: &str = "What's the secret code from the wedding invitation?";
const DEFAULT_ANSWER: &str = "MJALWAYS";

/// 文字列キー/値の永続ストア（ブラウザの localStorage 相当）
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// メモリ上のストア（テスト・一時利用）
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// 合言葉の質問と答え
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub question: String,
    pub answer: String,
}

impl Default for Challenge {
    fn default() -> Self {
        Self {
            question: DEFAULT_QUESTION.to_string(),
            answer: DEFAULT_ANSWER.to_string(),
        }
    }
}

impl Challenge {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// 前後の空白を除き、大文字小文字を区別せずに比較
    pub fn matches(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }
}

/// 判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }

    /// 拒否時に表示する再入力メッセージ
    pub fn message(&self) -> Option<&'static str> {
        match self {
            AccessDecision::Granted => None,
            AccessDecision::Denied => Some(RETRY_MESSAGE),
        }
    }
}

/// 入場ゲート
///
/// 起動時に一度だけストアを読み、以後はメモリ上の状態と書き込みを同期させる。
#[derive(Debug)]
pub struct AccessGate<S> {
    store: S,
    challenge: Challenge,
    authorized: bool,
}

impl<S: SessionStore> AccessGate<S> {
    /// ストアから認可状態を読み込んで開く
    ///
    /// 値が `granted` 以外（未保存を含む）なら未認可。
    pub fn open(store: S, challenge: Challenge) -> Result<Self> {
        let authorized = store.get(ACCESS_KEY)?.as_deref() == Some(ACCESS_GRANTED);
        Ok(Self {
            store,
            challenge,
            authorized,
        })
    }

    /// 読み込みに失敗したら未認可として開く
    pub fn open_or_locked(store: S, challenge: Challenge) -> Self {
        let authorized = matches!(store.get(ACCESS_KEY), Ok(Some(v)) if v == ACCESS_GRANTED);
        Self {
            store,
            challenge,
            authorized,
        }
    }

    pub fn question(&self) -> &str {
        &self.challenge.question
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// 回答を判定し、正解なら認可を永続化する
    pub fn check(&mut self, answer: &str) -> Result<AccessDecision> {
        if !self.challenge.matches(answer) {
            return Ok(AccessDecision::Denied);
        }
        self.store.set(ACCESS_KEY, ACCESS_GRANTED)?;
        self.authorized = true;
        Ok(AccessDecision::Granted)
    }

    /// 認可を取り消す
    pub fn revoke(&mut self) -> Result<()> {
        self.store.remove(ACCESS_KEY)?;
        self.authorized = false;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(store: &MemorySessionStore) -> AccessGate<&MemorySessionStore> {
        AccessGate::open(store, Challenge::default()).unwrap()
    }

    #[test]
    fn test_answer_is_case_and_whitespace_insensitive() {
        let store = MemorySessionStore::new();
        for answer in ["mjalways", " MJAlways ", "MJALWAYS", "\tmjAlWaYs\n"] {
            let mut g = gate(&store);
            assert_eq!(g.check(answer).unwrap(), AccessDecision::Granted, "{:?}", answer);
            g.revoke().unwrap();
        }
    }

    #[test]
    fn test_wrong_answer_does_not_persist() {
        let store = MemorySessionStore::new();
        let mut g = gate(&store);
        let decision = g.check("wrong").unwrap();

        assert_eq!(decision, AccessDecision::Denied);
        assert_eq!(decision.message(), Some(RETRY_MESSAGE));
        assert!(!RETRY_MESSAGE.to_lowercase().contains("mjalways"));
        assert!(!g.is_authorized());
        assert_eq!(store.get(ACCESS_KEY).unwrap(), None);
    }

    #[test]
    fn test_unlimited_attempts() {
        let store = MemorySessionStore::new();
        let mut g = gate(&store);
        for _ in 0..100 {
            assert_eq!(g.check("nope").unwrap(), AccessDecision::Denied);
        }
        assert_eq!(g.check("MJALWAYS").unwrap(), AccessDecision::Granted);
    }

    #[test]
    fn test_session_lifecycle() {
        let store = MemorySessionStore::new();
        let mut g = gate(&store);
        assert!(!g.is_authorized());

        g.check("MJALWAYS").unwrap();
        assert!(g.is_authorized());
        assert_eq!(store.get(ACCESS_KEY).unwrap().as_deref(), Some(ACCESS_GRANTED));

        // 再起動相当: ストアから読み直しても認可済み
        assert!(gate(&store).is_authorized());

        g.revoke().unwrap();
        assert!(!g.is_authorized());
        assert!(!gate(&store).is_authorized());
    }

    #[test]
    fn test_other_stored_value_is_not_authorized() {
        let store = MemorySessionStore::new();
        store.set(ACCESS_KEY, "maybe").unwrap();
        assert!(!gate(&store).is_authorized());
    }

    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(crate::Error::Storage("unavailable".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(crate::Error::Storage("unavailable".into()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(crate::Error::Storage("unavailable".into()))
        }
    }

    #[test]
    fn test_unreadable_store_opens_locked() {
        assert!(AccessGate::open(BrokenStore, Challenge::default()).is_err());
        let mut g = AccessGate::open_or_locked(BrokenStore, Challenge::default());
        assert!(!g.is_authorized());
        // 書き込めなければ認可しない
        assert!(g.check("MJALWAYS").is_err());
        assert!(!g.is_authorized());
    }

    #[test]
    fn test_custom_challenge() {
        let store = MemorySessionStore::new();
        let mut g = AccessGate::open(&store, Challenge::new("Venue?", "Lakehouse")).unwrap();
        assert_eq!(g.question(), "Venue?");
        assert_eq!(g.check("MJALWAYS").unwrap(), AccessDecision::Denied);
        assert_eq!(g.check(" lakehouse").unwrap(), AccessDecision::Granted);
    }
}
