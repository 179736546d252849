//! ページ遷移のガード

/// 画面
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Page {
    #[default]
    Upload,
    Access,
    Gallery,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Upload => "/",
            Page::Access => "/access",
            Page::Gallery => "/gallery",
        }
    }

    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/access" => Page::Access,
            "/gallery" => Page::Gallery,
            _ => Page::Upload,
        }
    }
}

/// 未認可でギャラリーを要求された場合は入場ページへ振り替える
pub fn resolve(requested: Page, authorized: bool) -> Page {
    match requested {
        Page::Gallery if !authorized => Page::Access,
        page => page,
    }
}
