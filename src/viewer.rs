//! 端末でのギャラリー表示とスライドショー

use crate::lightbox::Lightbox;
use anyhow::{Context, Result};
use event_gallery_common::{MediaAsset, MediaKind, SlideshowState};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// スライドショーの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    Next,
    Prev,
    TogglePlay,
    Close,
    Help,
}

impl ViewerCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "n" | "next" | "l" => ViewerCommand::Next,
            "p" | "prev" | "h" => ViewerCommand::Prev,
            "" | "s" | "play" | "pause" => ViewerCommand::TogglePlay,
            "q" | "x" | "close" | "quit" => ViewerCommand::Close,
            _ => ViewerCommand::Help,
        }
    }
}

const HELP: &str = "[n] next  [p] prev  [Enter] play/pause  [q] close";

fn kind_icon(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "📸",
        MediaKind::Video => "🎥",
    }
}

/// 一覧表示
pub fn print_listing(assets: &[MediaAsset]) {
    if assets.is_empty() {
        println!("No uploads yet.");
        return;
    }
    println!("Wedding Gallery ({} items)\n", assets.len());
    for (i, asset) in assets.iter().enumerate() {
        println!(
            "{:>3}. {} {:<24} {:<16} {}",
            i + 1,
            kind_icon(asset.kind),
            asset.id,
            asset.uploader_display(),
            asset.url
        );
    }
}

/// ライトボックスの1行表示
pub fn describe(assets: &[MediaAsset], state: SlideshowState) -> Option<String> {
    let index = state.open_index?;
    let asset = assets.get(index)?;
    Some(format!(
        "[{}/{}] {} {}  by {}{}",
        index + 1,
        assets.len(),
        kind_icon(asset.kind),
        asset.url,
        asset.uploader_display(),
        if state.is_playing { "  ▶ playing" } else { "" }
    ))
}

/// 端末でスライドショーを回す
///
/// 標準入力のコマンドと自動再生による前進を同じループで処理する。
pub async fn run_slideshow(
    assets: &[MediaAsset],
    start: usize,
    play: bool,
    interval: Duration,
) -> Result<()> {
    if assets.is_empty() {
        println!("No uploads yet.");
        return Ok(());
    }

    let mut lightbox = Lightbox::new(assets.len(), interval);
    let mut changes = lightbox.subscribe();
    lightbox
        .open(start)
        .with_context(|| format!("cannot open item {}", start + 1))?;
    if play {
        lightbox.toggle_play();
    }

    println!("{}", HELP);
    if let Some(line) = describe(assets, *changes.borrow_and_update()) {
        println!("{}", line);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    lightbox.close();
                    break;
                };
                match ViewerCommand::parse(&line) {
                    ViewerCommand::Next => lightbox.next(),
                    ViewerCommand::Prev => lightbox.prev(),
                    ViewerCommand::TogglePlay => lightbox.toggle_play(),
                    ViewerCommand::Close => {
                        lightbox.close();
                        break;
                    }
                    ViewerCommand::Help => println!("{}", HELP),
                }
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *changes.borrow_and_update();
                match describe(assets, state) {
                    Some(line) => println!("{}", line),
                    None => break,
                }
            }
        }
    }

    Ok(())
}
