//! ライトボックスと自動再生タイマーのテスト
//!
//! tokio の時間を止めた状態で進め、タイマーの開始・停止を検証

use event_gallery::common::SlideshowState;
use event_gallery::lightbox::Lightbox;
use std::time::Duration;
use tokio::time::sleep;

const TICK: Duration = Duration::from_millis(3000);

fn index(lightbox: &Lightbox) -> Option<usize> {
    lightbox.state().open_index
}

#[tokio::test(start_paused = true)]
async fn test_three_items_wraparound() {
    let mut lightbox = Lightbox::new(3, TICK);
    lightbox.open(0).unwrap();
    assert_eq!(index(&lightbox), Some(0));
    lightbox.next();
    assert_eq!(index(&lightbox), Some(1));
    lightbox.next();
    assert_eq!(index(&lightbox), Some(2));
    lightbox.next();
    assert_eq!(index(&lightbox), Some(0));
    lightbox.prev();
    assert_eq!(index(&lightbox), Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_open_out_of_range() {
    let mut lightbox = Lightbox::new(2, TICK);
    assert!(lightbox.open(2).is_err());
    assert_eq!(lightbox.state(), SlideshowState::default());
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_advances_every_interval() {
    let mut lightbox = Lightbox::new(3, TICK);
    lightbox.open(1).unwrap();
    lightbox.toggle_play();
    assert!(lightbox.has_active_timer());
    assert_eq!(
        lightbox.state(),
        SlideshowState { open_index: Some(1), is_playing: true }
    );

    sleep(Duration::from_millis(2900)).await;
    assert_eq!(index(&lightbox), Some(1));
    sleep(Duration::from_millis(200)).await;
    assert_eq!(index(&lightbox), Some(2));
    sleep(TICK).await;
    assert_eq!(index(&lightbox), Some(0));
}

/// 再生を2回切り替えると元の表示に戻り、タイマーは残らない
#[tokio::test(start_paused = true)]
async fn test_toggle_twice_leaves_no_timer() {
    let mut lightbox = Lightbox::new(4, TICK);
    lightbox.open(2).unwrap();
    lightbox.toggle_play();
    lightbox.toggle_play();

    assert!(!lightbox.has_active_timer());
    assert_eq!(
        lightbox.state(),
        SlideshowState { open_index: Some(2), is_playing: false }
    );

    sleep(TICK * 5).await;
    assert_eq!(index(&lightbox), Some(2));
}

/// 再生中に閉じたら、時間が進んでも状態は変わらない
#[tokio::test(start_paused = true)]
async fn test_close_while_playing_stops_timer() {
    let mut lightbox = Lightbox::new(3, TICK);
    let mut changes = lightbox.subscribe();
    lightbox.open(0).unwrap();
    lightbox.toggle_play();
    sleep(TICK + Duration::from_millis(100)).await;
    assert_eq!(index(&lightbox), Some(1));

    lightbox.close();
    assert!(!lightbox.has_active_timer());
    assert_eq!(lightbox.state(), SlideshowState::default());
    changes.borrow_and_update();

    sleep(TICK * 5).await;
    assert_eq!(lightbox.state(), SlideshowState::default());
    assert!(!changes.has_changed().unwrap());
}

/// 手動で進めてもタイマーの周期は変わらない
#[tokio::test(start_paused = true)]
async fn test_manual_nudge_keeps_schedule() {
    let mut lightbox = Lightbox::new(5, TICK);
    lightbox.open(0).unwrap();
    lightbox.toggle_play();

    sleep(Duration::from_millis(1000)).await;
    lightbox.next();
    assert_eq!(index(&lightbox), Some(1));

    // 3000ms 時点で元の周期どおりに進む
    sleep(Duration::from_millis(2100)).await;
    assert_eq!(index(&lightbox), Some(2));
    assert!(lightbox.state().is_playing);
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_publishes_changes() {
    let mut lightbox = Lightbox::new(2, TICK);
    let mut changes = lightbox.subscribe();
    lightbox.open(0).unwrap();
    lightbox.toggle_play();
    changes.borrow_and_update();

    changes.changed().await.unwrap();
    assert_eq!(
        *changes.borrow_and_update(),
        SlideshowState { open_index: Some(1), is_playing: true }
    );
}

/// 一覧が空になったら閉じてタイマーも止める
#[tokio::test(start_paused = true)]
async fn test_listing_emptied_while_playing() {
    let mut lightbox = Lightbox::new(2, TICK);
    lightbox.open(1).unwrap();
    lightbox.toggle_play();
    lightbox.set_len(0);

    assert!(!lightbox.has_active_timer());
    assert_eq!(lightbox.state(), SlideshowState::default());
    assert!(lightbox.is_empty());
}

/// 破棄したらタイマーも止まる
#[tokio::test(start_paused = true)]
async fn test_drop_cancels_timer() {
    let mut lightbox = Lightbox::new(3, TICK);
    let mut changes = lightbox.subscribe();
    lightbox.open(0).unwrap();
    lightbox.toggle_play();
    changes.borrow_and_update();
    drop(lightbox);

    sleep(TICK * 3).await;
    // 送信側（タスクが持つ分も含めて）が消えている
    assert!(changes.changed().await.is_err());
}
