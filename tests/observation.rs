//! Live query integration tests.
//!
//! Run with: `cargo test --test observation`

use std::time::Duration;

use futures::StreamExt;
use hikerealrs::{EngineConfig, HikeEngine, HikeStatus, PublishedHike, UserProfile};

const QUIET: Duration = Duration::from_millis(50);

async fn setup_engine() -> HikeEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    HikeEngine::open(EngineConfig::default())
        .await
        .expect("failed to open engine")
}

fn jon() -> UserProfile {
    UserProfile {
        user_id: "u1".to_string(),
        username: "Jon".to_string(),
        profile_picture: String::new(),
    }
}

#[tokio::test]
async fn test_active_hike_stream_follows_lifecycle() {
    let engine = setup_engine().await;
    let lifecycle = engine.lifecycle();
    let mut current = lifecycle.observe_current_active_hike();

    assert_eq!(current.next().await.unwrap().unwrap(), None);

    let hike_id = lifecycle.start_new_hike("u1").await.unwrap();
    let started = current.next().await.unwrap().unwrap().unwrap();
    assert_eq!(started.id, hike_id);
    assert_eq!(started.status, HikeStatus::Active);

    lifecycle.pause(&hike_id).await.unwrap();
    let paused = current.next().await.unwrap().unwrap().unwrap();
    assert_eq!(paused.status, HikeStatus::Paused);

    lifecycle.update_distance(&hike_id, 2.5).await.unwrap();
    let moved = current.next().await.unwrap().unwrap().unwrap();
    assert_eq!(moved.current_distance, 2.5);

    lifecycle.attach_front_photo(&hike_id, "f.jpg").await.unwrap();
    lifecycle.attach_back_photo(&hike_id, "b.jpg").await.unwrap();
    lifecycle.complete_hike(&hike_id, &jon()).await.unwrap();

    // Intermediate photo updates may coalesce; the stream settles on None
    let mut last = current.next().await.unwrap().unwrap();
    while last.is_some() {
        last = current.next().await.unwrap().unwrap();
    }
    assert!(tokio::time::timeout(QUIET, current.next()).await.is_err());
}

#[tokio::test]
async fn test_rejected_command_emits_nothing() {
    let engine = setup_engine().await;
    let lifecycle = engine.lifecycle();
    let hike_id = lifecycle.start_new_hike("u1").await.unwrap();

    let mut current = lifecycle.observe_current_active_hike();
    assert!(current.next().await.unwrap().unwrap().is_some());

    assert!(lifecycle.start_new_hike("u2").await.is_err());
    assert!(lifecycle.complete_hike(&hike_id, &jon()).await.is_err());
    assert!(tokio::time::timeout(QUIET, current.next()).await.is_err());
}

#[tokio::test]
async fn test_dropped_stream_does_not_affect_writes() {
    let engine = setup_engine().await;
    let lifecycle = engine.lifecycle();

    let mut current = lifecycle.observe_current_active_hike();
    assert_eq!(current.next().await.unwrap().unwrap(), None);
    drop(current);

    let hike_id = lifecycle.start_new_hike("u1").await.unwrap();
    lifecycle.update_distance(&hike_id, 1.0).await.unwrap();
    lifecycle.cancel_hike(&hike_id).await.unwrap();
    assert!(lifecycle.current_active_hike_id().await.unwrap().is_none());

    // A fresh subscription starts from the current state
    let mut fresh = lifecycle.observe_current_active_hike();
    assert_eq!(fresh.next().await.unwrap().unwrap(), None);
}

#[tokio::test]
async fn test_profile_streams_update_on_completion() {
    let engine = setup_engine().await;
    let lifecycle = engine.lifecycle();
    let mut stats = engine.observe_user_stats("u1");
    let mut recent = engine.observe_recent_hikes("u1");
    let mut feed = engine.observe_feed();

    assert_eq!(stats.next().await.unwrap().unwrap().hike_count, 0);
    assert!(recent.next().await.unwrap().unwrap().is_empty());
    assert!(feed.next().await.unwrap().unwrap().is_empty());

    let hike_id = lifecycle.start_new_hike("u1").await.unwrap();
    lifecycle.update_distance(&hike_id, 9.5).await.unwrap();
    lifecycle.attach_front_photo(&hike_id, "f.jpg").await.unwrap();
    lifecycle.attach_back_photo(&hike_id, "b.jpg").await.unwrap();

    // Active hike writes do not touch the hike table
    assert!(tokio::time::timeout(QUIET, stats.next()).await.is_err());

    lifecycle.complete_hike(&hike_id, &jon()).await.unwrap();
    let updated = stats.next().await.unwrap().unwrap();
    assert_eq!(updated.hike_count, 1);
    assert_eq!(updated.total_distance, 9.5);

    let hikes: Vec<PublishedHike> = recent.next().await.unwrap().unwrap();
    assert_eq!(hikes[0].id, hike_id);
    assert_eq!(feed.next().await.unwrap().unwrap()[0].author_name, "Jon");
}

#[tokio::test]
async fn test_badge_stream_sees_seeding() {
    let engine = setup_engine().await;
    let mut badges = engine.observe_recent_badges("u1");
    assert!(badges.next().await.unwrap().unwrap().is_empty());

    engine.initialize_user("u1").await.unwrap();
    assert_eq!(badges.next().await.unwrap().unwrap().len(), 5);

    // Seeding again writes nothing, so nothing is emitted
    engine.initialize_user("u1").await.unwrap();
    assert!(tokio::time::timeout(QUIET, badges.next()).await.is_err());
}
