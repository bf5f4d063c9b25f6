//! Profile and feed read-model integration tests.
//!
//! Run with: `cargo test --test profile_queries`

use hikerealrs::clock::{now_millis, start_of_year_millis};
use hikerealrs::{
    BadgeLevel, BadgeType, EngineConfig, HikeEngine, PublishedHike, UserProfile, UserStats,
};
use tempfile::TempDir;

async fn setup_engine(config: EngineConfig) -> (HikeEngine, TempDir) {
    let _ = env_logger::builder().is_test(true).try_init();
    let tmp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = tmp_dir.path().join("profile.db");
    let config = EngineConfig {
        db_path: db_path.to_str().unwrap().to_string(),
        ..config
    };
    let engine = HikeEngine::open(config).await.expect("failed to open engine");
    (engine, tmp_dir)
}

fn published(id: &str, user_id: &str, distance: f64, elevation: i32, at: i64) -> PublishedHike {
    PublishedHike {
        id: id.to_string(),
        caption: format!("Hike {}", id),
        location_name: "Chamonix".to_string(),
        distance,
        elevation_gain: elevation,
        duration: 7_200_000,
        view_count: 0,
        like_count: 0,
        date: at,
        user_id: user_id.to_string(),
        author_name: "Jon".to_string(),
        author_picture: String::new(),
        front_photo_ref: Some("f.jpg".to_string()),
        back_photo_ref: Some("b.jpg".to_string()),
        group_size: 1,
        published_at: at,
    }
}

#[tokio::test]
async fn test_stats_for_user_without_hikes_are_zero() {
    let (engine, _tmp) = setup_engine(EngineConfig::default()).await;
    let stats = engine.user_stats("nobody").await.unwrap();
    assert_eq!(stats, UserStats::default());
    assert_eq!(stats.total_distance, 0.0);
    assert_eq!(stats.yearly_elevation, 0);
}

#[tokio::test]
async fn test_stats_split_lifetime_and_current_year() {
    let (engine, _tmp) = setup_engine(EngineConfig::default()).await;
    let year_start = start_of_year_millis(now_millis());

    engine
        .insert_hikes(vec![
            published("last-year", "u1", 20.0, 1_000, year_start - 1),
            published("this-year", "u1", 5.0, 250, year_start),
            published("someone-else", "u2", 7.0, 700, year_start + 10),
        ])
        .await
        .unwrap();

    let stats = engine.user_stats("u1").await.unwrap();
    assert_eq!(stats.hike_count, 2);
    assert_eq!(stats.total_distance, 25.0);
    assert_eq!(stats.total_elevation, 1_250);
    assert_eq!(stats.yearly_hike_count, 1);
    assert_eq!(stats.yearly_distance, 5.0);
    assert_eq!(stats.yearly_elevation, 250);
}

#[tokio::test]
async fn test_completed_hike_counts_towards_stats() {
    let (engine, _tmp) = setup_engine(EngineConfig::default()).await;
    let lifecycle = engine.lifecycle();
    let author = UserProfile {
        user_id: "u1".to_string(),
        username: "Jon".to_string(),
        profile_picture: String::new(),
    };

    let hike_id = lifecycle.start_new_hike("u1").await.unwrap();
    lifecycle.update_distance(&hike_id, 8.4).await.unwrap();
    lifecycle.attach_front_photo(&hike_id, "f.jpg").await.unwrap();
    lifecycle.attach_back_photo(&hike_id, "b.jpg").await.unwrap();
    lifecycle.complete_hike(&hike_id, &author).await.unwrap();

    let stats = engine.user_stats("u1").await.unwrap();
    assert_eq!(stats.hike_count, 1);
    assert_eq!(stats.yearly_hike_count, 1);
    assert_eq!(stats.total_distance, 8.4);
}

#[tokio::test]
async fn test_recent_hikes_limit_and_order() {
    let config = EngineConfig {
        recent_hikes_limit: 2,
        ..EngineConfig::default()
    };
    let (engine, _tmp) = setup_engine(config).await;
    engine
        .insert_hikes(vec![
            published("a", "u1", 1.0, 10, 1_000),
            published("b", "u1", 1.0, 10, 3_000),
            published("c", "u1", 1.0, 10, 2_000),
        ])
        .await
        .unwrap();

    let ids: Vec<String> = engine
        .recent_hikes("u1")
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.id)
        .collect();
    assert_eq!(ids, vec!["b", "c"]);
}

#[tokio::test]
async fn test_insert_hikes_replaces_by_id() {
    let (engine, _tmp) = setup_engine(EngineConfig::default()).await;
    engine
        .insert_hikes(vec![published("a", "u1", 1.0, 10, 1_000)])
        .await
        .unwrap();
    engine
        .insert_hikes(vec![published("a", "u1", 2.0, 10, 1_000)])
        .await
        .unwrap();

    assert_eq!(engine.hike_count().await.unwrap(), 1);
    assert_eq!(engine.recent_hikes("u1").await.unwrap()[0].distance, 2.0);
}

#[tokio::test]
async fn test_badges_seeded_once_across_restarts() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tmp_dir = TempDir::new().unwrap();
    let config = EngineConfig {
        db_path: tmp_dir.path().join("badges.db").to_str().unwrap().to_string(),
        seed_user_id: Some("u1".to_string()),
        ..EngineConfig::default()
    };

    drop(HikeEngine::open(config.clone()).await.unwrap());
    let engine = HikeEngine::open(config).await.unwrap();
    assert_eq!(engine.badge_count().await.unwrap(), 5);

    let badges = engine.recent_badges("u1").await.unwrap();
    assert_eq!(badges.len(), 5);
    assert_eq!(badges[0].name, "Weekly Warrior");
    assert_eq!(badges[4].name, "Explorer");

    let summit = badges.iter().find(|b| b.name == "Summit Seeker").unwrap();
    assert_eq!(summit.badge_type, BadgeType::Elevation);
    assert_eq!(summit.level, BadgeLevel::Gold);
    assert!(engine.recent_badges("u2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_feed_posts_newest_first() {
    let (engine, _tmp) = setup_engine(EngineConfig::default()).await;
    let now = now_millis();
    engine
        .insert_hikes(vec![
            published("old", "u1", 3.0, 100, now - 2 * 24 * 60 * 60 * 1000),
            published("new", "u2", 4.0, 200, now),
        ])
        .await
        .unwrap();

    let posts = engine.feed().await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "new");
    assert_eq!(posts[0].metrics.duration, "2h 0m");
    assert_eq!(posts[1].time_ago, "2d");
    assert_eq!(posts[1].dual_view.front_image_ref.as_deref(), Some("f.jpg"));
}
