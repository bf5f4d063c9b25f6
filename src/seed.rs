//! Starter data: the badge set every new profile shows, plus optional demo hikes.
//!
//! Both seeders only write into an empty table, so running them on every
//! start is safe.

use log::info;

use crate::clock::now_millis;
use crate::error::Result;
use crate::observe::Table;
use crate::persistence::{badges, hikes, Database};
use crate::types::{Badge, BadgeLevel, BadgeType, PublishedHike};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// The five starter badges for `user_id`, earned relative to `now`.
pub fn starter_badges(user_id: &str, now: i64) -> Vec<Badge> {
    let badge = |id: &str,
                 name: &str,
                 description: &str,
                 badge_type: BadgeType,
                 level: BadgeLevel,
                 days_ago: i64| Badge {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        badge_type,
        level,
        date_earned: now - days_ago * DAY_MS,
        user_id: user_id.to_string(),
    };

    vec![
        badge(
            "1",
            "Distance Master",
            "Hike over 100km total",
            BadgeType::Distance,
            BadgeLevel::Bronze,
            10,
        ),
        badge(
            "2",
            "Summit Seeker",
            "Reach 5000m elevation gain total",
            BadgeType::Elevation,
            BadgeLevel::Gold,
            5,
        ),
        badge(
            "3",
            "Explorer",
            "Visit 3 different regions",
            BadgeType::Explore,
            BadgeLevel::Bronze,
            15,
        ),
        badge(
            "4",
            "Weekly Warrior",
            "Hike for 3 consecutive weeks",
            BadgeType::Streak,
            BadgeLevel::Bronze,
            2,
        ),
        badge(
            "5",
            "Speed Demon",
            "Maintain 5km/h average on a 10km+ hike",
            BadgeType::Speed,
            BadgeLevel::Bronze,
            7,
        ),
    ]
}

/// Three sample hikes for `user_id`, used to populate an empty profile.
pub fn demo_hikes(user_id: &str) -> Vec<PublishedHike> {
    let hike = |id: &str,
                name: &str,
                distance: f64,
                elevation_gain: i32,
                views: u32,
                likes: u32,
                date: i64| PublishedHike {
        id: id.to_string(),
        caption: name.to_string(),
        location_name: name.to_string(),
        distance,
        elevation_gain,
        duration: 0,
        view_count: views,
        like_count: likes,
        date,
        user_id: user_id.to_string(),
        author_name: String::new(),
        author_picture: String::new(),
        front_photo_ref: None,
        back_photo_ref: None,
        group_size: 1,
        published_at: date,
    };

    vec![
        hike("demo-1", "Mont Blanc Circuit", 24.5, 1850, 328, 45, 1_709_766_000_000),
        hike("demo-2", "Alpine Lake Loop", 16.2, 760, 156, 32, 1_709_161_200_000),
        hike("demo-3", "Valley Trail", 12.8, 520, 203, 28, 1_708_556_400_000),
    ]
}

/// Insert the starter badges if no badge exists yet. Returns how many were written.
pub async fn seed_badges_if_empty(db: &Database, user_id: &str) -> Result<u32> {
    let user_id = user_id.to_string();
    let written = db
        .write(&[Table::Badges], move |tx| {
            if badges::count(tx)? > 0 {
                return Ok(0);
            }
            let seed = starter_badges(&user_id, now_millis());
            badges::insert_many(tx, &seed)?;
            Ok(seed.len() as u32)
        })
        .await?;

    if written > 0 {
        info!("[HikeSeed] Seeded {} badges", written);
    }
    Ok(written)
}

/// Insert the demo hikes if the hike table is empty. Returns how many were written.
pub async fn seed_demo_hikes_if_empty(db: &Database, user_id: &str) -> Result<u32> {
    let user_id = user_id.to_string();
    let written = db
        .write(&[Table::Hikes], move |tx| {
            if hikes::count(tx)? > 0 {
                return Ok(0);
            }
            let seed = demo_hikes(&user_id);
            hikes::insert_many(tx, &seed)?;
            Ok(seed.len() as u32)
        })
        .await?;

    if written > 0 {
        info!("[HikeSeed] Seeded {} demo hikes", written);
    }
    Ok(written)
}
