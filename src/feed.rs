//! Feed posts: the presentation shape of a [`PublishedHike`].

use serde::{Deserialize, Serialize};

use crate::types::PublishedHike;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Front and back camera halves of a BeReal-style photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct DualViewImage {
    pub front_image_ref: Option<String>,
    pub back_image_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct FeedMetrics {
    /// Meters
    pub elevation: i32,
    /// Kilometers
    pub distance: f64,
    /// e.g. "3h 20m"
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    pub id: String,
    pub user_id: String,
    pub author_name: String,
    pub author_picture: String,
    pub time_ago: String,
    pub location_name: String,
    pub dual_view: DualViewImage,
    pub caption: String,
    pub is_liked: bool,
    pub group_size: u32,
    pub like_count: u32,
    pub metrics: FeedMetrics,
}

impl FeedPost {
    /// Build a post for display at `now` (epoch millis).
    pub fn from_hike(hike: &PublishedHike, now: i64) -> Self {
        Self {
            id: hike.id.clone(),
            user_id: hike.user_id.clone(),
            author_name: hike.author_name.clone(),
            author_picture: hike.author_picture.clone(),
            time_ago: time_ago(hike.published_at, now),
            location_name: hike.location_name.clone(),
            dual_view: DualViewImage {
                front_image_ref: hike.front_photo_ref.clone(),
                back_image_ref: hike.back_photo_ref.clone(),
            },
            caption: hike.caption.clone(),
            is_liked: false,
            group_size: hike.group_size,
            like_count: hike.like_count,
            metrics: FeedMetrics {
                elevation: hike.elevation_gain,
                distance: hike.distance,
                duration: format_duration(hike.duration),
            },
        }
    }
}

/// "1h 20m" when at least an hour, otherwise "20m".
pub fn format_duration(duration_ms: i64) -> String {
    let duration_ms = duration_ms.max(0);
    let hours = duration_ms / HOUR_MS;
    let minutes = (duration_ms / MINUTE_MS) % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Compact age of a post: "just now", "5m", "3h", "2d".
pub fn time_ago(published_at: i64, now: i64) -> String {
    let diff = now - published_at;
    if diff < MINUTE_MS {
        "just now".to_string()
    } else if diff < HOUR_MS {
        format!("{}m", diff / MINUTE_MS)
    } else if diff < DAY_MS {
        format!("{}h", diff / HOUR_MS)
    } else {
        format!("{}d", diff / DAY_MS)
    }
}
