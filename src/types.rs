//! Domain types shared by the stores, the lifecycle manager and the FFI boundary.
//!
//! Units: distances in kilometres, speeds in km/h, elevation in metres,
//! durations and timestamps in milliseconds (timestamps since the Unix epoch).

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

// ============================================================================
// Active Hike
// ============================================================================

/// Lifecycle status of an active hike row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HikeStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl HikeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HikeStatus::Active => "ACTIVE",
            HikeStatus::Paused => "PAUSED",
            HikeStatus::Completed => "COMPLETED",
            HikeStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(HikeStatus::Active),
            "PAUSED" => Some(HikeStatus::Paused),
            "COMPLETED" => Some(HikeStatus::Completed),
            "CANCELLED" => Some(HikeStatus::Cancelled),
            _ => None,
        }
    }

    /// ACTIVE or PAUSED: the hike still accepts commands.
    pub fn is_live(&self) -> bool {
        matches!(self, HikeStatus::Active | HikeStatus::Paused)
    }
}

impl ToSql for HikeStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for HikeStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        HikeStatus::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown hike status '{}'", s).into()))
    }
}

/// The in-progress hike and its mutable telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct ActiveHike {
    pub id: String,
    pub start_time: i64,
    pub pause_time: Option<i64>,
    pub end_time: Option<i64>,
    pub status: HikeStatus,

    /// Dual-view photo references, opaque to the core
    pub front_photo_ref: Option<String>,
    pub back_photo_ref: Option<String>,

    pub current_distance: f64,
    pub current_elevation_gain: i32,
    pub current_duration: i64,
    pub max_speed: f64,
    pub average_speed: f64,
    pub total_ascent: i32,
    pub total_descent: i32,
    pub calories_burned: i32,

    pub start_location_name: Option<String>,
    pub current_location_name: Option<String>,
    pub last_location_timestamp: Option<i64>,
    pub tracked_locations_count: u32,

    pub user_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ActiveHike {
    /// A freshly started hike with zeroed telemetry.
    pub fn new(id: String, user_id: String, now: i64) -> Self {
        Self {
            id,
            start_time: now,
            pause_time: None,
            end_time: None,
            status: HikeStatus::Active,
            front_photo_ref: None,
            back_photo_ref: None,
            current_distance: 0.0,
            current_elevation_gain: 0,
            current_duration: 0,
            max_speed: 0.0,
            average_speed: 0.0,
            total_ascent: 0,
            total_descent: 0,
            calories_burned: 0,
            start_location_name: None,
            current_location_name: None,
            last_location_timestamp: None,
            tracked_locations_count: 0,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    pub fn has_required_photos(&self) -> bool {
        self.front_photo_ref.is_some() && self.back_photo_ref.is_some()
    }
}

/// Sparse telemetry patch: `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryUpdate {
    pub distance: Option<f64>,
    pub duration: Option<i64>,
    pub elevation_gain: Option<i32>,
    pub max_speed: Option<f64>,
    pub average_speed: Option<f64>,
    pub total_ascent: Option<i32>,
    pub total_descent: Option<i32>,
    pub calories_burned: Option<i32>,
}

impl TelemetryUpdate {
    pub fn distance(distance: f64) -> Self {
        Self {
            distance: Some(distance),
            ..Self::default()
        }
    }

    /// Merge onto a snapshot, leaving unsupplied fields untouched.
    pub fn apply(&self, hike: &ActiveHike) -> ActiveHike {
        ActiveHike {
            current_distance: self.distance.unwrap_or(hike.current_distance),
            current_duration: self.duration.unwrap_or(hike.current_duration),
            current_elevation_gain: self.elevation_gain.unwrap_or(hike.current_elevation_gain),
            max_speed: self.max_speed.unwrap_or(hike.max_speed),
            average_speed: self.average_speed.unwrap_or(hike.average_speed),
            total_ascent: self.total_ascent.unwrap_or(hike.total_ascent),
            total_descent: self.total_descent.unwrap_or(hike.total_descent),
            calories_burned: self.calories_burned.unwrap_or(hike.calories_burned),
            ..hike.clone()
        }
    }
}

/// A location sample reported while hiking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    /// Reverse-geocoded place name, if known
    pub name: Option<String>,
    /// When the sample was taken
    pub timestamp: i64,
}

// ============================================================================
// Published Hike
// ============================================================================

/// Feed-visible record created when an active hike completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct PublishedHike {
    pub id: String,
    pub caption: String,
    pub location_name: String,
    pub distance: f64,
    pub elevation_gain: i32,
    pub duration: i64,
    pub view_count: u32,
    pub like_count: u32,
    /// Start of the hike
    pub date: i64,
    pub user_id: String,
    pub author_name: String,
    pub author_picture: String,
    /// Seeded demo hikes carry no photos
    pub front_photo_ref: Option<String>,
    pub back_photo_ref: Option<String>,
    pub group_size: u32,
    pub published_at: i64,
}

/// Author data supplied by the user-identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub profile_picture: String,
}

/// Totals for the profile screen. Sums over no hikes are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub hike_count: u32,
    pub total_distance: f64,
    pub total_elevation: i64,
    pub yearly_hike_count: u32,
    pub yearly_distance: f64,
    pub yearly_elevation: i64,
}

// ============================================================================
// Badges
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeType {
    Distance,
    Elevation,
    Speed,
    Explore,
    Streak,
    Social,
    Special,
}

impl BadgeType {
    const ALL: [BadgeType; 7] = [
        BadgeType::Distance,
        BadgeType::Elevation,
        BadgeType::Speed,
        BadgeType::Explore,
        BadgeType::Streak,
        BadgeType::Social,
        BadgeType::Special,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeType::Distance => "DISTANCE",
            BadgeType::Elevation => "ELEVATION",
            BadgeType::Speed => "SPEED",
            BadgeType::Explore => "EXPLORE",
            BadgeType::Streak => "STREAK",
            BadgeType::Social => "SOCIAL",
            BadgeType::Special => "SPECIAL",
        }
    }

    /// Case-insensitive; anything unrecognised is a special badge.
    pub fn parse(s: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .unwrap_or(BadgeType::Special)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BadgeType::Distance => "Distance",
            BadgeType::Elevation => "Elevation",
            BadgeType::Speed => "Speed",
            BadgeType::Explore => "Exploration",
            BadgeType::Streak => "Streak",
            BadgeType::Social => "Social",
            BadgeType::Special => "Special",
        }
    }
}

/// Badge tier, stored as ordinal 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeLevel {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl BadgeLevel {
    /// Out-of-range ordinals fall back to bronze.
    pub fn from_ordinal(ordinal: i32) -> Self {
        match ordinal {
            2 => BadgeLevel::Silver,
            3 => BadgeLevel::Gold,
            4 => BadgeLevel::Platinum,
            _ => BadgeLevel::Bronze,
        }
    }

    pub fn ordinal(&self) -> i32 {
        match self {
            BadgeLevel::Bronze => 1,
            BadgeLevel::Silver => 2,
            BadgeLevel::Gold => 3,
            BadgeLevel::Platinum => 4,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BadgeLevel::Bronze => "Bronze",
            BadgeLevel::Silver => "Silver",
            BadgeLevel::Gold => "Gold",
            BadgeLevel::Platinum => "Platinum",
        }
    }

    /// ARGB colour of the tier.
    pub fn color_argb(&self) -> u32 {
        match self {
            BadgeLevel::Bronze => 0xFFCD7F32,
            BadgeLevel::Silver => 0xFFC0C0C0,
            BadgeLevel::Gold => 0xFFFFD700,
            BadgeLevel::Platinum => 0xFF43B0F1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub badge_type: BadgeType,
    pub level: BadgeLevel,
    pub date_earned: i64,
    pub user_id: String,
}
