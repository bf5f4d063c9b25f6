//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Database path used when none is configured (in-memory, for tests and previews).
pub const IN_MEMORY_DB: &str = ":memory:";

/// Configuration for [`crate::HikeEngine`].
///
/// Every field has a default so a partial JSON document is enough:
///
/// ```rust
/// use hikerealrs::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{"dbPath": "/data/hikes.db"}"#).unwrap();
/// assert_eq!(config.db_path, "/data/hikes.db");
/// assert_eq!(config.recent_hikes_limit, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// SQLite database file
    pub db_path: String,
    /// Seed the starter badges for this user when the badge table is empty
    pub seed_user_id: Option<String>,
    /// Seed demo hikes when the hike table is empty (requires `seed_user_id`)
    pub seed_demo_hikes: bool,
    /// Page size for the profile's recent hikes
    pub recent_hikes_limit: u32,
    /// Page size for the profile's recent badges
    pub recent_badges_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: IN_MEMORY_DB.to_string(),
            seed_user_id: None,
            seed_demo_hikes: false,
            recent_hikes_limit: 10,
            recent_badges_limit: 10,
        }
    }
}

impl EngineConfig {
    pub fn with_db_path(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
