//! Unified error handling for the hike core.
//!
//! Every lifecycle command reports failures through [`HikeError`]. The
//! presentation layer maps [`HikeErrorKind`] to a localized message; the core
//! itself carries no user-facing text beyond `Display`.

use rusqlite::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for hike operations.
#[derive(Debug, Error)]
pub enum HikeError {
    /// A hike is already ACTIVE or PAUSED, a second one cannot start
    #[error("a hike is already in progress ({hike_id})")]
    ActiveHikeAlreadyExists { hike_id: String },

    /// The id is unknown or the hike is no longer ACTIVE/PAUSED
    #[error("no active hike with id '{hike_id}'")]
    NoActiveHike { hike_id: String },

    /// Completion requires both halves of the dual-view photo
    #[error(
        "hike '{hike_id}' is missing required photos (front missing: {missing_front}, back missing: {missing_back})"
    )]
    MissingRequiredPhotos {
        hike_id: String,
        missing_front: bool,
        missing_back: bool,
    },

    /// Failure reported by SQLite
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Schema migration failed
    #[error("migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    /// Engine configuration could not be parsed
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

/// Flat classification of [`HikeError`], stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HikeErrorKind {
    ActiveHikeAlreadyExists,
    NoActiveHike,
    MissingRequiredPhotos,
    StorageFailure,
    InvalidConfig,
}

impl HikeError {
    pub fn kind(&self) -> HikeErrorKind {
        match self {
            HikeError::ActiveHikeAlreadyExists { .. } => HikeErrorKind::ActiveHikeAlreadyExists,
            HikeError::NoActiveHike { .. } => HikeErrorKind::NoActiveHike,
            HikeError::MissingRequiredPhotos { .. } => HikeErrorKind::MissingRequiredPhotos,
            HikeError::Storage(_) | HikeError::Migration(_) => HikeErrorKind::StorageFailure,
            HikeError::InvalidConfig(_) => HikeErrorKind::InvalidConfig,
        }
    }

    pub(crate) fn no_active_hike(hike_id: &str) -> Self {
        HikeError::NoActiveHike {
            hike_id: hike_id.to_string(),
        }
    }
}

/// Result type alias for hike operations.
pub type Result<T> = std::result::Result<T, HikeError>;

/// True when SQLite rejected a write because of a UNIQUE constraint.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
