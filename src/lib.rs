//! hikerealrs - core of the HikeReal hiking app
//!
//! This crate provides:
//! - The active hike lifecycle (start, pause, resume, telemetry, dual-view
//!   photos, complete, cancel) with at most one hike in progress
//! - SQLite persistence for active hikes, published hikes and badges
//! - Push-based live queries for the active hike, profile and feed screens
//! - UniFFI bindings for iOS/Android (feature `ffi`)

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod lifecycle;
pub mod migrations;
pub mod observe;
pub mod persistence;
pub mod seed;
pub mod types;

// FFI bindings for mobile platforms
#[cfg(feature = "ffi")]
pub mod ffi;

pub use config::EngineConfig;
pub use engine::HikeEngine;
pub use error::{HikeError, HikeErrorKind, Result};
pub use feed::FeedPost;
pub use lifecycle::HikeLifecycle;
pub use observe::{Observation, Table};
pub use persistence::Database;
pub use types::{
    ActiveHike, Badge, BadgeLevel, BadgeType, HikeStatus, LocationUpdate, PublishedHike,
    TelemetryUpdate, UserProfile, UserStats,
};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android
#[cfg(target_os = "android")]
pub fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("hikerealrs"),
    );
}

/// Initialize logging for iOS (unified logging)
#[cfg(target_os = "ios")]
pub fn init_logging() {
    use log::LevelFilter;

    // Fails only if a logger is already installed
    let _ = oslog::OsLogger::new("app.hikereal.core")
        .level_filter(LevelFilter::Debug)
        .init();
}

#[cfg(not(any(target_os = "android", target_os = "ios")))]
pub fn init_logging() {
    // No-op elsewhere; hosts install their own logger
}
