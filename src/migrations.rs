//! Schema migrations.
//!
//! Versions are tracked in SQLite's `user_version` by `rusqlite_migration`.
//! Append new steps, never edit a released one.

use log::info;
use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};

use crate::error::Result;

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // v1: the three tables
        M::up(
            r#"
            -- In-progress hike with mutable telemetry
            CREATE TABLE active_hikes (
                id TEXT PRIMARY KEY,
                start_time INTEGER NOT NULL,
                pause_time INTEGER,
                end_time INTEGER,
                status TEXT NOT NULL CHECK(status IN ('ACTIVE', 'PAUSED', 'COMPLETED', 'CANCELLED')),
                front_photo_ref TEXT,
                back_photo_ref TEXT,
                current_distance REAL NOT NULL DEFAULT 0,
                current_elevation_gain INTEGER NOT NULL DEFAULT 0,
                current_duration INTEGER NOT NULL DEFAULT 0,
                max_speed REAL NOT NULL DEFAULT 0,
                average_speed REAL NOT NULL DEFAULT 0,
                total_ascent INTEGER NOT NULL DEFAULT 0,
                total_descent INTEGER NOT NULL DEFAULT 0,
                calories_burned INTEGER NOT NULL DEFAULT 0,
                start_location_name TEXT,
                current_location_name TEXT,
                last_location_timestamp INTEGER,
                tracked_locations_count INTEGER NOT NULL DEFAULT 0,
                user_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            -- Published hikes (feed), append-only
            CREATE TABLE hikes (
                id TEXT PRIMARY KEY,
                caption TEXT NOT NULL,
                location_name TEXT NOT NULL,
                distance REAL NOT NULL,
                elevation_gain INTEGER NOT NULL,
                duration INTEGER NOT NULL,
                view_count INTEGER NOT NULL DEFAULT 0,
                like_count INTEGER NOT NULL DEFAULT 0,
                date INTEGER NOT NULL,
                user_id TEXT NOT NULL,
                author_name TEXT NOT NULL,
                author_picture TEXT NOT NULL,
                front_photo_ref TEXT,
                back_photo_ref TEXT,
                group_size INTEGER NOT NULL DEFAULT 1,
                published_at INTEGER NOT NULL
            );

            CREATE TABLE badges (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                type TEXT NOT NULL,
                level INTEGER NOT NULL,
                date_earned INTEGER NOT NULL,
                user_id TEXT NOT NULL
            );

            CREATE INDEX idx_hikes_user_date ON hikes(user_id, date);
            CREATE INDEX idx_hikes_published ON hikes(published_at);
            CREATE INDEX idx_badges_user_earned ON badges(user_id, date_earned);
            "#,
        ),
        // v2: at most one ACTIVE/PAUSED row, system-wide.
        // Every indexed row has the same key, so a second live row is a UNIQUE violation.
        M::up(
            r#"
            CREATE UNIQUE INDEX idx_active_hikes_single_live
            ON active_hikes((status IN ('ACTIVE', 'PAUSED')))
            WHERE status IN ('ACTIVE', 'PAUSED');
            "#,
        ),
    ])
}

/// Bring the database to the latest schema version.
pub fn run(conn: &mut Connection) -> Result<()> {
    let before: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    migrations().to_latest(conn)?;
    let after: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if after != before {
        info!("[HikeDb] Migrated schema from v{} to v{}", before, after);
    }
    Ok(())
}
