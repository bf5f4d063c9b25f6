//! Published hike store (the feed table).

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::types::{PublishedHike, UserStats};

const COLUMNS: &str = "id, caption, location_name, distance, elevation_gain, duration, view_count,
     like_count, date, user_id, author_name, author_picture, front_photo_ref, back_photo_ref,
     group_size, published_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<PublishedHike> {
    Ok(PublishedHike {
        id: row.get(0)?,
        caption: row.get(1)?,
        location_name: row.get(2)?,
        distance: row.get(3)?,
        elevation_gain: row.get(4)?,
        duration: row.get(5)?,
        view_count: row.get(6)?,
        like_count: row.get(7)?,
        date: row.get(8)?,
        user_id: row.get(9)?,
        author_name: row.get(10)?,
        author_picture: row.get(11)?,
        front_photo_ref: row.get(12)?,
        back_photo_ref: row.get(13)?,
        group_size: row.get(14)?,
        published_at: row.get(15)?,
    })
}

fn write_row(conn: &Connection, verb: &str, hike: &PublishedHike) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(&format!(
        "{verb} INTO hikes ({COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
    ))?;
    stmt.execute(params![
        hike.id,
        hike.caption,
        hike.location_name,
        hike.distance,
        hike.elevation_gain,
        hike.duration,
        hike.view_count,
        hike.like_count,
        hike.date,
        hike.user_id,
        hike.author_name,
        hike.author_picture,
        hike.front_photo_ref,
        hike.back_photo_ref,
        hike.group_size,
        hike.published_at,
    ])?;
    Ok(())
}

/// Append one hike. An existing id is an error: a hike is published once.
pub fn insert(conn: &Connection, hike: &PublishedHike) -> rusqlite::Result<()> {
    write_row(conn, "INSERT", hike)
}

/// Insert-or-replace by id.
pub fn insert_many(conn: &Connection, hikes: &[PublishedHike]) -> rusqlite::Result<()> {
    for hike in hikes {
        write_row(conn, "INSERT OR REPLACE", hike)?;
    }
    Ok(())
}

pub fn count(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("SELECT COUNT(id) FROM hikes", [], |row| row.get(0))
}

pub fn get_by_id(conn: &Connection, hike_id: &str) -> rusqlite::Result<Option<PublishedHike>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM hikes WHERE id = ?1"),
        params![hike_id],
        from_row,
    )
    .optional()
}

/// A user's hikes, most recent hike date first.
pub fn recent_for_user(
    conn: &Connection,
    user_id: &str,
    limit: u32,
) -> rusqlite::Result<Vec<PublishedHike>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM hikes WHERE user_id = ?1 ORDER BY date DESC, id LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![user_id, limit], from_row)?;
    rows.collect()
}

/// Every published hike, newest publication first.
pub fn feed(conn: &Connection) -> rusqlite::Result<Vec<PublishedHike>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM hikes ORDER BY published_at DESC, id"
    ))?;
    let rows = stmt.query_map([], from_row)?;
    rows.collect()
}

/// Totals for one user, with "yearly" meaning published at or after `year_start`.
///
/// Sums over zero rows come back as zero, never NULL.
pub fn stats_for_user(
    conn: &Connection,
    user_id: &str,
    year_start: i64,
) -> rusqlite::Result<UserStats> {
    conn.query_row(
        "SELECT
            COUNT(*),
            COALESCE(SUM(distance), 0.0),
            COALESCE(SUM(elevation_gain), 0),
            COALESCE(SUM(CASE WHEN published_at >= ?2 THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN published_at >= ?2 THEN distance ELSE 0.0 END), 0.0),
            COALESCE(SUM(CASE WHEN published_at >= ?2 THEN elevation_gain ELSE 0 END), 0)
         FROM hikes
         WHERE user_id = ?1",
        params![user_id, year_start],
        |row| {
            Ok(UserStats {
                hike_count: row.get(0)?,
                total_distance: row.get(1)?,
                total_elevation: row.get(2)?,
                yearly_hike_count: row.get(3)?,
                yearly_distance: row.get(4)?,
                yearly_elevation: row.get(5)?,
            })
        },
    )
}
