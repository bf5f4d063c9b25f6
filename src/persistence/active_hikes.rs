//! Active hike store.
//!
//! Row-level access to `active_hikes`. No business rules here: status checks
//! belong to [`crate::lifecycle`].

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::types::{ActiveHike, HikeStatus};

const COLUMNS: &str = "id, start_time, pause_time, end_time, status, front_photo_ref, back_photo_ref,
     current_distance, current_elevation_gain, current_duration, max_speed, average_speed,
     total_ascent, total_descent, calories_burned, start_location_name, current_location_name,
     last_location_timestamp, tracked_locations_count, user_id, created_at, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<ActiveHike> {
    Ok(ActiveHike {
        id: row.get(0)?,
        start_time: row.get(1)?,
        pause_time: row.get(2)?,
        end_time: row.get(3)?,
        status: row.get(4)?,
        front_photo_ref: row.get(5)?,
        back_photo_ref: row.get(6)?,
        current_distance: row.get(7)?,
        current_elevation_gain: row.get(8)?,
        current_duration: row.get(9)?,
        max_speed: row.get(10)?,
        average_speed: row.get(11)?,
        total_ascent: row.get(12)?,
        total_descent: row.get(13)?,
        calories_burned: row.get(14)?,
        start_location_name: row.get(15)?,
        current_location_name: row.get(16)?,
        last_location_timestamp: row.get(17)?,
        tracked_locations_count: row.get(18)?,
        user_id: row.get(19)?,
        created_at: row.get(20)?,
        updated_at: row.get(21)?,
    })
}

/// Insert a new row. Fails with a UNIQUE violation if it would be a second live hike.
pub fn insert(conn: &Connection, hike: &ActiveHike) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO active_hikes ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20, ?21, ?22)"
        ),
        params![
            hike.id,
            hike.start_time,
            hike.pause_time,
            hike.end_time,
            hike.status,
            hike.front_photo_ref,
            hike.back_photo_ref,
            hike.current_distance,
            hike.current_elevation_gain,
            hike.current_duration,
            hike.max_speed,
            hike.average_speed,
            hike.total_ascent,
            hike.total_descent,
            hike.calories_burned,
            hike.start_location_name,
            hike.current_location_name,
            hike.last_location_timestamp,
            hike.tracked_locations_count,
            hike.user_id,
            hike.created_at,
            hike.updated_at,
        ],
    )?;
    Ok(())
}

/// Overwrite every mutable column of an existing row. Returns false if the id is unknown.
pub fn update(conn: &Connection, hike: &ActiveHike) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE active_hikes SET
            pause_time = ?2, end_time = ?3, status = ?4,
            front_photo_ref = ?5, back_photo_ref = ?6,
            current_distance = ?7, current_elevation_gain = ?8, current_duration = ?9,
            max_speed = ?10, average_speed = ?11, total_ascent = ?12, total_descent = ?13,
            calories_burned = ?14, start_location_name = ?15, current_location_name = ?16,
            last_location_timestamp = ?17, tracked_locations_count = ?18, updated_at = ?19
         WHERE id = ?1",
        params![
            hike.id,
            hike.pause_time,
            hike.end_time,
            hike.status,
            hike.front_photo_ref,
            hike.back_photo_ref,
            hike.current_distance,
            hike.current_elevation_gain,
            hike.current_duration,
            hike.max_speed,
            hike.average_speed,
            hike.total_ascent,
            hike.total_descent,
            hike.calories_burned,
            hike.start_location_name,
            hike.current_location_name,
            hike.last_location_timestamp,
            hike.tracked_locations_count,
            hike.updated_at,
        ],
    )?;
    Ok(changed > 0)
}

pub fn get_by_id(conn: &Connection, hike_id: &str) -> rusqlite::Result<Option<ActiveHike>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM active_hikes WHERE id = ?1"),
        params![hike_id],
        from_row,
    )
    .optional()
}

/// The single ACTIVE or PAUSED row, if any.
pub fn get_current(conn: &Connection) -> rusqlite::Result<Option<ActiveHike>> {
    conn.query_row(
        &format!(
            "SELECT {COLUMNS} FROM active_hikes
             WHERE status IN ('ACTIVE', 'PAUSED')
             LIMIT 1"
        ),
        [],
        from_row,
    )
    .optional()
}

/// Set status and end time. Used for terminal transitions.
pub fn update_status(
    conn: &Connection,
    hike_id: &str,
    status: HikeStatus,
    end_time: i64,
    updated_at: i64,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE active_hikes SET status = ?2, end_time = ?3, updated_at = ?4 WHERE id = ?1",
        params![hike_id, status, end_time, updated_at],
    )?;
    Ok(changed > 0)
}

/// Remove a row outright. Not part of the normal lifecycle.
pub fn delete(conn: &Connection, hike_id: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute("DELETE FROM active_hikes WHERE id = ?1", params![hike_id])?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;

    fn setup() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        migrations::run(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_get() {
        let conn = setup();
        let mut hike = ActiveHike::new("h1".to_string(), "u1".to_string(), 1_000);
        hike.start_location_name = Some("Mountain Trail".to_string());
        insert(&conn, &hike).unwrap();

        assert_eq!(get_by_id(&conn, "h1").unwrap(), Some(hike.clone()));
        assert_eq!(get_current(&conn).unwrap(), Some(hike));
        assert!(get_by_id(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_terminal_rows_are_not_current() {
        let conn = setup();
        let hike = ActiveHike::new("h1".to_string(), "u1".to_string(), 1_000);
        insert(&conn, &hike).unwrap();
        assert!(update_status(&conn, "h1", HikeStatus::Cancelled, 2_000, 2_000).unwrap());

        assert!(get_current(&conn).unwrap().is_none());
        let stored = get_by_id(&conn, "h1").unwrap().unwrap();
        assert_eq!(stored.status, HikeStatus::Cancelled);
        assert_eq!(stored.end_time, Some(2_000));
    }

    #[test]
    fn test_update_unknown_id() {
        let conn = setup();
        let hike = ActiveHike::new("ghost".to_string(), "u1".to_string(), 1_000);
        assert!(!update(&conn, &hike).unwrap());
        assert!(!delete(&conn, "ghost").unwrap());
    }

    #[test]
    fn test_update_full_row() {
        let conn = setup();
        let mut hike = ActiveHike::new("h1".to_string(), "u1".to_string(), 1_000);
        insert(&conn, &hike).unwrap();

        hike.status = HikeStatus::Paused;
        hike.pause_time = Some(1_500);
        hike.front_photo_ref = Some("f.jpg".to_string());
        hike.current_distance = 3.2;
        hike.tracked_locations_count = 4;
        hike.updated_at = 1_500;
        assert!(update(&conn, &hike).unwrap());

        assert_eq!(get_by_id(&conn, "h1").unwrap(), Some(hike));
    }

    #[test]
    fn test_delete() {
        let conn = setup();
        let hike = ActiveHike::new("h1".to_string(), "u1".to_string(), 1_000);
        insert(&conn, &hike).unwrap();
        assert!(delete(&conn, "h1").unwrap());
        assert!(get_by_id(&conn, "h1").unwrap().is_none());
    }
}
