//! Badge store. Badges are seeded, never mutated by the lifecycle.

use rusqlite::{params, Connection, Row};

use crate::types::{Badge, BadgeLevel, BadgeType};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Badge> {
    let badge_type: String = row.get(3)?;
    let level: i32 = row.get(4)?;
    Ok(Badge {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        badge_type: BadgeType::parse(&badge_type),
        level: BadgeLevel::from_ordinal(level),
        date_earned: row.get(5)?,
        user_id: row.get(6)?,
    })
}

/// Insert-or-replace by id.
pub fn insert_many(conn: &Connection, badges: &[Badge]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR REPLACE INTO badges (id, name, description, type, level, date_earned, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for badge in badges {
        stmt.execute(params![
            badge.id,
            badge.name,
            badge.description,
            badge.badge_type.as_str(),
            badge.level.ordinal(),
            badge.date_earned,
            badge.user_id,
        ])?;
    }
    Ok(())
}

pub fn count(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("SELECT COUNT(*) FROM badges", [], |row| row.get(0))
}

/// A user's badges, most recently earned first.
pub fn recent_for_user(
    conn: &Connection,
    user_id: &str,
    limit: u32,
) -> rusqlite::Result<Vec<Badge>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, description, type, level, date_earned, user_id
         FROM badges WHERE user_id = ?1
         ORDER BY date_earned DESC, id
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![user_id, limit], from_row)?;
    rows.collect()
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

    fn badge(id: &str, earned: i64) -> Badge {
        Badge {
            id: id.to_string(),
            name: format!("Badge {}", id),
            description: "desc".to_string(),
            badge_type: BadgeType::Streak,
            level: BadgeLevel::Silver,
            date_earned: earned,
            user_id: "u1".to_string(),
        }
    }

    #[test]
    fn test_insert_and_query() {
        let conn = setup();
        insert_many(&conn, &[badge("1", 10), badge("2", 30), badge("3", 20)]).unwrap();

        assert_eq!(count(&conn).unwrap(), 3);
        let recent = recent_for_user(&conn, "u1", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "2");
        assert_eq!(recent[1].id, "3");
        assert_eq!(recent[0].level, BadgeLevel::Silver);
        assert_eq!(recent[0].badge_type, BadgeType::Streak);
        assert!(recent_for_user(&conn, "u2", 10).unwrap().is_empty());
    }

    #[test]
    fn test_legacy_values_are_normalised() {
        let conn = setup();
        conn.execute(
            "INSERT INTO badges (id, name, description, type, level, date_earned, user_id)
             VALUES ('x', 'Explorer', 'Visit 3 regions', 'Explore', 0, 1, 'u1')",
            [],
        )
        .unwrap();

        let badge = &recent_for_user(&conn, "u1", 1).unwrap()[0];
        assert_eq!(badge.badge_type, BadgeType::Explore);
        assert_eq!(badge.level, BadgeLevel::Bronze);
    }
}
