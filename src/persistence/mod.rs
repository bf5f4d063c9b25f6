//! # SQLite persistence
//!
//! One connection shared by every caller. Commands lock it, run their whole
//! read-check-write sequence inside a single transaction, commit, and then
//! publish a change notification for each table they touched. Live queries in
//! [`crate::observe`] re-run when those notifications arrive.
//!
//! The store contracts live in the submodules as plain functions over a
//! `&Connection` so they compose inside one transaction.

use std::sync::Arc;

use log::info;
use rusqlite::{Connection, Transaction};
use tokio::sync::Mutex;

use crate::config::IN_MEMORY_DB;
use crate::error::Result;
use crate::migrations;
use crate::observe::{ChangeTracker, Table};

pub mod active_hikes;
pub mod badges;
pub mod hikes;

/// Cloneable handle to the hike database.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

struct DatabaseInner {
    conn: Mutex<Connection>,
    changes: ChangeTracker,
    path: String,
}

impl Database {
    /// Open (or create) the database at `db_path` and migrate it.
    pub fn open(db_path: &str) -> Result<Self> {
        let mut conn = Connection::open(db_path)?;
        if db_path != IN_MEMORY_DB {
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            log::debug!("[HikeDb] journal_mode={}", mode);
        }
        migrations::run(&mut conn)?;
        info!("[HikeDb] Opened database at {}", db_path);

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                conn: Mutex::new(conn),
                changes: ChangeTracker::new(),
                path: db_path.to_string(),
            }),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::open(IN_MEMORY_DB)
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn changes(&self) -> &ChangeTracker {
        &self.inner.changes
    }

    /// Run a read-only query.
    pub async fn read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<R>,
    {
        let conn = self.inner.conn.lock().await;
        Ok(f(&conn)?)
    }

    /// Run `f` inside one transaction and notify observers of `tables` once it commits.
    ///
    /// Any error from `f` rolls the transaction back and nothing is notified.
    pub async fn write<F, R>(&self, tables: &[Table], f: F) -> Result<R>
    where
        F: FnOnce(&Transaction<'_>) -> Result<R>,
    {
        let result = {
            let mut conn = self.inner.conn.lock().await;
            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;
            result
        };

        for table in tables {
            self.inner.changes.notify(*table);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HikeError;

    #[tokio::test]
    async fn test_write_notifies_after_commit() {
        let db = Database::in_memory().unwrap();
        let mut rx = db.changes().subscribe(Table::Badges);
        rx.borrow_and_update();

        db.write(&[Table::Badges], |tx| {
            tx.execute(
                "INSERT INTO badges (id, name, description, type, level, date_earned, user_id)
                 VALUES ('b1', 'n', 'd', 'SPEED', 1, 0, 'u1')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_silently() {
        let db = Database::in_memory().unwrap();
        let mut rx = db.changes().subscribe(Table::Badges);
        rx.borrow_and_update();

        let result: Result<()> = db
            .write(&[Table::Badges], |tx| {
                tx.execute(
                    "INSERT INTO badges (id, name, description, type, level, date_earned, user_id)
                     VALUES ('b1', 'n', 'd', 'SPEED', 1, 0, 'u1')",
                    [],
                )?;
                Err(HikeError::no_active_hike("x"))
            })
            .await;
        assert!(result.is_err());
        assert!(!rx.has_changed().unwrap());

        let count: i64 = db
            .read(|conn| conn.query_row("SELECT COUNT(*) FROM badges", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_reopen_file_keeps_schema() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("hikes.db");
        let path = path.to_str().unwrap();

        drop(Database::open(path).unwrap());
        let db = Database::open(path).unwrap();
        assert_eq!(db.path(), path);
    }
}
