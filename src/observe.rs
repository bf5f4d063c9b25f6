//! # Live queries
//!
//! Presentation code subscribes to read models instead of polling. Each table
//! has a `watch` channel carrying a version counter that [`crate::Database`]
//! bumps after every committed write touching it.
//!
//! An [`Observation`] is cold: it runs its query when first polled, then waits
//! for the next version bump and runs it again. Results equal to the previous
//! emission are skipped. Dropping the stream unsubscribes it; writes issued
//! elsewhere are unaffected.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use rusqlite::Connection;
use tokio::sync::watch;

use crate::error::Result;
use crate::persistence::Database;

/// A push-updated read model.
pub type Observation<T> = BoxStream<'static, Result<T>>;

/// Tables that can be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    ActiveHikes,
    Hikes,
    Badges,
}

/// Per-table change counters.
pub struct ChangeTracker {
    active_hikes: watch::Sender<u64>,
    hikes: watch::Sender<u64>,
    badges: watch::Sender<u64>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self {
            active_hikes: watch::channel(0).0,
            hikes: watch::channel(0).0,
            badges: watch::channel(0).0,
        }
    }

    fn sender(&self, table: Table) -> &watch::Sender<u64> {
        match table {
            Table::ActiveHikes => &self.active_hikes,
            Table::Hikes => &self.hikes,
            Table::Badges => &self.badges,
        }
    }

    /// Record a committed change to `table`. Succeeds with or without subscribers.
    pub fn notify(&self, table: Table) {
        self.sender(table).send_modify(|version| *version += 1);
    }

    pub fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.sender(table).subscribe()
    }

    /// Number of changes recorded for `table` so far.
    pub fn version(&self, table: Table) -> u64 {
        *self.sender(table).borrow()
    }
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

struct ObserveState<T, Q> {
    db: Database,
    rx: watch::Receiver<u64>,
    query: Arc<Q>,
    last: Option<T>,
    started: bool,
}

/// Observe `query` over `table`.
///
/// The receiver is created before the first query runs, so a write landing
/// between subscription and first emission is never missed.
pub fn observe<T, Q>(db: Database, table: Table, query: Q) -> Observation<T>
where
    T: Clone + PartialEq + Send + 'static,
    Q: Fn(&Connection) -> rusqlite::Result<T> + Send + Sync + 'static,
{
    let rx = db.changes().subscribe(table);
    let state = ObserveState {
        db,
        rx,
        query: Arc::new(query),
        last: None,
        started: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.started {
                // The sender lives inside the Database we hold, so this only
                // fails if the tracker itself is gone.
                if state.rx.changed().await.is_err() {
                    return None;
                }
            } else {
                state.rx.borrow_and_update();
                state.started = true;
            }

            let query = Arc::clone(&state.query);
            match state.db.read(move |conn| query(conn)).await {
                Ok(value) => {
                    if state.last.as_ref() == Some(&value) {
                        continue;
                    }
                    state.last = Some(value.clone());
                    return Some((Ok(value), state));
                }
                Err(e) => return Some((Err(e), state)),
            }
        }
    })
    .boxed()
}
