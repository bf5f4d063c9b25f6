//! # Active hike lifecycle
//!
//! ```text
//!   (none) --start--> ACTIVE <--pause/resume--> PAUSED
//!                       |                          |
//!                       +-----complete / cancel----+--> COMPLETED | CANCELLED
//! ```
//!
//! At most one hike is ACTIVE or PAUSED at a time, across all users. Terminal
//! rows stay in the table but accept no further commands. Completion needs both
//! dual-view photos and publishes exactly one [`PublishedHike`].
//!
//! Every command runs as a single transaction on the shared connection, so a
//! precondition checked inside a command still holds when its write lands.

use log::{debug, info, warn};
use rusqlite::Connection;
use uuid::Uuid;

use crate::clock::{format_local_date, next_update_stamp, now_millis};
use crate::error::{is_unique_violation, HikeError, Result};
use crate::observe::{observe, Observation, Table};
use crate::persistence::{active_hikes, hikes, Database};
use crate::types::{
    ActiveHike, HikeStatus, LocationUpdate, PublishedHike, TelemetryUpdate, UserProfile,
};

/// Location label used when a hike never reported a place name.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Sole writer of `active_hikes`, and of `hikes` on completion.
#[derive(Clone)]
pub struct HikeLifecycle {
    db: Database,
}

/// Load a hike that still accepts commands.
fn load_live(conn: &Connection, hike_id: &str) -> Result<ActiveHike> {
    match active_hikes::get_by_id(conn, hike_id)? {
        Some(hike) if hike.is_live() => Ok(hike),
        Some(hike) => {
            warn!(
                "[HikeLifecycle] Rejected command on {} hike {}",
                hike.status.as_str(),
                hike_id
            );
            Err(HikeError::no_active_hike(hike_id))
        }
        None => {
            warn!("[HikeLifecycle] Rejected command on unknown hike {}", hike_id);
            Err(HikeError::no_active_hike(hike_id))
        }
    }
}

/// Feed caption: location and local start date, or just the date.
pub fn hike_caption(hike: &ActiveHike) -> String {
    let date = format_local_date(hike.start_time);
    match &hike.start_location_name {
        Some(location) => format!("Hike at {} - {}", location, date),
        None => format!("Hike on {}", date),
    }
}

/// Build the feed record for a hike completing at `published_at`.
pub fn publish(hike: &ActiveHike, author: &UserProfile, published_at: i64) -> PublishedHike {
    let location_name = hike
        .current_location_name
        .clone()
        .or_else(|| hike.start_location_name.clone())
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

    PublishedHike {
        id: hike.id.clone(),
        caption: hike_caption(hike),
        location_name,
        distance: hike.current_distance,
        elevation_gain: hike.current_elevation_gain,
        duration: hike.current_duration,
        view_count: 0,
        like_count: 0,
        date: hike.start_time,
        user_id: hike.user_id.clone(),
        author_name: author.username.clone(),
        author_picture: author.profile_picture.clone(),
        front_photo_ref: hike.front_photo_ref.clone(),
        back_photo_ref: hike.back_photo_ref.clone(),
        group_size: 1,
        published_at,
    }
}

impl HikeLifecycle {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Start a hike for `user_id` and return its id.
    pub async fn start_new_hike(&self, user_id: &str) -> Result<String> {
        let user_id = user_id.to_string();
        let hike_id = self
            .db
            .write(&[Table::ActiveHikes], move |tx| {
                if let Some(current) = active_hikes::get_current(tx)? {
                    warn!(
                        "[HikeLifecycle] Cannot start: hike {} is {}",
                        current.id,
                        current.status.as_str()
                    );
                    return Err(HikeError::ActiveHikeAlreadyExists {
                        hike_id: current.id,
                    });
                }

                let hike = ActiveHike::new(Uuid::new_v4().to_string(), user_id, now_millis());
                match active_hikes::insert(tx, &hike) {
                    Ok(()) => Ok(hike.id),
                    // Backstop: the schema's single-live index caught a second live row
                    Err(e) if is_unique_violation(&e) => {
                        let existing = active_hikes::get_current(tx)?
                            .map(|h| h.id)
                            .unwrap_or_default();
                        Err(HikeError::ActiveHikeAlreadyExists { hike_id: existing })
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await?;

        info!("[HikeLifecycle] Started hike {}", hike_id);
        Ok(hike_id)
    }

    /// Pause an ACTIVE hike. Pausing a PAUSED hike keeps the original pause time.
    pub async fn pause(&self, hike_id: &str) -> Result<()> {
        self.modify(hike_id, |hike| {
            if hike.status == HikeStatus::Paused {
                return None;
            }
            Some(ActiveHike {
                status: HikeStatus::Paused,
                pause_time: Some(now_millis()),
                ..hike.clone()
            })
        })
        .await?;
        info!("[HikeLifecycle] Paused hike {}", hike_id);
        Ok(())
    }

    /// Resume a PAUSED hike. Resuming an ACTIVE hike changes nothing.
    pub async fn resume(&self, hike_id: &str) -> Result<()> {
        self.modify(hike_id, |hike| {
            if hike.status == HikeStatus::Active {
                return None;
            }
            Some(ActiveHike {
                status: HikeStatus::Active,
                pause_time: None,
                ..hike.clone()
            })
        })
        .await?;
        info!("[HikeLifecycle] Resumed hike {}", hike_id);
        Ok(())
    }

    /// Apply a sparse telemetry patch and return the updated hike.
    ///
    /// Fields left as `None` keep their value; `updated_at` always advances.
    pub async fn update_telemetry(
        &self,
        hike_id: &str,
        update: TelemetryUpdate,
    ) -> Result<ActiveHike> {
        debug!("[HikeLifecycle] Telemetry for {}: {:?}", hike_id, update);
        self.modify(hike_id, move |hike| Some(update.apply(hike))).await
    }

    pub async fn update_distance(&self, hike_id: &str, distance: f64) -> Result<ActiveHike> {
        self.update_telemetry(hike_id, TelemetryUpdate::distance(distance)).await
    }

    /// Record a location sample. The first named sample also becomes the start location.
    pub async fn update_location(
        &self,
        hike_id: &str,
        update: LocationUpdate,
    ) -> Result<ActiveHike> {
        self.modify(hike_id, move |hike| {
            let name = update.name;
            Some(ActiveHike {
                start_location_name: hike.start_location_name.clone().or_else(|| name.clone()),
                current_location_name: name.or_else(|| hike.current_location_name.clone()),
                last_location_timestamp: Some(update.timestamp),
                tracked_locations_count: hike.tracked_locations_count + 1,
                ..hike.clone()
            })
        })
        .await
    }

    /// Store (or replace) the front-camera half of the dual-view photo.
    pub async fn attach_front_photo(&self, hike_id: &str, photo_ref: &str) -> Result<()> {
        let photo_ref = photo_ref.to_string();
        self.modify(hike_id, move |hike| {
            Some(ActiveHike {
                front_photo_ref: Some(photo_ref),
                ..hike.clone()
            })
        })
        .await?;
        debug!("[HikeLifecycle] Front photo attached to {}", hike_id);
        Ok(())
    }

    /// Store (or replace) the back-camera half of the dual-view photo.
    pub async fn attach_back_photo(&self, hike_id: &str, photo_ref: &str) -> Result<()> {
        let photo_ref = photo_ref.to_string();
        self.modify(hike_id, move |hike| {
            Some(ActiveHike {
                back_photo_ref: Some(photo_ref),
                ..hike.clone()
            })
        })
        .await?;
        debug!("[HikeLifecycle] Back photo attached to {}", hike_id);
        Ok(())
    }

    /// Complete a live hike and publish it. Returns the published hike id.
    pub async fn complete_hike(&self, hike_id: &str, author: &UserProfile) -> Result<String> {
        let id = hike_id.to_string();
        let author = author.clone();
        let published_id = self
            .db
            .write(&[Table::ActiveHikes, Table::Hikes], move |tx| {
                let hike = load_live(tx, &id)?;
                if !hike.has_required_photos() {
                    warn!("[HikeLifecycle] Cannot complete {}: photos missing", id);
                    return Err(HikeError::MissingRequiredPhotos {
                        hike_id: id,
                        missing_front: hike.front_photo_ref.is_none(),
                        missing_back: hike.back_photo_ref.is_none(),
                    });
                }

                let now = now_millis();
                let updated_at = next_update_stamp(hike.updated_at);
                active_hikes::update_status(tx, &hike.id, HikeStatus::Completed, now, updated_at)?;

                let published = publish(&hike, &author, now);
                hikes::insert(tx, &published)?;
                Ok(published.id)
            })
            .await?;

        info!("[HikeLifecycle] Completed and published hike {}", published_id);
        Ok(published_id)
    }

    /// Cancel a live hike. Nothing is published and no photos are required.
    pub async fn cancel_hike(&self, hike_id: &str) -> Result<()> {
        let id = hike_id.to_string();
        self.db
            .write(&[Table::ActiveHikes], move |tx| {
                let hike = load_live(tx, &id)?;
                let now = now_millis();
                let updated_at = next_update_stamp(hike.updated_at);
                active_hikes::update_status(tx, &id, HikeStatus::Cancelled, now, updated_at)?;
                Ok(())
            })
            .await?;

        info!("[HikeLifecycle] Cancelled hike {}", hike_id);
        Ok(())
    }

    /// Hard-delete a row in any status. Returns whether it existed.
    pub async fn delete_active_hike(&self, hike_id: &str) -> Result<bool> {
        let id = hike_id.to_string();
        let deleted = self
            .db
            .write(&[Table::ActiveHikes], move |tx| Ok(active_hikes::delete(tx, &id)?))
            .await?;
        if deleted {
            info!("[HikeLifecycle] Deleted hike {}", hike_id);
        }
        Ok(deleted)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn current_active_hike_id(&self) -> Result<Option<String>> {
        Ok(self.current_active_hike().await?.map(|hike| hike.id))
    }

    pub async fn current_active_hike(&self) -> Result<Option<ActiveHike>> {
        self.db.read(active_hikes::get_current).await
    }

    pub async fn get_hike(&self, hike_id: &str) -> Result<Option<ActiveHike>> {
        let id = hike_id.to_string();
        self.db
            .read(move |conn| active_hikes::get_by_id(conn, &id))
            .await
    }

    /// Live view of the ACTIVE/PAUSED hike; emits `None` once it ends.
    pub fn observe_current_active_hike(&self) -> Observation<Option<ActiveHike>> {
        observe(self.db.clone(), Table::ActiveHikes, active_hikes::get_current)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Read-modify-write of a live hike. `f` returns `None` for a no-op.
    async fn modify<F>(&self, hike_id: &str, f: F) -> Result<ActiveHike>
    where
        F: FnOnce(&ActiveHike) -> Option<ActiveHike> + Send,
    {
        let id = hike_id.to_string();
        self.db
            .write(&[Table::ActiveHikes], move |tx| {
                let current = load_live(tx, &id)?;
                let Some(mut next) = f(&current) else {
                    return Ok(current);
                };
                next.updated_at = next_update_stamp(current.updated_at);
                active_hikes::update(tx, &next)?;
                Ok(next)
            })
            .await
    }
}
