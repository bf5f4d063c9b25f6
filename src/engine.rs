//! # Hike engine
//!
//! Facade handed to presentation code. It owns the [`Database`], the
//! [`HikeLifecycle`] that mutates it, and the live profile and feed queries.
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use hikerealrs::{EngineConfig, HikeEngine};
//!
//! # async fn demo() -> hikerealrs::Result<()> {
//! let engine = HikeEngine::open(EngineConfig::with_db_path("/data/hikes.db")).await?;
//! let hike_id = engine.lifecycle().start_new_hike("user-1").await?;
//!
//! let mut current = engine.lifecycle().observe_current_active_hike();
//! assert_eq!(current.next().await.unwrap()?.map(|h| h.id), Some(hike_id));
//! # Ok(())
//! # }
//! ```

use log::info;

use crate::clock::{now_millis, start_of_year_millis};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::feed::FeedPost;
use crate::lifecycle::HikeLifecycle;
use crate::observe::{observe, Observation, Table};
use crate::persistence::{badges, hikes, Database};
use crate::seed;
use crate::types::{Badge, PublishedHike, UserStats};

#[derive(Clone)]
pub struct HikeEngine {
    db: Database,
    lifecycle: HikeLifecycle,
    config: EngineConfig,
}

impl HikeEngine {
    /// Open the database, migrate it and run the configured seeders.
    pub async fn open(config: EngineConfig) -> Result<Self> {
        let db = Database::open(&config.db_path)?;
        let engine = Self {
            lifecycle: HikeLifecycle::new(db.clone()),
            db,
            config,
        };

        if let Some(user_id) = engine.config.seed_user_id.clone() {
            engine.initialize_user(&user_id).await?;
        }
        info!("[HikeEngine] Ready ({})", engine.db.path());
        Ok(engine)
    }

    /// Seed the starter badges for `user_id`, and demo hikes when configured.
    ///
    /// Both seeders skip non-empty tables.
    pub async fn initialize_user(&self, user_id: &str) -> Result<()> {
        seed::seed_badges_if_empty(&self.db, user_id).await?;
        if self.config.seed_demo_hikes {
            seed::seed_demo_hikes_if_empty(&self.db, user_id).await?;
        }
        Ok(())
    }

    pub fn lifecycle(&self) -> &HikeLifecycle {
        &self.lifecycle
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Profile
    // ========================================================================

    /// The user's most recent published hikes, newest hike date first.
    pub fn observe_recent_hikes(&self, user_id: &str) -> Observation<Vec<PublishedHike>> {
        let user_id = user_id.to_string();
        let limit = self.config.recent_hikes_limit;
        observe(self.db.clone(), Table::Hikes, move |conn| {
            hikes::recent_for_user(conn, &user_id, limit)
        })
    }

    /// Lifetime and current-year totals. The year boundary is re-read on every
    /// emission, so a stream left open over New Year rolls over on the next change.
    pub fn observe_user_stats(&self, user_id: &str) -> Observation<UserStats> {
        let user_id = user_id.to_string();
        observe(self.db.clone(), Table::Hikes, move |conn| {
            hikes::stats_for_user(conn, &user_id, start_of_year_millis(now_millis()))
        })
    }

    pub fn observe_recent_badges(&self, user_id: &str) -> Observation<Vec<Badge>> {
        let user_id = user_id.to_string();
        let limit = self.config.recent_badges_limit;
        observe(self.db.clone(), Table::Badges, move |conn| {
            badges::recent_for_user(conn, &user_id, limit)
        })
    }

    pub async fn recent_hikes(&self, user_id: &str) -> Result<Vec<PublishedHike>> {
        let limit = self.config.recent_hikes_limit;
        self.db
            .read(|conn| hikes::recent_for_user(conn, user_id, limit))
            .await
    }

    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats> {
        let year_start = start_of_year_millis(now_millis());
        self.db
            .read(|conn| hikes::stats_for_user(conn, user_id, year_start))
            .await
    }

    pub async fn recent_badges(&self, user_id: &str) -> Result<Vec<Badge>> {
        let limit = self.config.recent_badges_limit;
        self.db
            .read(|conn| badges::recent_for_user(conn, user_id, limit))
            .await
    }

    // ========================================================================
    // Feed
    // ========================================================================

    /// Every published hike as a feed post, newest publication first.
    pub fn observe_feed(&self) -> Observation<Vec<FeedPost>> {
        observe(self.db.clone(), Table::Hikes, |conn| {
            let now = now_millis();
            Ok(hikes::feed(conn)?
                .iter()
                .map(|hike| FeedPost::from_hike(hike, now))
                .collect())
        })
    }

    pub async fn feed(&self) -> Result<Vec<FeedPost>> {
        let posts = self.db.read(hikes::feed).await?;
        let now = now_millis();
        Ok(posts.iter().map(|hike| FeedPost::from_hike(hike, now)).collect())
    }

    // ========================================================================
    // Store maintenance
    // ========================================================================

    /// Insert-or-replace published hikes (imports, sync).
    pub async fn insert_hikes(&self, published: Vec<PublishedHike>) -> Result<()> {
        self.db
            .write(&[Table::Hikes], move |tx| Ok(hikes::insert_many(tx, &published)?))
            .await
    }

    pub async fn insert_badges(&self, earned: Vec<Badge>) -> Result<()> {
        self.db
            .write(&[Table::Badges], move |tx| Ok(badges::insert_many(tx, &earned)?))
            .await
    }

    pub async fn hike_count(&self) -> Result<u32> {
        self.db.read(hikes::count).await
    }

    pub async fn badge_count(&self) -> Result<u32> {
        self.db.read(badges::count).await
    }
}
