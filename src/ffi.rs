//! FFI bindings for mobile platforms (iOS/Android).
//!
//! Kotlin and Swift see a blocking API over one global [`HikeEngine`]. Every
//! call clones the engine handle out of the global slot and drives the async
//! operation to completion on a shared tokio runtime. Live queries run as
//! tasks on that runtime and hand each value to a dedicated delivery thread,
//! so an observer may call back into any export, until the returned
//! [`HikeSubscription`] is cancelled or dropped.

use std::future::Future;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use futures::StreamExt;
use log::{info, warn};
use once_cell::sync::Lazy;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::engine::HikeEngine;
use crate::error::{HikeError, HikeErrorKind};
use crate::feed::FeedPost;
use crate::init_logging;
use crate::observe::Observation;
use crate::types::{
    ActiveHike, Badge, LocationUpdate, PublishedHike, TelemetryUpdate, UserProfile, UserStats,
};

// ============================================================================
// Global state
// ============================================================================

/// Global engine instance, set by [`hike_engine_init`].
static HIKE_ENGINE: Lazy<Mutex<Option<HikeEngine>>> = Lazy::new(|| Mutex::new(None));

static RUNTIME: Lazy<Option<Runtime>> = Lazy::new(|| {
    match Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("hikereal-core")
        .enable_all()
        .build()
    {
        Ok(rt) => Some(rt),
        Err(e) => {
            warn!("[HikeFfi] Failed to create tokio runtime: {}", e);
            None
        }
    }
});

fn runtime() -> Result<&'static Runtime, FfiHikeError> {
    RUNTIME.as_ref().ok_or(FfiHikeError::RuntimeUnavailable)
}

/// The engine slot. A panic while it was held leaves a whole value, so poisoning is ignored.
fn engine_slot() -> MutexGuard<'static, Option<HikeEngine>> {
    HIKE_ENGINE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn current_engine() -> Result<HikeEngine, FfiHikeError> {
    engine_slot().clone().ok_or(FfiHikeError::NotInitialized)
}

/// Run an engine operation to completion on the shared runtime.
fn run<T, F, Fut>(op: F) -> Result<T, FfiHikeError>
where
    F: FnOnce(HikeEngine) -> Fut,
    Fut: Future<Output = crate::Result<T>>,
{
    let engine = current_engine()?;
    Ok(runtime()?.block_on(op(engine))?)
}

// ============================================================================
// Errors
// ============================================================================

/// Error surfaced to Kotlin/Swift. Messages are diagnostic only; localize by variant.
#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum FfiHikeError {
    #[error("{0}")]
    ActiveHikeAlreadyExists(String),
    #[error("{0}")]
    NoActiveHike(String),
    #[error("{0}")]
    MissingRequiredPhotos(String),
    #[error("{0}")]
    StorageFailure(String),
    #[error("{0}")]
    InvalidConfig(String),
    #[error("hike engine not initialized")]
    NotInitialized,
    #[error("async runtime unavailable")]
    RuntimeUnavailable,
}

impl From<HikeError> for FfiHikeError {
    fn from(err: HikeError) -> Self {
        let message = err.to_string();
        match err.kind() {
            HikeErrorKind::ActiveHikeAlreadyExists => {
                FfiHikeError::ActiveHikeAlreadyExists(message)
            }
            HikeErrorKind::NoActiveHike => FfiHikeError::NoActiveHike(message),
            HikeErrorKind::MissingRequiredPhotos => FfiHikeError::MissingRequiredPhotos(message),
            HikeErrorKind::StorageFailure => FfiHikeError::StorageFailure(message),
            HikeErrorKind::InvalidConfig => FfiHikeError::InvalidConfig(message),
        }
    }
}

// ============================================================================
// Engine setup
// ============================================================================

/// Open the engine. Call once at app startup; a second call replaces the engine.
#[uniffi::export]
pub fn hike_engine_init(config: EngineConfig) -> Result<(), FfiHikeError> {
    init_logging();
    info!("[HikeFfi] Initializing with db: {}", config.db_path);

    let engine = runtime()?.block_on(HikeEngine::open(config))?;
    *engine_slot() = Some(engine);
    Ok(())
}

/// Same as [`hike_engine_init`], from a JSON [`EngineConfig`].
#[uniffi::export]
pub fn hike_engine_init_json(config_json: String) -> Result<(), FfiHikeError> {
    hike_engine_init(EngineConfig::from_json(&config_json)?)
}

#[uniffi::export]
pub fn hike_engine_is_initialized() -> bool {
    engine_slot().is_some()
}

/// Seed starter badges (and demo hikes when configured) for a signed-in user.
#[uniffi::export]
pub fn hike_engine_initialize_user(user_id: String) -> Result<(), FfiHikeError> {
    run(|engine| async move { engine.initialize_user(&user_id).await })
}

// ============================================================================
// Lifecycle commands
// ============================================================================

#[uniffi::export]
pub fn start_new_hike(user_id: String) -> Result<String, FfiHikeError> {
    run(|engine| async move { engine.lifecycle().start_new_hike(&user_id).await })
}

#[uniffi::export]
pub fn pause_hike(hike_id: String) -> Result<(), FfiHikeError> {
    run(|engine| async move { engine.lifecycle().pause(&hike_id).await })
}

#[uniffi::export]
pub fn resume_hike(hike_id: String) -> Result<(), FfiHikeError> {
    run(|engine| async move { engine.lifecycle().resume(&hike_id).await })
}

#[uniffi::export]
pub fn update_hike_telemetry(
    hike_id: String,
    update: TelemetryUpdate,
) -> Result<ActiveHike, FfiHikeError> {
    run(|engine| async move { engine.lifecycle().update_telemetry(&hike_id, update).await })
}

#[uniffi::export]
pub fn update_hike_distance(hike_id: String, distance: f64) -> Result<ActiveHike, FfiHikeError> {
    run(|engine| async move { engine.lifecycle().update_distance(&hike_id, distance).await })
}

#[uniffi::export]
pub fn update_hike_location(
    hike_id: String,
    update: LocationUpdate,
) -> Result<ActiveHike, FfiHikeError> {
    run(|engine| async move { engine.lifecycle().update_location(&hike_id, update).await })
}

#[uniffi::export]
pub fn attach_front_photo(hike_id: String, photo_ref: String) -> Result<(), FfiHikeError> {
    run(|engine| async move {
        engine
            .lifecycle()
            .attach_front_photo(&hike_id, &photo_ref)
            .await
    })
}

#[uniffi::export]
pub fn attach_back_photo(hike_id: String, photo_ref: String) -> Result<(), FfiHikeError> {
    run(|engine| async move {
        engine
            .lifecycle()
            .attach_back_photo(&hike_id, &photo_ref)
            .await
    })
}

/// Complete the hike and publish it under `author`. Returns the published id.
#[uniffi::export]
pub fn complete_hike(hike_id: String, author: UserProfile) -> Result<String, FfiHikeError> {
    run(|engine| async move { engine.lifecycle().complete_hike(&hike_id, &author).await })
}

#[uniffi::export]
pub fn cancel_hike(hike_id: String) -> Result<(), FfiHikeError> {
    run(|engine| async move { engine.lifecycle().cancel_hike(&hike_id).await })
}

#[uniffi::export]
pub fn current_active_hike() -> Result<Option<ActiveHike>, FfiHikeError> {
    run(|engine| async move { engine.lifecycle().current_active_hike().await })
}

#[uniffi::export]
pub fn current_active_hike_id() -> Result<Option<String>, FfiHikeError> {
    run(|engine| async move { engine.lifecycle().current_active_hike_id().await })
}

// ============================================================================
// Profile and feed queries
// ============================================================================

#[uniffi::export]
pub fn recent_hikes(user_id: String) -> Result<Vec<PublishedHike>, FfiHikeError> {
    run(|engine| async move { engine.recent_hikes(&user_id).await })
}

#[uniffi::export]
pub fn user_stats(user_id: String) -> Result<UserStats, FfiHikeError> {
    run(|engine| async move { engine.user_stats(&user_id).await })
}

#[uniffi::export]
pub fn recent_badges(user_id: String) -> Result<Vec<Badge>, FfiHikeError> {
    run(|engine| async move { engine.recent_badges(&user_id).await })
}

#[uniffi::export]
pub fn feed_posts() -> Result<Vec<FeedPost>, FfiHikeError> {
    run(|engine| async move { engine.feed().await })
}

// ============================================================================
// Observers
// ============================================================================

/// Receives every change of the current ACTIVE/PAUSED hike.
#[uniffi::export(callback_interface)]
pub trait ActiveHikeObserver: Send + Sync {
    /// `None` once no hike is in progress.
    fn on_change(&self, hike: Option<ActiveHike>);
    fn on_error(&self, message: String);
}

#[uniffi::export(callback_interface)]
pub trait UserStatsObserver: Send + Sync {
    fn on_change(&self, stats: UserStats);
    fn on_error(&self, message: String);
}

#[uniffi::export(callback_interface)]
pub trait FeedObserver: Send + Sync {
    fn on_change(&self, posts: Vec<FeedPost>);
    fn on_error(&self, message: String);
}

/// Handle to a running observer. Cancelling or dropping it stops delivery.
#[derive(uniffi::Object)]
pub struct HikeSubscription {
    task: Mutex<Option<JoinHandle<()>>>,
}

#[uniffi::export]
impl HikeSubscription {
    pub fn cancel(&self) {
        if let Ok(mut task) = self.task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for HikeSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Drive `stream` on the runtime and call `deliver` on a plain thread.
///
/// `deliver` never runs on a runtime worker, so it may block on other exports.
/// The thread exits once the task ends or is aborted and drops its sender.
fn subscribe<T, F>(
    stream: Observation<T>,
    mut deliver: F,
) -> Result<Arc<HikeSubscription>, FfiHikeError>
where
    T: Send + 'static,
    F: FnMut(crate::Result<T>) + Send + 'static,
{
    let rt = runtime()?;
    let (tx, rx) = mpsc::channel::<crate::Result<T>>();

    thread::Builder::new()
        .name("hikereal-observer".to_string())
        .spawn(move || {
            while let Ok(item) = rx.recv() {
                deliver(item);
            }
        })
        .map_err(|e| {
            warn!("[HikeFfi] Failed to spawn observer thread: {}", e);
            FfiHikeError::RuntimeUnavailable
        })?;

    let task = rt.spawn(async move {
        let mut stream = stream;
        while let Some(item) = stream.next().await {
            if tx.send(item).is_err() {
                break;
            }
        }
    });
    Ok(Arc::new(HikeSubscription {
        task: Mutex::new(Some(task)),
    }))
}

#[uniffi::export]
pub fn observe_current_active_hike(
    observer: Box<dyn ActiveHikeObserver>,
) -> Result<Arc<HikeSubscription>, FfiHikeError> {
    let stream = current_engine()?.lifecycle().observe_current_active_hike();
    subscribe(stream, move |item| match item {
        Ok(hike) => observer.on_change(hike),
        Err(e) => observer.on_error(e.to_string()),
    })
}

#[uniffi::export]
pub fn observe_user_stats(
    user_id: String,
    observer: Box<dyn UserStatsObserver>,
) -> Result<Arc<HikeSubscription>, FfiHikeError> {
    let stream = current_engine()?.observe_user_stats(&user_id);
    subscribe(stream, move |item| match item {
        Ok(stats) => observer.on_change(stats),
        Err(e) => observer.on_error(e.to_string()),
    })
}

#[uniffi::export]
pub fn observe_feed(
    observer: Box<dyn FeedObserver>,
) -> Result<Arc<HikeSubscription>, FfiHikeError> {
    let stream = current_engine()?.observe_feed();
    subscribe(stream, move |item| match item {
        Ok(posts) => observer.on_change(posts),
        Err(e) => observer.on_error(e.to_string()),
    })
}
