pub mod allocator;
pub mod backlog;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod progress;
pub mod schedule;
pub mod state;
pub mod storage;
pub mod todo;

use std::sync::Arc;
use chrono::Utc;
use crate::catalog::LessonCatalog;
use crate::error::{ErrorKind, GaiaError};
use crate::state::AppState;
use crate::storage::FileStorage;

/// Print today's dashboard as JSON.
///
/// An optional first argument (`YYYY-MM-DD`) stands in for today.
pub fn run() -> Result<(), GaiaError> {
    // Initialize structured logging first
    logging::init_logging()?;
    tracing::info!("GAIA engine starting");

    let config = Arc::new(config::get_schedule_config().clone());

    let today = match std::env::args().nth(1) {
        Some(raw) => calendar::parse_iso(&raw)?,
        None => calendar::today_in(Utc::now(), config.utc_offset_minutes),
    };

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| GaiaError::new(
            ErrorKind::State,
            format!("Failed to create async runtime: {}", e),
            "startup"
        ))?;

    rt.block_on(async {
        let catalog = LessonCatalog::load(&config::paths::lesson_catalog_path()).await?;
        let storage = Arc::new(FileStorage::in_app_data());
        tracing::info!(dir = ?storage.dir(), today = %today, "Using file storage");

        let state = AppState::new(config.clone(), storage, catalog);
        let summary = state.dashboard(today).await?;
        let out = serde_json::to_string_pretty(&summary)?;
        println!("{}", out);

        tracing::info!(metrics = ?state.metrics.snapshot(), "Dashboard built");
        Ok::<(), GaiaError>(())
    })
}
