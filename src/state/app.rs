use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use chrono::NaiveDate;
use parking_lot::RwLock;
use crate::allocator::{month_calendar, MonthCalendar};
use crate::calendar::days_between;
use crate::catalog::LessonCatalog;
use crate::config::ScheduleConfig;
use crate::dashboard::{build_dashboard, DashboardSummary};
use crate::error::GaiaError;
use crate::metrics::EngineMetrics;
use crate::progress::store::{self, PROGRESS_KEY};
use crate::progress::AcademyProgress;
use crate::schedule::TrackId;
use crate::storage::{ChangeOrigin, StorageEvent, Subscription, UserStorage};
use crate::todo::{self, Category, DropPosition, ReorderOutcome, StorageTaskStore};

/// Application-wide state container.
/// Everything the engine reads is passed in explicitly; the only mutable piece
/// is the progress cache, which is dropped whenever stored progress changes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ScheduleConfig>,
    pub storage: Arc<dyn UserStorage>,
    pub catalog: Arc<LessonCatalog>,
    /// Derived from storage on first read; `None` means re-read.
    pub progress: Arc<RwLock<Option<AcademyProgress>>>,
    /// Bumped on every stored progress change; a load only fills the cache if
    /// no change landed while it was reading.
    progress_generation: Arc<AtomicU64>,
    pub metrics: EngineMetrics,
    _subscription: Arc<Subscription>,
}

impl AppState {
    pub fn new(
        config: Arc<ScheduleConfig>,
        storage: Arc<dyn UserStorage>,
        catalog: LessonCatalog,
    ) -> Self {
        let progress: Arc<RwLock<Option<AcademyProgress>>> = Arc::new(RwLock::new(None));
        let metrics = EngineMetrics::new();

        let progress_generation = Arc::new(AtomicU64::new(0));

        let cache = progress.clone();
        let generation = progress_generation.clone();
        let counters = metrics.clone();
        let subscription = storage.subscribe(Arc::new(move |event: &StorageEvent| {
            if event.key != PROGRESS_KEY {
                return;
            }
            {
                let mut slot = cache.write();
                generation.fetch_add(1, Ordering::SeqCst);
                *slot = None;
            }
            if event.origin == ChangeOrigin::Remote {
                counters.record_remote_invalidation();
                tracing::info!(key = %event.key, "Progress changed on another device, cache dropped");
            }
        }));

        AppState {
            config,
            storage,
            catalog: Arc::new(catalog),
            progress,
            progress_generation,
            metrics,
            _subscription: Arc::new(subscription),
        }
    }

    /// Current progress, from cache or storage.
    pub async fn progress(&self) -> AcademyProgress {
        if let Some(cached) = self.progress.read().as_ref() {
            self.metrics.record_cache_hit();
            return cached.clone();
        }
        self.metrics.record_cache_miss();
        let generation = self.progress_generation.load(Ordering::SeqCst);
        let loaded = store::load_progress(&*self.storage).await;

        let mut slot = self.progress.write();
        if self.progress_generation.load(Ordering::SeqCst) == generation {
            *slot = Some(loaded.clone());
        } else {
            tracing::debug!("Progress changed during load, not caching");
        }
        loaded
    }

    pub fn invalidate_progress(&self) {
        *self.progress.write() = None;
    }

    fn cache_progress(&self, progress: &AcademyProgress) {
        *self.progress.write() = Some(progress.clone());
    }

    pub async fn record_lesson_completion(
        &self,
        track: TrackId,
        lesson_id: &str,
        today: NaiveDate,
    ) -> Result<AcademyProgress, GaiaError> {
        let progress = store::record_lesson_completion(&*self.storage, track, lesson_id, today).await?;
        self.cache_progress(&progress);
        Ok(progress)
    }

    pub async fn toggle_lesson_completed(
        &self,
        track: TrackId,
        lesson_id: &str,
        today: NaiveDate,
    ) -> Result<AcademyProgress, GaiaError> {
        let progress = store::toggle_lesson_completed(&*self.storage, track, lesson_id, today).await?;
        self.cache_progress(&progress);
        Ok(progress)
    }

    pub async fn mark_study_visit(&self, track: TrackId, today: NaiveDate) -> Result<AcademyProgress, GaiaError> {
        let progress = store::mark_study_visit(&*self.storage, track, today).await?;
        self.cache_progress(&progress);
        Ok(progress)
    }

    pub async fn reset_progress(&self, track: Option<TrackId>) -> Result<AcademyProgress, GaiaError> {
        let progress = store::reset_progress(&*self.storage, track).await?;
        self.cache_progress(&progress);
        Ok(progress)
    }

    /// Dashboard for a visit on `today`. Records the visit, so the backlog of
    /// a second call on the same day is empty.
    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardSummary, GaiaError> {
        let last_visit = store::take_last_visit(&*self.storage, today).await?;
        let progress = self.progress().await;
        let summary = build_dashboard(&self.config, &progress, &self.catalog, last_visit, today);

        let days_iterated = last_visit
            .map(|last| (days_between(last, today) - 1).max(0) as u64)
            .unwrap_or(0);
        self.metrics.record_backlog(days_iterated);
        Ok(summary)
    }

    pub async fn month_calendar(&self, year: i32, month: u32, today: NaiveDate) -> Result<MonthCalendar, GaiaError> {
        let progress = self.progress().await;
        month_calendar(&self.config, &progress, &self.catalog, year, month, today)
    }

    pub fn task_store(&self) -> StorageTaskStore<dyn UserStorage> {
        StorageTaskStore::new(self.storage.clone())
    }

    pub async fn reorder_tasks(
        &self,
        category: Category,
        task_id: &str,
        target_id: Option<&str>,
        position: DropPosition,
        today: NaiveDate,
    ) -> Result<Vec<ReorderOutcome>, GaiaError> {
        let outcomes = todo::reorder(&self.task_store(), category, task_id, target_id, position, today).await?;
        let ok = outcomes.iter().filter(|o| o.is_ok()).count() as u64;
        self.metrics.record_reorder(ok, outcomes.len() as u64 - ok);
        Ok(outcomes)
    }
}
