#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use gaia_lib::allocator::DayStatus;
    use gaia_lib::error::{ErrorKind, GaiaError};
    use gaia_lib::catalog::{Lesson, LessonCatalog};
    use gaia_lib::config::ScheduleConfig;
    use gaia_lib::progress::store::{
        load_progress, mark_study_visit, record_lesson_completion, take_last_visit, toggle_lesson_completed,
        LAST_VISIT_KEY, PROGRESS_KEY,
    };
    use gaia_lib::schedule::TrackId;
    use gaia_lib::state::AppState;
    use gaia_lib::storage::{FileStorage, MemoryStorage, StorageCallback, Subscription, UserStorage};
    use gaia_lib::todo::{Category, DropPosition, StorageTaskStore, Task, TaskStore};

    /// Storage whose reads always fail while writes go through.
    struct UnreadableStorage {
        inner: Arc<MemoryStorage>,
    }

    #[async_trait]
    impl UserStorage for UnreadableStorage {
        async fn read(&self, _key: &str) -> Result<Option<Value>, GaiaError> {
            Err(GaiaError::new(ErrorKind::Io, "I/O error: EIO", "test_storage"))
        }

        async fn write(&self, key: &str, value: Value) -> Result<(), GaiaError> {
            self.inner.write(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), GaiaError> {
            self.inner.remove(key).await
        }

        fn subscribe(&self, callback: StorageCallback) -> Subscription {
            self.inner.subscribe(callback)
        }
    }

    /// Storage where a synced progress value arrives while a read is in
    /// flight: the read returns what was stored before the sync.
    struct SyncDuringRead {
        inner: Arc<MemoryStorage>,
        incoming: Mutex<Option<Value>>,
    }

    #[async_trait]
    impl UserStorage for SyncDuringRead {
        async fn read(&self, key: &str) -> Result<Option<Value>, GaiaError> {
            let before = self.inner.read(key).await?;
            if key == PROGRESS_KEY {
                let incoming = self.incoming.lock().take();
                if let Some(value) = incoming {
                    self.inner.apply_remote(key, value);
                }
            }
            Ok(before)
        }

        async fn write(&self, key: &str, value: Value) -> Result<(), GaiaError> {
            self.inner.write(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), GaiaError> {
            self.inner.remove(key).await
        }

        fn subscribe(&self, callback: StorageCallback) -> Subscription {
            self.inner.subscribe(callback)
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn catalog() -> LessonCatalog {
        let lessons = vec![
            Lesson { id: "p1".into(), code: "1".into(), title: "One".into() },
            Lesson { id: "p2".into(), code: "2".into(), title: "Two".into() },
        ];
        LessonCatalog::new([(TrackId::Programming, lessons)].into_iter().collect())
    }

    #[tokio::test]
    async fn test_malformed_blob_reads_as_empty() {
        let storage = MemoryStorage::new();
        storage.write(PROGRESS_KEY, json!("definitely not progress")).await.unwrap();
        let progress = load_progress(&storage).await;
        assert_eq!(progress.track(TrackId::Programming).completed_count(), 0);
    }

    #[tokio::test]
    async fn test_completion_persists_in_memory() {
        let storage = MemoryStorage::new();
        record_lesson_completion(&storage, TrackId::Accounting, "a1", d(2025, 12, 8)).await.unwrap();
        mark_study_visit(&storage, TrackId::Accounting, d(2025, 12, 9)).await.unwrap();

        let progress = load_progress(&storage).await;
        let accounting = progress.track(TrackId::Accounting);
        assert_eq!(accounting.completed_lesson_ids, vec!["a1".to_string()]);
        assert_eq!(accounting.started_on, Some(d(2025, 12, 8)));
        assert_eq!(accounting.last_study_date, Some(d(2025, 12, 9)));
        assert_eq!(accounting.study_history, vec![d(2025, 12, 8), d(2025, 12, 9)]);

        toggle_lesson_completed(&storage, TrackId::Accounting, "a1", d(2025, 12, 10)).await.unwrap();
        assert_eq!(load_progress(&storage).await.track(TrackId::Accounting).completed_count(), 0);
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("gaia"));

        assert!(storage.read(PROGRESS_KEY).await.unwrap().is_none());
        record_lesson_completion(&storage, TrackId::SelfRepair, "s1", d(2025, 12, 19)).await.unwrap();

        let reopened = FileStorage::new(dir.path().join("gaia"));
        let progress = load_progress(&reopened).await;
        assert!(progress.is_lesson_completed(TrackId::SelfRepair, "s1"));

        reopened.remove(PROGRESS_KEY).await.unwrap();
        reopened.remove(PROGRESS_KEY).await.unwrap();
        assert!(reopened.read(PROGRESS_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_storage_write_failure_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file in the way").unwrap();

        let storage = FileStorage::new(&blocker);
        let err = record_lesson_completion(&storage, TrackId::Programming, "p1", d(2025, 12, 1))
            .await
            .unwrap_err();
        assert!(err.is_persistence());
    }

    #[tokio::test]
    async fn test_take_last_visit_returns_previous_and_records_today() {
        let storage = MemoryStorage::new();
        assert_eq!(take_last_visit(&storage, d(2025, 12, 1)).await.unwrap(), None);
        assert_eq!(take_last_visit(&storage, d(2025, 12, 5)).await.unwrap(), Some(d(2025, 12, 1)));
        assert_eq!(storage.read(LAST_VISIT_KEY).await.unwrap(), Some(json!("2025-12-05")));

        storage.write(LAST_VISIT_KEY, json!("12/05/2025")).await.unwrap();
        assert_eq!(take_last_visit(&storage, d(2025, 12, 6)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remote_change_drops_progress_cache() {
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::new(Arc::new(ScheduleConfig::default()), storage.clone(), catalog());

        assert_eq!(state.progress().await.track(TrackId::Programming).completed_count(), 0);
        assert_eq!(state.progress().await.track(TrackId::Programming).completed_count(), 0);
        let metrics = state.metrics.snapshot();
        assert_eq!(metrics.progress_cache_misses, 1);
        assert_eq!(metrics.progress_cache_hits, 1);

        storage.apply_remote(
            PROGRESS_KEY,
            json!({"byTrack": {"programming": {"completedLessonIds": ["p1"]}}}),
        );
        assert!(state.progress.read().is_none());
        assert!(state.progress().await.is_lesson_completed(TrackId::Programming, "p1"));
        assert_eq!(state.metrics.snapshot().remote_invalidations, 1);

        // Unrelated keys leave the cache alone.
        storage.apply_remote("something-else", json!(1));
        assert!(state.progress.read().is_some());
    }

    #[tokio::test]
    async fn test_dashboard_records_visit() {
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::new(Arc::new(ScheduleConfig::default()), storage.clone(), catalog());

        state.record_lesson_completion(TrackId::Programming, "p1", d(2025, 12, 1)).await.unwrap();
        let first = state.dashboard(d(2025, 12, 1)).await.unwrap();
        assert_eq!(first.tracks[&TrackId::Programming].percent_complete, 50);
        assert!(first.backlog.is_clear());

        // Mon Dec 8 (accounting) falls between the visits.
        let second = state.dashboard(d(2025, 12, 10)).await.unwrap();
        assert_eq!(second.backlog.total_minutes, 30);
        assert_eq!(state.metrics.snapshot().backlog_days_iterated, 8);

        let third = state.dashboard(d(2025, 12, 10)).await.unwrap();
        assert!(third.backlog.is_clear());
    }

    #[tokio::test]
    async fn test_reorder_through_app_state_counts_writes() {
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::new(Arc::new(ScheduleConfig::default()), storage.clone(), catalog());
        let store: StorageTaskStore<MemoryStorage> = StorageTaskStore::new(storage.clone());
        let created = chrono::Utc::now();
        store.upsert(&Task::new("x", Category::Life, "x", created).with_due_date(d(2025, 12, 2))).await.unwrap();
        store.upsert(&Task::new("y", Category::Life, "y", created).with_due_date(d(2025, 12, 3))).await.unwrap();

        let outcomes = state
            .reorder_tasks(Category::Life, "y", Some("x"), DropPosition::Before, d(2025, 12, 1))
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        let metrics = state.metrics.snapshot();
        assert_eq!(metrics.reorders, 1);
        assert_eq!(metrics.task_writes_ok, 2);
        assert_eq!(metrics.task_writes_failed, 0);
    }

    #[tokio::test]
    async fn test_failed_read_does_not_overwrite_progress() {
        let inner = Arc::new(MemoryStorage::new());
        for id in ["a1", "a2", "a3"] {
            record_lesson_completion(&*inner, TrackId::Accounting, id, d(2025, 12, 8)).await.unwrap();
        }
        assert_eq!(inner.keys(), vec![PROGRESS_KEY.to_string()]);

        let unreadable = UnreadableStorage { inner: inner.clone() };
        let err = record_lesson_completion(&unreadable, TrackId::Programming, "p1", d(2025, 12, 9))
            .await
            .unwrap_err();
        assert!(err.is_persistence());
        assert!(mark_study_visit(&unreadable, TrackId::Programming, d(2025, 12, 9)).await.is_err());

        let stored = load_progress(&*inner).await;
        assert_eq!(stored.track(TrackId::Accounting).completed_count(), 3);
        assert_eq!(stored.track(TrackId::Accounting).study_history, vec![d(2025, 12, 8)]);
        assert!(!stored.is_lesson_completed(TrackId::Programming, "p1"));
    }

    #[tokio::test]
    async fn test_sync_during_load_is_not_cached_stale() {
        let inner = Arc::new(MemoryStorage::new());
        let storage = Arc::new(SyncDuringRead {
            inner: inner.clone(),
            incoming: Mutex::new(Some(json!({"byTrack": {"programming": {"completedLessonIds": ["p1"]}}}))),
        });
        let state = AppState::new(Arc::new(ScheduleConfig::default()), storage, catalog());

        let first = state.progress().await;
        assert!(!first.is_lesson_completed(TrackId::Programming, "p1"));
        assert!(state.progress.read().is_none(), "stale load must not fill the cache");

        let second = state.progress().await;
        assert!(second.is_lesson_completed(TrackId::Programming, "p1"));
        assert_eq!(state.metrics.snapshot().remote_invalidations, 1);
    }

    #[tokio::test]
    async fn test_month_view_reads_through_cache() {
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::new(Arc::new(ScheduleConfig::default()), storage.clone(), catalog());
        state.record_lesson_completion(TrackId::Programming, "p1", d(2025, 12, 1)).await.unwrap();

        let cal = state.month_calendar(2025, 12, d(2025, 12, 15)).await.unwrap();
        let dec1 = cal.cell(d(2025, 12, 1)).unwrap();
        assert_eq!(dec1.status, DayStatus::Completed);
        assert_eq!(dec1.lesson_label.as_deref(), Some("Lesson 1"));
        assert_eq!(state.metrics.snapshot().progress_cache_hits, 1);

        state.invalidate_progress();
        assert!(state.progress.read().is_none());
        assert!(state.month_calendar(2025, 13, d(2025, 12, 15)).await.is_err());
        assert_eq!(state.metrics.snapshot().progress_cache_misses, 1);
    }
}
