use chrono::NaiveDate;
use serde_json::Value;
use crate::calendar::{format_iso, parse_iso};
use crate::error::{ErrorKind, GaiaError};
use crate::progress::model::AcademyProgress;
use crate::schedule::TrackId;
use crate::storage::UserStorage;

pub const PROGRESS_KEY: &str = "gaia_academy_progress_v1";
pub const LAST_VISIT_KEY: &str = "gaia_academy_last_visit_v1";

/// Load academy progress for display. Unreadable or malformed data yields
/// empty progress; mutations go through [`load_progress_for_update`].
pub async fn load_progress<S: UserStorage + ?Sized>(storage: &S) -> AcademyProgress {
    match storage.read(PROGRESS_KEY).await {
        Ok(value) => AcademyProgress::from_value_lossy(value.as_ref()),
        Err(e) => {
            tracing::warn!(key = PROGRESS_KEY, error = %e, "Failed to read academy progress, using empty progress");
            AcademyProgress::empty()
        }
    }
}

pub async fn save_progress<S: UserStorage + ?Sized>(
    storage: &S,
    progress: &AcademyProgress,
) -> Result<(), GaiaError> {
    let value = serde_json::to_value(progress)
        .map_err(|e| GaiaError::new(
            ErrorKind::Json,
            format!("Failed to serialize academy progress: {}", e),
            "json_serialize"
        ))?;
    storage.write(PROGRESS_KEY, value).await.map_err(|e| {
        if e.is_persistence() {
            e
        } else {
            GaiaError::persistence(e.message.clone(), "progress_save").with_source(e.to_string())
        }
    })
}

/// Load progress for a read-modify-write. A malformed blob still parses
/// leniently, but a failed read is an error so the stored value is never
/// overwritten with empty progress.
pub async fn load_progress_for_update<S: UserStorage + ?Sized>(
    storage: &S,
) -> Result<AcademyProgress, GaiaError> {
    let value = storage.read(PROGRESS_KEY).await.map_err(|e| {
        GaiaError::new(ErrorKind::Persistence, "Failed to read academy progress before update", "progress_load")
            .with_context(format!("key: {}", PROGRESS_KEY))
            .with_source(e.to_string())
    })?;
    Ok(AcademyProgress::from_value_lossy(value.as_ref()))
}

/// Load, mutate and persist progress. Returns the saved state.
pub async fn update_progress<S, F>(storage: &S, f: F) -> Result<AcademyProgress, GaiaError>
where
    S: UserStorage + ?Sized,
    F: FnOnce(&mut AcademyProgress),
{
    let mut progress = load_progress_for_update(storage).await?;
    f(&mut progress);
    save_progress(storage, &progress).await?;
    Ok(progress)
}

pub async fn record_lesson_completion<S: UserStorage + ?Sized>(
    storage: &S,
    track: TrackId,
    lesson_id: &str,
    today: NaiveDate,
) -> Result<AcademyProgress, GaiaError> {
    let progress = update_progress(storage, |p| {
        p.track_mut(track).record_completion(lesson_id, today);
    })
    .await?;
    tracing::info!(track = %track, lesson_id, date = %today, "Recorded lesson completion");
    Ok(progress)
}

pub async fn toggle_lesson_completed<S: UserStorage + ?Sized>(
    storage: &S,
    track: TrackId,
    lesson_id: &str,
    today: NaiveDate,
) -> Result<AcademyProgress, GaiaError> {
    let mut completed = false;
    let progress = update_progress(storage, |p| {
        completed = p.track_mut(track).toggle_completion(lesson_id, today);
    })
    .await?;
    tracing::info!(track = %track, lesson_id, completed, "Toggled lesson completion");
    Ok(progress)
}

pub async fn mark_study_visit<S: UserStorage + ?Sized>(
    storage: &S,
    track: TrackId,
    today: NaiveDate,
) -> Result<AcademyProgress, GaiaError> {
    let progress = update_progress(storage, |p| p.track_mut(track).record_visit(today)).await?;
    tracing::debug!(track = %track, date = %today, "Recorded study visit");
    Ok(progress)
}

pub async fn reset_progress<S: UserStorage + ?Sized>(
    storage: &S,
    track: Option<TrackId>,
) -> Result<AcademyProgress, GaiaError> {
    let progress = update_progress(storage, |p| p.reset(track)).await?;
    tracing::info!(track = ?track, "Reset academy progress");
    Ok(progress)
}

/// Return the previously recorded dashboard visit and record `today` in its place.
pub async fn take_last_visit<S: UserStorage + ?Sized>(
    storage: &S,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, GaiaError> {
    let previous = match storage.read(LAST_VISIT_KEY).await {
        Ok(Some(Value::String(raw))) => match parse_iso(&raw) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed last visit date");
                None
            }
        },
        Ok(Some(other)) => {
            tracing::warn!(value = %other, "Ignoring non-string last visit value");
            None
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read last visit date");
            None
        }
    };

    storage
        .write(LAST_VISIT_KEY, Value::String(format_iso(today)))
        .await?;
    Ok(previous)
}
