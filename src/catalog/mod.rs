use std::collections::BTreeMap;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::error::GaiaError;
use crate::progress::AcademyProgress;
use crate::schedule::TrackId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub code: String,
    pub title: String,
}

/// Ordered lesson lists per track. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonCatalog {
    tracks: BTreeMap<TrackId, Vec<Lesson>>,
}

impl LessonCatalog {
    pub fn new(tracks: BTreeMap<TrackId, Vec<Lesson>>) -> Self {
        LessonCatalog { tracks }
    }

    pub fn from_json(json: &str) -> Result<Self, GaiaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog file, or an empty catalog if there is none.
    pub async fn load(path: &Path) -> Result<Self, GaiaError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Self::from_json(&content)
                .map_err(|e| e.with_context(format!("path: {:?}", path))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?path, "No lesson catalog found, using empty catalog");
                Ok(Self::default())
            }
            Err(e) => Err(GaiaError::from(e).with_context(format!("path: {:?}", path))),
        }
    }

    pub fn lessons(&self, track: TrackId) -> &[Lesson] {
        self.tracks.get(&track).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total(&self, track: TrackId) -> usize {
        self.lessons(track).len()
    }

    /// First lesson not yet completed, or the first lesson when all are done.
    pub fn next_lesson(&self, track: TrackId, progress: &AcademyProgress) -> Option<&Lesson> {
        let lessons = self.lessons(track);
        lessons
            .iter()
            .find(|lesson| !progress.is_lesson_completed(track, &lesson.id))
            .or_else(|| lessons.first())
    }

    /// Completed share of the track, rounded to a whole percent.
    pub fn percent_complete(&self, track: TrackId, progress: &AcademyProgress) -> u32 {
        let total = self.total(track);
        if total == 0 {
            return 0;
        }
        let completed = progress.track(track).completed_count();
        ((completed as f64 / total as f64) * 100.0).round() as u32
    }

    /// "Lesson <code>" for the lesson at `ordinal` in the track, if any.
    pub fn ordinal_label(&self, track: TrackId, ordinal: usize) -> Option<String> {
        self.lessons(track)
            .get(ordinal)
            .filter(|lesson| !lesson.code.is_empty())
            .map(|lesson| format!("Lesson {}", lesson.code))
    }
}
