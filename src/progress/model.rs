use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::calendar::parse_iso;
use crate::schedule::TrackId;

/// Persisted study state of one track.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackProgress {
    /// Completed lessons, in completion order, each listed once.
    #[serde(default)]
    pub completed_lesson_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_study_date: Option<NaiveDate>,
    /// Days the track was studied, ascending, each listed once.
    #[serde(default)]
    pub study_history: Vec<NaiveDate>,
}

static EMPTY_TRACK: TrackProgress = TrackProgress {
    completed_lesson_ids: Vec::new(),
    started_on: None,
    last_study_date: None,
    study_history: Vec::new(),
};

impl TrackProgress {
    pub fn completed_count(&self) -> usize {
        self.completed_lesson_ids.len()
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.completed_lesson_ids.iter().any(|id| id == lesson_id)
    }

    /// Study-history entries on or before `date`.
    pub fn studied_days_through(&self, date: NaiveDate) -> usize {
        self.study_history.partition_point(|d| *d <= date)
    }

    /// Record a lesson as completed. Returns false if it already was.
    pub fn record_completion(&mut self, lesson_id: &str, today: NaiveDate) -> bool {
        let added = !self.is_completed(lesson_id);
        if added {
            self.completed_lesson_ids.push(lesson_id.to_string());
        }
        self.stamp(today);
        added
    }

    /// Flip a lesson's completion. Returns whether it is completed afterwards.
    pub fn toggle_completion(&mut self, lesson_id: &str, today: NaiveDate) -> bool {
        if self.is_completed(lesson_id) {
            self.completed_lesson_ids.retain(|id| id != lesson_id);
            self.stamp(today);
            false
        } else {
            self.record_completion(lesson_id, today)
        }
    }

    /// A visit without finishing a lesson.
    pub fn record_visit(&mut self, today: NaiveDate) {
        self.stamp(today);
    }

    fn stamp(&mut self, today: NaiveDate) {
        self.started_on.get_or_insert(today);
        self.last_study_date = Some(today);
        if let Err(pos) = self.study_history.binary_search(&today) {
            self.study_history.insert(pos, today);
        }
    }

    /// Build from an untrusted stored value, keeping every well-formed field.
    pub fn from_value_lossy(track: TrackId, value: &Value) -> Self {
        let mut progress = TrackProgress::default();
        let Some(obj) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!(track = %track, "Stored track progress is not an object, using empty progress");
            }
            return progress;
        };

        if let Some(ids) = obj.get("completedLessonIds").and_then(Value::as_array) {
            for id in ids.iter().filter_map(Value::as_str) {
                if !progress.is_completed(id) {
                    progress.completed_lesson_ids.push(id.to_string());
                }
            }
        }
        progress.started_on = lossy_date(track, obj.get("startedOn"), "startedOn");
        progress.last_study_date = lossy_date(track, obj.get("lastStudyDate"), "lastStudyDate");

        if let Some(history) = obj.get("studyHistory").and_then(Value::as_array) {
            let mut dates: Vec<NaiveDate> = history
                .iter()
                .filter_map(|v| v.as_str())
                .filter_map(|s| parse_iso(s).ok())
                .collect();
            if dates.len() != history.len() {
                tracing::warn!(track = %track, dropped = history.len() - dates.len(), "Dropped malformed study history entries");
            }
            dates.sort();
            dates.dedup();
            progress.study_history = dates;
        }

        progress
    }
}

fn lossy_date(track: TrackId, value: Option<&Value>, field: &'static str) -> Option<NaiveDate> {
    let raw = value?.as_str()?;
    match parse_iso(raw) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(track = %track, field, error = %e, "Ignoring malformed stored date");
            None
        }
    }
}

/// Study progress of every track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademyProgress {
    pub by_track: BTreeMap<TrackId, TrackProgress>,
}

impl Default for AcademyProgress {
    fn default() -> Self {
        Self::empty()
    }
}

impl AcademyProgress {
    pub fn empty() -> Self {
        AcademyProgress {
            by_track: TrackId::ALL.iter().map(|t| (*t, TrackProgress::default())).collect(),
        }
    }

    pub fn track(&self, track: TrackId) -> &TrackProgress {
        self.by_track.get(&track).unwrap_or(&EMPTY_TRACK)
    }

    pub fn track_mut(&mut self, track: TrackId) -> &mut TrackProgress {
        self.by_track.entry(track).or_default()
    }

    pub fn is_lesson_completed(&self, track: TrackId, lesson_id: &str) -> bool {
        self.track(track).is_completed(lesson_id)
    }

    /// Clear one track, or every track when `track` is `None`.
    pub fn reset(&mut self, track: Option<TrackId>) {
        match track {
            Some(track) => {
                self.by_track.insert(track, TrackProgress::default());
            }
            None => *self = AcademyProgress::empty(),
        }
    }

    /// Parse a stored blob. Anything missing or malformed becomes empty
    /// progress rather than an error, so a bad blob never blocks the dashboard.
    pub fn from_value_lossy(value: Option<&Value>) -> Self {
        let mut progress = AcademyProgress::empty();
        let Some(by_track) = value.and_then(|v| v.get("byTrack")).and_then(Value::as_object) else {
            if value.is_some_and(|v| !v.is_null()) {
                tracing::warn!("Stored academy progress has no byTrack object, using empty progress");
            }
            return progress;
        };

        for track in TrackId::ALL {
            if let Some(raw) = by_track.get(track.as_str()) {
                progress.by_track.insert(track, TrackProgress::from_value_lossy(track, raw));
            }
        }
        progress
    }
}
