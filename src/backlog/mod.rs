pub mod summary;

use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::calendar::add_days;
use crate::config::{ScheduleConfig, TierThresholds};
use crate::schedule::{schedule_range, TrackId};

pub use summary::{compute_plan_summary, PlanSummary, PlanSummaryByTrack};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BacklogTier {
    Clear,
    Light,
    Medium,
    Heavy,
}

impl BacklogTier {
    pub fn classify(minutes: u32, thresholds: &TierThresholds) -> Self {
        if minutes == 0 {
            BacklogTier::Clear
        } else if minutes <= thresholds.light_max {
            BacklogTier::Light
        } else if minutes <= thresholds.medium_max {
            BacklogTier::Medium
        } else {
            BacklogTier::Heavy
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BacklogTier::Clear => "no backlog",
            BacklogTier::Light => "light backlog",
            BacklogTier::Medium => "medium backlog",
            BacklogTier::Heavy => "heavy backlog",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackBacklog {
    pub minutes: u32,
    pub tier: BacklogTier,
}

/// Scheduled study time that fell between two visits.
///
/// Advisory only: it counts what the plan asked for, not what was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogSnapshot {
    pub days: u32,
    pub total_minutes: u32,
    pub per_track: BTreeMap<TrackId, TrackBacklog>,
}

impl BacklogSnapshot {
    pub fn empty() -> Self {
        let per_track = TrackId::ALL
            .iter()
            .map(|t| (*t, TrackBacklog { minutes: 0, tier: BacklogTier::Clear }))
            .collect();
        BacklogSnapshot { days: 0, total_minutes: 0, per_track }
    }

    pub fn track(&self, track: TrackId) -> TrackBacklog {
        self.per_track
            .get(&track)
            .copied()
            .unwrap_or(TrackBacklog { minutes: 0, tier: BacklogTier::Clear })
    }

    pub fn is_clear(&self) -> bool {
        self.total_minutes == 0
    }
}

/// Backlog accrued strictly between `last_visit` and `today`.
///
/// Both endpoints are excluded: the last visit was already seen, and today is
/// surfaced as today's focus. Cost is linear in the gap between the visits.
pub fn compute_backlog(
    config: &ScheduleConfig,
    last_visit: Option<NaiveDate>,
    today: NaiveDate,
) -> BacklogSnapshot {
    let mut snapshot = BacklogSnapshot::empty();
    let last_visit = match last_visit {
        Some(date) if date < today => date,
        _ => return snapshot,
    };

    let start = add_days(last_visit, 1);
    let end = add_days(today, -1);
    if start > end {
        return snapshot;
    }

    let mut minutes_by_track: BTreeMap<TrackId, u32> = BTreeMap::new();
    let mut iterated = 0u64;
    for (_, entry) in schedule_range(config, start, end) {
        iterated += 1;
        if !entry.is_study_day() {
            continue;
        }
        snapshot.days += 1;
        snapshot.total_minutes = snapshot.total_minutes.saturating_add(entry.minutes);
        let slot = minutes_by_track.entry(entry.track_id).or_insert(0);
        *slot = slot.saturating_add(entry.minutes);
    }

    for (track, minutes) in minutes_by_track {
        snapshot.per_track.insert(
            track,
            TrackBacklog { minutes, tier: BacklogTier::classify(minutes, &config.tiers) },
        );
    }

    tracing::debug!(
        last_visit = %last_visit,
        today = %today,
        days_iterated = iterated,
        study_days = snapshot.days,
        total_minutes = snapshot.total_minutes,
        "Computed backlog"
    );
    snapshot
}

/// "45 minutes", "1 hour", "2.5 hours".
pub fn format_approx_hours(minutes: u32) -> String {
    if minutes == 0 {
        return "0 minutes".to_string();
    }
    if minutes < 60 {
        return format!("{} minutes", minutes);
    }
    let hours = f64::from(minutes) / 60.0;
    let rounded = (hours * 10.0).round() / 10.0;
    let suffix = if (rounded - 1.0).abs() < f64::EPSILON { "" } else { "s" };
    format!("{} hour{}", rounded, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        let t = TierThresholds::default();
        assert_eq!(BacklogTier::classify(0, &t), BacklogTier::Clear);
        assert_eq!(BacklogTier::classify(1, &t), BacklogTier::Light);
        assert_eq!(BacklogTier::classify(60, &t), BacklogTier::Light);
        assert_eq!(BacklogTier::classify(61, &t), BacklogTier::Medium);
        assert_eq!(BacklogTier::classify(180, &t), BacklogTier::Medium);
        assert_eq!(BacklogTier::classify(181, &t), BacklogTier::Heavy);
    }

    #[test]
    fn test_format_approx_hours() {
        assert_eq!(format_approx_hours(0), "0 minutes");
        assert_eq!(format_approx_hours(45), "45 minutes");
        assert_eq!(format_approx_hours(60), "1 hour");
        assert_eq!(format_approx_hours(90), "1.5 hours");
        assert_eq!(format_approx_hours(120), "2 hours");
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(BacklogTier::Clear.label(), "no backlog");
        assert_eq!(BacklogTier::Heavy.label(), "heavy backlog");
    }
}
