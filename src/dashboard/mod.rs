//! Read model for the academy dashboard: today's focus, backlog and per-track totals.

use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::backlog::{compute_backlog, compute_plan_summary, BacklogSnapshot, BacklogTier, PlanSummaryByTrack};
use crate::catalog::{Lesson, LessonCatalog};
use crate::config::ScheduleConfig;
use crate::progress::AcademyProgress;
use crate::schedule::{schedule_for, ScheduleEntry, TrackId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayFocus {
    pub date: NaiveDate,
    pub entry: ScheduleEntry,
    pub is_rest_day: bool,
    /// Next lesson of today's track, if the catalog has any.
    pub next_lesson: Option<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub track_id: TrackId,
    pub label: String,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub percent_complete: u32,
    pub last_study_date: Option<NaiveDate>,
    pub backlog_minutes: u32,
    pub backlog_tier: BacklogTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub today: TodayFocus,
    pub backlog: BacklogSnapshot,
    pub plan: PlanSummaryByTrack,
    pub tracks: BTreeMap<TrackId, TrackSummary>,
}

pub fn build_dashboard(
    config: &ScheduleConfig,
    progress: &AcademyProgress,
    catalog: &LessonCatalog,
    last_visit: Option<NaiveDate>,
    today: NaiveDate,
) -> DashboardSummary {
    let entry = schedule_for(config, today);
    let focus = TodayFocus {
        date: today,
        entry,
        is_rest_day: !entry.is_study_day(),
        next_lesson: catalog.next_lesson(entry.track_id, progress).cloned(),
    };

    let backlog = compute_backlog(config, last_visit, today);
    let plan = compute_plan_summary(config, progress, today);

    let tracks = TrackId::ALL
        .iter()
        .map(|&track| {
            let state = progress.track(track);
            let owed = backlog.track(track);
            let summary = TrackSummary {
                track_id: track,
                label: track.label().to_string(),
                total_lessons: catalog.total(track),
                completed_lessons: state.completed_count(),
                percent_complete: catalog.percent_complete(track, progress),
                last_study_date: state.last_study_date,
                backlog_minutes: owed.minutes,
                backlog_tier: owed.tier,
            };
            (track, summary)
        })
        .collect();

    DashboardSummary { today: focus, backlog, plan, tracks }
}
