use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::calendar::add_days;
use crate::config::ScheduleConfig;
use crate::progress::AcademyProgress;
use crate::schedule::{schedule_range, TrackId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanSummary {
    pub scheduled_days: u32,
    pub completed_days: u32,
    pub backlog_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummaryByTrack {
    pub total: PlanSummary,
    pub per_track: BTreeMap<TrackId, PlanSummary>,
    /// Studied days beyond what the plan has asked for so far.
    pub ahead_days: u32,
}

/// Whole-plan tally from the anchor through yesterday, against study history.
pub fn compute_plan_summary(
    config: &ScheduleConfig,
    progress: &AcademyProgress,
    today: NaiveDate,
) -> PlanSummaryByTrack {
    let mut scheduled: BTreeMap<TrackId, u32> = TrackId::ALL.iter().map(|t| (*t, 0)).collect();

    let yesterday = add_days(today, -1);
    for (_, entry) in schedule_range(config, config.anchor, yesterday) {
        if entry.is_study_day() {
            *scheduled.entry(entry.track_id).or_insert(0) += 1;
        }
    }

    let mut per_track = BTreeMap::new();
    let mut total = PlanSummary::default();
    for (track, scheduled_days) in scheduled {
        let completed_days =
            u32::try_from(progress.track(track).studied_days_through(today)).unwrap_or(u32::MAX);
        let summary = PlanSummary {
            scheduled_days,
            completed_days,
            backlog_days: scheduled_days.saturating_sub(completed_days),
        };
        total.scheduled_days += summary.scheduled_days;
        total.completed_days += summary.completed_days;
        total.backlog_days += summary.backlog_days;
        per_track.insert(track, summary);
    }

    PlanSummaryByTrack {
        ahead_days: total.completed_days.saturating_sub(total.scheduled_days),
        total,
        per_track,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_first_three_weeks_of_plan() {
        let config = ScheduleConfig::default();
        // Through Dec 21: Mon Dec 1 (programming), Mon Dec 8 (accounting), Fri Dec 19 (self-repair).
        let summary = compute_plan_summary(&config, &AcademyProgress::empty(), d(2025, 12, 22));
        assert_eq!(summary.per_track[&TrackId::Programming].scheduled_days, 1);
        assert_eq!(summary.per_track[&TrackId::Accounting].scheduled_days, 1);
        assert_eq!(summary.per_track[&TrackId::SelfRepair].scheduled_days, 1);
        assert_eq!(summary.total.backlog_days, 3);
        assert_eq!(summary.ahead_days, 0);
    }

    #[test]
    fn test_extra_study_counts_as_ahead() {
        let config = ScheduleConfig::default();
        let mut progress = AcademyProgress::empty();
        for day in 1..=4 {
            progress.track_mut(TrackId::Programming).record_visit(d(2025, 12, day));
        }
        let summary = compute_plan_summary(&config, &progress, d(2025, 12, 5));
        assert_eq!(summary.per_track[&TrackId::Programming].completed_days, 4);
        assert_eq!(summary.per_track[&TrackId::Programming].backlog_days, 0);
        assert_eq!(summary.total.scheduled_days, 1);
        assert_eq!(summary.ahead_days, 3);
    }
}
