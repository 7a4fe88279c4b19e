pub mod cadence;
pub mod days;
pub mod rotation;

use std::fmt;
use std::str::FromStr;
use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::calendar::{date_range, WeekWindow};
use crate::config::ScheduleConfig;

pub use cadence::cadence_level;
pub use days::study_days;
pub use rotation::track_for_week;

/// One of the three parallel curricula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackId {
    Programming,
    Accounting,
    SelfRepair,
}

impl TrackId {
    pub const ALL: [TrackId; 3] = [TrackId::Programming, TrackId::Accounting, TrackId::SelfRepair];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackId::Programming => "programming",
            TrackId::Accounting => "accounting",
            TrackId::SelfRepair => "self-repair",
        }
    }

    /// Human-facing name of the track.
    pub fn label(&self) -> &'static str {
        match self {
            TrackId::Programming => "Web Programming",
            TrackId::Accounting => "Accounting",
            TrackId::SelfRepair => "Self-Repair",
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "programming" => Ok(TrackId::Programming),
            "accounting" => Ok(TrackId::Accounting),
            "self-repair" => Ok(TrackId::SelfRepair),
            other => Err(format!("unknown track '{}'", other)),
        }
    }
}

/// What the plan asks for on a single date. `minutes == 0` is a rest day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub track_id: TrackId,
    pub minutes: u32,
}

impl ScheduleEntry {
    pub fn rest(track_id: TrackId) -> Self {
        ScheduleEntry { track_id, minutes: 0 }
    }

    pub fn is_study_day(&self) -> bool {
        self.minutes > 0
    }
}

/// The resolved plan for one Monday–Sunday window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPlan {
    pub window: WeekWindow,
    pub track_id: TrackId,
    pub cadence: u8,
    /// Selected study days, in calendar order.
    pub study_days: Vec<NaiveDate>,
}

impl WeekPlan {
    pub fn entry_for(&self, config: &ScheduleConfig, date: NaiveDate) -> ScheduleEntry {
        if date < config.anchor || !self.study_days.contains(&date) {
            return ScheduleEntry::rest(self.track_id);
        }
        ScheduleEntry { track_id: self.track_id, minutes: config.minutes_per_study_day }
    }
}

/// Track, cadence and study days of the week containing `date`.
/// Cadence is evaluated at the window's Monday.
pub fn week_plan(config: &ScheduleConfig, date: NaiveDate) -> WeekPlan {
    let window = WeekWindow::containing(date);
    let track_id = track_for_week(config, window.start());
    let cadence = cadence_level(config, window.start());
    let mut picked = study_days(config, window, track_id, cadence);
    picked.sort();

    WeekPlan { window, track_id, cadence, study_days: picked }
}

/// The schedule for a single date. Total and pure.
pub fn schedule_for(config: &ScheduleConfig, date: NaiveDate) -> ScheduleEntry {
    if date < config.anchor {
        return ScheduleEntry::rest(TrackId::Programming);
    }
    week_plan(config, date).entry_for(config, date)
}

/// Schedule of every date in `start..=end`, resolving each week once.
pub fn schedule_range(
    config: &ScheduleConfig,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<(NaiveDate, ScheduleEntry)> {
    let mut out = Vec::new();
    let mut current: Option<WeekPlan> = None;

    for date in date_range(start, end) {
        if date < config.anchor {
            out.push((date, ScheduleEntry::rest(TrackId::Programming)));
            continue;
        }
        let plan = match current.take() {
            Some(plan) if plan.window.contains(date) => plan,
            _ => week_plan(config, date),
        };
        out.push((date, plan.entry_for(config, date)));
        current = Some(plan);
    }

    out
}
