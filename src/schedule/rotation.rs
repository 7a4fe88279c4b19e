use chrono::NaiveDate;
use crate::calendar::weeks_between;
use crate::config::ScheduleConfig;
use super::TrackId;

/// Index of the week starting at `week_start`, counted from the anchor.
/// Weeks at or before the anchor's week are week 0.
pub fn week_index(config: &ScheduleConfig, week_start: NaiveDate) -> u32 {
    weeks_between(config.anchor, week_start)
}

/// Track assigned to the week starting at `week_start`.
pub fn track_for_week(config: &ScheduleConfig, week_start: NaiveDate) -> TrackId {
    let index = week_index(config, week_start) as usize;
    config
        .rotation
        .get(index % config.rotation.len().max(1))
        .copied()
        .unwrap_or(TrackId::Programming)
}
