use chrono::NaiveDate;
use crate::calendar::month_index;
use crate::config::ScheduleConfig;

/// Calendar months from the anchor's month to `date`'s month, never negative.
pub fn months_elapsed(config: &ScheduleConfig, date: NaiveDate) -> u32 {
    let diff = month_index(date) - month_index(config.anchor);
    u32::try_from(diff.max(0)).unwrap_or(u32::MAX)
}

/// Study days per week in force on `date`: one in the anchor's month, one more
/// each following month, capped at `max_cadence`.
pub fn cadence_level(config: &ScheduleConfig, date: NaiveDate) -> u8 {
    let cap = config.max_cadence.clamp(1, 7);
    let level = months_elapsed(config, date).saturating_add(1);
    u8::try_from(level).unwrap_or(u8::MAX).clamp(1, cap)
}
