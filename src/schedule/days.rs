use chrono::NaiveDate;
use crate::calendar::WeekWindow;
use crate::config::ScheduleConfig;
use super::TrackId;

/// Pick the study days of one week.
///
/// Walks the track's preferred weekday order and takes the matching date of
/// `window` when it is on or after the anchor, stopping after `cadence`
/// picks. Dates come back in pick order, not calendar order.
pub fn study_days(
    config: &ScheduleConfig,
    window: WeekWindow,
    track: TrackId,
    cadence: u8,
) -> Vec<NaiveDate> {
    let wanted = usize::from(cadence.min(7));
    let mut picked: Vec<NaiveDate> = Vec::with_capacity(wanted);

    for weekday in config.preferred_days.for_track(track) {
        if picked.len() >= wanted {
            break;
        }
        let candidate = window.date_for(*weekday);
        if candidate < config.anchor || picked.contains(&candidate) {
            continue;
        }
        picked.push(candidate);
    }

    picked
}
