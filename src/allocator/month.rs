use std::collections::BTreeMap;
use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Deserialize};
use crate::allocator::{allocate, TrackAllocation};
use crate::calendar::month_bounds;
use crate::catalog::LessonCatalog;
use crate::config::ScheduleConfig;
use crate::error::GaiaError;
use crate::progress::AcademyProgress;
use crate::schedule::{schedule_range, ScheduleEntry, TrackId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayStatus {
    Rest,
    Completed,
    BacklogPending,
    /// Study day on today that has no completion credit yet.
    Today,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub schedule: ScheduleEntry,
    pub status: DayStatus,
    pub lesson_label: Option<String>,
}

/// One month of the plan laid out Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    /// Empty grid slots before the 1st.
    pub lead_blanks: usize,
    pub cells: Vec<DayCell>,
    pub allocations: BTreeMap<TrackId, TrackAllocation>,
}

impl MonthCalendar {
    /// Grid rows of seven slots, padded with `None` on both ends.
    pub fn rows(&self) -> Vec<Vec<Option<&DayCell>>> {
        let mut slots: Vec<Option<&DayCell>> = vec![None; self.lead_blanks];
        slots.extend(self.cells.iter().map(Some));
        while slots.len() % 7 != 0 {
            slots.push(None);
        }
        slots.chunks(7).map(|row| row.to_vec()).collect()
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find(|c| c.date == date)
    }
}

/// Build the month view: the schedule of each day plus completion coloring.
///
/// Each track's completed-lesson count is credited to its study days of this
/// month up to today, earliest first. Those same days get lesson labels by
/// ordinal position in the catalog.
pub fn month_calendar(
    config: &ScheduleConfig,
    progress: &AcademyProgress,
    catalog: &LessonCatalog,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<MonthCalendar, GaiaError> {
    let (first, last) = month_bounds(year, month)?;
    let schedule = schedule_range(config, first, last);

    let mut study_days: BTreeMap<TrackId, Vec<NaiveDate>> = BTreeMap::new();
    for (date, entry) in &schedule {
        if entry.is_study_day() && *date <= today {
            study_days.entry(entry.track_id).or_default().push(*date);
        }
    }

    let mut labels: BTreeMap<NaiveDate, String> = BTreeMap::new();
    let mut allocations = BTreeMap::new();
    for track in TrackId::ALL {
        let days = study_days.remove(&track).unwrap_or_default();
        for (ordinal, date) in days.iter().enumerate() {
            if let Some(label) = catalog.ordinal_label(track, ordinal) {
                labels.insert(*date, label);
            }
        }
        let completed = progress.track(track).completed_count();
        allocations.insert(track, allocate(&days, completed, today));
    }

    let cells = schedule
        .into_iter()
        .map(|(date, entry)| {
            let status = if !entry.is_study_day() {
                DayStatus::Rest
            } else if date > today {
                DayStatus::Upcoming
            } else {
                let alloc = allocations.get(&entry.track_id);
                if alloc.is_some_and(|a| a.is_completed(date)) {
                    DayStatus::Completed
                } else if alloc.is_some_and(|a| a.is_pending(date)) {
                    DayStatus::BacklogPending
                } else {
                    DayStatus::Today
                }
            };
            DayCell { date, schedule: entry, status, lesson_label: labels.remove(&date) }
        })
        .collect();

    Ok(MonthCalendar {
        year,
        month,
        lead_blanks: first.weekday().num_days_from_monday() as usize,
        cells,
        allocations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_january_grid_shape() {
        let config = ScheduleConfig::default();
        let cal = month_calendar(
            &config,
            &AcademyProgress::empty(),
            &LessonCatalog::default(),
            2026,
            1,
            d(2026, 1, 31),
        )
        .unwrap();
        // 2026-01-01 is a Thursday.
        assert_eq!(cal.lead_blanks, 3);
        assert_eq!(cal.cells.len(), 31);
        let rows = cal.rows();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.len() == 7));
    }

    #[test]
    fn test_invalid_month_is_error() {
        let config = ScheduleConfig::default();
        let result = month_calendar(
            &config,
            &AcademyProgress::empty(),
            &LessonCatalog::default(),
            2026,
            13,
            d(2026, 1, 1),
        );
        assert!(result.is_err());
    }
}
