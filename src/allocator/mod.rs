pub mod month;

use std::collections::BTreeSet;
use chrono::NaiveDate;
use serde::{Serialize, Deserialize};

pub use month::{month_calendar, DayCell, DayStatus, MonthCalendar};

/// Which of a track's past study days count as done.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackAllocation {
    pub completed: BTreeSet<NaiveDate>,
    /// Study days before today that no completion credit covers.
    pub pending: BTreeSet<NaiveDate>,
}

impl TrackAllocation {
    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.completed.contains(&date)
    }

    pub fn is_pending(&self, date: NaiveDate) -> bool {
        self.pending.contains(&date)
    }
}

/// Credit `completed_count` finished lessons to the earliest study days.
///
/// Only counts matter; no attempt is made to match a lesson to the day it was
/// actually done. `study_days` is sorted internally, and a study day on
/// `today` is never pending.
pub fn allocate(study_days: &[NaiveDate], completed_count: usize, today: NaiveDate) -> TrackAllocation {
    let mut ordered: Vec<NaiveDate> = study_days.to_vec();
    ordered.sort();
    ordered.dedup();

    let credited = completed_count.min(ordered.len());
    let (done, rest) = ordered.split_at(credited);

    TrackAllocation {
        completed: done.iter().copied().collect(),
        pending: rest.iter().copied().filter(|d| *d < today).collect(),
    }
}
