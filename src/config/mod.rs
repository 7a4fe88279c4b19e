pub mod paths;
pub mod schedule;

pub use schedule::{get_schedule_config, PreferredDays, ScheduleConfig, TierThresholds};
