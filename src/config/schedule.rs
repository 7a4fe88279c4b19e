use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use lazy_static::lazy_static;
use crate::calendar::parse_iso;
use crate::config::paths::schedule_config_path;
use crate::error::{ErrorKind, GaiaError};
use crate::schedule::TrackId;

/// Fixed parameters of the stepped study plan.
///
/// Every engine entry point takes this explicitly, so several plans can be
/// evaluated side by side. The process-wide copy from [`get_schedule_config`]
/// is only the startup default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Day zero of the cadence ramp and the track rotation. Written either as a
    /// bare TOML date (`anchor = 2026-03-02`) or a quoted one.
    #[serde(deserialize_with = "deserialize_anchor")]
    pub anchor: NaiveDate,
    /// Track assigned to week 0, 1, 2, ... of the plan, cycling.
    pub rotation: Vec<TrackId>,
    pub preferred_days: PreferredDays,
    pub minutes_per_study_day: u32,
    /// Upper bound of the cadence ramp (study days per week).
    pub max_cadence: u8,
    pub tiers: TierThresholds,
    /// Fixed UTC offset used to derive "today". `None` means host local time.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            anchor: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap_or_default(),
            rotation: vec![TrackId::Programming, TrackId::Accounting, TrackId::SelfRepair],
            preferred_days: PreferredDays::default(),
            minutes_per_study_day: 30,
            max_cadence: 7,
            tiers: TierThresholds::default(),
            utc_offset_minutes: None,
        }
    }
}

fn deserialize_anchor<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    use serde::de::Error;
    match toml::Value::deserialize(deserializer)? {
        toml::Value::String(s) => parse_iso(&s).map_err(|e| D::Error::custom(format!("anchor {:?}: {}", s, e))),
        toml::Value::Datetime(dt) => match (dt.date, dt.time) {
            (Some(date), None) => NaiveDate::from_ymd_opt(date.year as i32, date.month as u32, date.day as u32)
                .ok_or_else(|| D::Error::custom(format!("anchor {} is not a calendar date", dt))),
            _ => Err(D::Error::custom(format!("anchor {} must be a date without a time", dt))),
        },
        other => Err(D::Error::custom(format!("anchor must be a date, got {}", other.type_str()))),
    }
}

/// Weekday visitation order per track, most preferred first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferredDays {
    pub programming: Vec<Weekday>,
    pub accounting: Vec<Weekday>,
    #[serde(rename = "self-repair")]
    pub self_repair: Vec<Weekday>,
}

impl Default for PreferredDays {
    fn default() -> Self {
        use Weekday::*;
        let monday_first = vec![Mon, Tue, Wed, Thu, Sun, Sat, Fri];
        PreferredDays {
            programming: monday_first.clone(),
            accounting: monday_first,
            self_repair: vec![Fri, Mon, Wed, Tue, Thu, Sun, Sat],
        }
    }
}

impl PreferredDays {
    pub fn for_track(&self, track: TrackId) -> &[Weekday] {
        match track {
            TrackId::Programming => &self.programming,
            TrackId::Accounting => &self.accounting,
            TrackId::SelfRepair => &self.self_repair,
        }
    }
}

/// Inclusive upper bounds, in minutes, of the light and medium backlog tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub light_max: u32,
    pub medium_max: u32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        TierThresholds { light_max: 60, medium_max: 180 }
    }
}

impl ScheduleConfig {
    pub fn with_anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn validate(&self) -> Result<(), GaiaError> {
        if self.rotation.is_empty() {
            return Err(GaiaError::new(ErrorKind::Config, "rotation must name at least one track", "config"));
        }
        let unique: HashSet<_> = self.rotation.iter().collect();
        if unique.len() != self.rotation.len() {
            return Err(GaiaError::new(ErrorKind::Config, "rotation lists a track twice", "config")
                .with_context(format!("rotation: {:?}", self.rotation)));
        }
        for track in TrackId::ALL {
            let order = self.preferred_days.for_track(track);
            let days: HashSet<_> = order.iter().map(|d| d.num_days_from_monday()).collect();
            if order.len() != 7 || days.len() != 7 {
                return Err(GaiaError::new(
                    ErrorKind::Config,
                    "preferred day order must list each weekday exactly once",
                    "config",
                )
                .with_context(format!("track: {}", track)));
            }
        }
        if !(1..=7).contains(&self.max_cadence) {
            return Err(GaiaError::new(ErrorKind::Config, "max_cadence must be within 1..=7", "config")
                .with_context(format!("max_cadence: {}", self.max_cadence)));
        }
        if self.tiers.light_max > self.tiers.medium_max {
            return Err(GaiaError::new(ErrorKind::Config, "light tier bound exceeds medium tier bound", "config"));
        }
        Ok(())
    }
}

/// Read and validate a schedule config from a TOML file.
pub fn load_schedule_config_from(path: &Path) -> Result<ScheduleConfig, GaiaError> {
    let content = fs::read_to_string(path)
        .map_err(|e| GaiaError::from(e).with_context(format!("path: {:?}", path)))?;
    let config: ScheduleConfig = toml::from_str(&content)
        .map_err(|e| GaiaError::from(e).with_context(format!("path: {:?}", path)))?;
    config.validate()?;
    Ok(config)
}

fn load_schedule_config_internal() -> ScheduleConfig {
    let config_path = schedule_config_path();
    if !config_path.exists() {
        tracing::info!(path = ?config_path, "No schedule.toml found, using default schedule");
        return ScheduleConfig::default();
    }

    match load_schedule_config_from(&config_path) {
        Ok(config) => {
            tracing::info!(path = ?config_path, anchor = %config.anchor, "Loaded schedule config");
            config
        }
        Err(e) => {
            tracing::warn!(path = ?config_path, error = %e, "Invalid schedule.toml, using default schedule");
            ScheduleConfig::default()
        }
    }
}

lazy_static! {
    static ref SCHEDULE_CONFIG: ScheduleConfig = load_schedule_config_internal();
}

/// Get the cached schedule configuration (loaded once at startup)
pub fn get_schedule_config() -> &'static ScheduleConfig {
    &SCHEDULE_CONFIG
}
