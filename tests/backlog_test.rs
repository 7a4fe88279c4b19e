#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use gaia_lib::backlog::{compute_backlog, format_approx_hours, BacklogSnapshot, BacklogTier};
    use gaia_lib::calendar::{add_days, date_range};
    use gaia_lib::config::ScheduleConfig;
    use gaia_lib::schedule::{schedule_for, TrackId};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_first_week_gap_has_no_backlog() {
        let config = ScheduleConfig::default();
        let snapshot = compute_backlog(&config, Some(d(2025, 12, 1)), d(2025, 12, 5));
        assert_eq!(snapshot.total_minutes, 0);
        assert_eq!(snapshot.days, 0);
        assert!(snapshot.is_clear());
    }

    #[test]
    fn test_no_visit_or_same_day_is_empty() {
        let config = ScheduleConfig::default();
        assert_eq!(compute_backlog(&config, None, d(2026, 2, 1)), BacklogSnapshot::empty());
        assert_eq!(compute_backlog(&config, Some(d(2026, 2, 1)), d(2026, 2, 1)), BacklogSnapshot::empty());
        assert_eq!(compute_backlog(&config, Some(d(2026, 2, 3)), d(2026, 2, 1)), BacklogSnapshot::empty());
    }

    #[test]
    fn test_today_is_never_counted() {
        let config = ScheduleConfig::default();
        // Mon Dec 8 is the accounting study day; visiting on it leaves it out.
        let on_the_day = compute_backlog(&config, Some(d(2025, 12, 5)), d(2025, 12, 8));
        assert!(on_the_day.is_clear());
        let day_after = compute_backlog(&config, Some(d(2025, 12, 5)), d(2025, 12, 9));
        assert_eq!(day_after.track(TrackId::Accounting).minutes, 30);
    }

    #[test]
    fn test_total_matches_schedule_sum() {
        let config = ScheduleConfig::default();
        let visits = [
            (d(2025, 11, 20), d(2025, 12, 10)),
            (d(2025, 12, 1), d(2026, 1, 20)),
            (d(2026, 1, 9), d(2026, 1, 10)),
            (d(2026, 2, 14), d(2026, 6, 2)),
        ];
        for (last, today) in visits {
            let snapshot = compute_backlog(&config, Some(last), today);
            let expected: u32 = date_range(add_days(last, 1), add_days(today, -1))
                .map(|date| schedule_for(&config, date).minutes)
                .sum();
            assert_eq!(snapshot.total_minutes, expected, "{} -> {}", last, today);
            let per_track: u32 = snapshot.per_track.values().map(|t| t.minutes).sum();
            assert_eq!(per_track, snapshot.total_minutes);
            assert_eq!(snapshot.days * config.minutes_per_study_day, snapshot.total_minutes);
        }
    }

    #[test]
    fn test_tiers_follow_minutes() {
        let config = ScheduleConfig::default();
        let snapshot = compute_backlog(&config, Some(d(2026, 2, 28)), d(2026, 4, 1));
        for backlog in snapshot.per_track.values() {
            assert_eq!(backlog.tier, BacklogTier::classify(backlog.minutes, &config.tiers));
        }
        // Mar 16-22 is the only programming week: four study days.
        assert_eq!(snapshot.track(TrackId::Programming).minutes, 120);
        assert_eq!(snapshot.track(TrackId::Programming).tier, BacklogTier::Medium);
    }

    #[test]
    fn test_format_approx_hours() {
        assert_eq!(format_approx_hours(0), "0 minutes");
        assert_eq!(format_approx_hours(45), "45 minutes");
        assert_eq!(format_approx_hours(60), "1 hour");
        assert_eq!(format_approx_hours(90), "1.5 hours");
    }
}
