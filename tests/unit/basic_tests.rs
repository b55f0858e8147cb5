/// Basic unit tests to verify core functionality
use chrono::{NaiveDate, Weekday};
use habit_streaks::*;
use std::path::PathBuf;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_habit_creation() {
        let periodicity = Periodicity::from_parts("Weekly", Some(3), vec![Weekday::Mon, Weekday::Thu]).unwrap();
        let habit = Habit::new(
            "  Swim  ".to_string(),
            Some("Pool laps".to_string()),
            periodicity,
            date(2024, 3, 1),
            Some(date(2024, 12, 31)),
        );

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.title, "Swim");
        assert_eq!(habit.periodicity.frequency(), 3);
        assert_eq!(habit.periodicity.selected_days(), &[Weekday::Mon, Weekday::Thu]);
        assert!(habit.tag_ids.is_empty());
    }

    #[test]
    fn test_periodicity_validation() {
        assert!(Periodicity::from_parts("daily", None, vec![]).is_ok());
        assert!(Periodicity::from_parts("daily", Some(2), vec![]).is_err());
        assert!(Periodicity::from_parts("weekly", Some(8), vec![]).is_err());
        assert!(Periodicity::from_parts("monthly", Some(0), vec![]).is_err());
        assert!(Periodicity::from_parts("monthly", Some(2), vec![Weekday::Fri]).is_err());
        assert!(Periodicity::from_parts("yearly", None, vec![]).is_err());
    }

    #[test]
    fn test_completion_log_creation() {
        let habit_id = HabitId::new();
        let now = chrono::Utc::now();

        let log = CompletionLog::new(habit_id.clone(), date(2024, 1, 1), true, Some("Done".to_string()), now);

        assert_eq!(log.habit_id, habit_id);
        assert!(log.completed_at.is_some());
        assert!(log.has_notes());

        let undone = log.toggled(now);
        assert!(!undone.completed);
        assert!(undone.completed_at.is_none());
        assert_eq!(undone.id, log.id);
    }

    #[test]
    fn test_tag_creation() {
        let tag = Tag::new(" Morning ").unwrap();
        assert_eq!(tag.name, "Morning");
        assert!(Tag::new("   ").is_err());
    }

    #[test]
    fn test_period_grids() {
        // 2024-01-10 is a Wednesday
        let week = PeriodKind::Week.containing(date(2024, 1, 10)).unwrap();
        assert_eq!(week, DateRange::new(date(2024, 1, 8), date(2024, 1, 14)).unwrap());

        let feb = PeriodKind::Month.containing(date(2024, 2, 10)).unwrap();
        assert_eq!(feb.num_days(), 29);
        assert_eq!(PeriodKind::Month.previous(&feb).unwrap().start, date(2024, 1, 1));
    }

    #[test]
    fn test_streak_engine_over_sqlite() {
        let storage = SqliteStorage::open_in_memory().expect("Failed to open storage");
        let habit = Habit::new("Meditate".to_string(), None, Periodicity::Daily, date(2024, 1, 1), None).unwrap();
        storage.create_habit(&habit).unwrap();

        for d in 3..=6 {
            storage.upsert_log(&habit.id, date(2024, 1, d), true, None).unwrap();
        }
        // An explicit "not done" log breaks the run like a missing one
        storage.upsert_log(&habit.id, date(2024, 1, 7), false, None).unwrap();
        storage.upsert_log(&habit.id, date(2024, 1, 8), true, None).unwrap();

        let engine = StreakEngine::new(&storage);
        assert_eq!(engine.current_streak(&habit, date(2024, 1, 8)).unwrap(), 1);
        assert_eq!(engine.current_streak(&habit, date(2024, 1, 6)).unwrap(), 4);
        assert_eq!(engine.longest_streak(&habit, date(2024, 1, 8)).unwrap(), 4);
        // Nothing logged for the day asked about
        assert_eq!(engine.current_streak(&habit, date(2024, 1, 9)).unwrap(), 0);
    }

    #[test]
    fn test_config_today_follows_offset() {
        let config = ServerConfig::new(PathBuf::from("habits.db")).with_utc_offset_minutes(840).unwrap();
        let utc_today = chrono::Utc::now().date_naive();
        let today = config.today();
        assert!(today == utc_today || today == utc_today.succ_opt().unwrap());

        assert!(ServerConfig::new(PathBuf::from("habits.db")).with_utc_offset_minutes(900).is_err());
    }
}
