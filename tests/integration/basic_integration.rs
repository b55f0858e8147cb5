/// Basic integration tests
use chrono::NaiveDate;
use habit_streaks::*;
use tempfile::{tempdir, NamedTempFile};

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_server_creates_missing_directories() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("habits.db");

        let server = HabitTrackerServer::new(ServerConfig::new(db_path.clone()))
            .expect("Failed to create server");

        assert!(db_path.exists());
        assert!(server.storage().list_habits(None).unwrap().is_empty());
    }

    #[test]
    fn test_database_persistence() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        let habit = Habit::new("Read".to_string(), None, Periodicity::Daily, date(2024, 1, 1), None).unwrap();
        let tag = Tag::new("Evening").unwrap();
        {
            let server = HabitTrackerServer::new(ServerConfig::new(db_path.clone()))
                .expect("Failed to create first server");
            server.storage().create_tag(&tag).unwrap();

            let mut tagged = habit.clone();
            tagged.tag_ids = vec![tag.id.clone()];
            server.storage().create_habit(&tagged).unwrap();
            server.storage().toggle_log(&habit.id, date(2024, 1, 2)).unwrap();
        }

        // A second server over the same file sees everything
        let server = HabitTrackerServer::new(ServerConfig::new(db_path))
            .expect("Failed to create second server");
        let loaded = server.storage().get_habit(&habit.id).unwrap();
        assert_eq!(loaded.title, "Read");
        assert_eq!(loaded.tag_ids, vec![tag.id]);

        let engine = server.streak_engine();
        assert!(engine.has_completed_on_date(&loaded, date(2024, 1, 2)).unwrap());
        assert_eq!(engine.current_streak(&loaded, date(2024, 1, 2)).unwrap(), 1);
    }

    #[test]
    fn test_storage_interface() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf())
            .expect("Failed to create storage");

        // The engine only needs the log store half
        let store: &dyn LogStore = &storage;
        let engine = StreakEngine::new(store);

        let habit = Habit::new("Walk".to_string(), None, Periodicity::Daily, date(2024, 1, 1), None).unwrap();
        storage.create_habit(&habit).unwrap();
        for d in [1, 2, 3, 5] {
            storage.upsert_log(&habit.id, date(2024, 1, d), true, None).unwrap();
        }

        assert_eq!(engine.longest_streak(&habit, date(2024, 1, 5)).unwrap(), 3);
        assert_eq!(engine.current_streak(&habit, date(2024, 1, 5)).unwrap(), 1);
    }

    #[test]
    fn test_monthly_stats_through_sqlite() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let habit = Habit::new(
            "Budget review".to_string(),
            None,
            Periodicity::Monthly { frequency: 2 },
            date(2023, 12, 1),
            None,
        ).unwrap();
        storage.create_habit(&habit).unwrap();

        for d in [date(2023, 12, 3), date(2023, 12, 30), date(2024, 1, 31), date(2024, 2, 1), date(2024, 2, 29)] {
            storage.toggle_log(&habit.id, d).unwrap();
        }

        let engine = StreakEngine::new(&storage);
        let range = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        let stats = engine.completion_stats(&habit, range, date(2024, 2, 29)).unwrap();

        assert_eq!(stats.total_days, 29);
        assert_eq!(stats.completed_days, 2);
        // February met its target, January only had one completion
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);

        let exact = StreakEngine::new(&storage).with_policy(LongestStreakPolicy::Exact);
        assert_eq!(exact.longest_streak(&habit, date(2024, 2, 29)).unwrap(), 1);
    }
}
