/// Tool functions driven directly through a ToolContext
use chrono::NaiveDate;
use habit_streaks::tools::*;
use habit_streaks::*;

#[cfg(test)]
mod tool_flow_tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create(ctx: &ToolContext<'_, SqliteStorage>, title: &str, periodicity: &str, frequency: Option<u32>) -> Habit {
        create_habit(ctx, CreateHabitParams {
            title: title.to_string(),
            description: None,
            periodicity: periodicity.to_string(),
            frequency,
            selected_days: vec![],
            start_date: Some("2024-01-01".to_string()),
            end_date: None,
            icon: None,
            reminder: false,
            tag_ids: vec![],
        })
        .unwrap()
        .habit
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = ToolContext::new(&storage, date(2024, 1, 5), LongestStreakPolicy::Approximate);
        let habit = create(&ctx, "Floss", "daily", None);

        let first = toggle_habit(&ctx, ToggleHabitParams { habit_id: habit.id.to_string(), date: None }).unwrap();
        assert!(first.log.completed);
        assert_eq!(first.log.log_date, date(2024, 1, 5));
        assert_eq!(first.current_streak, 1);

        let second = toggle_habit(&ctx, ToggleHabitParams { habit_id: habit.id.to_string(), date: None }).unwrap();
        assert!(!second.log.completed);
        assert_eq!(second.log.id, first.log.id);
        assert_eq!(second.current_streak, 0);
    }

    #[test]
    fn test_log_before_start_rejected() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = ToolContext::new(&storage, date(2024, 1, 5), LongestStreakPolicy::Approximate);
        let habit = create(&ctx, "Floss", "daily", None);

        let result = mark_habit(&ctx, MarkHabitParams {
            habit_id: habit.id.to_string(),
            completed: true,
            date: Some("2023-12-31".to_string()),
            notes: None,
        });
        assert!(matches!(result, Err(ToolError::Domain(DomainError::InvalidDate(_)))));
    }

    #[test]
    fn test_update_keeps_frequency_and_clears_end_date() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = ToolContext::new(&storage, date(2024, 1, 5), LongestStreakPolicy::Approximate);
        let habit = create(&ctx, "Call family", "weekly", Some(2));

        update_habit(&ctx, UpdateHabitParams {
            habit_id: habit.id.to_string(),
            end_date: Some("2024-06-30".to_string()),
            ..Default::default()
        })
        .unwrap();

        let updated = update_habit(&ctx, UpdateHabitParams {
            habit_id: habit.id.to_string(),
            title: Some("Call parents".to_string()),
            end_date: Some(String::new()),
            ..Default::default()
        })
        .unwrap()
        .habit;

        assert_eq!(updated.title, "Call parents");
        assert_eq!(updated.end_date, None);
        assert_eq!(updated.periodicity.frequency(), 2);
        assert_eq!(storage.get_habit(&habit.id).unwrap(), updated);
    }

    #[test]
    fn test_stats_policy_comes_from_context() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = ToolContext::new(&storage, date(2024, 2, 4), LongestStreakPolicy::Approximate);
        let habit = create(&ctx, "Run", "weekly", Some(1));

        // Three full weeks, a gap week, then the current week
        for d in [date(2024, 1, 2), date(2024, 1, 9), date(2024, 1, 16), date(2024, 2, 4)] {
            storage.upsert_log(&habit.id, d, true, None).unwrap();
        }

        let params = || HabitStatsParams { habit_id: habit.id.to_string(), start_date: None, end_date: None };

        let approximate = habit_stats(&ctx, params()).unwrap();
        assert_eq!(approximate.stats.current_streak, 1);
        assert_eq!(approximate.stats.longest_streak, 1);
        assert_eq!(approximate.stats.total_days, 35);
        assert_eq!(approximate.stats.last_completed, Some(date(2024, 2, 4)));

        let exact_ctx = ToolContext::new(&storage, date(2024, 2, 4), LongestStreakPolicy::Exact);
        let exact = habit_stats(&exact_ctx, params()).unwrap();
        assert_eq!(exact.stats.longest_streak, 3);
    }

    #[test]
    fn test_tag_lifecycle() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = ToolContext::new(&storage, date(2024, 1, 5), LongestStreakPolicy::Approximate);
        let habit = create(&ctx, "Journal", "daily", None);

        let tag = create_tag(&ctx, CreateTagParams { name: "Mind".to_string() }).unwrap().tag;
        assert!(create_tag(&ctx, CreateTagParams { name: "Mind".to_string() }).is_err());

        update_habit(&ctx, UpdateHabitParams {
            habit_id: habit.id.to_string(),
            tag_ids: Some(vec![tag.id.to_string()]),
            ..Default::default()
        })
        .unwrap();

        let listed = list_habits(&ctx, ListHabitsParams { tag_id: Some(tag.id.to_string()), ..Default::default() }).unwrap();
        assert_eq!(listed.habits.len(), 1);
        assert_eq!(listed.habits[0].tags, vec![tag.clone()]);

        delete_tag(&ctx, DeleteTagParams { tag_id: tag.id.to_string() }).unwrap();
        assert!(storage.get_habit(&habit.id).unwrap().tag_ids.is_empty());
        assert!(list_tags(&ctx, ListTagsParams::default()).unwrap().tags.is_empty());
    }
}
