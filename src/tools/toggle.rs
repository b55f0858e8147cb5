/// Tool for toggling a day's completion
///
/// This module implements the habit_toggle MCP tool, the one-tap
/// done/not-done switch of the daily board.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::motivational_message;
use crate::storage::{HabitStorage, LogStore};
use crate::tools::{parse_optional_date, LogResponse, ToolContext, ToolError};

/// Parameters for toggling a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleHabitParams {
    /// ID of the habit
    pub habit_id: String,
    /// Day to toggle (YYYY-MM-DD). Defaults to today
    pub date: Option<String>,
}

/// Flip the completion of a habit on one date
///
/// A day without a log becomes completed.
pub fn toggle_habit<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: ToggleHabitParams,
) -> Result<LogResponse, ToolError> {
    let requested = parse_optional_date(params.date.as_deref())?;
    let habit = ctx.load_habit(&params.habit_id)?;
    let date = ctx.log_date_for(&habit, requested)?;

    let log = ctx.storage.toggle_log(&habit.id, date)?;
    let current_streak = ctx.engine().current_streak(&habit, ctx.today)?;
    tracing::info!("Toggled habit '{}' on {} -> {}", habit.title, date, log.completed);

    let message = if log.completed {
        format!(
            "Marked '{}' done for {}. {}",
            habit.title,
            date,
            motivational_message(current_streak, habit.periodicity.period_kind())
        )
    } else {
        format!("Marked '{}' not done for {}", habit.title, date)
    };

    Ok(LogResponse {
        success: true,
        log,
        current_streak,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, HabitId};
    use crate::storage::SqliteStorage;
    use crate::tools::test_support::*;

    #[test]
    fn test_toggle_flips_status() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let today = date(2024, 1, 10);
        let ctx = context(&storage, today);
        let habit = daily_habit(&storage, "Meditate", date(2024, 1, 1));
        let params = || ToggleHabitParams { habit_id: habit.id.to_string(), date: None };

        let first = toggle_habit(&ctx, params()).unwrap();
        assert!(first.log.completed);
        assert_eq!(first.log.log_date, today);
        assert_eq!(first.current_streak, 1);
        assert!(first.message.contains("done"));

        let second = toggle_habit(&ctx, params()).unwrap();
        assert!(!second.log.completed);
        assert_eq!(second.current_streak, 0);

        let third = toggle_habit(&ctx, params()).unwrap();
        assert!(third.log.completed);
    }

    #[test]
    fn test_toggle_before_start_date_rejected() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = context(&storage, date(2024, 1, 10));
        let habit = daily_habit(&storage, "Meditate", date(2024, 1, 5));

        let result = toggle_habit(&ctx, ToggleHabitParams {
            habit_id: habit.id.to_string(),
            date: Some("2024-01-04".to_string()),
        });
        assert!(matches!(result, Err(ToolError::Domain(DomainError::InvalidDate(_)))));
        assert!(storage.find_log(&habit.id, date(2024, 1, 4)).unwrap().is_none());
    }

    #[test]
    fn test_toggle_bad_date_reported_before_lookup() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = context(&storage, date(2024, 1, 10));

        let result = toggle_habit(&ctx, ToggleHabitParams {
            habit_id: HabitId::new().to_string(),
            date: Some("not-a-date".to_string()),
        });
        assert!(matches!(result, Err(ToolError::Domain(DomainError::InvalidDate(_)))));
    }

    #[test]
    fn test_backfill_reports_streak_as_of_today() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = context(&storage, date(2024, 1, 10));
        let habit = daily_habit(&storage, "Meditate", date(2024, 1, 1));
        for d in [8, 10] {
            storage.upsert_log(&habit.id, date(2024, 1, d), true, None).unwrap();
        }

        // Filling the gap joins the run ending today
        let response = toggle_habit(&ctx, ToggleHabitParams {
            habit_id: habit.id.to_string(),
            date: Some("2024-01-09".to_string()),
        }).unwrap();
        assert!(response.log.completed);
        assert_eq!(response.current_streak, 3);
    }
}
