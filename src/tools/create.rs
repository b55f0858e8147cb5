/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Habit, HabitChanges, Periodicity};
use crate::storage::{HabitStorage, LogStore};
use crate::tools::{parse_optional_date, parse_tag_ids, parse_weekdays, ToolContext, ToolError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Title of the habit (1-100 characters)
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// How often: daily, weekly or monthly
    pub periodicity: String,
    /// Completions needed per week (1-7) or month (1-31). Defaults to 1
    pub frequency: Option<u32>,
    /// Planned weekdays for weekly habits, e.g. ["Mon", "Wed"]
    #[serde(default)]
    pub selected_days: Vec<String>,
    /// First tracked day (YYYY-MM-DD). Defaults to today
    pub start_date: Option<String>,
    /// Last tracked day (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// Display icon, usually an emoji
    pub icon: Option<String>,
    /// Whether reminders are wanted
    #[serde(default)]
    pub reminder: bool,
    /// IDs of existing tags to attach
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit: Habit,
    pub message: String,
}

/// Create a new habit using the provided storage
pub fn create_habit<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ToolError> {
    let periodicity = Periodicity::from_parts(
        &params.periodicity,
        params.frequency,
        parse_weekdays(&params.selected_days)?,
    )?;
    let start_date = parse_optional_date(params.start_date.as_deref())?.unwrap_or(ctx.today);
    let end_date = parse_optional_date(params.end_date.as_deref())?;

    let mut habit = Habit::new(params.title, params.description, periodicity, start_date, end_date)?;
    habit.apply(HabitChanges {
        icon: Some(params.icon),
        reminder: Some(params.reminder),
        tag_ids: Some(parse_tag_ids(&params.tag_ids)?),
        ..Default::default()
    })?;

    ctx.storage.create_habit(&habit)?;
    tracing::info!("Created habit '{}' ({})", habit.title, habit.id);

    let message = format!("Created habit '{}'! Ready to start your streak!", habit.title);
    Ok(CreateHabitResponse {
        success: true,
        habit,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, Tag};
    use crate::storage::{SqliteStorage, StorageError};
    use crate::tools::test_support::*;
    use chrono::Weekday;

    fn params(title: &str, periodicity: &str) -> CreateHabitParams {
        CreateHabitParams {
            title: title.to_string(),
            description: None,
            periodicity: periodicity.to_string(),
            frequency: None,
            selected_days: Vec::new(),
            start_date: None,
            end_date: None,
            icon: None,
            reminder: false,
            tag_ids: Vec::new(),
        }
    }

    #[test]
    fn test_create_weekly_habit_with_tag() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = context(&storage, date(2024, 1, 10));
        let tag = Tag::new("Fitness").unwrap();
        storage.create_tag(&tag).unwrap();

        let response = create_habit(&ctx, CreateHabitParams {
            frequency: Some(2),
            selected_days: vec!["Wed".to_string(), "Sun".to_string()],
            icon: Some("🏃".to_string()),
            tag_ids: vec![tag.id.to_string()],
            ..params("Run", "weekly")
        }).unwrap();

        assert!(response.success);
        assert_eq!(response.habit.start_date, date(2024, 1, 10));

        let stored = storage.get_habit(&response.habit.id).unwrap();
        assert_eq!(
            stored.periodicity,
            Periodicity::Weekly { frequency: 2, selected_days: vec![Weekday::Wed, Weekday::Sun] }
        );
        assert_eq!(stored.tag_ids, vec![tag.id]);
        assert_eq!(stored.icon.as_deref(), Some("🏃"));
    }

    #[test]
    fn test_create_rejects_invalid_input() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = context(&storage, date(2024, 1, 10));

        let unknown = create_habit(&ctx, params("Run", "yearly"));
        assert!(matches!(unknown, Err(ToolError::Domain(DomainError::InvalidPeriodicity(_)))));

        let daily_freq = create_habit(&ctx, CreateHabitParams { frequency: Some(3), ..params("Run", "daily") });
        assert!(matches!(daily_freq, Err(ToolError::Domain(DomainError::InvalidFrequency(_)))));

        let bad_date = create_habit(&ctx, CreateHabitParams {
            start_date: Some("2024-13-01".to_string()),
            ..params("Run", "daily")
        });
        assert!(matches!(bad_date, Err(ToolError::Domain(DomainError::InvalidDate(_)))));

        let empty = create_habit(&ctx, params("   ", "daily"));
        assert!(matches!(empty, Err(ToolError::Domain(DomainError::InvalidTitle(_)))));

        assert!(storage.list_habits(None).unwrap().is_empty());
    }

    #[test]
    fn test_create_with_unknown_tag() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let ctx = context(&storage, date(2024, 1, 10));

        let result = create_habit(&ctx, CreateHabitParams {
            tag_ids: vec![crate::domain::TagId::new().to_string()],
            ..params("Run", "daily")
        });
        assert!(matches!(result, Err(ToolError::Storage(StorageError::TagNotFound { .. }))));
    }
}
