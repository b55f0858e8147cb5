/// Tool for updating existing habits
///
/// This module implements the habit_update MCP tool to modify
/// existing habit properties like title, periodicity, dates and tags.

use chrono::Weekday;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_date, Habit, HabitChanges, Periodicity};
use crate::storage::{HabitStorage, LogStore};
use crate::tools::{parse_tag_ids, parse_weekdays, ToolContext, ToolError};

/// Parameters for updating an existing habit
///
/// Omitted fields are left as they are. For description, end date and icon
/// an empty string clears the stored value.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    pub title: Option<String>,
    /// New description; "" clears it
    pub description: Option<String>,
    /// daily, weekly or monthly
    pub periodicity: Option<String>,
    /// Completions per week or month
    pub frequency: Option<u32>,
    /// Planned weekdays for weekly habits
    pub selected_days: Option<Vec<String>>,
    /// First tracked day (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Last tracked day (YYYY-MM-DD); "" clears it
    pub end_date: Option<String>,
    /// Display icon; "" clears it
    pub icon: Option<String>,
    pub reminder: Option<bool>,
    /// Replaces the habit's tags
    pub tag_ids: Option<Vec<String>>,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub habit: Habit,
    pub message: String,
}

/// Update an existing habit using the provided storage
pub fn update_habit<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let selected_days = params.selected_days.as_deref().map(parse_weekdays).transpose()?;
    let start_date = params.start_date.as_deref().map(parse_date).transpose()?;
    let end_date = params
        .end_date
        .map(|s| non_empty(s).as_deref().map(parse_date).transpose())
        .transpose()?;
    let tag_ids = params.tag_ids.as_deref().map(parse_tag_ids).transpose()?;

    let mut habit = ctx.load_habit(&params.habit_id)?;

    let periodicity = updated_periodicity(
        &habit.periodicity,
        params.periodicity.as_deref(),
        params.frequency,
        selected_days,
    )?;
    let changes = HabitChanges {
        title: params.title,
        description: params.description.map(non_empty),
        periodicity,
        start_date,
        end_date,
        icon: params.icon.map(non_empty),
        reminder: params.reminder,
        tag_ids,
    };

    habit.apply(changes)?;
    ctx.storage.update_habit(&habit)?;
    tracing::info!("Updated habit '{}' ({})", habit.title, habit.id);

    let message = format!("Updated habit '{}'", habit.title);
    Ok(UpdateHabitResponse {
        success: true,
        habit,
        message,
    })
}

/// Re-parse periodicity, frequency and selected days together
///
/// Fields that were not given carry over from `current` as long as the
/// cadence stays the same. Returns `None` when none of them were given.
fn updated_periodicity(
    current: &Periodicity,
    kind: Option<&str>,
    frequency: Option<u32>,
    selected_days: Option<Vec<Weekday>>,
) -> Result<Option<Periodicity>, ToolError> {
    if kind.is_none() && frequency.is_none() && selected_days.is_none() {
        return Ok(None);
    }

    let kind = kind
        .map(|k| k.trim().to_lowercase())
        .unwrap_or_else(|| current.kind_name().to_string());
    let same_kind = kind == current.kind_name();

    let frequency = frequency.or_else(|| (same_kind && kind != "daily").then(|| current.frequency()));
    let selected_days = match selected_days {
        Some(days) => days,
        None if same_kind => current.selected_days().to_vec(),
        None => Vec::new(),
    };

    Ok(Some(Periodicity::from_parts(&kind, frequency, selected_days)?))
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
