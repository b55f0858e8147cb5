/// Tool for looking up a single habit
///
/// This module implements the habit_get MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::motivational_message;
use crate::storage::{HabitStorage, LogStore};
use crate::tools::{HabitView, ToolContext, ToolError};

/// Parameters for fetching a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetHabitParams {
    /// ID of the habit
    pub habit_id: String,
}

#[derive(Debug, Serialize)]
pub struct GetHabitResponse {
    #[serde(flatten)]
    pub view: HabitView,
    pub message: String,
}

/// Get a habit with its tags, today's status and current streak
pub fn get_habit<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: GetHabitParams,
) -> Result<GetHabitResponse, ToolError> {
    let habit = ctx.load_habit(&params.habit_id)?;
    let kind = habit.periodicity.period_kind();
    let all_tags = ctx.storage.list_tags()?;

    let view = ctx.habit_view(habit, ctx.today, &all_tags)?;
    let message = motivational_message(view.current_streak, kind);

    Ok(GetHabitResponse { view, message })
}
