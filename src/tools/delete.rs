/// Tool for deleting habits
///
/// This module implements the habit_delete MCP tool. Deletion is permanent:
/// the habit's completion logs and tag links go with it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::storage::{HabitStorage, LogStore};
use crate::tools::{ToolContext, ToolError};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteHabitParams {
    /// ID of the habit to delete
    pub habit_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub message: String,
}

pub fn delete_habit<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit = ctx.load_habit(&params.habit_id)?;
    ctx.storage.delete_habit(&habit.id)?;
    tracing::info!("Deleted habit '{}' ({})", habit.title, habit.id);

    Ok(DeleteHabitResponse {
        success: true,
        message: format!("Deleted habit '{}' and its history", habit.title),
    })
}
