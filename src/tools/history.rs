/// Tool for a habit's completion history
///
/// This module implements the habit_history MCP tool, which returns the raw
/// logs of a date range (calendar heatmap data).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_date, CompletionLog, DateRange};
use crate::storage::{HabitStorage, LogStore};
use crate::tools::{ToolContext, ToolError};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitHistoryParams {
    /// ID of the habit
    pub habit_id: String,
    /// First day of the range (YYYY-MM-DD)
    pub start_date: String,
    /// Last day of the range (YYYY-MM-DD)
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct HabitHistoryResponse {
    pub habit_id: String,
    pub range: DateRange,
    pub completed_days: u32,
    /// Logs in the range, oldest first
    pub logs: Vec<CompletionLog>,
}

pub fn habit_history<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: HabitHistoryParams,
) -> Result<HabitHistoryResponse, ToolError> {
    let range = DateRange::new(parse_date(&params.start_date)?, parse_date(&params.end_date)?)?;
    let habit = ctx.load_habit(&params.habit_id)?;

    let logs = ctx.storage.list_logs(&habit.id, range)?;
    let completed_days = logs.iter().filter(|l| l.completed).count() as u32;

    Ok(HabitHistoryResponse {
        habit_id: habit.id.to_string(),
        range,
        completed_days,
        logs,
    })
}
