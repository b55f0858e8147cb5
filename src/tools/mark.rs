/// Tool for explicitly marking a day complete or incomplete
///
/// This module implements the habit_mark MCP tool. Unlike toggling, the
/// caller states the outcome and may attach notes.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::{motivational_message, CompletionLog};
use crate::storage::{HabitStorage, LogStore};
use crate::tools::{parse_optional_date, LogResponse, ToolContext, ToolError};

/// Parameters for marking a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MarkHabitParams {
    /// ID of the habit
    pub habit_id: String,
    /// Whether the habit was done
    pub completed: bool,
    /// Day to mark (YYYY-MM-DD). Defaults to today
    pub date: Option<String>,
    /// Notes about the day; replaces any stored notes
    pub notes: Option<String>,
}

pub fn mark_habit<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: MarkHabitParams,
) -> Result<LogResponse, ToolError> {
    CompletionLog::validate_notes(&params.notes)?;
    let requested = parse_optional_date(params.date.as_deref())?;
    let habit = ctx.load_habit(&params.habit_id)?;
    let date = ctx.log_date_for(&habit, requested)?;

    let log = ctx.storage.upsert_log(&habit.id, date, params.completed, params.notes)?;
    let current_streak = ctx.engine().current_streak(&habit, ctx.today)?;
    tracing::info!("Marked habit '{}' on {} as {}", habit.title, date, log.completed);

    let mut message = if log.completed {
        motivational_message(current_streak, habit.periodicity.period_kind())
    } else {
        format!("Marked '{}' not done for {}", habit.title, date)
    };
    if log.has_notes() {
        message.push_str(" (notes saved)");
    }

    Ok(LogResponse {
        success: true,
        log,
        current_streak,
        message,
    })
}
