/// Tool for habit statistics
///
/// This module implements the habit_stats MCP tool: completion rate over a
/// date range plus current and longest streaks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{motivational_message, CompletionStats, DateRange};
use crate::storage::{HabitStorage, LogStore};
use crate::tools::{parse_optional_date, ToolContext, ToolError};

/// Parameters for habit statistics
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitStatsParams {
    /// ID of the habit
    pub habit_id: String,
    /// First day of the range (YYYY-MM-DD). Defaults to the habit's start date
    pub start_date: Option<String>,
    /// Last day of the range (YYYY-MM-DD). Defaults to today
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HabitStatsResponse {
    pub title: String,
    pub periodicity: &'static str,
    pub stats: CompletionStats,
    pub message: String,
}

pub fn habit_stats<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: HabitStatsParams,
) -> Result<HabitStatsResponse, ToolError> {
    let start = parse_optional_date(params.start_date.as_deref())?;
    let end = parse_optional_date(params.end_date.as_deref())?;
    let habit = ctx.load_habit(&params.habit_id)?;

    let range = match (start, end) {
        // Not started yet: nothing to count
        (None, None) if ctx.today < habit.start_date => DateRange::single(ctx.today),
        // An end before the habit started is an empty range, not an inverted one
        (None, Some(end)) => DateRange::new(habit.start_date.min(end), end)?,
        _ => DateRange::new(start.unwrap_or(habit.start_date), end.unwrap_or(ctx.today))?,
    };

    let stats = ctx.engine().completion_stats(&habit, range, ctx.today)?;
    let kind = habit.periodicity.period_kind();

    let message = if stats.has_completions() {
        format!(
            "{:.0}% complete over {} days. {}",
            stats.completion_rate * 100.0,
            stats.total_days,
            motivational_message(stats.current_streak, kind)
        )
    } else {
        "No completions logged yet.".to_string()
    };

    Ok(HabitStatsResponse {
        title: habit.title,
        periodicity: habit.periodicity.kind_name(),
        stats,
        message,
    })
}
