/// Tool for listing habits
///
/// This module implements the habit_list MCP tool: the daily board of
/// habits with their completion status on one date.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::TagId;
use crate::storage::{HabitStorage, LogStore};
use crate::tools::{parse_optional_date, HabitView, ToolContext, ToolError};

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Day to show the board for (YYYY-MM-DD). Defaults to today
    pub date: Option<String>,
    /// Only list habits carrying this tag
    pub tag_id: Option<String>,
    /// Also list habits that are not active on the date (default: false)
    pub include_inactive: Option<bool>,
}

/// Summary statistics for the board
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: u32,
    pub completed: u32,
    pub remaining: u32,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub date: NaiveDate,
    pub habits: Vec<HabitView>,
    pub summary: HabitListSummary,
}

/// List habits using the provided storage
pub fn list_habits<S: HabitStorage + LogStore>(
    ctx: &ToolContext<'_, S>,
    params: ListHabitsParams,
) -> Result<ListHabitsResponse, ToolError> {
    let date = parse_optional_date(params.date.as_deref())?.unwrap_or(ctx.today);
    let tag = params.tag_id.as_deref().map(TagId::parse).transpose()?;
    if let Some(tag_id) = &tag {
        ctx.storage.get_tag(tag_id)?;
    }
    let include_inactive = params.include_inactive.unwrap_or(false);

    let all_tags = ctx.storage.list_tags()?;
    let habits = ctx.storage.list_habits(tag.as_ref())?;

    let views = habits
        .into_iter()
        .filter(|h| include_inactive || h.is_active_on(date))
        .map(|h| ctx.habit_view(h, date, &all_tags))
        .collect::<Result<Vec<_>, _>>()?;

    let total_habits = views.len() as u32;
    let completed = views.iter().filter(|v| v.completed).count() as u32;

    Ok(ListHabitsResponse {
        date,
        habits: views,
        summary: HabitListSummary {
            total_habits,
            completed,
            remaining: total_habits - completed,
        },
    })
}
