/// MCP tools for habit management
///
/// This module contains all the MCP tools that external clients can call to
/// interact with the habit tracker. Each tool takes a parameter struct
/// deserialized from the call arguments and returns a serializable response.

pub mod create;
pub mod delete;
pub mod get;
pub mod history;
pub mod list;
pub mod mark;
pub mod stats;
pub mod tags;
pub mod toggle;
pub mod update;

// Re-export tool functions for easy access
pub use create::*;
pub use delete::*;
pub use get::*;
pub use history::*;
pub use list::*;
pub use mark::*;
pub use stats::*;
pub use tags::*;
pub use toggle::*;
pub use update::*;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::analytics::{StreakEngine, StreakError};
use crate::domain::{
    parse_date, parse_weekday, CompletionLog, DomainError, Habit, HabitId, LongestStreakPolicy, Tag, TagId,
};
use crate::storage::{HabitStorage, LogStore, StorageError};

/// Errors a tool call can end with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Streak(#[from] StreakError),

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Everything a tool needs for one request
///
/// `today` is fixed when the request arrives so every computation in the
/// call agrees on the date.
pub struct ToolContext<'a, S: HabitStorage + LogStore> {
    pub storage: &'a S,
    pub today: NaiveDate,
    pub policy: LongestStreakPolicy,
}

impl<'a, S: HabitStorage + LogStore> ToolContext<'a, S> {
    pub fn new(storage: &'a S, today: NaiveDate, policy: LongestStreakPolicy) -> Self {
        Self { storage, today, policy }
    }

    /// A streak engine over this request's storage
    pub fn engine(&self) -> StreakEngine<'a, S> {
        StreakEngine::new(self.storage).with_policy(self.policy)
    }

    /// Load a habit from a request-supplied ID
    pub fn load_habit(&self, habit_id: &str) -> Result<Habit, ToolError> {
        let id = HabitId::parse(habit_id)?;
        Ok(self.storage.get_habit(&id)?)
    }

    /// Resolve the date a log is written for
    ///
    /// `date` is parsed by the caller before the habit is loaded. It defaults
    /// to today, and dates before the habit's start are rejected.
    pub fn log_date_for(&self, habit: &Habit, date: Option<NaiveDate>) -> Result<NaiveDate, ToolError> {
        let date = date.unwrap_or(self.today);
        if date < habit.start_date {
            return Err(DomainError::InvalidDate(format!(
                "{} is before the habit's start date {}",
                date, habit.start_date
            ))
            .into());
        }
        Ok(date)
    }

    /// Build the client-facing view of a habit as of `date`
    pub fn habit_view(&self, habit: Habit, date: NaiveDate, all_tags: &[Tag]) -> Result<HabitView, ToolError> {
        let engine = self.engine();
        let completed = engine.has_completed_on_date(&habit, date)?;
        let current_streak = engine.current_streak(&habit, date)?;
        let tags = all_tags
            .iter()
            .filter(|t| habit.tag_ids.contains(&t.id))
            .cloned()
            .collect();

        Ok(HabitView {
            habit,
            tags,
            date,
            completed,
            current_streak,
        })
    }
}

/// A habit together with its tags and its status on one date
#[derive(Debug, Serialize)]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    pub tags: Vec<Tag>,
    /// Date `completed` and `current_streak` refer to
    pub date: NaiveDate,
    pub completed: bool,
    pub current_streak: u32,
}

/// Response from writing a completion log
#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub success: bool,
    pub log: CompletionLog,
    /// Streak as of today, whichever day was written
    pub current_streak: u32,
    pub message: String,
}

/// Parse an optional `YYYY-MM-DD` request field
pub fn parse_optional_date(date: Option<&str>) -> Result<Option<NaiveDate>, DomainError> {
    date.map(parse_date).transpose()
}

/// Parse weekday names like "Mon" or "wednesday"
pub fn parse_weekdays(days: &[String]) -> Result<Vec<chrono::Weekday>, DomainError> {
    days.iter().map(|d| parse_weekday(d)).collect()
}

/// Parse tag IDs, dropping duplicates
pub fn parse_tag_ids(ids: &[String]) -> Result<Vec<TagId>, DomainError> {
    let mut tag_ids = ids.iter().map(|s| TagId::parse(s)).collect::<Result<Vec<_>, _>>()?;
    tag_ids.sort();
    tag_ids.dedup();
    Ok(tag_ids)
}
