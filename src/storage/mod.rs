/// Storage layer for persisting habit data
///
/// This module defines the two storage contracts used by the rest of the
/// crate: `LogStore`, the completion-log queries the streak engine consumes,
/// and `HabitStorage`, the habit and tag CRUD used by the tools. `SqliteStorage`
/// implements both.

pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{CompletionLog, DateRange, Habit, HabitId, Tag, TagId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Tag not found: {tag_id}")]
    TagNotFound { tag_id: String },

    #[error("Duplicate tag: a tag named '{name}' already exists")]
    DuplicateTag { name: String },

    #[error("Duplicate log: habit {habit_id} already has a log for {date}")]
    DuplicateLog { habit_id: String, date: NaiveDate },

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Completion-log queries and writes
///
/// Lookups assume at most one log per (habit, date). Implementations enforce
/// that with a uniqueness constraint and resolve insert races in
/// `upsert_log`/`toggle_log` by re-reading and retrying.
pub trait LogStore {
    /// The log for a habit on one date, if any
    fn find_log(&self, habit_id: &HabitId, date: NaiveDate) -> Result<Option<CompletionLog>, StorageError>;

    /// Number of completed logs dated inside `range`
    fn count_completed(&self, habit_id: &HabitId, range: DateRange) -> Result<u32, StorageError>;

    /// Number of distinct dates with a completed log on or after `since`
    fn count_completed_dates(&self, habit_id: &HabitId, since: NaiveDate) -> Result<u32, StorageError>;

    /// All completed logs for a habit, oldest date first
    fn list_completed(&self, habit_id: &HabitId) -> Result<Vec<CompletionLog>, StorageError>;

    /// All logs (completed or not) dated inside `range`, oldest date first
    fn list_logs(&self, habit_id: &HabitId, range: DateRange) -> Result<Vec<CompletionLog>, StorageError>;

    /// Create or overwrite the status of the log for (habit, date)
    ///
    /// `notes` replaces the stored note when given.
    fn upsert_log(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        completed: bool,
        notes: Option<String>,
    ) -> Result<CompletionLog, StorageError>;

    /// Create a completed log if none exists, otherwise flip its flag
    fn toggle_log(&self, habit_id: &HabitId, date: NaiveDate) -> Result<CompletionLog, StorageError>;
}

/// Habit and tag persistence
pub trait HabitStorage {
    /// Create a new habit together with its tag links
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Update an existing habit, replacing its tag links
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit; its logs and tag links go with it
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List habits, optionally only those carrying a tag
    fn list_habits(&self, tag: Option<&TagId>) -> Result<Vec<Habit>, StorageError>;

    /// Create a tag with a unique name
    fn create_tag(&self, tag: &Tag) -> Result<(), StorageError>;

    /// Get a tag by ID
    fn get_tag(&self, tag_id: &TagId) -> Result<Tag, StorageError>;

    /// All tags ordered by name
    fn list_tags(&self) -> Result<Vec<Tag>, StorageError>;

    /// Delete a tag, detaching it from every habit
    fn delete_tag(&self, tag_id: &TagId) -> Result<(), StorageError>;
}
