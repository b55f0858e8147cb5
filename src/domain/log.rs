/// CompletionLog entity for tracking per-day habit completion
///
/// A log records whether a habit was done on one calendar date. There is at
/// most one log per (habit, date); it is only ever created or rewritten by a
/// toggle or an explicit mark, and goes away with its habit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, HabitId, LogId};

/// Longest allowed note, in characters
pub const MAX_NOTES_LEN: usize = 500;

/// Whether a habit was completed on a specific date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionLog {
    /// Unique identifier for this log
    pub id: LogId,
    /// Which habit this log belongs to
    pub habit_id: HabitId,
    /// Calendar day the log is for
    pub log_date: NaiveDate,
    /// Whether the habit was done that day
    pub completed: bool,
    /// User's notes about the day
    pub notes: Option<String>,
    /// When the habit was marked done; only set while `completed` is true
    pub completed_at: Option<DateTime<Utc>>,
    /// When the log row was first written
    pub created_at: DateTime<Utc>,
}

impl CompletionLog {
    /// Create a fresh log for a date with the given status
    pub fn new(
        habit_id: HabitId,
        log_date: NaiveDate,
        completed: bool,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LogId::new(),
            habit_id,
            log_date,
            completed,
            notes,
            completed_at: completed.then_some(now),
            created_at: now,
        }
    }

    /// Copy of this log with its completion flag flipped
    ///
    /// Notes are kept; the completion timestamp follows the new flag.
    pub fn toggled(&self, now: DateTime<Utc>) -> Self {
        self.with_status(!self.completed, None, now)
    }

    /// Copy of this log with an explicit status
    ///
    /// `notes` replaces the stored note when given and keeps it otherwise.
    pub fn with_status(&self, completed: bool, notes: Option<String>, now: DateTime<Utc>) -> Self {
        let completed_at = match (completed, self.completed) {
            (false, _) => None,
            // Re-marking an already completed day keeps the original stamp
            (true, true) => self.completed_at.or(Some(now)),
            (true, false) => Some(now),
        };

        Self {
            completed,
            notes: notes.or_else(|| self.notes.clone()),
            completed_at,
            ..self.clone()
        }
    }

    /// Check if this log has non-blank notes
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Validate user-supplied notes
    pub fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(note_text) = notes {
            if note_text.chars().count() > MAX_NOTES_LEN {
                return Err(DomainError::Validation {
                    message: format!("Notes cannot be longer than {} characters", MAX_NOTES_LEN)
                });
            }
        }
        Ok(())
    }
}
