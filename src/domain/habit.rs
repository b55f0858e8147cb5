/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents something the
/// user wants to do on a daily, weekly or monthly cadence, along with its
/// validation rules and the partial-update type used by the update tool.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, HabitId, Periodicity, TagId};

/// Longest allowed title, in characters
pub const MAX_TITLE_LEN: usize = 100;
/// Longest allowed description, in characters
pub const MAX_DESCRIPTION_LEN: usize = 500;
/// Longest allowed icon (usually a single emoji), in characters
pub const MAX_ICON_LEN: usize = 10;

/// A habit the user wants to keep
///
/// `start_date` is the inclusive lower bound of every streak computation:
/// logs dated before it never count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display title (e.g., "Drink 8 glasses of water")
    pub title: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Cadence and per-period completion target
    pub periodicity: Periodicity,
    /// First day the habit is tracked
    pub start_date: NaiveDate,
    /// Optional last day the habit is tracked
    pub end_date: Option<NaiveDate>,
    /// Optional display icon
    pub icon: Option<String>,
    /// Whether the user asked for reminders
    pub reminder: bool,
    /// Tags attached to this habit
    pub tag_ids: Vec<TagId>,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

/// Changes to apply to an existing habit
///
/// `None` leaves a field untouched. For the nullable fields the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub periodicity: Option<Periodicity>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub icon: Option<Option<String>>,
    pub reminder: Option<bool>,
    pub tag_ids: Option<Vec<TagId>>,
}

impl Habit {
    /// Create a new habit with validation
    pub fn new(
        title: String,
        description: Option<String>,
        periodicity: Periodicity,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        let title = Self::validate_title(&title)?;
        Self::validate_description(&description)?;
        periodicity.validate()?;
        Self::validate_dates(start_date, end_date)?;

        Ok(Self {
            id: HabitId::new(),
            title,
            description,
            periodicity,
            start_date,
            end_date,
            icon: None,
            reminder: false,
            tag_ids: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Apply a set of changes, validating the resulting habit as a whole
    ///
    /// Nothing is modified when validation fails.
    pub fn apply(&mut self, changes: HabitChanges) -> Result<(), DomainError> {
        let title = match changes.title {
            Some(ref t) => Self::validate_title(t)?,
            None => self.title.clone(),
        };
        let description = changes.description.unwrap_or_else(|| self.description.clone());
        Self::validate_description(&description)?;

        let periodicity = changes.periodicity.unwrap_or_else(|| self.periodicity.clone());
        periodicity.validate()?;

        let start_date = changes.start_date.unwrap_or(self.start_date);
        let end_date = changes.end_date.unwrap_or(self.end_date);
        Self::validate_dates(start_date, end_date)?;

        let icon = changes.icon.unwrap_or_else(|| self.icon.clone());
        Self::validate_icon(&icon)?;

        self.title = title;
        self.description = description;
        self.periodicity = periodicity;
        self.start_date = start_date;
        self.end_date = end_date;
        self.icon = icon;
        if let Some(reminder) = changes.reminder {
            self.reminder = reminder;
        }
        if let Some(mut tag_ids) = changes.tag_ids {
            tag_ids.sort();
            tag_ids.dedup();
            self.tag_ids = tag_ids;
        }

        Ok(())
    }

    /// Whether the habit is being tracked on `date`
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }

    // Validation helper methods

    /// Trim and validate a title, returning the trimmed form
    fn validate_title(title: &str) -> Result<String, DomainError> {
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidTitle(
                "Habit title cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::InvalidTitle(
                format!("Habit title cannot be longer than {} characters", MAX_TITLE_LEN)
            ));
        }

        Ok(trimmed.to_string())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(DomainError::Validation {
                    message: format!("Description cannot be longer than {} characters", MAX_DESCRIPTION_LEN)
                });
            }
        }
        Ok(())
    }

    fn validate_icon(icon: &Option<String>) -> Result<(), DomainError> {
        if let Some(icon) = icon {
            if icon.trim().is_empty() || icon.chars().count() > MAX_ICON_LEN {
                return Err(DomainError::Validation {
                    message: format!("Icon must be 1-{} characters", MAX_ICON_LEN)
                });
            }
        }
        Ok(())
    }

    fn validate_dates(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Result<(), DomainError> {
        if let Some(end) = end_date {
            if end < start_date {
                return Err(DomainError::InvalidDate(
                    format!("End date {} is before start date {}", end, start_date)
                ));
            }
        }
        Ok(())
    }
}
