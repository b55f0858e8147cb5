/// Core types used throughout the domain layer
///
/// This module defines the identifier wrappers, the `Periodicity` sum type and
/// the inclusive `DateRange` that Habit, CompletionLog and the streak engine
/// are built on.

use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a habit ID where a log or tag ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a habit ID from its string form (request input or database row)
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidId(s.to_string()))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a completion log
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(pub Uuid);

impl LogId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidId(s.to_string()))
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagId(pub Uuid);

impl TagId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidId(s.to_string()))
    }
}

impl Default for TagId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Largest per-week completion target
pub const MAX_WEEKLY_FREQUENCY: u32 = 7;

/// Largest per-month completion target
pub const MAX_MONTHLY_FREQUENCY: u32 = 31;

/// How often a habit repeats
///
/// Each cadence carries only the parameters it needs. `frequency` is the
/// number of completed logs a period must contain to count toward a streak;
/// daily habits implicitly need one completion per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Periodicity {
    /// Every single day
    Daily,
    /// At least `frequency` completions in each Monday-aligned week
    Weekly {
        frequency: u32,
        /// Days the user plans to do the habit on. Informational: every
        /// completion inside the week counts toward the target.
        #[serde(default)]
        selected_days: Vec<Weekday>,
    },
    /// At least `frequency` completions in each calendar month
    Monthly { frequency: u32 },
}

impl Periodicity {
    /// Build a periodicity from the loose parts used by requests and rows
    ///
    /// `frequency` defaults to 1. Selected days are only accepted for weekly
    /// habits.
    pub fn from_parts(
        kind: &str,
        frequency: Option<u32>,
        selected_days: Vec<Weekday>,
    ) -> Result<Self, DomainError> {
        let kind = kind.trim().to_lowercase();

        if !selected_days.is_empty() && kind != "weekly" {
            return Err(DomainError::InvalidPeriodicity(
                format!("Selected days are only meaningful for weekly habits, not '{}'", kind)
            ));
        }

        let periodicity = match kind.as_str() {
            "daily" => {
                if let Some(freq) = frequency {
                    if freq != 1 {
                        return Err(DomainError::InvalidFrequency(
                            format!("Daily habits are done once per day, got frequency {}", freq)
                        ));
                    }
                }
                Periodicity::Daily
            }
            "weekly" => Periodicity::Weekly {
                frequency: frequency.unwrap_or(1),
                selected_days,
            },
            "monthly" => Periodicity::Monthly {
                frequency: frequency.unwrap_or(1),
            },
            other => {
                return Err(DomainError::InvalidPeriodicity(
                    format!("Unknown periodicity '{}'. Valid options: daily, weekly, monthly", other)
                ));
            }
        };

        periodicity.validate()?;
        Ok(periodicity)
    }

    /// Validate that the completion target is reachable within one period
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Periodicity::Daily => {}
            Periodicity::Weekly { frequency, selected_days } => {
                if *frequency == 0 || *frequency > MAX_WEEKLY_FREQUENCY {
                    return Err(DomainError::InvalidFrequency(
                        format!("Weekly frequency must be 1-{}, got {}", MAX_WEEKLY_FREQUENCY, frequency)
                    ));
                }
                for (i, day) in selected_days.iter().enumerate() {
                    if selected_days[..i].contains(day) {
                        return Err(DomainError::InvalidPeriodicity(
                            format!("Selected day {} is listed more than once", day)
                        ));
                    }
                }
            }
            Periodicity::Monthly { frequency } => {
                if *frequency == 0 || *frequency > MAX_MONTHLY_FREQUENCY {
                    return Err(DomainError::InvalidFrequency(
                        format!("Monthly frequency must be 1-{}, got {}", MAX_MONTHLY_FREQUENCY, frequency)
                    ));
                }
            }
        }
        Ok(())
    }

    /// Lowercase name stored in the database and shown to clients
    pub fn kind_name(&self) -> &'static str {
        match self {
            Periodicity::Daily => "daily",
            Periodicity::Weekly { .. } => "weekly",
            Periodicity::Monthly { .. } => "monthly",
        }
    }

    /// Completions needed per period
    pub fn frequency(&self) -> u32 {
        match self {
            Periodicity::Daily => 1,
            Periodicity::Weekly { frequency, .. } | Periodicity::Monthly { frequency } => *frequency,
        }
    }

    /// Planned weekdays (empty unless weekly with a selection)
    pub fn selected_days(&self) -> &[Weekday] {
        match self {
            Periodicity::Weekly { selected_days, .. } => selected_days,
            _ => &[],
        }
    }

    /// The period grid this cadence is counted on
    pub fn period_kind(&self) -> PeriodKind {
        match self {
            Periodicity::Daily => PeriodKind::Day,
            Periodicity::Weekly { .. } => PeriodKind::Week,
            Periodicity::Monthly { .. } => PeriodKind::Month,
        }
    }
}

/// Parse a weekday name such as "Mon" or "wednesday"
pub fn parse_weekday(s: &str) -> Result<Weekday, DomainError> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| DomainError::InvalidPeriodicity(format!("Unknown weekday '{}'", s)))
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(format!("'{}' is not a YYYY-MM-DD date", s)))
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting one that ends before it starts
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidDate(
                format!("Range end {} is before its start {}", end, start)
            ));
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day
    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// Number of days in the range, both ends included
    pub fn num_days(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Overlap of two ranges, or `None` when they are disjoint
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateRange { start, end })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Calendar grid a streak is counted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Day,
    /// Monday through Sunday
    Week,
    /// First through last day of a calendar month
    Month,
}

impl PeriodKind {
    /// The period that contains `date`
    ///
    /// `None` only at the edges of chrono's representable calendar.
    pub fn containing(self, date: NaiveDate) -> Option<DateRange> {
        match self {
            PeriodKind::Day => Some(DateRange::single(date)),
            PeriodKind::Week => {
                let monday = date.checked_sub_days(Days::new(u64::from(
                    date.weekday().num_days_from_monday(),
                )))?;
                let sunday = monday.checked_add_days(Days::new(6))?;
                Some(DateRange { start: monday, end: sunday })
            }
            PeriodKind::Month => {
                let first = date.with_day(1)?;
                let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
                Some(DateRange { start: first, end: last })
            }
        }
    }

    /// The period immediately before `period`
    pub fn previous(self, period: &DateRange) -> Option<DateRange> {
        self.containing(period.start.pred_opt()?)
    }

    /// The period immediately after `period`
    pub fn next(self, period: &DateRange) -> Option<DateRange> {
        self.containing(period.end.succ_opt()?)
    }
}
