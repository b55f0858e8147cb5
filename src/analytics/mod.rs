/// Streak engine for computing habit statistics
///
/// This module computes current streaks, longest streaks and completion
/// rates over a habit's completion logs. It reads everything through the
/// `LogStore` trait and never writes.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{
    completion_rate, longest_daily_run, longest_period_run, CompletionStats, DateRange, DomainError,
    Habit, LongestStreakPolicy, PeriodKind,
};
use crate::storage::{LogStore, StorageError};

/// Errors from streak computations
#[derive(Error, Debug)]
pub enum StreakError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("Log store error: {0}")]
    Store(#[from] StorageError),
}

/// Computes streak statistics for habits
///
/// The engine borrows its store; it holds no state of its own beyond the
/// longest-streak policy.
pub struct StreakEngine<'a, S: LogStore + ?Sized> {
    store: &'a S,
    policy: LongestStreakPolicy,
}

impl<'a, S: LogStore + ?Sized> StreakEngine<'a, S> {
    /// Create an engine with the default (approximate) longest-streak policy
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            policy: LongestStreakPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LongestStreakPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether the habit has a completed log on `date`
    ///
    /// A missing log means "not completed".
    pub fn has_completed_on_date(&self, habit: &Habit, date: NaiveDate) -> Result<bool, StorageError> {
        let log = self.store.find_log(&habit.id, date)?;
        Ok(log.is_some_and(|l| l.completed))
    }

    /// Number of consecutive days, weeks or months completed up to `today`
    ///
    /// Daily habits need today itself to be done. Weekly and monthly habits
    /// count the period containing `today` like any past period, so an
    /// unfinished current week breaks the streak.
    pub fn current_streak(&self, habit: &Habit, today: NaiveDate) -> Result<u32, StreakError> {
        habit.periodicity.validate()?;

        match habit.periodicity.period_kind() {
            PeriodKind::Day => self.current_daily_streak(habit, today),
            kind => self.current_period_streak(habit, kind, today),
        }
    }

    fn current_daily_streak(&self, habit: &Habit, today: NaiveDate) -> Result<u32, StreakError> {
        let mut streak = 0;
        let mut day = Some(today);

        while let Some(d) = day {
            if d < habit.start_date || !self.has_completed_on_date(habit, d)? {
                break;
            }
            streak += 1;
            day = d.pred_opt();
        }

        Ok(streak)
    }

    fn current_period_streak(&self, habit: &Habit, kind: PeriodKind, today: NaiveDate) -> Result<u32, StreakError> {
        let frequency = habit.periodicity.frequency();
        let mut streak = 0;
        let mut period = kind.containing(today);

        while let Some(p) = period {
            if p.start < habit.start_date {
                break;
            }
            if self.store.count_completed(&habit.id, p)? < frequency {
                break;
            }
            streak += 1;
            period = kind.previous(&p);
        }

        Ok(streak)
    }

    /// Best streak the habit has reached
    ///
    /// Daily habits get a full scan of their history. Weekly and monthly
    /// habits follow the engine's `LongestStreakPolicy`.
    pub fn longest_streak(&self, habit: &Habit, today: NaiveDate) -> Result<u32, StreakError> {
        habit.periodicity.validate()?;

        let kind = habit.periodicity.period_kind();
        if kind == PeriodKind::Day {
            return Ok(longest_daily_run(self.completed_dates(habit)?));
        }

        match self.policy {
            LongestStreakPolicy::Approximate => {
                let distinct_dates = self.store.count_completed_dates(&habit.id, habit.start_date)?;
                let current = self.current_period_streak(habit, kind, today)?;
                Ok(distinct_dates.min(current))
            }
            LongestStreakPolicy::Exact => Ok(longest_period_run(
                kind,
                self.completed_dates(habit)?,
                habit.periodicity.frequency(),
                habit.start_date,
            )),
        }
    }

    /// Completion statistics over `range`, with streaks relative to `today`
    ///
    /// The range is clipped to the habit's own start and end dates first.
    pub fn completion_stats(
        &self,
        habit: &Habit,
        range: DateRange,
        today: NaiveDate,
    ) -> Result<CompletionStats, StreakError> {
        habit.periodicity.validate()?;
        DateRange::new(range.start, range.end)?;

        let tracked = DateRange {
            start: habit.start_date,
            end: habit.end_date.unwrap_or(NaiveDate::MAX),
        };
        let effective = range.intersect(&tracked);

        let (total_days, completed_days) = match effective {
            Some(r) => (r.num_days(), self.store.count_completed(&habit.id, r)?),
            None => (0, 0),
        };

        let current_streak = self.current_streak(habit, today)?;
        let longest_streak = self.longest_streak(habit, today)?;
        let last_completed = self.completed_dates(habit)?.last().copied();

        tracing::debug!(
            "Stats for habit {} over {:?}: {}/{} days, current {}, longest {}",
            habit.id, effective, completed_days, total_days, current_streak, longest_streak
        );

        Ok(CompletionStats {
            habit_id: habit.id.clone(),
            range: effective,
            total_days,
            completed_days,
            completion_rate: completion_rate(completed_days, total_days),
            current_streak,
            longest_streak,
            last_completed,
        })
    }

    /// Completed log dates on or after the start date, ascending
    fn completed_dates(&self, habit: &Habit) -> Result<Vec<NaiveDate>, StorageError> {
        Ok(self
            .store
            .list_completed(&habit.id)?
            .into_iter()
            .map(|log| log.log_date)
            .filter(|date| *date >= habit.start_date)
            .collect())
    }
}
