/// Streak statistics and the pure calendar scans behind them
///
/// This module holds the `CompletionStats` value returned by the streak
/// engine, the policy for weekly/monthly longest streaks, and the store-free
/// run scans. The engine in `crate::analytics` feeds these with logs fetched
/// from a `LogStore`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DateRange, HabitId, PeriodKind};

/// Read-only aggregate over a habit's completion history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionStats {
    /// Which habit these stats are for
    pub habit_id: HabitId,
    /// Requested range clipped to the habit's start/end dates; `None` when
    /// they do not overlap
    pub range: Option<DateRange>,
    /// Calendar days in `range`
    pub total_days: u32,
    /// Completed logs in `range`
    pub completed_days: u32,
    /// `completed_days / total_days`, 0.0 for an empty range
    pub completion_rate: f64,
    /// Current consecutive days/weeks/months completed
    pub current_streak: u32,
    /// Best streak ever achieved, per the configured policy
    pub longest_streak: u32,
    /// Most recent completed day (None if never completed)
    pub last_completed: Option<NaiveDate>,
}

impl CompletionStats {
    /// Whether the habit has any completion on record
    ///
    /// A habit without logs and a habit whose streak lapsed both report a
    /// current streak of 0; this is how callers tell them apart.
    pub fn has_completions(&self) -> bool {
        self.last_completed.is_some()
    }
}

/// Ratio of completed to total days, 0.0 when there are no days
pub fn completion_rate(completed_days: u32, total_days: u32) -> f64 {
    if total_days == 0 {
        return 0.0;
    }
    (f64::from(completed_days) / f64::from(total_days)).min(1.0)
}

/// How the longest streak of weekly and monthly habits is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LongestStreakPolicy {
    /// Minimum of the number of distinct completed dates and the current
    /// streak. Coarse: it can undercount an older run that was longer than
    /// the current one.
    #[default]
    Approximate,
    /// Longest run of consecutive periods that each met the frequency target
    Exact,
}

/// Longest run of consecutive calendar days in an ascending date sequence
///
/// A date exactly one day after its predecessor extends the run; anything
/// else starts a new run of 1.
pub fn longest_daily_run<I>(dates: I) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut longest = 0;
    let mut running = 0;
    let mut previous: Option<NaiveDate> = None;

    for date in dates {
        if previous.and_then(|p| p.succ_opt()) == Some(date) {
            running += 1;
        } else if previous != Some(date) {
            running = 1;
        }
        longest = longest.max(running);
        previous = Some(date);
    }

    longest
}

/// Longest run of adjacent periods that each hold at least `frequency`
/// completed dates
///
/// Periods starting before `start_date` never qualify, matching the rule the
/// current streak walk follows.
pub fn longest_period_run<I>(kind: PeriodKind, dates: I, frequency: u32, start_date: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut per_period: BTreeMap<NaiveDate, (DateRange, u32)> = BTreeMap::new();
    for date in dates {
        if let Some(period) = kind.containing(date) {
            if period.start < start_date {
                continue;
            }
            per_period.entry(period.start).or_insert((period, 0)).1 += 1;
        }
    }

    let mut longest = 0;
    let mut running = 0;
    let mut previous: Option<DateRange> = None;

    for (period, count) in per_period.into_values() {
        if count < frequency {
            running = 0;
            previous = None;
            continue;
        }

        let adjacent = previous.and_then(|p| kind.next(&p)) == Some(period);
        running = if adjacent { running + 1 } else { 1 };
        longest = longest.max(running);
        previous = Some(period);
    }

    longest
}

/// Get an encouraging message for a streak length
pub fn motivational_message(current_streak: u32, kind: PeriodKind) -> String {
    let unit = match kind {
        PeriodKind::Day => "day",
        PeriodKind::Week => "week",
        PeriodKind::Month => "month",
    };
    let plural = if current_streak == 1 { "" } else { "s" };

    match current_streak {
        0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
        1 => format!("Great start! One {} down, keep the momentum going.", unit),
        2..=6 => format!("Nice work! {} {}{} in a row. You're building a strong habit.", current_streak, unit, plural),
        7..=29 => format!("Excellent! {} {}{} strong. You're in the groove now!", current_streak, unit, plural),
        _ => format!("Legendary! {} {}{} of unwavering commitment.", current_streak, unit, plural),
    }
}
