/// Server configuration
///
/// Holds the settings that shape every request: where the database lives,
/// which UTC offset defines "today", and how longest streaks of weekly and
/// monthly habits are computed.

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use thiserror::Error;

use crate::domain::LongestStreakPolicy;

/// Westernmost real-world UTC offset, in minutes (UTC-12:00)
pub const MIN_UTC_OFFSET_MINUTES: i32 = -12 * 60;
/// Easternmost real-world UTC offset, in minutes (UTC+14:00)
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Errors while building the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid UTC offset: {minutes} minutes (expected -720..=840)")]
    InvalidUtcOffset { minutes: i32 },

    #[error("No writable location for the database: {0}")]
    NoDatabaseLocation(#[from] std::io::Error),
}

/// Settings for one server process
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// Offset used to decide which calendar day "today" is
    pub utc_offset: FixedOffset,
    /// How weekly/monthly longest streaks are computed
    pub longest_streak_policy: LongestStreakPolicy,
}

impl ServerConfig {
    /// Configuration with UTC days and the approximate longest-streak policy
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path,
            utc_offset: Utc.fix(),
            longest_streak_policy: LongestStreakPolicy::default(),
        }
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Result<Self, ConfigError> {
        self.utc_offset = utc_offset_from_minutes(minutes)?;
        Ok(self)
    }

    pub fn with_longest_streak_policy(mut self, policy: LongestStreakPolicy) -> Self {
        self.longest_streak_policy = policy;
        self
    }

    /// The current calendar date at the configured offset
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset).date_naive()
    }
}

/// Convert an offset in minutes east of UTC into a `FixedOffset`
pub fn utc_offset_from_minutes(minutes: i32) -> Result<FixedOffset, ConfigError> {
    if !(MIN_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&minutes) {
        return Err(ConfigError::InvalidUtcOffset { minutes });
    }
    FixedOffset::east_opt(minutes * 60).ok_or(ConfigError::InvalidUtcOffset { minutes })
}

/// Make sure the directory holding `path` exists
pub fn prepare_database_path(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Get the default database path with robust fallback strategy
///
/// Tries the home directory, the platform data and config directories and
/// the working directory, in that order, and takes the first one that can
/// be written to. The temp directory is the last resort.
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(".habit_tracker")),
        dirs::data_dir().map(|p| p.join("habit_tracker")),
        dirs::config_dir().map(|p| p.join("habit_tracker")),
        std::env::current_dir().ok().map(|p| p.join(".habit_tracker")),
    ];

    for dir in potential_paths.iter().flatten() {
        if is_writable_dir(dir) {
            return Ok(dir.join("habits.db"));
        }
    }

    let temp_dir = std::env::temp_dir().join("habit_tracker");
    std::fs::create_dir_all(&temp_dir)?;

    tracing::warn!("Using temporary directory for database: {}", temp_dir.display());
    Ok(temp_dir.join("habits.db"))
}

fn is_writable_dir(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".test_write");
    if std::fs::write(&probe, "test").is_err() {
        return false;
    }
    let _ = std::fs::remove_file(&probe);
    true
}
