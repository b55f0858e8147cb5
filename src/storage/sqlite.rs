/// SQLite implementation of the storage interfaces
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habits, tags and completion logs. It handles all SQL
/// queries and row conversion.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension, Row};

use crate::domain::{
    parse_weekday, CompletionLog, DateRange, Habit, HabitId, LogId, Periodicity, Tag, TagId,
};
use crate::storage::{migrations, HabitStorage, LogStore, StorageError};

/// How many times a log write is attempted when another writer races us
/// for the same (habit, date) row
const MAX_WRITE_ATTEMPTS: u32 = 3;

const HABIT_COLUMNS: &str =
    "id, title, description, periodicity, frequency, selected_days, start_date, end_date, icon, reminder, created_at";

const LOG_COLUMNS: &str = "id, habit_id, log_date, completed, notes, completed_at, created_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// both `HabitStorage` and `LogStore`.
pub struct SqliteStorage {
    conn: Connection,
}

/// Which constraint a failed write ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conflict {
    Unique,
    ForeignKey,
}

fn conflict_of(err: &rusqlite::Error) -> Option<Conflict> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            match e.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Some(Conflict::Unique),
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Conflict::ForeignKey),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Wrap a decode failure so it surfaces from inside a row mapper
fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::setup(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Open a private in-memory database (used by tests)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::setup(conn)
    }

    fn setup(conn: Connection) -> Result<Self, StorageError> {
        // Cascading deletes depend on this; SQLite leaves it off per connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| StorageError::Connection(format!("Failed to set busy timeout: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    /// Convert a `habits` row; tag links are loaded separately
    fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let id_str: String = row.get(0)?;
        let id = HabitId::parse(&id_str).map_err(|e| conversion_error(0, e))?;

        let kind: String = row.get(3)?;
        let frequency: u32 = row.get(4)?;
        let selected_days: Option<String> = row.get(5)?;
        let days = selected_days
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter(|d| !d.trim().is_empty())
            .map(parse_weekday)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| conversion_error(5, e))?;
        let periodicity = Periodicity::from_parts(&kind, Some(frequency), days)
            .map_err(|e| conversion_error(3, e))?;

        Ok(Habit {
            id,
            title: row.get(1)?,
            description: row.get(2)?,
            periodicity,
            start_date: row.get(6)?,
            end_date: row.get(7)?,
            icon: row.get(8)?,
            reminder: row.get(9)?,
            tag_ids: Vec::new(),
            created_at: row.get(10)?,
        })
    }

    fn log_from_row(row: &Row<'_>) -> rusqlite::Result<CompletionLog> {
        let id_str: String = row.get(0)?;
        let id = LogId::parse(&id_str).map_err(|e| conversion_error(0, e))?;

        let habit_id_str: String = row.get(1)?;
        let habit_id = HabitId::parse(&habit_id_str).map_err(|e| conversion_error(1, e))?;

        Ok(CompletionLog {
            id,
            habit_id,
            log_date: row.get(2)?,
            completed: row.get(3)?,
            notes: row.get(4)?,
            completed_at: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    /// Comma-separated weekday list ("Mon,Wed,Fri"), or NULL when empty
    fn selected_days_column(periodicity: &Periodicity) -> Option<String> {
        let days = periodicity.selected_days();
        if days.is_empty() {
            return None;
        }
        Some(days.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(","))
    }

    fn load_tag_ids(&self, habit_id: &HabitId) -> Result<Vec<TagId>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT tag_id FROM habit_tags WHERE habit_id = ?1 ORDER BY tag_id"
        )?;
        let raw = stmt
            .query_map(params![habit_id.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        raw.iter()
            .map(|s| TagId::parse(s).map_err(|e| StorageError::Corrupt(e.to_string())))
            .collect()
    }

    /// Insert the tag links of `habit`; the caller clears old links first
    fn write_tag_links(conn: &Connection, habit: &Habit) -> Result<(), StorageError> {
        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO habit_tags (habit_id, tag_id) VALUES (?1, ?2)"
        )?;
        for tag_id in &habit.tag_ids {
            stmt.execute(params![habit.id.to_string(), tag_id.to_string()])
                .map_err(|e| match conflict_of(&e) {
                    Some(Conflict::ForeignKey) => StorageError::TagNotFound { tag_id: tag_id.to_string() },
                    _ => StorageError::Query(e),
                })?;
        }
        Ok(())
    }

    fn insert_log(&self, log: &CompletionLog) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO habit_logs (id, habit_id, log_date, completed, notes, completed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    log.id.to_string(),
                    log.habit_id.to_string(),
                    log.log_date,
                    log.completed,
                    log.notes,
                    log.completed_at,
                    log.created_at
                ],
            )
            .map_err(|e| match conflict_of(&e) {
                Some(Conflict::Unique) => StorageError::DuplicateLog {
                    habit_id: log.habit_id.to_string(),
                    date: log.log_date,
                },
                Some(Conflict::ForeignKey) => StorageError::HabitNotFound {
                    habit_id: log.habit_id.to_string(),
                },
                None => StorageError::Query(e),
            })?;
        Ok(())
    }

    /// Rewrite the mutable columns of a log, but only while the row still
    /// holds `previous`'s status and notes
    ///
    /// Returns false when the row is gone or another writer changed it first.
    fn update_log(&self, previous: &CompletionLog, log: &CompletionLog) -> Result<bool, StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habit_logs SET completed = ?2, notes = ?3, completed_at = ?4
             WHERE id = ?1 AND completed = ?5 AND notes IS ?6",
            params![
                log.id.to_string(),
                log.completed,
                log.notes,
                log.completed_at,
                previous.completed,
                previous.notes
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Read-modify-write the log for (habit, date)
    ///
    /// `apply` builds the row to store from the current one. Losing an insert
    /// race to the unique index, or finding the row changed or gone at update
    /// time, re-reads and tries again.
    fn write_log_with_retry<F>(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        apply: F,
    ) -> Result<CompletionLog, StorageError>
    where
        F: Fn(Option<&CompletionLog>) -> CompletionLog,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let existing = self.find_log(habit_id, date)?;
            let log = apply(existing.as_ref());

            let written = match &existing {
                Some(previous) => self.update_log(previous, &log)?,
                None => match self.insert_log(&log) {
                    Ok(()) => true,
                    Err(StorageError::DuplicateLog { .. }) => false,
                    Err(e) => return Err(e),
                },
            };

            if written {
                tracing::debug!(
                    "Wrote log for habit {} on {} (completed: {})",
                    habit_id, date, log.completed
                );
                return Ok(log);
            }

            tracing::debug!(
                "Log for habit {} on {} changed concurrently, retrying (attempt {})",
                habit_id, date, attempt
            );
        }

        Err(StorageError::DuplicateLog {
            habit_id: habit_id.to_string(),
            date,
        })
    }
}

impl HabitStorage for SqliteStorage {
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO habits (
                id, title, description, periodicity, frequency, selected_days,
                start_date, end_date, icon, reminder, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                habit.id.to_string(),
                habit.title,
                habit.description,
                habit.periodicity.kind_name(),
                habit.periodicity.frequency(),
                Self::selected_days_column(&habit.periodicity),
                habit.start_date,
                habit.end_date,
                habit.icon,
                habit.reminder,
                habit.created_at
            ],
        )?;
        Self::write_tag_links(&tx, habit)?;
        tx.commit()?;

        tracing::debug!("Created habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let habit = self
            .conn
            .query_row(
                &format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS),
                params![habit_id.to_string()],
                Self::habit_from_row,
            )
            .optional()?;

        let mut habit = habit.ok_or_else(|| StorageError::HabitNotFound {
            habit_id: habit_id.to_string(),
        })?;
        habit.tag_ids = self.load_tag_ids(&habit.id)?;
        Ok(habit)
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let rows_affected = tx.execute(
            "UPDATE habits SET
                title = ?2,
                description = ?3,
                periodicity = ?4,
                frequency = ?5,
                selected_days = ?6,
                start_date = ?7,
                end_date = ?8,
                icon = ?9,
                reminder = ?10
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.title,
                habit.description,
                habit.periodicity.kind_name(),
                habit.periodicity.frequency(),
                Self::selected_days_column(&habit.periodicity),
                habit.start_date,
                habit.end_date,
                habit.icon,
                habit.reminder
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tx.execute("DELETE FROM habit_tags WHERE habit_id = ?1", params![habit.id.to_string()])?;
        Self::write_tag_links(&tx, habit)?;
        tx.commit()?;

        tracing::debug!("Updated habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    fn list_habits(&self, tag: Option<&TagId>) -> Result<Vec<Habit>, StorageError> {
        let mut habits = match tag {
            Some(tag_id) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM habits
                     WHERE id IN (SELECT habit_id FROM habit_tags WHERE tag_id = ?1)
                     ORDER BY created_at, title",
                    HABIT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![tag_id.to_string()], Self::habit_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM habits ORDER BY created_at, title",
                    HABIT_COLUMNS
                ))?;
                let rows = stmt.query_map([], Self::habit_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        for habit in &mut habits {
            habit.tag_ids = self.load_tag_ids(&habit.id)?;
        }

        Ok(habits)
    }

    fn create_tag(&self, tag: &Tag) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO tags (id, name) VALUES (?1, ?2)",
                params![tag.id.to_string(), tag.name],
            )
            .map_err(|e| match conflict_of(&e) {
                Some(Conflict::Unique) => StorageError::DuplicateTag { name: tag.name.clone() },
                _ => StorageError::Query(e),
            })?;

        tracing::debug!("Created tag: {} ({})", tag.name, tag.id);
        Ok(())
    }

    fn get_tag(&self, tag_id: &TagId) -> Result<Tag, StorageError> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, name FROM tags WHERE id = ?1",
                params![tag_id.to_string()],
                |row| {
                    let name: String = row.get(1)?;
                    Ok(Tag { id: tag_id.clone(), name })
                },
            )
            .optional()?;

        tag.ok_or_else(|| StorageError::TagNotFound {
            tag_id: tag_id.to_string(),
        })
    }

    fn list_tags(&self) -> Result<Vec<Tag>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM tags ORDER BY name COLLATE NOCASE")?;
        let tags = stmt
            .query_map([], |row| {
                let id_str: String = row.get(0)?;
                let id = TagId::parse(&id_str).map_err(|e| conversion_error(0, e))?;
                Ok(Tag { id, name: row.get(1)? })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    fn delete_tag(&self, tag_id: &TagId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM tags WHERE id = ?1",
            params![tag_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::TagNotFound {
                tag_id: tag_id.to_string(),
            });
        }

        tracing::debug!("Deleted tag: {}", tag_id);
        Ok(())
    }
}

impl LogStore for SqliteStorage {
    fn find_log(&self, habit_id: &HabitId, date: NaiveDate) -> Result<Option<CompletionLog>, StorageError> {
        let log = self
            .conn
            .query_row(
                &format!("SELECT {} FROM habit_logs WHERE habit_id = ?1 AND log_date = ?2", LOG_COLUMNS),
                params![habit_id.to_string(), date],
                Self::log_from_row,
            )
            .optional()?;
        Ok(log)
    }

    fn count_completed(&self, habit_id: &HabitId, range: DateRange) -> Result<u32, StorageError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM habit_logs
             WHERE habit_id = ?1 AND completed = 1 AND log_date BETWEEN ?2 AND ?3",
            params![habit_id.to_string(), range.start, range.end],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    fn count_completed_dates(&self, habit_id: &HabitId, since: NaiveDate) -> Result<u32, StorageError> {
        let count = self.conn.query_row(
            "SELECT COUNT(DISTINCT log_date) FROM habit_logs
             WHERE habit_id = ?1 AND completed = 1 AND log_date >= ?2",
            params![habit_id.to_string(), since],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    fn list_completed(&self, habit_id: &HabitId) -> Result<Vec<CompletionLog>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM habit_logs WHERE habit_id = ?1 AND completed = 1 ORDER BY log_date ASC",
            LOG_COLUMNS
        ))?;
        let logs = stmt
            .query_map(params![habit_id.to_string()], Self::log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    fn list_logs(&self, habit_id: &HabitId, range: DateRange) -> Result<Vec<CompletionLog>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM habit_logs
             WHERE habit_id = ?1 AND log_date BETWEEN ?2 AND ?3
             ORDER BY log_date ASC",
            LOG_COLUMNS
        ))?;
        let logs = stmt
            .query_map(params![habit_id.to_string(), range.start, range.end], Self::log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    fn upsert_log(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        completed: bool,
        notes: Option<String>,
    ) -> Result<CompletionLog, StorageError> {
        self.write_log_with_retry(habit_id, date, |existing| {
            let now = Utc::now();
            match existing {
                Some(log) => log.with_status(completed, notes.clone(), now),
                None => CompletionLog::new(habit_id.clone(), date, completed, notes.clone(), now),
            }
        })
    }

    fn toggle_log(&self, habit_id: &HabitId, date: NaiveDate) -> Result<CompletionLog, StorageError> {
        self.write_log_with_retry(habit_id, date, |existing| {
            let now = Utc::now();
            match existing {
                Some(log) => log.toggled(now),
                None => CompletionLog::new(habit_id.clone(), date, true, None, now),
            }
        })
    }
}
