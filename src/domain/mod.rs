/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, CompletionLog, Tag), the
/// periodicity and date-range types, and the pure calendar logic the streak
/// engine is built on. Nothing in here touches the database.

pub mod habit;
pub mod log;
pub mod streak;
pub mod tag;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use log::*;
pub use streak::*;
pub use tag::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
///
/// Every variant is an invalid-input error: it is raised before any store
/// access happens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit title: {0}")]
    InvalidTitle(String),

    #[error("Invalid tag name: {0}")]
    InvalidTagName(String),

    #[error("Invalid periodicity: {0}")]
    InvalidPeriodicity(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}
