//! Unified error types for Managea.
//!
//! `DuplicateViolation` is the only domain-level failure of the accounting service.
//! `Validation` is raised before any store call. Store failures arrive as `Database`
//! and are propagated unchanged.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by the core, configuration and bot layers.
#[derive(Debug, Error)]
pub enum Error {
    /// A violation with the same (student, date, prayer, type) key already exists
    #[error(
        "Duplicate: {violation_type} ({prayer}) is already recorded for student {student_id} on {date}"
    )]
    DuplicateViolation {
        /// Student the violation was recorded against
        student_id: i64,
        /// Day of the violation
        date: NaiveDate,
        /// Prayer name or `"N/A"`
        prayer: String,
        /// Violation kind
        violation_type: String,
    },

    /// Input rejected before reaching the store
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Failure reported by the record store
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Referenced student does not exist
    #[error("Student not found: {id}")]
    StudentNotFound {
        /// Missing student ID
        id: i64,
    },

    /// Referenced class does not exist
    #[error("Class not found: {id}")]
    ClassNotFound {
        /// Missing class ID
        id: i64,
    },

    /// Referenced violation does not exist
    #[error("Violation not found: {id}")]
    ViolationNotFound {
        /// Missing violation ID
        id: i64,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Details of the failure
        message: String,
    },

    /// Roster file could not be turned into students
    #[error("Import error: {message}")]
    Import {
        /// Details of the failure
        message: String,
    },

    /// Report document could not be rendered
    #[error("Export error: {message}")]
    Export {
        /// Details of the failure
        message: String,
    },

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// String formatting failure while building a message
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Integer conversion failure
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True for the duplicate-key failure of the accounting service.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateViolation { .. })
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
