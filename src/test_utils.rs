//! Shared test utilities for `Managea`.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test entities with sensible defaults, and checking the fine ledger.

use crate::{
    core::{
        class,
        student::{self, NewStudent},
    },
    entities::{self, Student, Violation},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output to the test harness; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test class with the given name.
pub async fn create_test_class(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::class::Model> {
    class::create_class(db, name).await
}

/// Creates a test student with sensible defaults.
///
/// # Defaults
/// * `room`: None
/// * `total_fine`: 0
pub async fn create_test_student(
    db: &DatabaseConnection,
    name: &str,
    class: Option<&entities::class::Model>,
) -> Result<entities::student::Model> {
    student::create_student(db, NewStudent::new(name, None), class).await
}

/// Current stored `total_fine` of a student.
pub async fn total_fine_of(db: &DatabaseConnection, student_id: i64) -> Result<i64> {
    Student::find_by_id(student_id)
        .one(db)
        .await?
        .map(|s| s.total_fine)
        .ok_or(Error::StudentNotFound { id: student_id })
}

/// Asserts every student's `total_fine` equals the sum of their violation fines.
pub async fn assert_fines_consistent(db: &DatabaseConnection) -> Result<()> {
    let students = Student::find().all(db).await?;
    let violations = Violation::find().all(db).await?;

    let mut ledger: HashMap<i64, i64> = HashMap::new();
    for v in &violations {
        *ledger.entry(v.student_id).or_default() += v.fine;
    }

    for s in &students {
        assert_eq!(
            s.total_fine,
            ledger.get(&s.id).copied().unwrap_or(0),
            "total_fine of '{}' disagrees with the ledger",
            s.name
        );
    }

    // No violation may point at a missing student
    for v in &violations {
        assert!(
            students.iter().any(|s| s.id == v.student_id),
            "violation {} is orphaned",
            v.id
        );
    }
    Ok(())
}
