//! Database configuration module for Managea.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The one thing the entity macros cannot
//! express, the composite uniqueness of a violation's duplicate key, is added as an
//! explicit index.

use crate::entities::{Class, Student, Violation, violation};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/managea.sqlite?mode=rwc";

/// Name of the unique index over `(student_id, date, prayer, violation_type)`.
pub const DUPLICATE_KEY_INDEX: &str = "idx_violations_duplicate_key";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates every table and index if it does not exist yet.
///
/// Safe to call on every startup.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut class_table = schema.create_table_from_entity(Class);
    let mut student_table = schema.create_table_from_entity(Student);
    let mut violation_table = schema.create_table_from_entity(Violation);

    class_table.if_not_exists();
    student_table.if_not_exists();
    violation_table.if_not_exists();

    db.execute(builder.build(&class_table)).await?;
    db.execute(builder.build(&student_table)).await?;
    db.execute(builder.build(&violation_table)).await?;

    let duplicate_key = Index::create()
        .name(DUPLICATE_KEY_INDEX)
        .table(Violation)
        .col(violation::Column::StudentId)
        .col(violation::Column::Date)
        .col(violation::Column::Prayer)
        .col(violation::Column::ViolationType)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&duplicate_key)).await?;

    info!("Database tables ensured (classes, students, violations).");
    Ok(())
}
