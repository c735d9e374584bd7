//! Student business logic - roster operations and the `total_fine` projection.
//!
//! Students start with a zero `total_fine`. Only [`adjust_total_fine`] and the clearing
//! operations in [`crate::core::violation`] ever change it, always inside the same
//! transaction that changes the violation ledger.

use crate::{
    entities::{Student, Violation, class, student, violation},
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Input for adding a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    /// Student's name
    pub name: String,
    /// Optional room
    pub room: Option<String>,
}

impl NewStudent {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, room: Option<String>) -> Self {
        Self {
            name: name.into(),
            room,
        }
    }
}

/// Editable student fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentUpdate {
    /// New name
    pub name: Option<String>,
    /// New room; `Some(None)` clears it
    pub room: Option<Option<String>>,
}

/// Trims a room and maps blank input to `None`.
#[must_use]
pub fn normalize_room(room: Option<String>) -> Option<String> {
    room.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())
}

fn validate_student_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Student name is required"));
    }
    Ok(trimmed.to_string())
}

fn new_active_model(
    student: NewStudent,
    class: Option<&class::Model>,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<student::ActiveModel> {
    Ok(student::ActiveModel {
        name: Set(validate_student_name(&student.name)?),
        room: Set(normalize_room(student.room)),
        class_id: Set(class.map(|c| c.id)),
        class_name: Set(class.map(|c| c.name.clone()).unwrap_or_default()),
        total_fine: Set(0),
        created_at: Set(now),
        ..Default::default()
    })
}

/// Retrieves every student ordered alphabetically by name.
pub async fn get_all_students(db: &DatabaseConnection) -> Result<Vec<student::Model>> {
    Student::find()
        .order_by_asc(student::Column::Name)
        .order_by_asc(student::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a student by ID.
pub async fn get_student_by_id(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Option<student::Model>> {
    Student::find_by_id(student_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Students of one class ordered by name.
pub async fn get_students_in_class(
    db: &DatabaseConnection,
    class_id: i64,
) -> Result<Vec<student::Model>> {
    Student::find()
        .filter(student::Column::ClassId.eq(class_id))
        .order_by_asc(student::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Students whose name matches exactly (after trimming). Names are not unique.
pub async fn find_students_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Vec<student::Model>> {
    Student::find()
        .filter(student::Column::Name.eq(name.trim()))
        .order_by_asc(student::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds one student with a zero fine balance.
///
/// # Errors
/// Returns a validation error when the name is empty.
#[instrument(skip(db, class), fields(class_id = class.map(|c| c.id)))]
pub async fn create_student(
    db: &DatabaseConnection,
    student: NewStudent,
    class: Option<&class::Model>,
) -> Result<student::Model> {
    let active = new_active_model(student, class, chrono::Utc::now())?;
    let created = active.insert(db).await?;
    debug!(student_id = created.id, "Created student '{}'", created.name);
    Ok(created)
}

/// Adds many students in one transaction; either all are added or none.
///
/// Every name is validated before anything is written.
///
/// # Errors
/// Returns a validation error if any name is empty.
#[instrument(skip(db, students, class), fields(count = students.len()))]
pub async fn create_students_batch(
    db: &DatabaseConnection,
    students: Vec<NewStudent>,
    class: Option<&class::Model>,
) -> Result<Vec<student::Model>> {
    let now = chrono::Utc::now();
    let models = students
        .into_iter()
        .map(|s| new_active_model(s, class, now))
        .collect::<Result<Vec<_>>>()?;

    let txn = db.begin().await?;
    let mut created = Vec::with_capacity(models.len());
    for model in models {
        created.push(model.insert(&txn).await?);
    }
    txn.commit().await?;

    info!("Added {} students", created.len());
    Ok(created)
}

/// Updates a student's name and/or room.
///
/// # Errors
/// Returns a validation error for an empty name and `StudentNotFound` when the
/// student does not exist.
pub async fn update_student(
    db: &DatabaseConnection,
    student_id: i64,
    update: StudentUpdate,
) -> Result<student::Model> {
    let name = update
        .name
        .as_deref()
        .map(validate_student_name)
        .transpose()?;

    let existing = get_student_by_id(db, student_id)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;

    let mut active: student::ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(room) = update.room {
        active.room = Set(normalize_room(room));
    }
    active.update(db).await.map_err(Into::into)
}

/// Deletes a student together with all of their violations as one atomic unit.
///
/// Returns the number of violations removed.
///
/// # Errors
/// Returns `StudentNotFound` when the student does not exist.
#[instrument(skip(db))]
pub async fn delete_student(db: &DatabaseConnection, student_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    Student::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;

    let removed = Violation::delete_many()
        .filter(violation::Column::StudentId.eq(student_id))
        .exec(&txn)
        .await?
        .rows_affected;

    Student::delete_by_id(student_id).exec(&txn).await?;

    txn.commit().await?;
    info!(student_id, removed, "Deleted student and their violations");
    Ok(removed)
}

/// Adds `delta` to a student's `total_fine` with a single relative update.
///
/// The update is `UPDATE students SET total_fine = total_fine + delta WHERE id = ?`,
/// so concurrent writers never lose each other's increments. Pass a transaction to
/// make it part of a larger atomic unit.
///
/// # Errors
/// Returns `StudentNotFound` when the student does not exist.
pub async fn adjust_total_fine<C>(db: &C, student_id: i64, delta: i64) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;

    Student::update_many()
        .col_expr(
            student::Column::TotalFine,
            Expr::col(student::Column::TotalFine).add(delta),
        )
        .filter(student::Column::Id.eq(student_id))
        .exec(db)
        .await?;

    Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })
}
