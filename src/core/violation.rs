//! Violation accounting - records violations and keeps each student's `total_fine` equal
//! to the sum of the fines in their violation ledger.
//!
//! Every write happens in one database transaction that touches both the ledger and
//! the total, so readers never see one without the other. A violation's key
//! `(student_id, date, prayer, violation_type)` is unique: a pre-check gives a clean
//! [`Error::DuplicateViolation`], and the unique index turns a racing insert from another
//! session into the same error.

use crate::{
    core::{fines::ViolationSlot, student::adjust_total_fine},
    entities::{Student, Violation, student, violation},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use std::collections::HashMap;
use std::fmt::Write;
use tracing::{debug, info, instrument, warn};

/// Per-student results of [`record_violations_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Violations that were recorded
    pub recorded: Vec<violation::Model>,
    /// Students that already had this violation
    pub duplicates: Vec<i64>,
    /// Students whose recording failed for another reason, with the error message
    pub failures: Vec<(i64, String)>,
}

impl BatchOutcome {
    /// Number of students a violation was recorded for.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.recorded.len()
    }

    /// Sum of the fines recorded by this batch.
    #[must_use]
    pub fn total_fine(&self) -> i64 {
        self.recorded.iter().map(|v| v.fine).sum()
    }

    /// One-line summary suitable for a single user notification.
    #[must_use]
    pub fn summary(&self) -> String {
        let succeeded = self.succeeded();
        let duplicates = self.duplicates.len();
        let failed = self.failures.len();

        let mut message = if succeeded > 0 {
            let mut m = format!(
                "Fine added for {succeeded} student{}",
                if succeeded == 1 { "" } else { "s" }
            );
            if duplicates > 0 {
                let _ = write!(m, " ({duplicates} skipped)");
            }
            m
        } else if duplicates > 0 {
            format!("All {duplicates} entries were duplicates")
        } else if failed == 0 {
            "No students selected".to_string()
        } else {
            "No fines added".to_string()
        };

        if failed > 0 {
            let _ = write!(message, "; {failed} failed");
        }
        message
    }
}

/// Result of [`clear_all_violations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearSummary {
    /// Violations deleted
    pub violations_removed: u64,
    /// Students whose total was reset to zero
    pub students_reset: u64,
}

/// A `total_fine` that disagreed with the ledger and was repaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FineCorrection {
    /// Student whose total was wrong
    pub student_id: i64,
    /// Student's name
    pub student_name: String,
    /// Total stored before the repair
    pub recorded_total: i64,
    /// Sum of the student's violation fines, now stored
    pub ledger_total: i64,
}

/// All violations, newest first.
pub async fn get_all_violations(db: &DatabaseConnection) -> Result<Vec<violation::Model>> {
    Violation::find()
        .order_by_desc(violation::Column::CreatedAt)
        .order_by_desc(violation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// One student's violations, newest first.
pub async fn get_violations_for_student(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<violation::Model>> {
    Violation::find()
        .filter(violation::Column::StudentId.eq(student_id))
        .order_by_desc(violation::Column::CreatedAt)
        .order_by_desc(violation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a violation by ID.
pub async fn get_violation_by_id(
    db: &DatabaseConnection,
    violation_id: i64,
) -> Result<Option<violation::Model>> {
    Violation::find_by_id(violation_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Looks up the violation holding this exact duplicate key, if any.
pub async fn find_duplicate<C>(
    db: &C,
    student_id: i64,
    date: NaiveDate,
    slot: ViolationSlot,
) -> Result<Option<violation::Model>>
where
    C: ConnectionTrait,
{
    Violation::find()
        .filter(violation::Column::StudentId.eq(student_id))
        .filter(violation::Column::Date.eq(date))
        .filter(violation::Column::Prayer.eq(slot.prayer().as_str()))
        .filter(violation::Column::ViolationType.eq(slot.kind().as_str()))
        .one(db)
        .await
        .map_err(Into::into)
}

fn duplicate_error(student_id: i64, date: NaiveDate, slot: ViolationSlot) -> Error {
    Error::DuplicateViolation {
        student_id,
        date,
        prayer: slot.prayer().as_str().to_string(),
        violation_type: slot.kind().as_str().to_string(),
    }
}

/// Inserts the violation row, mapping a unique-index rejection to `DuplicateViolation`.
async fn insert_violation<C>(
    db: &C,
    student_id: i64,
    student_name: &str,
    date: NaiveDate,
    slot: ViolationSlot,
) -> Result<violation::Model>
where
    C: ConnectionTrait,
{
    let model = violation::ActiveModel {
        student_id: Set(student_id),
        student_name: Set(student_name.to_string()),
        date: Set(date),
        prayer: Set(slot.prayer().as_str().to_string()),
        violation_type: Set(slot.kind().as_str().to_string()),
        fine: Set(slot.fine()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    model.insert(db).await.map_err(|err| {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            duplicate_error(student_id, date, slot)
        } else {
            err.into()
        }
    })
}

/// Records a violation and charges its fine to the student.
///
/// The fine comes from the fine table; Late to School is always stored with the
/// `"N/A"` prayer. The new row and the `total_fine` increment commit together.
///
/// # Errors
/// - `Validation` when the student name snapshot is empty (nothing is written)
/// - `DuplicateViolation` when the key is already recorded (nothing is written)
/// - `StudentNotFound` when the student does not exist
#[instrument(skip(db, student_name), fields(prayer = %slot.prayer(), kind = %slot.kind()))]
pub async fn record_violation(
    db: &DatabaseConnection,
    student_id: i64,
    student_name: &str,
    date: NaiveDate,
    slot: ViolationSlot,
) -> Result<violation::Model> {
    let student_name = student_name.trim();
    if student_name.is_empty() {
        return Err(Error::validation("Student name is required"));
    }

    let txn = db.begin().await?;

    Student::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;

    if find_duplicate(&txn, student_id, date, slot).await?.is_some() {
        debug!("Duplicate violation rejected");
        return Err(duplicate_error(student_id, date, slot));
    }

    let recorded = insert_violation(&txn, student_id, student_name, date, slot).await?;
    adjust_total_fine(&txn, student_id, recorded.fine).await?;

    txn.commit().await?;

    info!(
        violation_id = recorded.id,
        fine = recorded.fine,
        "Recorded violation for '{}'",
        recorded.student_name
    );
    Ok(recorded)
}

/// Records the same violation for several students, one after another.
///
/// Each student is independent: a duplicate or failure for one student is tallied and
/// the batch moves on. Students are processed in order, so a student listed twice
/// gets one violation and one duplicate.
#[instrument(skip(db, student_ids), fields(students = student_ids.len()))]
pub async fn record_violations_batch(
    db: &DatabaseConnection,
    student_ids: &[i64],
    date: NaiveDate,
    slot: ViolationSlot,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for &student_id in student_ids {
        let result = match Student::find_by_id(student_id).one(db).await {
            Ok(Some(student)) => {
                record_violation(db, student.id, &student.name, date, slot).await
            }
            Ok(None) => Err(Error::StudentNotFound { id: student_id }),
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(recorded) => outcome.recorded.push(recorded),
            Err(err) if err.is_duplicate() => outcome.duplicates.push(student_id),
            Err(err) => {
                warn!(student_id, "Failed to record violation: {err}");
                outcome.failures.push((student_id, err.to_string()));
            }
        }
    }

    info!("{}", outcome.summary());
    outcome
}

/// Deletes a violation and refunds its stored fine from the student's total.
///
/// The fine is read from the stored row inside the same transaction, never taken from
/// the caller. Returns the deleted violation.
///
/// # Errors
/// Returns `ViolationNotFound` when the violation does not exist.
#[instrument(skip(db))]
pub async fn delete_violation(
    db: &DatabaseConnection,
    violation_id: i64,
) -> Result<violation::Model> {
    let txn = db.begin().await?;

    let existing = Violation::find_by_id(violation_id)
        .one(&txn)
        .await?
        .ok_or(Error::ViolationNotFound { id: violation_id })?;

    Violation::delete_by_id(existing.id).exec(&txn).await?;
    adjust_total_fine(&txn, existing.student_id, -existing.fine).await?;

    txn.commit().await?;

    info!(
        student_id = existing.student_id,
        fine = existing.fine,
        "Deleted violation"
    );
    Ok(existing)
}

/// Deletes all of a student's violations and sets their total to zero atomically.
///
/// Returns the number of violations removed.
///
/// # Errors
/// Returns `StudentNotFound` when the student does not exist.
#[instrument(skip(db))]
pub async fn clear_student_violations(db: &DatabaseConnection, student_id: i64) -> Result<u64> {
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

    Student::update_many()
        .col_expr(student::Column::TotalFine, Expr::value(0_i64))
        .filter(student::Column::Id.eq(student_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(removed, "Cleared student violations");
    Ok(removed)
}

/// Deletes every violation and resets every student's total to zero atomically.
///
/// The reset covers all students in the store at commit time, including students added
/// after the caller last looked at the roster.
#[instrument(skip(db))]
pub async fn clear_all_violations(db: &DatabaseConnection) -> Result<ClearSummary> {
    let txn = db.begin().await?;

    let violations_removed = Violation::delete_many().exec(&txn).await?.rows_affected;
    let students_reset = Student::update_many()
        .col_expr(student::Column::TotalFine, Expr::value(0_i64))
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;

    info!(
        violations_removed,
        students_reset, "Cleared all violations"
    );
    Ok(ClearSummary {
        violations_removed,
        students_reset,
    })
}

/// Recomputes every student's total from the violation ledger and repairs drift.
///
/// Returns the corrections made; an empty list means the store was consistent.
#[instrument(skip(db))]
pub async fn reconcile_total_fines(db: &DatabaseConnection) -> Result<Vec<FineCorrection>> {
    let txn = db.begin().await?;

    let students = Student::find()
        .order_by_asc(student::Column::Id)
        .all(&txn)
        .await?;
    let violations = Violation::find().all(&txn).await?;

    let mut ledger: HashMap<i64, i64> = HashMap::new();
    for v in &violations {
        *ledger.entry(v.student_id).or_default() += v.fine;
    }

    let mut corrections = Vec::new();
    for s in students {
        let ledger_total = ledger.get(&s.id).copied().unwrap_or(0);
        if s.total_fine == ledger_total {
            continue;
        }

        warn!(
            student_id = s.id,
            recorded = s.total_fine,
            ledger = ledger_total,
            "Repairing total fine"
        );
        Student::update_many()
            .col_expr(student::Column::TotalFine, Expr::value(ledger_total))
            .filter(student::Column::Id.eq(s.id))
            .exec(&txn)
            .await?;

        corrections.push(FineCorrection {
            student_id: s.id,
            student_name: s.name,
            recorded_total: s.total_fine,
            ledger_total,
        });
    }

    txn.commit().await?;
    Ok(corrections)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::fines::{Prayer, ViolationType};
    use crate::core::student::get_student_by_id;
    use crate::test_utils::*;
    use sea_orm::ConnectionTrait;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn slot(prayer: Prayer, kind: ViolationType) -> ViolationSlot {
        ViolationSlot::new(prayer, kind).unwrap()
    }

    #[tokio::test]
    async fn test_record_violation_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = record_violation(
            &db,
            1,
            "   ",
            day(2024, 1, 10),
            slot(Prayer::Subh, ViolationType::Absent),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_ali_scenario() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let ali = create_test_student(&db, "Ali", None).await?;
        let date = day(2024, 1, 10);

        let absent = record_violation(
            &db,
            ali.id,
            &ali.name,
            date,
            slot(Prayer::Subh, ViolationType::Absent),
        )
        .await?;
        assert_eq!(absent.fine, 50);
        assert_eq!(total_fine_of(&db, ali.id).await?, 50);

        let again = record_violation(
            &db,
            ali.id,
            &ali.name,
            date,
            slot(Prayer::Subh, ViolationType::Absent),
        )
        .await;
        assert!(matches!(again, Err(Error::DuplicateViolation { .. })));
        assert_eq!(total_fine_of(&db, ali.id).await?, 50);

        let masbooq = record_violation(
            &db,
            ali.id,
            &ali.name,
            date,
            slot(Prayer::Subh, ViolationType::Masbooq),
        )
        .await?;
        assert_eq!(masbooq.fine, 25);
        assert_eq!(total_fine_of(&db, ali.id).await?, 75);

        delete_violation(&db, absent.id).await?;
        assert_eq!(total_fine_of(&db, ali.id).await?, 25);

        assert_fines_consistent(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_late_to_school_is_stored_with_not_applicable_prayer() -> Result<()> {
        let db = setup_test_db().await?;
        let ali = create_test_student(&db, "Ali", None).await?;

        let late = record_violation(
            &db,
            ali.id,
            &ali.name,
            day(2024, 2, 1),
            slot(Prayer::Isha, ViolationType::LateToSchool),
        )
        .await?;

        assert_eq!(late.prayer, "N/A");
        assert_eq!(late.violation_type, "Late to School");
        assert_eq!(late.fine, 25);
        assert_eq!(late.student_name, "Ali");
        Ok(())
    }

    #[tokio::test]
    async fn test_one_late_to_school_per_day() -> Result<()> {
        let db = setup_test_db().await?;
        let ali = create_test_student(&db, "Ali", None).await?;

        record_violation(
            &db,
            ali.id,
            &ali.name,
            day(2024, 2, 1),
            ViolationSlot::late_to_school(),
        )
        .await?;
        let second = record_violation(
            &db,
            ali.id,
            &ali.name,
            day(2024, 2, 1),
            ViolationSlot::late_to_school(),
        )
        .await;
        assert!(matches!(second, Err(Error::DuplicateViolation { .. })));

        // A different day is a different key
        record_violation(
            &db,
            ali.id,
            &ali.name,
            day(2024, 2, 2),
            ViolationSlot::late_to_school(),
        )
        .await?;
        assert_eq!(total_fine_of(&db, ali.id).await?, 50);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_key_for_different_students_is_allowed() -> Result<()> {
        let db = setup_test_db().await?;
        let ali = create_test_student(&db, "Ali", None).await?;
        let bilal = create_test_student(&db, "Bilal", None).await?;
        let s = slot(Prayer::Asar, ViolationType::NoCap);

        record_violation(&db, ali.id, &ali.name, day(2024, 3, 3), s).await?;
        record_violation(&db, bilal.id, &bilal.name, day(2024, 3, 3), s).await?;

        assert_eq!(total_fine_of(&db, ali.id).await?, 25);
        assert_eq!(total_fine_of(&db, bilal.id).await?, 25);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_for_missing_student() -> Result<()> {
        let db = setup_test_db().await?;

        let result = record_violation(
            &db,
            404,
            "Ghost",
            day(2024, 1, 1),
            ViolationSlot::late_to_school(),
        )
        .await;
        assert!(matches!(result, Err(Error::StudentNotFound { id: 404 })));
        assert!(get_all_violations(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicate_without_precheck() -> Result<()> {
        let db = setup_test_db().await?;
        let ali = create_test_student(&db, "Ali", None).await?;
        let s = slot(Prayer::Luhar, ViolationType::Absent);

        insert_violation(&db, ali.id, &ali.name, day(2024, 4, 4), s).await?;
        let raced = insert_violation(&db, ali.id, &ali.name, day(2024, 4, 4), s).await;

        assert!(matches!(raced, Err(Error::DuplicateViolation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_then_record_again() -> Result<()> {
        let db = setup_test_db().await?;
        let ali = create_test_student(&db, "Ali", None).await?;
        let s = slot(Prayer::Magrib, ViolationType::Absent);
        let date = day(2024, 5, 5);

        let first = record_violation(&db, ali.id, &ali.name, date, s).await?;
        let deleted = delete_violation(&db, first.id).await?;
        assert_eq!(deleted, first);
        assert_eq!(total_fine_of(&db, ali.id).await?, 0);

        let second = record_violation(&db, ali.id, &ali.name, date, s).await?;
        assert_ne!(second.id, first.id);
        assert_eq!(total_fine_of(&db, ali.id).await?, 50);
        assert_fines_consistent(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_violation() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_violation(&db, 31).await;
        assert!(matches!(result, Err(Error::ViolationNotFound { id: 31 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_reports_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_student(&db, "A", None).await?;
        let b = create_test_student(&db, "B", None).await?;
        let date = day(2024, 2, 1);

        record_violation(&db, b.id, &b.name, date, ViolationSlot::late_to_school()).await?;
        let b_before = total_fine_of(&db, b.id).await?;

        let outcome =
            record_violations_batch(&db, &[a.id, b.id], date, ViolationSlot::late_to_school())
                .await;

        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(outcome.duplicates, vec![b.id]);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.total_fine(), 25);
        assert_eq!(outcome.summary(), "Fine added for 1 student (1 skipped)");

        assert_eq!(total_fine_of(&db, a.id).await?, 25);
        assert_eq!(total_fine_of(&db, b.id).await?, b_before);
        assert_fines_consistent(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_sees_its_own_earlier_inserts() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_student(&db, "A", None).await?;
        let s = slot(Prayer::Subh, ViolationType::Masbooq);

        let outcome = record_violations_batch(&db, &[a.id, a.id], day(2024, 6, 1), s).await;

        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(outcome.duplicates.len(), 1);
        assert_eq!(total_fine_of(&db, a.id).await?, 25);
        Ok(())
    }

    #[tokio::test]
    async fn test_batch_continues_past_failures() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_student(&db, "A", None).await?;
        let b = create_test_student(&db, "B", None).await?;
        let s = slot(Prayer::Isha, ViolationType::Absent);

        let outcome = record_violations_batch(&db, &[a.id, 999, b.id], day(2024, 6, 2), s).await;

        assert_eq!(outcome.succeeded(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, 999);
        assert_eq!(outcome.summary(), "Fine added for 2 students; 1 failed");
        Ok(())
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated_and_tallied() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_student(&db, "A", None).await?;
        let b = create_test_student(&db, "B", None).await?;
        let s = slot(Prayer::Subh, ViolationType::Masbooq);
        db.execute_unprepared("DROP TABLE violations").await?;

        let single = record_violation(&db, a.id, &a.name, day(2024, 6, 3), s).await;
        assert!(matches!(single, Err(Error::Database(_))));

        let outcome = record_violations_batch(&db, &[a.id, b.id], day(2024, 6, 3), s).await;
        assert_eq!(outcome.succeeded(), 0);
        assert!(outcome.duplicates.is_empty());
        let failed: Vec<i64> = outcome.failures.iter().map(|(id, _)| *id).collect();
        assert_eq!(failed, vec![a.id, b.id]);
        assert!(outcome.failures[0].1.starts_with("Database error"));
        assert_eq!(outcome.summary(), "No fines added; 2 failed");

        assert_eq!(total_fine_of(&db, a.id).await?, 0);
        assert_eq!(total_fine_of(&db, b.id).await?, 0);
        Ok(())
    }

    #[test]
    fn test_batch_summary_all_duplicates() {
        let outcome = BatchOutcome {
            duplicates: vec![1, 2, 3],
            ..Default::default()
        };
        assert_eq!(outcome.summary(), "All 3 entries were duplicates");
        assert_eq!(BatchOutcome::default().summary(), "No students selected");
    }

    #[tokio::test]
    async fn test_clear_student_violations() -> Result<()> {
        let db = setup_test_db().await?;
        let ali = create_test_student(&db, "Ali", None).await?;
        let bilal = create_test_student(&db, "Bilal", None).await?;
        let date = day(2024, 7, 1);

        record_violation(&db, ali.id, &ali.name, date, slot(Prayer::Subh, ViolationType::Absent))
            .await?;
        record_violation(&db, ali.id, &ali.name, date, ViolationSlot::late_to_school()).await?;
        record_violation(
            &db,
            bilal.id,
            &bilal.name,
            date,
            ViolationSlot::late_to_school(),
        )
        .await?;

        let removed = clear_student_violations(&db, ali.id).await?;
        assert_eq!(removed, 2);
        assert_eq!(total_fine_of(&db, ali.id).await?, 0);
        assert!(get_violations_for_student(&db, ali.id).await?.is_empty());
        assert_eq!(total_fine_of(&db, bilal.id).await?, 25);
        assert_fines_consistent(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_missing_student() -> Result<()> {
        let db = setup_test_db().await?;
        let result = clear_student_violations(&db, 12).await;
        assert!(matches!(result, Err(Error::StudentNotFound { id: 12 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_all_violations() -> Result<()> {
        let db = setup_test_db().await?;
        let ali = create_test_student(&db, "Ali", None).await?;
        let bilal = create_test_student(&db, "Bilal", None).await?;
        let zaid = create_test_student(&db, "Zaid", None).await?;
        let date = day(2024, 8, 1);

        record_violation(&db, ali.id, &ali.name, date, slot(Prayer::Asar, ViolationType::Absent))
            .await?;
        record_violation(
            &db,
            bilal.id,
            &bilal.name,
            date,
            ViolationSlot::late_to_school(),
        )
        .await?;

        let summary = clear_all_violations(&db).await?;
        assert_eq!(summary.violations_removed, 2);
        assert_eq!(summary.students_reset, 3);

        assert!(get_all_violations(&db).await?.is_empty());
        for id in [ali.id, bilal.id, zaid.id] {
            assert_eq!(total_fine_of(&db, id).await?, 0);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_reconcile_repairs_drift() -> Result<()> {
        let db = setup_test_db().await?;
        let ali = create_test_student(&db, "Ali", None).await?;
        let bilal = create_test_student(&db, "Bilal", None).await?;
        record_violation(
            &db,
            ali.id,
            &ali.name,
            day(2024, 9, 1),
            slot(Prayer::Subh, ViolationType::Absent),
        )
        .await?;

        assert!(reconcile_total_fines(&db).await?.is_empty());

        // Corrupt both totals behind the ledger's back
        adjust_total_fine(&db, ali.id, 10).await?;
        adjust_total_fine(&db, bilal.id, 25).await?;

        let corrections = reconcile_total_fines(&db).await?;
        assert_eq!(
            corrections,
            vec![
                FineCorrection {
                    student_id: ali.id,
                    student_name: "Ali".to_string(),
                    recorded_total: 60,
                    ledger_total: 50,
                },
                FineCorrection {
                    student_id: bilal.id,
                    student_name: "Bilal".to_string(),
                    recorded_total: 25,
                    ledger_total: 0,
                },
            ]
        );

        assert_eq!(get_student_by_id(&db, ali.id).await?.unwrap().total_fine, 50);
        assert_fines_consistent(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_student_history_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let ali = create_test_student(&db, "Ali", None).await?;

        let first = record_violation(
            &db,
            ali.id,
            &ali.name,
            day(2024, 1, 1),
            ViolationSlot::late_to_school(),
        )
        .await?;
        let second = record_violation(
            &db,
            ali.id,
            &ali.name,
            day(2024, 1, 2),
            ViolationSlot::late_to_school(),
        )
        .await?;

        let history = get_violations_for_student(&db, ali.id).await?;
        assert_eq!(history, vec![second, first]);
        Ok(())
    }
}
