//! Class business logic - create, rename and delete classes.
//!
//! Deleting a class removes every student in it together with their violations in
//! one database transaction, so no student or violation is orphaned.

use crate::{
    entities::{Class, Student, Violation, class, student, violation},
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument};

/// What a class deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDeletion {
    /// Students removed with the class
    pub students_removed: u64,
    /// Violations removed with those students
    pub violations_removed: u64,
}

/// Retrieves all classes ordered alphabetically by name.
pub async fn get_all_classes(db: &DatabaseConnection) -> Result<Vec<class::Model>> {
    Class::find()
        .order_by_asc(class::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a class by its unique ID.
pub async fn get_class_by_id(
    db: &DatabaseConnection,
    class_id: i64,
) -> Result<Option<class::Model>> {
    Class::find_by_id(class_id).one(db).await.map_err(Into::into)
}

/// Finds a class by name; surrounding whitespace is ignored.
pub async fn get_class_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<class::Model>> {
    Class::find()
        .filter(class::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All classes with the number of students in each, ordered by class name.
pub async fn get_classes_with_counts(
    db: &DatabaseConnection,
) -> Result<Vec<(class::Model, usize)>> {
    let classes = get_all_classes(db).await?;
    let class_ids: Vec<Option<i64>> = Student::find()
        .select_only()
        .column(student::Column::ClassId)
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for class_id in class_ids.into_iter().flatten() {
        *counts.entry(class_id).or_default() += 1;
    }

    Ok(classes
        .into_iter()
        .map(|c| {
            let count = counts.get(&c.id).copied().unwrap_or(0);
            (c, count)
        })
        .collect())
}

fn validate_class_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Class name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn name_taken(name: &str) -> Error {
    Error::validation(format!("Class '{name}' already exists"))
}

/// Maps a rejection by the unique index on `classes.name` to the validation error the
/// pre-check would have given.
fn map_name_conflict(err: DbErr, name: &str) -> Error {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        name_taken(name)
    } else {
        err.into()
    }
}

async fn insert_class<C>(db: &C, name: String) -> Result<class::Model>
where
    C: ConnectionTrait,
{
    let class = class::ActiveModel {
        name: Set(name.clone()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    class
        .insert(db)
        .await
        .map_err(|err| map_name_conflict(err, &name))
}

/// Creates a class with a trimmed, unique name.
///
/// # Errors
/// Returns a validation error for an empty name or a name already in use.
#[instrument(skip(db))]
pub async fn create_class(db: &DatabaseConnection, name: &str) -> Result<class::Model> {
    let name = validate_class_name(name)?;

    if get_class_by_name(db, &name).await?.is_some() {
        return Err(name_taken(&name));
    }

    let created = insert_class(db, name).await?;
    info!(class_id = created.id, "Created class '{}'", created.name);
    Ok(created)
}

/// Renames a class and refreshes the class name snapshot of its students.
///
/// # Errors
/// Returns a validation error for an empty name or a name used by another class,
/// and `ClassNotFound` when the class does not exist.
#[instrument(skip(db))]
pub async fn rename_class(
    db: &DatabaseConnection,
    class_id: i64,
    name: &str,
) -> Result<class::Model> {
    let name = validate_class_name(name)?;

    let taken = get_class_by_name(db, &name)
        .await?
        .is_some_and(|existing| existing.id != class_id);
    if taken {
        return Err(name_taken(&name));
    }

    let txn = db.begin().await?;

    let class = Class::find_by_id(class_id)
        .one(&txn)
        .await?
        .ok_or(Error::ClassNotFound { id: class_id })?;

    let mut active: class::ActiveModel = class.into();
    active.name = Set(name.clone());
    let updated = active
        .update(&txn)
        .await
        .map_err(|err| map_name_conflict(err, &name))?;

    Student::update_many()
        .col_expr(student::Column::ClassName, Expr::value(name))
        .filter(student::Column::ClassId.eq(class_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a class, its students and all of their violations as one atomic unit.
///
/// # Errors
/// Returns `ClassNotFound` when the class does not exist.
#[instrument(skip(db))]
pub async fn delete_class(db: &DatabaseConnection, class_id: i64) -> Result<ClassDeletion> {
    let txn = db.begin().await?;

    Class::find_by_id(class_id)
        .one(&txn)
        .await?
        .ok_or(Error::ClassNotFound { id: class_id })?;

    let student_ids: Vec<i64> = Student::find()
        .select_only()
        .column(student::Column::Id)
        .filter(student::Column::ClassId.eq(class_id))
        .into_tuple()
        .all(&txn)
        .await?;

    let violations_removed = Violation::delete_many()
        .filter(violation::Column::StudentId.is_in(student_ids))
        .exec(&txn)
        .await?
        .rows_affected;

    let students_removed = Student::delete_many()
        .filter(student::Column::ClassId.eq(class_id))
        .exec(&txn)
        .await?
        .rows_affected;

    Class::delete_by_id(class_id).exec(&txn).await?;

    txn.commit().await?;

    info!(
        class_id,
        students_removed, violations_removed, "Deleted class with its roster"
    );
    Ok(ClassDeletion {
        students_removed,
        violations_removed,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::fines::{Prayer, ViolationSlot, ViolationType};
    use crate::core::{student, violation as accounting};
    use crate::test_utils::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_create_class_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_class(&db, "   ").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicate_name_without_precheck() -> Result<()> {
        let db = setup_test_db().await?;
        create_class(&db, "Grade 7").await?;

        let result = insert_class(&db, "Grade 7".to_string()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(get_all_classes(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_class_trims_name() -> Result<()> {
        let db = setup_test_db().await?;

        let class = create_class(&db, "  Grade 7  ").await?;
        assert_eq!(class.name, "Grade 7");

        let found = get_class_by_name(&db, "Grade 7").await?;
        assert_eq!(found, Some(class));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_class_rejects_duplicate_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_class(&db, "Grade 7").await?;

        let result = create_class(&db, " Grade 7 ").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(get_all_classes(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_classes_sorted_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_class(&db, "Grade 9").await?;
        create_class(&db, "Grade 7").await?;
        create_class(&db, "Grade 8").await?;

        let names: Vec<String> = get_all_classes(&db)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Grade 7", "Grade 8", "Grade 9"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_class_updates_student_snapshots() -> Result<()> {
        let db = setup_test_db().await?;
        let class = create_test_class(&db, "Grade 7").await?;
        let ali = create_test_student(&db, "Ali", Some(&class)).await?;
        let other_class = create_test_class(&db, "Grade 8").await?;
        let bilal = create_test_student(&db, "Bilal", Some(&other_class)).await?;

        let renamed = rename_class(&db, class.id, "Grade 7A").await?;
        assert_eq!(renamed.name, "Grade 7A");

        let ali = student::get_student_by_id(&db, ali.id).await?.unwrap();
        assert_eq!(ali.class_name, "Grade 7A");
        let bilal = student::get_student_by_id(&db, bilal.id).await?.unwrap();
        assert_eq!(bilal.class_name, "Grade 8");
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_class_to_own_name_is_allowed() -> Result<()> {
        let db = setup_test_db().await?;
        let class = create_test_class(&db, "Grade 7").await?;

        let renamed = rename_class(&db, class.id, "Grade 7").await?;
        assert_eq!(renamed.name, "Grade 7");
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_class_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        let class = create_test_class(&db, "Grade 7").await?;
        create_test_class(&db, "Grade 8").await?;

        let result = rename_class(&db, class.id, "Grade 8").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_missing_class() -> Result<()> {
        let db = setup_test_db().await?;
        let result = rename_class(&db, 42, "Grade 7").await;
        assert!(matches!(result, Err(Error::ClassNotFound { id: 42 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_class_cascades() -> Result<()> {
        let db = setup_test_db().await?;
        let class = create_test_class(&db, "Grade 7").await?;
        let ali = create_test_student(&db, "Ali", Some(&class)).await?;
        let bilal = create_test_student(&db, "Bilal", Some(&class)).await?;
        let other_class = create_test_class(&db, "Grade 8").await?;
        let zaid = create_test_student(&db, "Zaid", Some(&other_class)).await?;

        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let slot = ViolationSlot::new(Prayer::Subh, ViolationType::Absent)?;
        accounting::record_violation(&db, ali.id, &ali.name, date, slot).await?;
        accounting::record_violation(&db, bilal.id, &bilal.name, date, slot).await?;
        accounting::record_violation(&db, zaid.id, &zaid.name, date, slot).await?;

        let deletion = delete_class(&db, class.id).await?;
        assert_eq!(deletion.students_removed, 2);
        assert_eq!(deletion.violations_removed, 2);

        assert!(get_class_by_id(&db, class.id).await?.is_none());
        assert!(student::get_student_by_id(&db, ali.id).await?.is_none());
        assert!(
            accounting::get_violations_for_student(&db, ali.id)
                .await?
                .is_empty()
        );

        // Other classes are untouched
        assert_eq!(
            accounting::get_violations_for_student(&db, zaid.id)
                .await?
                .len(),
            1
        );
        assert_fines_consistent(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_class() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_class(&db, 7).await;
        assert!(matches!(result, Err(Error::ClassNotFound { id: 7 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_classes_with_counts() -> Result<()> {
        let db = setup_test_db().await?;
        let grade7 = create_test_class(&db, "Grade 7").await?;
        create_test_class(&db, "Grade 8").await?;
        create_test_student(&db, "Ali", Some(&grade7)).await?;
        create_test_student(&db, "Bilal", Some(&grade7)).await?;
        create_test_student(&db, "Unassigned", None).await?;

        let counts: Vec<(String, usize)> = get_classes_with_counts(&db)
            .await?
            .into_iter()
            .map(|(c, n)| (c.name, n))
            .collect();
        assert_eq!(
            counts,
            [("Grade 7".to_string(), 2), ("Grade 8".to_string(), 0)]
        );
        Ok(())
    }
}
