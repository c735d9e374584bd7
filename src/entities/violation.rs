//! Violation entity - One dated infraction recorded against a student.
//!
//! The `fine` is captured from the fine table when the violation is recorded and never
//! changes afterwards. `(student_id, date, prayer, violation_type)` is unique; the
//! database enforces it with `idx_violations_duplicate_key`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Violation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "violations")]
pub struct Model {
    /// Unique identifier for the violation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the student this violation belongs to
    pub student_id: i64,
    /// Snapshot of the student's name at recording time
    pub student_name: String,
    /// Calendar day of the infraction
    pub date: Date,
    /// One of the five prayers, or `"N/A"` for non-prayer violations
    pub prayer: String,
    /// Violation kind: `"Absent"`, `"Masbooq"`, `"No Cap"` or `"Late to School"`
    pub violation_type: String,
    /// Fine charged for this violation
    pub fine: i64,
    /// When the violation was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Violation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each violation belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
