//! Student entity - A person fines are recorded against.
//!
//! `total_fine` is a maintained projection of the student's violation ledger: it must
//! equal the sum of `fine` over the student's violations after every completed write.
//! `class_name` is a snapshot of the owning class's name taken when the student was
//! added (and refreshed when the class is renamed).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student's name, never empty
    pub name: String,
    /// Hostel room, if one was given
    pub room: Option<String>,
    /// Owning class, None while unassigned
    pub class_id: Option<i64>,
    /// Denormalized class name, empty while unassigned
    pub class_name: String,
    /// Running sum of the fines of this student's violations
    pub total_fine: i64,
    /// When the student was added
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each student optionally belongs to one class
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id"
    )]
    Class,
    /// One student has many violations
    #[sea_orm(has_many = "super::violation::Entity")]
    Violations,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::violation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Violations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
