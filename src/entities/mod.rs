//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod class;
pub mod student;
pub mod violation;

// Re-export specific types to avoid conflicts
pub use class::{Column as ClassColumn, Entity as Class, Model as ClassModel};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
pub use violation::{Column as ViolationColumn, Entity as Violation, Model as ViolationModel};
