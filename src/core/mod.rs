//! Core business logic - framework-agnostic operations on classes, students and
//! violations, plus the read-side projections built on top of them.

/// Class creation, renaming and cascading deletion
pub mod class;
/// Report export to PDF
pub mod export;
/// Fine table and violation kinds
pub mod fines;
/// Roster import from CSV
pub mod import;
/// Push-based snapshots of stored records
pub mod live;
/// Dashboard and ranking projections
pub mod report;
/// Student roster management
pub mod student;
/// Violation recording and fine accounting
pub mod violation;
