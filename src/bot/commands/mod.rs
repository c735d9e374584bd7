//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Dashboard command
pub mod dashboard;

/// General utility commands
pub mod general;

/// Class and student management commands
pub mod manage;

/// Violation recording commands
pub mod mark;

/// Roster-wide records commands
pub mod records;

/// Per-student commands
pub mod student;

/// Helpers shared by the commands
pub mod utils;

// Export commands
pub use dashboard::*;
pub use general::*;
pub use manage::*;
pub use mark::*;
pub use records::*;
pub use student::*;
