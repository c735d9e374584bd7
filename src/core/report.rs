//! Report generation business logic.
//!
//! Dashboards and rankings are pure projections over student and violation snapshots.
//! Nothing here is stored; callers recompute whenever a snapshot changes. The bot layer
//! formats the structured results.

use crate::{
    core::fines::{PRAYERS, Prayer, ViolationType},
    entities::{Student, Violation, student, violation},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, EntityTrait};
use std::collections::HashMap;

/// Aggregate view of the whole ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    /// Sum of every student's total fine
    pub total_fines: i64,
    /// Violations dated today
    pub today_count: usize,
    /// Violation counts for each of the five prayers, in prayer order
    pub prayer_counts: Vec<(Prayer, usize)>,
    /// Number of Late to School violations
    pub late_count: usize,
    /// Violation counts per type, largest first
    pub type_counts: Vec<(String, usize)>,
    /// Students with the largest non-zero totals, largest first
    pub top_students: Vec<student::Model>,
}

/// Builds a dashboard from snapshots.
///
/// `today` is compared by exact date against each violation's date. Prayer counts skip
/// the `"N/A"` prayer; type counts with equal counts are ordered by type name.
#[must_use]
pub fn summarize(
    students: &[student::Model],
    violations: &[violation::Model],
    today: NaiveDate,
    top_n: usize,
) -> Dashboard {
    let total_fines = students.iter().map(|s| s.total_fine).sum();
    let today_count = violations.iter().filter(|v| v.date == today).count();

    let prayer_counts = PRAYERS
        .into_iter()
        .map(|p| {
            let count = violations
                .iter()
                .filter(|v| v.prayer == p.as_str())
                .count();
            (p, count)
        })
        .collect();

    let late_count = violations
        .iter()
        .filter(|v| v.violation_type == ViolationType::LateToSchool.as_str())
        .count();

    let mut by_type: HashMap<&str, usize> = HashMap::new();
    for v in violations {
        *by_type.entry(v.violation_type.as_str()).or_default() += 1;
    }
    let mut type_counts: Vec<(String, usize)> = by_type
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    type_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let top_students = fine_ranking(students).into_iter().take(top_n).collect();

    Dashboard {
        total_fines,
        today_count,
        prayer_counts,
        late_count,
        type_counts,
        top_students,
    }
}

/// Students with a non-zero total, largest total first, ties by name.
#[must_use]
pub fn fine_ranking(students: &[student::Model]) -> Vec<student::Model> {
    let mut ranked: Vec<student::Model> = students
        .iter()
        .filter(|s| s.total_fine > 0)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| {
        b.total_fine
            .cmp(&a.total_fine)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked
}

/// Case-insensitive substring search over student names. An empty query matches all.
#[must_use]
pub fn search_students<'a>(
    students: &'a [student::Model],
    query: &str,
) -> Vec<&'a student::Model> {
    let needle = query.trim().to_lowercase();
    students
        .iter()
        .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
        .collect()
}

/// Loads current snapshots and summarizes them.
pub async fn load_dashboard(
    db: &DatabaseConnection,
    today: NaiveDate,
    top_n: usize,
) -> Result<Dashboard> {
    let students = Student::find().all(db).await?;
    let violations = Violation::find().all(db).await?;
    Ok(summarize(&students, &violations, today, top_n))
}
