//! Helpers shared by the command modules: argument resolution and reply formatting.

use crate::{
    core::{class, student},
    entities,
    errors::{Error, Result},
};
use chrono::{Local, NaiveDate};
use sea_orm::DatabaseConnection;
use std::fmt::Write;

/// Discord embed descriptions are capped at 4096 characters; stay well below.
const MAX_LISTING_CHARS: usize = 3800;

/// Today's date in the bot's local time zone.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses an optional `YYYY-MM-DD` argument, defaulting to today.
pub fn parse_date(input: Option<&str>) -> Result<NaiveDate> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(today()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| Error::validation(format!("Invalid date '{s}'; use YYYY-MM-DD"))),
    }
}

/// Resolves a student argument: an autocomplete value (the student ID) or an exact name.
pub async fn resolve_student(
    db: &DatabaseConnection,
    input: &str,
) -> Result<entities::student::Model> {
    let input = input.trim();
    if let Ok(id) = input.parse::<i64>() {
        if let Some(found) = student::get_student_by_id(db, id).await? {
            return Ok(found);
        }
    }

    let mut matches = student::find_students_by_name(db, input).await?;
    match matches.len() {
        0 => Err(Error::validation(format!("Student '{input}' not found"))),
        1 => Ok(matches.remove(0)),
        n => Err(Error::validation(format!(
            "{n} students are named '{input}'; pick one from the suggestions"
        ))),
    }
}

/// Resolves every given student argument, in order, before anything is written.
pub async fn resolve_students<I>(
    db: &DatabaseConnection,
    inputs: I,
) -> Result<Vec<entities::student::Model>>
where
    I: IntoIterator<Item = String>,
{
    let mut students = Vec::new();
    for input in inputs {
        students.push(resolve_student(db, &input).await?);
    }
    Ok(students)
}

/// Resolves a class argument by exact (trimmed) name.
pub async fn resolve_class(
    db: &DatabaseConnection,
    input: &str,
) -> Result<entities::class::Model> {
    class::get_class_by_name(db, input)
        .await?
        .ok_or_else(|| Error::validation(format!("Class '{}' not found", input.trim())))
}

/// Joins lines for an embed, cutting off with a count of what was left out.
#[must_use]
pub fn bounded_listing(lines: &[String]) -> String {
    let mut out = String::new();
    for (shown, line) in lines.iter().enumerate() {
        if out.len() + line.len() + 1 > MAX_LISTING_CHARS {
            let _ = write!(out, "…and {} more", lines.len() - shown);
            break;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// `"-"` for a missing or blank value.
#[must_use]
pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}
