//! Roster import - turns an uploaded CSV file into students of one class.
//!
//! Columns are found by header name, ignoring case: `Name` is required, `Room` is
//! optional. Rows without a name are dropped. All students of a file are added in one
//! batch, so a rejected file adds nobody.

use crate::{
    core::student::{NewStudent, create_students_batch},
    entities::{class, student},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use tracing::{info, instrument};

const NAME_COLUMN: &str = "name";
const ROOM_COLUMN: &str = "room";

fn import_error(message: impl Into<String>) -> Error {
    Error::Import {
        message: message.into(),
    }
}

/// Parses a roster CSV into students to add.
///
/// # Errors
/// - `Import` with "No data found in file" when the file has no data rows
/// - `Import` asking for a `Name` column when no row carries a name
/// - `Import` when the CSV itself is malformed
pub fn parse_roster_csv(bytes: &[u8]) -> Result<Vec<NewStudent>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: HashMap<String, usize> = reader
        .headers()
        .map_err(|e| import_error(format!("Error reading file: {e}")))?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim_start_matches('\u{feff}').to_lowercase(), i))
        .collect();
    let name_col = columns.get(NAME_COLUMN).copied();
    let room_col = columns.get(ROOM_COLUMN).copied();

    let mut rows = 0_usize;
    let mut students = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| import_error(format!("Error reading file: {e}")))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows += 1;

        let name = name_col.and_then(|i| record.get(i)).unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let room = room_col.and_then(|i| record.get(i)).map(ToString::to_string);
        students.push(NewStudent::new(name, room));
    }

    if rows == 0 {
        return Err(import_error("No data found in file"));
    }
    if students.is_empty() {
        return Err(import_error(
            "No valid student names found. Use \"Name\" column header.",
        ));
    }
    Ok(students)
}

/// Parses a roster CSV and adds every student in it to `class` as one batch.
#[instrument(skip(db, bytes, class), fields(bytes = bytes.len()))]
pub async fn import_students(
    db: &DatabaseConnection,
    bytes: &[u8],
    class: Option<&class::Model>,
) -> Result<Vec<student::Model>> {
    let students = parse_roster_csv(bytes)?;
    let created = create_students_batch(db, students, class).await?;
    info!("{} students imported", created.len());
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::core::student::get_students_in_class;
    use crate::test_utils::*;

    fn message(err: Error) -> String {
        match err {
            Error::Import { message } => message,
            other => panic!("expected an import error, got {other:?}"),
        }
    }

    #[test]
    fn test_headers_ignore_case() {
        let csv = "NAME,ROOM\nAli,12\n  Bilal  ,\n";
        let students = parse_roster_csv(csv.as_bytes()).unwrap();

        assert_eq!(
            students,
            vec![
                NewStudent::new("Ali", Some("12".to_string())),
                NewStudent::new("Bilal", Some(String::new())),
            ]
        );
    }

    #[test]
    fn test_rows_without_name_are_dropped() {
        let csv = "Room,Name\n4,Ali\n5,\n6,Zaid\n";
        let names: Vec<String> = parse_roster_csv(csv.as_bytes())
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Ali", "Zaid"]);
    }

    #[test]
    fn test_room_column_is_optional() {
        let students = parse_roster_csv(b"name\nAli\n").unwrap();
        assert_eq!(students, vec![NewStudent::new("Ali", None)]);
    }

    #[test]
    fn test_empty_file() {
        let err = parse_roster_csv(b"Name,Room\n").unwrap_err();
        assert_eq!(message(err), "No data found in file");

        let err = parse_roster_csv(b"").unwrap_err();
        assert_eq!(message(err), "No data found in file");
    }

    #[test]
    fn test_missing_name_column() {
        let err = parse_roster_csv(b"Student,Room\nAli,1\n").unwrap_err();
        assert_eq!(
            message(err),
            "No valid student names found. Use \"Name\" column header."
        );
    }

    #[tokio::test]
    async fn test_import_into_class() -> Result<()> {
        let db = setup_test_db().await?;
        let class = create_test_class(&db, "Grade 7").await?;

        let created =
            import_students(&db, b"Name,Room\nAli,101\nBilal,\n", Some(&class)).await?;
        assert_eq!(created.len(), 2);

        let members = get_students_in_class(&db, class.id).await?;
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|s| s.class_name == "Grade 7"));
        assert!(members.iter().all(|s| s.total_fine == 0));

        let bilal = members.iter().find(|s| s.name == "Bilal").unwrap();
        assert_eq!(bilal.room, None);
        Ok(())
    }
}
