//! Report export - tabular fine reports rendered to PDF.
//!
//! Reports are first built as a [`ReportDocument`] (plain strings, easy to test) and then
//! laid out on A4 pages with the built-in Helvetica fonts.

use crate::{
    core::report::fine_ranking,
    entities::{student, violation},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const ROW_HEIGHT: f32 = 6.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 9.0;
const TOTAL_SIZE: f32 = 12.0;

/// One table column with its width in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportColumn {
    /// Header text
    pub header: &'static str,
    /// Column width in millimetres
    pub width: f32,
}

const fn column(header: &'static str, width: f32) -> ReportColumn {
    ReportColumn { header, width }
}

const STUDENT_COLUMNS: [ReportColumn; 5] = [
    column("#", 10.0),
    column("Date", 35.0),
    column("Prayer", 35.0),
    column("Violation", 50.0),
    column("Fine", 25.0),
];

const ROSTER_COLUMNS: [ReportColumn; 5] = [
    column("#", 10.0),
    column("Name", 65.0),
    column("Room", 25.0),
    column("Class", 45.0),
    column("Total Fine", 30.0),
];

/// A titled table with a totals line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    /// Heading on the first page
    pub title: String,
    /// Lines printed under the title
    pub subtitle: Vec<String>,
    /// Table columns
    pub columns: Vec<ReportColumn>,
    /// Table body, one cell per column
    pub rows: Vec<Vec<String>>,
    /// Closing line under the table
    pub total: String,
    /// Suggested file name for the rendered document
    pub file_name: String,
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Lowercased file-name stem: letters of any script are kept, each run of spaces or
/// ASCII punctuation becomes one `-`. `None` when nothing usable is left.
fn file_stem(name: &str) -> Option<String> {
    let mut stem = String::new();
    for c in name.chars() {
        if c.is_alphanumeric() || !(c.is_ascii() || c.is_whitespace() || c.is_control()) {
            stem.extend(c.to_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem = stem.trim_end_matches('-');
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Violation report for one student, entries in the order given.
#[must_use]
pub fn student_report(
    student: &student::Model,
    violations: &[violation::Model],
    generated: NaiveDate,
) -> ReportDocument {
    let rows = violations
        .iter()
        .enumerate()
        .map(|(i, v)| {
            vec![
                (i + 1).to_string(),
                v.date.to_string(),
                v.prayer.clone(),
                v.violation_type.clone(),
                v.fine.to_string(),
            ]
        })
        .collect();

    ReportDocument {
        title: format!("Violation Report - {}", student.name),
        subtitle: vec![
            format!(
                "Room: {}  |  Class: {}",
                or_dash(student.room.as_deref().unwrap_or_default()),
                or_dash(&student.class_name)
            ),
            format!("Generated: {generated}"),
        ],
        columns: STUDENT_COLUMNS.to_vec(),
        rows,
        total: format!("Total Fine: {}", student.total_fine),
        file_name: format!(
            "{}-violations.pdf",
            file_stem(&student.name).unwrap_or_else(|| "student".to_string())
        ),
    }
}

/// Roster-wide report of every student with an outstanding fine, largest first.
///
/// The total line sums over all students, fined or not.
#[must_use]
pub fn roster_report(
    app_title: &str,
    students: &[student::Model],
    generated: NaiveDate,
) -> ReportDocument {
    let rows = fine_ranking(students)
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            vec![
                (i + 1).to_string(),
                s.name,
                or_dash(s.room.as_deref().unwrap_or_default()),
                or_dash(&s.class_name),
                s.total_fine.to_string(),
            ]
        })
        .collect();
    let total: i64 = students.iter().map(|s| s.total_fine).sum();

    ReportDocument {
        title: format!("{app_title} - All Student Fines"),
        subtitle: vec![format!("Generated: {generated}")],
        columns: ROSTER_COLUMNS.to_vec(),
        rows,
        total: format!("Total Fines: {total}"),
        file_name: file_stem(app_title)
            .map_or_else(|| "fines.pdf".to_string(), |stem| format!("{stem}-fines.pdf")),
    }
}

/// Writes table rows top-down, starting new pages as the current one fills.
struct PageWriter<'a> {
    doc: &'a printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageWriter<'_> {
    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        self.ensure_room(ROW_HEIGHT);
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= ROW_HEIGHT;
    }

    fn row(&mut self, columns: &[ReportColumn], cells: &[String], font: &IndirectFontRef) {
        self.ensure_room(ROW_HEIGHT);
        let mut x = MARGIN;
        for (col, cell) in columns.iter().zip(cells) {
            self.layer.use_text(cell.as_str(), BODY_SIZE, Mm(x), Mm(self.y), font);
            x += col.width;
        }
        self.y -= ROW_HEIGHT;
    }
}

fn pdf_error(err: &printpdf::Error) -> Error {
    Error::Export {
        message: err.to_string(),
    }
}

/// Lays the document out on A4 pages and returns the PDF bytes.
///
/// # Errors
/// Returns `Export` when the PDF cannot be produced.
pub fn render_pdf(report: &ReportDocument) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        report.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| pdf_error(&e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| pdf_error(&e))?;

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - MARGIN - 6.0,
    };

    writer.line(&report.title, TITLE_SIZE, &bold);
    writer.y -= 2.0;
    for line in &report.subtitle {
        writer.line(line, BODY_SIZE + 1.0, &regular);
    }
    writer.y -= 2.0;

    let headers: Vec<String> = report
        .columns
        .iter()
        .map(|c| c.header.to_string())
        .collect();
    writer.row(&report.columns, &headers, &bold);
    for cells in &report.rows {
        writer.row(&report.columns, cells, &regular);
    }

    writer.y -= ROW_HEIGHT;
    writer.line(&report.total, TOTAL_SIZE, &bold);

    drop(writer);
    doc.save_to_bytes().map_err(|e| pdf_error(&e))
}
