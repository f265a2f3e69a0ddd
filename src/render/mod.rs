//! Plain-text views of the form state

use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::record::Field;
use crate::schema::ValidationErrors;
use crate::store::Submission;

const COLUMN_GAP: &str = "  ";

/// Submissions as an aligned table, oldest first, one column per field.
pub fn render_table(submissions: &[Submission]) -> String {
    let header: Vec<String> = Field::TABLE_ORDER
        .iter()
        .map(|field| field.label().to_string())
        .collect();
    let rows: Vec<Vec<String>> = submissions
        .iter()
        .map(|submission| {
            Field::TABLE_ORDER
                .iter()
                .map(|&field| cell_text(submission.record.value(field)))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.width()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|&width| "-".repeat(width)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

/// One `Label: message` line per failing field.
pub fn render_errors(errors: &ValidationErrors) -> String {
    let mut out = String::new();
    for (field, error) in errors.iter() {
        let _ = writeln!(out, "{}: {}", field.label(), error.message);
    }
    out
}

/// Table cells are single-line; embedded newlines (multi-line addresses) are folded.
fn cell_text(value: Option<String>) -> String {
    value
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        line.push_str(&" ".repeat(width.saturating_sub(cell.width())));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
