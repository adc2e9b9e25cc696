//! Text and JSON rendering of record listings.

use vitals_core::{VITALS_COLUMN_LABELS, VitalRecord};

/// Renders records as a fixed-width table with a labeled header row.
///
/// Each column is as wide as its widest cell or label. Absent values render
/// as empty cells.
pub fn render_table(records: &[VitalRecord]) -> String {
    let rows: Vec<[String; 8]> = records.iter().map(VitalRecord::cells).collect();

    let mut widths = VITALS_COLUMN_LABELS.map(|label| label.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, VITALS_COLUMN_LABELS.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

/// Renders records as a pretty-printed JSON array.
pub fn render_json(records: &[VitalRecord]) -> Result<String, String> {
    serde_json::to_string_pretty(records).map_err(|e| format!("Failed to serialize records: {e}"))
}
