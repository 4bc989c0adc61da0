//! Table flattening into tab-delimited row strings.

use crate::model::{Table, TableRow};

/// End-of-cell marker some readers leave in cell text.
const CELL_END_MARK: &str = "\r\u{7}";

/// Flatten a table into one tab-delimited string per row.
pub fn flatten_table(table: &Table) -> Vec<String> {
    table.rows.iter().map(flatten_row).collect()
}

/// Flatten a single row.
pub fn flatten_row(row: &TableRow) -> String {
    row.cells
        .iter()
        .map(|cell| clean_cell(cell))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Cell text with end-of-cell markers removed and surrounding whitespace trimmed.
pub fn clean_cell(text: &str) -> String {
    text.replace(CELL_END_MARK, "").trim().to_string()
}
