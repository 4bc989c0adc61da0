//! Row layout: writes a section's lines into a sheet.
//!
//! Plain lines go to column 1, tabular rows spread over columns 1..N. A row
//! whose leading cells mention "kopā" is a total row: it is written in bold
//! and followed by a three-row verification scaffold that the formula stage
//! fills in later.

mod preset;

pub use preset::LayoutPreset;

use crate::model::{CellStyle, CellValue, Line, Sheet};
use crate::normalize::ACCOUNTING_FORMAT;

/// Label of the first scaffold row.
pub const RECALCULATED_LABEL: &str = "Recalculated";

/// Label of the second scaffold row.
pub const DIFFERENCE_LABEL: &str = "Difference";

/// Lowercase marker word of total rows.
pub const TOTAL_MARKER: &str = "kopā";

/// Number of leading cells inspected for the total marker.
pub const TOTAL_SCAN_CELLS: usize = 5;

/// Rows reserved after each total row: Recalculated, Difference, blank.
pub const SCAFFOLD_ROWS: u32 = 3;

/// Fonts, accent colours and number format of the output workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOptions {
    /// Font family of every cell
    pub font_name: String,

    /// Font size in points
    pub font_size: f64,

    /// Accent colour of "Recalculated" labels and SUM formulas
    pub recalculated_color: u32,

    /// Accent colour of "Difference" labels and difference formulas
    pub difference_color: u32,

    /// Display format of numeric and formula cells
    pub number_format: String,
}

impl StyleOptions {
    /// Create style options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font.
    pub fn with_font(mut self, name: impl Into<String>, size: f64) -> Self {
        self.font_name = name.into();
        self.font_size = size;
        self
    }

    /// Set the accent colours (0xRRGGBB).
    pub fn with_accents(mut self, recalculated: u32, difference: u32) -> Self {
        self.recalculated_color = recalculated;
        self.difference_color = difference;
        self
    }

    /// Set the number display format.
    pub fn with_number_format(mut self, format: impl Into<String>) -> Self {
        self.number_format = format.into();
        self
    }

    /// Base cell style.
    pub fn cell(&self, wrap: bool) -> CellStyle {
        CellStyle::new(self.font_name.clone(), self.font_size).wrap(wrap)
    }

    /// Style of "Recalculated" labels and SUM formulas.
    pub fn recalculated(&self, wrap: bool) -> CellStyle {
        self.cell(wrap).bold().color(self.recalculated_color)
    }

    /// Style of "Difference" labels and difference formulas.
    pub fn difference(&self, wrap: bool) -> CellStyle {
        self.cell(wrap).bold().color(self.difference_color)
    }
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            font_name: "Arial Narrow".to_string(),
            font_size: 10.0,
            recalculated_color: 0x0070C0,
            difference_color: 0xFF0000,
            number_format: ACCOUNTING_FORMAT.to_string(),
        }
    }
}

/// What a layout pass produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutSummary {
    /// Total rows detected (one scaffold each)
    pub total_rows: usize,

    /// Next free row after a one-row separator gap
    pub next_row: u32,
}

/// Check whether a tabular row is a total row.
pub fn is_total_row(cells: &[String]) -> bool {
    cells
        .iter()
        .take(TOTAL_SCAN_CELLS)
        .any(|cell| cell.to_lowercase().contains(TOTAL_MARKER))
}

/// Remove control characters spreadsheet XML cannot hold (tab, LF and CR stay).
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|&c| !matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}'))
        .collect()
}

/// Writes lines into a sheet following a preset.
#[derive(Debug)]
pub struct RowLayout<'a> {
    preset: &'a LayoutPreset,
    style: &'a StyleOptions,
}

impl<'a> RowLayout<'a> {
    /// Create a layout engine.
    pub fn new(preset: &'a LayoutPreset, style: &'a StyleOptions) -> Self {
        Self { preset, style }
    }

    /// Write `lines` starting at `start_row`.
    pub fn write(&self, sheet: &mut Sheet, lines: &[Line], start_row: u32) -> LayoutSummary {
        for &(col, width) in &self.preset.column_widths {
            sheet.set_column_width(col, width);
        }

        let wrap = self.preset.wrap_text;
        let mut summary = LayoutSummary::default();
        let mut row = start_row;

        for line in lines {
            match line {
                Line::Text(text) => {
                    sheet.set(row, 1, CellValue::Text(clean_text(text)), self.style.cell(wrap));
                    row += 1;
                }
                Line::Row(cells) => {
                    let cells: Vec<String> = cells.iter().map(|c| clean_text(c)).collect();
                    let total = is_total_row(&cells);
                    let style = if total {
                        self.style.cell(wrap).bold()
                    } else {
                        self.style.cell(wrap)
                    };

                    for (col, value) in (1u16..).zip(cells) {
                        sheet.set(row, col, CellValue::Text(value), style.clone());
                    }
                    row += 1;

                    if total {
                        self.insert_scaffold(sheet, row);
                        row += SCAFFOLD_ROWS;
                        summary.total_rows += 1;
                    }
                }
            }
        }

        summary.next_row = row + 1;
        summary
    }

    fn insert_scaffold(&self, sheet: &mut Sheet, row: u32) {
        let wrap = self.preset.wrap_text;
        sheet.insert_rows(row, SCAFFOLD_ROWS);
        sheet.set(
            row,
            1,
            CellValue::Text(RECALCULATED_LABEL.to_string()),
            self.style.recalculated(wrap),
        );
        sheet.set(
            row + 1,
            1,
            CellValue::Text(DIFFERENCE_LABEL.to_string()),
            self.style.difference(wrap),
        );
    }
}

/// Lay out a section's lines with its preset, starting at row 1.
pub fn layout_section(
    sheet: &mut Sheet,
    lines: &[Line],
    preset: &LayoutPreset,
    style: &StyleOptions,
) -> LayoutSummary {
    RowLayout::new(preset, style).write(sheet, lines, 1)
}
