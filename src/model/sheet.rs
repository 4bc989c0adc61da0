//! In-memory workbook: the single owned aggregate the pipeline stages share.
//!
//! Rows and columns are 1-based, as they appear to a spreadsheet user. Sinks
//! convert to their own addressing when the workbook is flushed.

use std::collections::BTreeMap;

/// Maximum sheet name length accepted by spreadsheet applications.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Cell content.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Literal text
    Text(String),
    /// Numeric value
    Number(f64),
    /// Formula, including the leading `=`
    Formula(String),
}

impl CellValue {
    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this is a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Formula text, if this is a formula cell.
    pub fn as_formula(&self) -> Option<&str> {
        match self {
            CellValue::Formula(f) => Some(f),
            _ => None,
        }
    }
}

/// Presentation attributes of a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    /// Font family
    pub font_name: String,
    /// Font size in points
    pub font_size: f64,
    /// Bold font
    pub bold: bool,
    /// Font colour as 0xRRGGBB
    pub color: Option<u32>,
    /// Wrap text within the cell
    pub wrap: bool,
    /// Excel number format code
    pub number_format: Option<String>,
}

impl CellStyle {
    /// Plain style with the given font.
    pub fn new(font_name: impl Into<String>, font_size: f64) -> Self {
        Self {
            font_name: font_name.into(),
            font_size,
            bold: false,
            color: None,
            wrap: false,
            number_format: None,
        }
    }

    /// Set bold and return self.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Set font colour and return self.
    pub fn color(mut self, rgb: u32) -> Self {
        self.color = Some(rgb);
        self
    }

    /// Set wrapping and return self.
    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }
}

/// A written cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Cell content
    pub value: CellValue,
    /// Cell style
    pub style: CellStyle,
}

/// A worksheet.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u16), Cell>,
    column_widths: BTreeMap<u16, f64>,
}

impl Sheet {
    /// Create an empty sheet. The name is truncated to the spreadsheet limit.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.chars().take(MAX_SHEET_NAME_LEN).collect(),
            cells: BTreeMap::new(),
            column_widths: BTreeMap::new(),
        }
    }

    /// Sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write a cell, replacing whatever was there.
    pub fn set(&mut self, row: u32, col: u16, value: CellValue, style: CellStyle) {
        debug_assert!(row >= 1 && col >= 1, "cells are 1-based");
        self.cells.insert((row, col), Cell { value, style });
    }

    /// Get a cell.
    pub fn get(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Text of a cell, if it holds text.
    pub fn text(&self, row: u32, col: u16) -> Option<&str> {
        self.get(row, col).and_then(|c| c.value.as_text())
    }

    /// Last row holding a cell (0 for an empty sheet).
    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|(r, _)| *r).max().unwrap_or(0)
    }

    /// Number of written cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if no cell was written.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u16), &Cell)> {
        self.cells.iter().map(|(k, v)| (*k, v))
    }

    /// Iterate cells mutably in row-major order.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = ((u32, u16), &mut Cell)> {
        self.cells.iter_mut().map(|(k, v)| (*k, v))
    }

    /// Shift every row at or below `at` down by `count`.
    pub fn insert_rows(&mut self, at: u32, count: u32) {
        if count == 0 || self.cells.range((at, 0)..).next().is_none() {
            return;
        }
        let shifted = std::mem::take(&mut self.cells)
            .into_iter()
            .map(|((r, c), cell)| {
                let r = if r >= at { r + count } else { r };
                ((r, c), cell)
            })
            .collect();
        self.cells = shifted;
    }

    /// Shift every column at or right of `at` by `count`.
    ///
    /// Column widths stay attached to their column index.
    pub fn insert_columns(&mut self, at: u16, count: u16) {
        if count == 0 {
            return;
        }
        let shifted = std::mem::take(&mut self.cells)
            .into_iter()
            .map(|((r, c), cell)| {
                let c = if c >= at { c + count } else { c };
                ((r, c), cell)
            })
            .collect();
        self.cells = shifted;
    }

    /// Set a column width in character units.
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// Width of a column, if one was set.
    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    /// All explicit column widths.
    pub fn column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.column_widths.iter().map(|(c, w)| (*c, *w))
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new sheet and return it.
    pub fn add_sheet(&mut self, name: &str) -> &mut Sheet {
        self.sheets.push(Sheet::new(name));
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    /// Sheets in creation order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Mutable sheets in creation order.
    pub fn sheets_mut(&mut self) -> &mut [Sheet] {
        &mut self.sheets
    }

    /// Find a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the workbook has no sheets.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Spreadsheet column letters for a 1-based column index (1 → "A", 27 → "AA").
pub fn column_letter(col: u16) -> String {
    let mut n = u32::from(col);
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
