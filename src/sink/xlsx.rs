//! XLSX sink backed by rust_xlsxwriter.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use super::SheetSink;
use crate::error::{Error, Result};
use crate::model::{Cell, CellStyle, CellValue, MAX_SHEET_NAME_LEN};

/// Writes sheets into an XLSX workbook.
pub struct XlsxSink {
    workbook: Workbook,
    sheets: usize,
}

impl XlsxSink {
    /// Create an empty XLSX workbook.
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            sheets: 0,
        }
    }

    /// Serialize the workbook into memory.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>> {
        Ok(self.workbook.save_to_buffer()?)
    }

    fn worksheet(&mut self, index: usize) -> Result<&mut Worksheet> {
        if index >= self.sheets {
            return Err(Error::Sink(format!("sheet index {} out of range", index)));
        }
        Ok(self.workbook.worksheet_from_index(index)?)
    }
}

impl Default for XlsxSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for XlsxSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxSink").field("sheets", &self.sheets).finish()
    }
}

/// Translate a cell style into an XLSX format.
fn xlsx_format(style: &CellStyle) -> Format {
    let mut format = Format::new()
        .set_font_name(style.font_name.as_str())
        .set_font_size(style.font_size)
        .set_align(FormatAlign::Top)
        .set_align(FormatAlign::Left);
    if style.bold {
        format = format.set_bold();
    }
    if let Some(rgb) = style.color {
        format = format.set_font_color(Color::RGB(rgb));
    }
    if style.wrap {
        format = format.set_text_wrap();
    }
    if let Some(num_format) = &style.number_format {
        format = format.set_num_format(num_format.as_str());
    }
    format
}

impl SheetSink for XlsxSink {
    fn create_sheet(&mut self, name: &str) -> Result<usize> {
        let name: String = name.chars().take(MAX_SHEET_NAME_LEN).collect();
        let mut worksheet = Worksheet::new();
        worksheet.set_name(&name)?;
        self.workbook.push_worksheet(worksheet);
        self.sheets += 1;
        Ok(self.sheets - 1)
    }

    fn set_column_width(&mut self, sheet: usize, col: u16, width: f64) -> Result<()> {
        let worksheet = self.worksheet(sheet)?;
        worksheet.set_column_width(col.saturating_sub(1), width)?;
        Ok(())
    }

    fn write_cell(&mut self, sheet: usize, row: u32, col: u16, cell: &Cell) -> Result<()> {
        let format = xlsx_format(&cell.style);
        let (row, col) = (row.saturating_sub(1), col.saturating_sub(1));
        let worksheet = self.worksheet(sheet)?;
        match &cell.value {
            CellValue::Text(text) => worksheet.write_string_with_format(row, col, text, &format)?,
            CellValue::Number(n) => worksheet.write_number_with_format(row, col, *n, &format)?,
            CellValue::Formula(formula) => {
                worksheet.write_formula_with_format(row, col, formula.as_str(), &format)?
            }
        };
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        if self.sheets == 0 {
            return Err(Error::Sink("workbook has no sheets".to_string()));
        }
        self.workbook.save(path)?;
        log::info!("Saved {} sheets to {}", self.sheets, path.display());
        Ok(())
    }
}
