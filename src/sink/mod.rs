//! Spreadsheet output.
//!
//! The pipeline builds an in-memory [`Workbook`] and hands it to a
//! [`SheetSink`] once every stage is done. Sinks receive 1-based coordinates
//! and translate them to whatever their backend uses.

mod xlsx;

pub use xlsx::XlsxSink;

use crate::error::Result;
use crate::model::{Cell, Workbook};
use std::path::Path;

/// A destination for finished sheets.
pub trait SheetSink {
    /// Create a sheet and return its index. Names longer than 31 characters are truncated.
    fn create_sheet(&mut self, name: &str) -> Result<usize>;

    /// Set a column width in character units.
    fn set_column_width(&mut self, sheet: usize, col: u16, width: f64) -> Result<()>;

    /// Write one styled cell.
    fn write_cell(&mut self, sheet: usize, row: u32, col: u16, cell: &Cell) -> Result<()>;

    /// Persist everything written so far.
    fn save(&mut self, path: &Path) -> Result<()>;
}

/// Copy every sheet of `workbook` into `sink`, in order.
pub fn flush<S: SheetSink + ?Sized>(workbook: &Workbook, sink: &mut S) -> Result<()> {
    for sheet in workbook.sheets() {
        let index = sink.create_sheet(sheet.name())?;
        for (col, width) in sheet.column_widths() {
            sink.set_column_width(index, col, width)?;
        }
        for ((row, col), cell) in sheet.cells() {
            sink.write_cell(index, row, col, cell)?;
        }
        log::debug!("Flushed sheet {} ({} cells)", sheet.name(), sheet.cell_count());
    }
    Ok(())
}
