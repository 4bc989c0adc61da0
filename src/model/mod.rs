//! Data model shared by the conversion pipeline.
//!
//! Three layers: the source elements a reader produces, the sections and
//! lines the classifier produces, and the in-memory workbook the layout,
//! formula and normalization stages operate on.

mod element;
mod section;
mod sheet;

pub use element::{DocumentElement, Paragraph, SourceDocument, Table, TableRow};
pub use section::{ClassifiedDocument, Line, NoteMarker, Section, SectionContent};
pub use sheet::{
    column_letter, Cell, CellStyle, CellValue, Sheet, Workbook, MAX_SHEET_NAME_LEN,
};
