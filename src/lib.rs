//! # atskaite
//!
//! Converts Latvian annual financial reports from Word (DOCX) into Excel
//! workbooks split by report section.
//!
//! The management letter, the primary statements (balance sheet and income
//! statement, cash flow, equity movement) and the notes each land on their own
//! sheet. Total rows get a verification scaffold with reconstructed `SUM`
//! formulas, and numbers printed in the Latvian locale become real numbers.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> atskaite::Result<()> {
//!     let stats = atskaite::convert_file("parskats.docx", "parskats.xlsx")?;
//!     println!("{} formulas written", stats.formulas_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`parser`] reads paragraphs and tables from the DOCX package
//! - [`classify`] merges them in document order and assigns sections
//! - [`layout`] writes each section's lines into a sheet, with total-row scaffolds
//! - [`formula`] infers the summed rows of every total and writes formulas
//! - [`normalize`] turns locale numerals into numbers
//! - [`sink`] writes the finished workbook as XLSX

pub mod classify;
pub mod convert;
pub mod detect;
pub mod error;
pub mod formula;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod sink;

// Re-export commonly used types
pub use classify::{classify_document, Classifier};
pub use convert::{ConversionStats, ConvertOptions, ConvertResult, ReportConverter};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, DocxFormat};
pub use error::{Error, Result};
pub use layout::StyleOptions;
pub use model::{
    ClassifiedDocument, DocumentElement, Line, Paragraph, Section, SourceDocument, Table, TableRow,
    Workbook,
};
pub use parser::{DocxParser, ErrorMode, ParseOptions};

use std::io::Read;
use std::path::Path;

/// Parse a DOCX file into paragraphs and tables.
///
/// # Example
///
/// ```no_run
/// use atskaite::parse_file;
///
/// let doc = parse_file("parskats.docx").unwrap();
/// println!("{} paragraphs", doc.paragraphs.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<SourceDocument> {
    DocxParser::open(path)?.parse()
}

/// Parse a DOCX file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<SourceDocument> {
    DocxParser::open_with_options(path, options)?.parse()
}

/// Parse a DOCX from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<SourceDocument> {
    DocxParser::from_bytes(data)?.parse()
}

/// Parse a DOCX from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<SourceDocument> {
    DocxParser::from_reader(reader)?.parse()
}

/// Parse and classify a DOCX file without building a workbook.
///
/// # Example
///
/// ```no_run
/// use atskaite::{classify_file, Section};
///
/// let doc = classify_file("parskats.docx").unwrap();
/// println!("{} note lines", doc.lines(Section::Notes).len());
/// ```
pub fn classify_file<P: AsRef<Path>>(path: P) -> Result<ClassifiedDocument> {
    Ok(classify_document(parse_file(path)?))
}

/// Convert a DOCX report into an XLSX workbook with default options.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<ConversionStats> {
    convert::convert_file(input, output, ConvertOptions::default())
}

/// Convert a DOCX report into an XLSX workbook with custom options.
pub fn convert_file_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: ConvertOptions,
) -> Result<ConversionStats> {
    convert::convert_file(input, output, options)
}

/// Builder for converting reports.
///
/// # Example
///
/// ```no_run
/// use atskaite::Atskaite;
///
/// let result = Atskaite::new()
///     .with_formulas(false)
///     .with_font("Arial", 11.0)
///     .convert("parskats.docx")?;
/// result.save("parskats.xlsx")?;
/// # Ok::<(), atskaite::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Atskaite {
    options: ConvertOptions,
}

impl Atskaite {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable lenient parsing mode (the default).
    pub fn lenient(mut self) -> Self {
        self.options.parse = self.options.parse.lenient();
        self
    }

    /// Fail on unreadable list numbering instead of dropping the labels.
    pub fn strict(mut self) -> Self {
        self.options.parse = self.options.parse.strict();
        self
    }

    /// Enable or disable list labels.
    pub fn with_numbering(mut self, numbering: bool) -> Self {
        self.options.parse = self.options.parse.with_numbering(numbering);
        self
    }

    /// Enable or disable formula reconstruction.
    pub fn with_formulas(mut self, enabled: bool) -> Self {
        self.options = self.options.with_formulas(enabled);
        self
    }

    /// Enable or disable number normalization.
    pub fn with_number_normalization(mut self, enabled: bool) -> Self {
        self.options = self.options.with_number_normalization(enabled);
        self
    }

    /// Create sheets for empty sections too.
    pub fn with_empty_sections(mut self, include: bool) -> Self {
        self.options = self.options.with_empty_sections(include);
        self
    }

    /// Set the cell font.
    pub fn with_font(mut self, name: impl Into<String>, size: f64) -> Self {
        self.options.style = self.options.style.with_font(name, size);
        self
    }

    /// Set all style options.
    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.options = self.options.with_style(style);
        self
    }

    /// Options collected so far.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a DOCX file.
    pub fn convert<P: AsRef<Path>>(self, path: P) -> Result<ConvertResult> {
        ReportConverter::new(self.options).convert_file(path)
    }

    /// Convert DOCX bytes.
    pub fn convert_bytes(self, data: &[u8]) -> Result<ConvertResult> {
        ReportConverter::new(self.options).convert_bytes(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default() {
        let builder = Atskaite::default();
        assert!(builder.options().formulas);
        assert_eq!(builder.options().parse.error_mode, ErrorMode::Lenient);
    }

    #[test]
    fn test_builder_chained() {
        let builder = Atskaite::new()
            .strict()
            .with_numbering(false)
            .with_formulas(false)
            .with_number_normalization(false)
            .with_empty_sections(true)
            .with_font("Arial", 11.0);

        let options = builder.options();
        assert_eq!(options.parse.error_mode, ErrorMode::Strict);
        assert!(!options.parse.numbering);
        assert!(!options.formulas);
        assert!(!options.normalize_numbers);
        assert!(options.include_empty_sections);
        assert_eq!(options.style.font_name, "Arial");
        assert_eq!(options.style.font_size, 11.0);
    }

    #[test]
    fn test_parse_bytes_empty_data() {
        let result = parse_bytes(&[]);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_parse_bytes_unknown_magic() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(parse_bytes(&data).is_err());
    }

    #[test]
    fn test_detect_format_unknown_magic() {
        let result = detect_format_from_bytes(b"<!DOCTYPE html><html></html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_builder_convert_invalid_bytes() {
        let result = Atskaite::new().convert_bytes(b"not a docx");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file("/nonexistent/parskats.docx");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
