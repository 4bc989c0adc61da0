//! Report conversion: the pipeline from Word document to workbook.
//!
//! Stages run strictly in order over one owned [`Workbook`]:
//! parse → classify → layout (per section) → spacer column → formulas →
//! number normalization. Nothing is written to disk until the caller saves
//! the [`ConvertResult`].
//!
//! # Example
//!
//! ```no_run
//! use atskaite::convert::{ConvertOptions, ReportConverter};
//!
//! fn main() -> atskaite::Result<()> {
//!     let converter = ReportConverter::new(ConvertOptions::default().with_formulas(false));
//!     let result = converter.convert_file("report.docx")?;
//!     result.save("report.xlsx")?;
//!     println!("{} sheets", result.workbook.sheet_count());
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Serialize;

use crate::classify::{ClassifySummary, Classifier};
use crate::error::{Error, Result};
use crate::formula::{FormulaEngine, FormulaReport, SkippedFormula};
use crate::layout::{LayoutPreset, RowLayout, StyleOptions};
use crate::model::{ClassifiedDocument, NoteMarker, Section, SourceDocument, Workbook};
use crate::normalize::NumberNormalizer;
use crate::parser::{DocxParser, ParseOptions};
use crate::sink::{flush, SheetSink, XlsxSink};

/// Options for report conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Document reading options
    pub parse: ParseOptions,

    /// Fonts, accents and number format
    pub style: StyleOptions,

    /// Reconstruct verification formulas
    pub formulas: bool,

    /// Convert numeric text to numbers
    pub normalize_numbers: bool,

    /// Create sheets for sections that received no lines
    pub include_empty_sections: bool,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set document reading options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set style options.
    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }

    /// Enable or disable formula reconstruction.
    pub fn with_formulas(mut self, enabled: bool) -> Self {
        self.formulas = enabled;
        self
    }

    /// Enable or disable number normalization.
    pub fn with_number_normalization(mut self, enabled: bool) -> Self {
        self.normalize_numbers = enabled;
        self
    }

    /// Create sheets for empty sections too.
    pub fn with_empty_sections(mut self, include: bool) -> Self {
        self.include_empty_sections = include;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            style: StyleOptions::default(),
            formulas: true,
            normalize_numbers: true,
            include_empty_sections: false,
        }
    }
}

/// Per-section figures of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStats {
    /// Section
    pub section: Section,
    /// Lines classified into the section
    pub lines: usize,
    /// Of those, tabular rows
    pub rows: usize,
    /// Total rows detected during layout
    pub total_rows: usize,
}

/// What a conversion did, for auditing the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Paragraphs read
    pub paragraphs: usize,
    /// Tables read
    pub tables: usize,
    /// Elements dropped by the classifier
    pub discarded: usize,
    /// Per-section figures, in sheet order
    pub sections: Vec<SectionStats>,
    /// Numbered note headings
    pub notes: Vec<NoteMarker>,
    /// Total rows detected across sheets
    pub total_rows: usize,
    /// Formulas written
    pub formulas_written: usize,
    /// Verification cells left without a formula
    pub skipped_formulas: Vec<SkippedFormula>,
    /// Text cells converted to numbers
    pub numbers_normalized: usize,
}

impl ConversionStats {
    fn from_classification(summary: &ClassifySummary, classified: &ClassifiedDocument) -> Self {
        Self {
            paragraphs: summary.paragraphs,
            tables: summary.tables,
            discarded: summary.discarded,
            notes: classified.notes.clone(),
            ..Self::default()
        }
    }

    /// Number of sheets produced.
    pub fn sheet_count(&self) -> usize {
        self.sections.len()
    }

    /// Pretty-printed JSON report.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Other(e.to_string()))
    }
}

/// Result of a conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Finished workbook
    pub workbook: Workbook,

    /// Classified lines the workbook was built from
    pub classified: ClassifiedDocument,

    /// Conversion figures
    pub stats: ConversionStats,
}

impl ConvertResult {
    /// Write the workbook into any sink.
    pub fn write_to<S: SheetSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        flush(&self.workbook, sink)
    }

    /// Save the workbook as an XLSX file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut sink = XlsxSink::new();
        self.write_to(&mut sink)?;
        sink.save(path.as_ref())
    }

    /// Serialize the workbook as XLSX bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut sink = XlsxSink::new();
        self.write_to(&mut sink)?;
        sink.save_to_buffer()
    }
}

/// Runs the conversion pipeline.
#[derive(Debug, Clone, Default)]
pub struct ReportConverter {
    options: ConvertOptions,
}

impl ReportConverter {
    /// Create a converter.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a DOCX file.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<ConvertResult> {
        let source = DocxParser::open_with_options(path, self.options.parse.clone())?.parse()?;
        self.convert_document(source)
    }

    /// Convert DOCX bytes.
    pub fn convert_bytes(&self, data: &[u8]) -> Result<ConvertResult> {
        let source = DocxParser::from_bytes_with_options(data, self.options.parse.clone())?.parse()?;
        self.convert_document(source)
    }

    /// Convert an already parsed document.
    pub fn convert_document(&self, source: SourceDocument) -> Result<ConvertResult> {
        let mut classifier = Classifier::new();
        let classified = classifier.run(source);
        if classified.is_empty() {
            return Err(Error::NoContent);
        }
        log::info!(
            "Classified {} lines into {} sections",
            classified.line_count(),
            classified.populated().count()
        );

        let mut stats = ConversionStats::from_classification(classifier.summary(), &classified);
        let workbook = self.build_workbook(&classified, &mut stats);

        Ok(ConvertResult {
            workbook,
            classified,
            stats,
        })
    }

    /// Lay out, fill in and normalize every section sheet.
    pub fn build_workbook(&self, classified: &ClassifiedDocument, stats: &mut ConversionStats) -> Workbook {
        let style = &self.options.style;
        let mut workbook = Workbook::new();
        let mut formulas = FormulaReport::default();

        for content in &classified.sections {
            if content.lines.is_empty() && !self.options.include_empty_sections {
                continue;
            }

            let preset = LayoutPreset::for_section(content.section);
            let sheet = workbook.add_sheet(content.section.title());
            let layout = RowLayout::new(&preset, style).write(sheet, &content.lines, 1);

            if preset.spacer_column {
                sheet.insert_columns(1, 1);
            }
            if preset.reconstruct_formulas && self.options.formulas {
                let report = FormulaEngine::new(style)
                    .with_wrap(preset.wrap_text)
                    .apply(sheet);
                log::debug!(
                    "{}: {} formulas, {} skipped",
                    sheet.name(),
                    report.written(),
                    report.skipped.len()
                );
                formulas.merge(report);
            }

            stats.total_rows += layout.total_rows;
            stats.sections.push(SectionStats {
                section: content.section,
                lines: content.lines.len(),
                rows: content.lines.iter().filter(|l| l.is_row()).count(),
                total_rows: layout.total_rows,
            });
        }

        stats.formulas_written = formulas.written();
        stats.skipped_formulas = formulas.skipped;

        if self.options.normalize_numbers {
            let summary = NumberNormalizer::with_format(style.number_format.clone()).apply(&mut workbook);
            stats.numbers_normalized = summary.converted;
        }

        if !stats.skipped_formulas.is_empty() {
            log::warn!(
                "{} verification cells left without a formula",
                stats.skipped_formulas.len()
            );
        }
        workbook
    }
}

/// Convert a DOCX file and save the workbook.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: ConvertOptions,
) -> Result<ConversionStats> {
    let result = ReportConverter::new(options).convert_file(input)?;
    result.save(output)?;
    Ok(result.stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph, Table};

    fn report() -> SourceDocument {
        let mut source = SourceDocument::new();
        source.add_paragraph(Paragraph::new("Vadības ziņojums", 0));
        source.add_paragraph(Paragraph::new("Sabiedrība strādāja ar peļņu.", 17));
        source.add_paragraph(Paragraph::new("Bilance", 47));
        source.add_table(
            Table::new(55)
                .with_row(["", "2023", "2022"])
                .with_row(["Nauda", "60", "50"])
                .with_row(["Krājumi", "40", "40"])
                .with_row(["Kopā aktīvi", "100", "90"]),
        );
        source
    }

    #[test]
    fn test_default_options() {
        let options = ConvertOptions::default();
        assert!(options.formulas);
        assert!(options.normalize_numbers);
        assert!(!options.include_empty_sections);
    }

    #[test]
    fn test_convert_document() {
        let result = ReportConverter::default().convert_document(report()).unwrap();

        let names: Vec<&str> = result.workbook.sheets().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Management letter", "FACE"]);

        let face = result.workbook.sheet("FACE").unwrap();
        assert_eq!(face.text(1, 2), Some("Bilance"));
        assert_eq!(face.get(3, 3).unwrap().value.as_number(), Some(60.0));
        assert_eq!(face.get(6, 3).unwrap().value.as_formula(), Some("=SUM(C3:C4)"));
        assert_eq!(face.get(7, 4).unwrap().value.as_formula(), Some("=D5-D6"));

        let stats = &result.stats;
        assert_eq!(stats.paragraphs, 3);
        assert_eq!(stats.tables, 1);
        assert_eq!(stats.total_rows, 1);
        assert_eq!(stats.formulas_written, 4);
        assert!(stats.skipped_formulas.is_empty());
        assert_eq!(stats.sheet_count(), 2);

        let json = stats.to_json().unwrap();
        assert!(json.contains("\"formulas_written\": 4"));
        assert!(json.contains("\"section\": \"Face\""));
    }

    #[test]
    fn test_toggles() {
        let options = ConvertOptions::new()
            .with_formulas(false)
            .with_number_normalization(false)
            .with_empty_sections(true);
        let result = ReportConverter::new(options).convert_document(report()).unwrap();

        assert_eq!(result.workbook.sheet_count(), Section::ALL.len());
        let face = result.workbook.sheet("FACE").unwrap();
        assert_eq!(face.text(3, 3), Some("60"));
        assert!(face.get(6, 3).is_none());
        assert_eq!(result.stats.formulas_written, 0);
        assert_eq!(result.stats.numbers_normalized, 0);
    }

    #[test]
    fn test_no_content() {
        let mut source = SourceDocument::new();
        source.add_paragraph(Paragraph::new("Titullapa", 0));
        let result = ReportConverter::default().convert_document(source);
        assert!(matches!(result, Err(Error::NoContent)));
    }

    #[test]
    fn test_to_bytes() {
        let result = ReportConverter::default().convert_document(report()).unwrap();
        let bytes = result.to_bytes().unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
