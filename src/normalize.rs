//! Latvian-locale number normalization.
//!
//! Report tables print numbers with spaces (or no-break spaces) between
//! thousands groups, a decimal comma, and parentheses for negatives. This pass
//! turns such text cells into real numbers and gives every numeric or formula
//! cell the accounting display format.

use crate::model::{CellValue, Workbook};
use regex::Regex;

/// Accounting display format: grouped thousands, parenthesised negatives, dash for zero.
pub const ACCOUNTING_FORMAT: &str = r#"_(* #,##0_);_(* (#,##0);_(* "—"_);_(@_)"#;

const NUMERAL_PATTERN: &str = r"^-?\(?\d{1,3}(\d{3})*(,\d+)?\)?$";

/// Placeholders that stand for zero in the source tables.
pub const DASHES: [&str; 3] = ["-", "–", "—"];

/// Counters from a normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    /// Text cells converted to numbers
    pub converted: usize,
    /// Cells that received the accounting format
    pub formatted: usize,
}

/// Parses locale numerals and applies the display format workbook-wide.
#[derive(Debug, Clone)]
pub struct NumberNormalizer {
    pattern: Regex,
    number_format: String,
}

impl NumberNormalizer {
    /// Create a normalizer using [`ACCOUNTING_FORMAT`].
    pub fn new() -> Self {
        Self::with_format(ACCOUNTING_FORMAT)
    }

    /// Create a normalizer with a custom display format.
    pub fn with_format(number_format: impl Into<String>) -> Self {
        Self {
            pattern: Regex::new(NUMERAL_PATTERN).expect("numeral pattern is valid"),
            number_format: number_format.into(),
        }
    }

    /// Parse a locale numeral; `None` leaves the text as it is.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let compact: String = text
            .chars()
            .filter(|c| *c != ' ' && *c != '\u{a0}')
            .collect();

        if DASHES.contains(&compact.as_str()) {
            return Some(0.0);
        }
        if !self.pattern.is_match(&compact) {
            return None;
        }
        compact
            .replace('(', "-")
            .replace(')', "")
            .replace(',', ".")
            .parse::<f64>()
            .ok()
    }

    /// Convert numeric text and tag numeric and formula cells in every sheet.
    pub fn apply(&self, workbook: &mut Workbook) -> NormalizeSummary {
        let mut summary = NormalizeSummary::default();

        for sheet in workbook.sheets_mut() {
            for (_, cell) in sheet.cells_mut() {
                let tag = match &cell.value {
                    CellValue::Text(text) => match self.parse(text) {
                        Some(number) => {
                            cell.value = CellValue::Number(number);
                            summary.converted += 1;
                            true
                        }
                        None => text.starts_with('='),
                    },
                    CellValue::Number(_) | CellValue::Formula(_) => true,
                };

                if tag {
                    cell.style.number_format = Some(self.number_format.clone());
                    summary.formatted += 1;
                }
            }
        }

        log::debug!(
            "Normalized {} numeric cells, formatted {}",
            summary.converted,
            summary.formatted
        );
        summary
    }
}

impl Default for NumberNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a locale numeral with a one-off normalizer.
pub fn parse_locale_number(text: &str) -> Option<f64> {
    NumberNormalizer::new().parse(text)
}
