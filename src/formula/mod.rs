//! Verification formula reconstruction.
//!
//! Runs on a sheet after layout and after the spacer column was inserted, so
//! labels live in column B and the two reporting periods in columns C and D.
//! Every "Recalculated" label gets a `=SUM(..)` over the rows its total row
//! summarises, and the "Difference" row below it gets `=<total>-<recalculated>`.

mod boundary;

pub use boundary::{infer_sum_range, is_year_token, BoundaryError, Probe, SumRange};

use crate::layout::{StyleOptions, DIFFERENCE_LABEL, RECALCULATED_LABEL};
use crate::model::{column_letter, CellValue, Sheet};
use serde::Serialize;

/// Column holding row labels.
pub const LABEL_COLUMN: u16 = 2;

/// Columns holding the current and the prior period.
pub const DATA_COLUMNS: [u16; 2] = [3, 4];

/// Rows above a label logged for diagnostics.
const CONTEXT_ROWS: u32 = 4;

/// A formula that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFormula {
    /// Sheet name
    pub sheet: String,
    /// Row of the "Recalculated" label
    pub row: u32,
    /// Column letter of the data column
    pub column: String,
    /// Why the range could not be inferred
    pub reason: String,
}

/// What a reconstruction pass wrote and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormulaReport {
    /// "Recalculated" labels found
    pub label_rows: usize,
    /// SUM formulas written
    pub sums: usize,
    /// Difference formulas written
    pub differences: usize,
    /// Skipped data cells
    pub skipped: Vec<SkippedFormula>,
}

impl FormulaReport {
    /// Total number of formulas written.
    pub fn written(&self) -> usize {
        self.sums + self.differences
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: FormulaReport) {
        self.label_rows += other.label_rows;
        self.sums += other.sums;
        self.differences += other.differences;
        self.skipped.extend(other.skipped);
    }
}

fn label_matches(sheet: &Sheet, row: u32, label: &str) -> bool {
    sheet
        .text(row, LABEL_COLUMN)
        .is_some_and(|text| text.trim().eq_ignore_ascii_case(label))
}

fn probe(sheet: &Sheet, row: u32, col: u16) -> Probe<'_> {
    match sheet.get(row, col).map(|cell| &cell.value) {
        None => Probe::Unwritten,
        Some(CellValue::Text(text)) => Probe::Text(text),
        Some(CellValue::Number(n)) => Probe::Number(*n),
        Some(CellValue::Formula(_)) => Probe::Formula,
    }
}

fn column_probes(sheet: &Sheet, col: u16, up_to: u32) -> Vec<Probe<'_>> {
    (1..=up_to).map(|row| probe(sheet, row, col)).collect()
}

fn describe(probe: Probe<'_>) -> String {
    match probe {
        Probe::Unwritten => "<none>".to_string(),
        Probe::Text(text) => format!("{:?}", text),
        Probe::Number(n) => n.to_string(),
        Probe::Formula => "<formula>".to_string(),
    }
}

/// Writes verification formulas into a laid-out sheet.
#[derive(Debug)]
pub struct FormulaEngine<'a> {
    style: &'a StyleOptions,
    wrap: bool,
}

impl<'a> FormulaEngine<'a> {
    /// Create an engine styling formulas with the given accents.
    pub fn new(style: &'a StyleOptions) -> Self {
        Self { style, wrap: false }
    }

    /// Wrap text in formula cells.
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Fill every "Recalculated" row of `sheet`.
    pub fn apply(&self, sheet: &mut Sheet) -> FormulaReport {
        let mut report = FormulaReport::default();

        let label_rows: Vec<u32> = (1..=sheet.max_row())
            .filter(|&row| label_matches(sheet, row, RECALCULATED_LABEL))
            .collect();

        for row in label_rows {
            report.label_rows += 1;
            self.log_context(sheet, row);
            let has_difference = label_matches(sheet, row + 1, DIFFERENCE_LABEL);

            for col in DATA_COLUMNS {
                let inferred = {
                    let data = column_probes(sheet, col, row);
                    let labels = column_probes(sheet, LABEL_COLUMN, row);
                    infer_sum_range(row, &data, &labels)
                };

                let letter = column_letter(col);
                match inferred {
                    Ok(range) => {
                        let sum = format!("=SUM({l}{}:{l}{})", range.start, range.end, l = letter);
                        log::debug!("{}!{}{}: {}", sheet.name(), letter, row, sum);
                        sheet.set(
                            row,
                            col,
                            CellValue::Formula(sum),
                            self.style.recalculated(self.wrap),
                        );
                        report.sums += 1;

                        if has_difference {
                            let difference =
                                format!("={l}{}-{l}{}", range.total_row, row, l = letter);
                            sheet.set(
                                row + 1,
                                col,
                                CellValue::Formula(difference),
                                self.style.difference(self.wrap),
                            );
                            report.differences += 1;
                        }
                    }
                    Err(err) => {
                        log::warn!(
                            "Skipping formula at {}!{}{}: {}",
                            sheet.name(),
                            letter,
                            row,
                            err
                        );
                        report.skipped.push(SkippedFormula {
                            sheet: sheet.name().to_string(),
                            row,
                            column: letter,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        report
    }

    fn log_context(&self, sheet: &Sheet, row: u32) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        for above in (row.saturating_sub(CONTEXT_ROWS).max(1)..row).rev() {
            let values: Vec<String> = DATA_COLUMNS
                .iter()
                .map(|&col| describe(probe(sheet, above, col)))
                .collect();
            log::debug!(
                "{}!{} above label {}: {}",
                sheet.name(),
                above,
                row,
                values.join(" | ")
            );
        }
    }
}

/// Reconstruct formulas in one sheet with default wrapping.
pub fn reconstruct_formulas(sheet: &mut Sheet, style: &StyleOptions) -> FormulaReport {
    FormulaEngine::new(style).apply(sheet)
}
