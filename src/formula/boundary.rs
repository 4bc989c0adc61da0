//! Boundary inference for verification SUM ranges.
//!
//! Subtotal rows in the source reports carry no schema. The addends of a total
//! sit between the column header (a bare year, or a short text label) and the
//! nearest row above labelled "kopā". Both walks run upward from the row just
//! above the "Recalculated" label and only look at cell values, so the
//! heuristic works on plain column slices without a sheet.

use crate::layout::TOTAL_MARKER;
use crate::normalize::DASHES;
use thiserror::Error;

/// What a column holds at one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe<'a> {
    /// Nothing was ever written here
    Unwritten,
    /// Literal text
    Text(&'a str),
    /// A number
    Number(f64),
    /// A formula
    Formula,
}

impl Probe<'_> {
    /// Whether the upward header walk stops here.
    pub fn is_header(&self) -> bool {
        match self {
            Probe::Unwritten => true,
            Probe::Text(text) => is_label_text(text) || is_year_token(text),
            Probe::Number(n) => n.fract() == 0.0 && (1900.0..=2100.0).contains(n),
            Probe::Formula => false,
        }
    }

    /// Whether this label cell marks a total row.
    pub fn mentions_total(&self) -> bool {
        matches!(self, Probe::Text(text) if text.to_lowercase().contains(TOTAL_MARKER))
    }
}

/// A four-digit year between 1900 and 2100.
pub fn is_year_token(text: &str) -> bool {
    text.trim()
        .parse::<i64>()
        .map(|year| (1900..=2100).contains(&year))
        .unwrap_or(false)
}

/// Non-empty text without any digit that is not a zero placeholder.
fn is_label_text(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && !text.chars().any(|c| c.is_ascii_digit()) && !DASHES.contains(&text)
}

/// Inferred bounds of one verification formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumRange {
    /// Header row (exclusive upper bound)
    pub header_row: u32,
    /// Total row as printed in the report (exclusive lower bound)
    pub total_row: u32,
    /// First summed row
    pub start: u32,
    /// Last summed row
    pub end: u32,
}

impl SumRange {
    /// Number of summed rows.
    pub fn row_count(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Why no range could be inferred.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// The label sits on the first row.
    #[error("label row {0} has no rows above it")]
    NoRowsAbove(u32),

    /// Header and total rows leave nothing between them.
    #[error("range {start}-{end} invalid (header row {header_row}, total row {total_row})")]
    EmptyRange {
        /// Header row found
        header_row: u32,
        /// Total row found
        total_row: u32,
        /// Would-be first row
        start: u32,
        /// Would-be last row
        end: u32,
    },
}

fn probe_at<'a>(column: &[Probe<'a>], row: u32) -> Probe<'a> {
    row.checked_sub(1)
        .and_then(|i| column.get(i as usize).copied())
        .unwrap_or(Probe::Unwritten)
}

/// Infer the SUM range for the label at `label_row`.
///
/// `data` and `labels` are the data column and the label column, index 0
/// being row 1. Missing entries count as unwritten.
pub fn infer_sum_range(
    label_row: u32,
    data: &[Probe<'_>],
    labels: &[Probe<'_>],
) -> Result<SumRange, BoundaryError> {
    if label_row < 2 {
        return Err(BoundaryError::NoRowsAbove(label_row));
    }
    let above = label_row - 1;

    let mut header_row = above;
    while header_row > 1 && !probe_at(data, header_row).is_header() {
        header_row -= 1;
    }

    let total_row = (header_row + 1..=above)
        .rev()
        .find(|&row| probe_at(labels, row).mentions_total())
        .unwrap_or(above);

    let start = header_row + 1;
    let end = total_row.saturating_sub(1);
    if start > end {
        return Err(BoundaryError::EmptyRange {
            header_row,
            total_row,
            start,
            end,
        });
    }

    Ok(SumRange {
        header_row,
        total_row,
        start,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use Probe::{Number, Text, Unwritten};

    #[test]
    fn test_year_token() {
        assert!(is_year_token("2023"));
        assert!(is_year_token(" 1900 "));
        assert!(!is_year_token("2101"));
        assert!(!is_year_token("100"));
        assert!(!is_year_token("2023."));
    }

    #[test]
    fn test_header_probe() {
        assert!(Unwritten.is_header());
        assert!(Text("EUR").is_header());
        assert!(Text("2022").is_header());
        assert!(Number(2022.0).is_header());
        assert!(!Text("1 234").is_header());
        assert!(!Text("").is_header());
        assert!(!Text("31.12.2023").is_header());
        assert!(!Probe::Formula.is_header());
        assert!(!Text("-").is_header());
        assert!(!Text(" – ").is_header());
        assert!(!Text("—").is_header());
    }

    #[test]
    fn test_dash_rows_are_data() {
        // 1: header, 2-4: data with zero placeholders, 5: total
        let data = [Text("2022"), Text("50"), Text("–"), Text("-"), Text("50")];
        let labels = [Text(""), Text("Nauda"), Text("Krājumi"), Text("Debitori"), Text("Kopā aktīvi")];

        let range = infer_sum_range(6, &data, &labels).unwrap();
        assert_eq!(range.header_row, 1);
        assert_eq!((range.start, range.end), (2, 4));
    }

    #[test]
    fn test_three_row_block() {
        // 1: header, 2-4: data, 5: total, 6: Recalculated
        let data = [Text("2023"), Text("10"), Text("20"), Text("30"), Text("60")];
        let labels = [Text(""), Text("a"), Text("b"), Text("c"), Text("Kopā")];

        let range = infer_sum_range(6, &data, &labels).unwrap();
        assert_eq!(range.header_row, 1);
        assert_eq!(range.total_row, 5);
        assert_eq!((range.start, range.end), (2, 4));
        assert_eq!(range.row_count(), 3);
    }

    #[test]
    fn test_empty_block_skips() {
        let data = [Text("2023"), Text("60")];
        let labels = [Text(""), Text("Kopā")];

        let err = infer_sum_range(3, &data, &labels).unwrap_err();
        assert_eq!(
            err,
            BoundaryError::EmptyRange {
                header_row: 1,
                total_row: 2,
                start: 2,
                end: 1,
            }
        );
    }

    #[test]
    fn test_unwritten_cell_is_boundary() {
        // 1: previous scaffold spacer (unwritten), 2-3: data, 4: total
        let data = [Unwritten, Text("5"), Text("7"), Text("12")];
        let labels = [Unwritten, Text("x"), Text("y"), Text("KOPĀ:")];

        let range = infer_sum_range(5, &data, &labels).unwrap();
        assert_eq!((range.start, range.end), (2, 3));
    }

    #[test]
    fn test_no_total_label_defaults_to_row_above() {
        let data = [Text("EUR"), Text("1"), Text("2"), Text("3")];
        let labels = [Text(""), Text("a"), Text("b"), Text("Summa")];

        let range = infer_sum_range(5, &data, &labels).unwrap();
        assert_eq!(range.total_row, 4);
        assert_eq!((range.start, range.end), (2, 3));
    }

    #[test]
    fn test_nearest_total_wins() {
        // two stacked totals: the lower one closes the range
        let data = [Text("2023"), Text("1"), Text("1"), Text("2"), Text("2")];
        let labels = [Text(""), Text("a"), Text("Kopā A"), Text("b"), Text("Kopā")];

        let range = infer_sum_range(6, &data, &labels).unwrap();
        assert_eq!(range.total_row, 5);
        assert_eq!((range.start, range.end), (2, 4));
    }

    #[test]
    fn test_first_row_label() {
        assert_eq!(
            infer_sum_range(1, &[], &[]),
            Err(BoundaryError::NoRowsAbove(1))
        );
    }

    #[test]
    fn test_walk_stops_at_row_one() {
        let data = [Text("5"), Text("7"), Text("12")];
        let labels = [Text("a"), Text("b"), Text("Kopā")];

        let range = infer_sum_range(4, &data, &labels).unwrap();
        assert_eq!(range.header_row, 1);
        assert_eq!((range.start, range.end), (2, 2));
    }
}
