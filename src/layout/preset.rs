//! Per-section sheet presets.

use crate::model::Section;

/// Column widths and behaviour for one section's sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPreset {
    /// Column widths (1-based column, width in characters) of the final sheet
    pub column_widths: Vec<(u16, f64)>,

    /// Wrap text in every written cell
    pub wrap_text: bool,

    /// Insert an empty narrow column in front of the content after layout
    pub spacer_column: bool,

    /// Reconstruct verification formulas after layout
    pub reconstruct_formulas: bool,
}

impl LayoutPreset {
    /// Preset for a section.
    pub fn for_section(section: Section) -> Self {
        match section {
            Section::ManagementLetter => Self {
                column_widths: vec![(1, 80.0)],
                wrap_text: true,
                spacer_column: false,
                reconstruct_formulas: false,
            },
            Section::Notes => Self::statement(true),
            Section::Face
            | Section::CashFlow
            | Section::Equity
            | Section::IntangibleAssets
            | Section::FixedAssets => Self::statement(false),
        }
    }

    /// Spacer column A, label column B and five value columns C..G.
    fn statement(wrap_text: bool) -> Self {
        let mut column_widths = vec![(1, 2.0), (2, 50.0)];
        column_widths.extend((3..=7).map(|col| (col, 17.0)));
        Self {
            column_widths,
            wrap_text,
            spacer_column: true,
            reconstruct_formulas: true,
        }
    }
}
