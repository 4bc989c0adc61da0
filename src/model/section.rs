//! Report sections and the lines classified into them.

use serde::{Deserialize, Serialize};

/// A named report section. Each populated section becomes one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    /// Management report ("Vadības ziņojums")
    ManagementLetter,
    /// Financial statements: profit/loss and balance sheet
    Face,
    /// Cash-flow statement
    CashFlow,
    /// Statement of changes in equity
    Equity,
    /// Notes to the financial statements
    Notes,
    /// Intangible asset movement (reserved)
    IntangibleAssets,
    /// Fixed asset movement (reserved)
    FixedAssets,
}

impl Section {
    /// All sections in sheet creation order.
    pub const ALL: [Section; 7] = [
        Section::ManagementLetter,
        Section::Face,
        Section::CashFlow,
        Section::Equity,
        Section::Notes,
        Section::IntangibleAssets,
        Section::FixedAssets,
    ];

    /// Sheet title for the section.
    pub fn title(&self) -> &'static str {
        match self {
            Section::ManagementLetter => "Management letter",
            Section::Face => "FACE",
            Section::CashFlow => "CF",
            Section::Equity => "EMT",
            Section::Notes => "Notes",
            Section::IntangibleAssets => "IAMT",
            Section::FixedAssets => "FAMT",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// A classified line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Line {
    /// Narrative text, written to a single cell
    Text(String),
    /// A flattened table row, one cell per value
    Row(Vec<String>),
}

impl Line {
    /// Build a line from a flattened (tab-delimited) string.
    ///
    /// Anything containing a tab is tabular; a single-cell table row therefore
    /// comes back as plain text.
    pub fn parse(flat: &str) -> Self {
        if flat.contains('\t') {
            Line::Row(flat.split('\t').map(str::to_string).collect())
        } else {
            Line::Text(flat.to_string())
        }
    }

    /// Check if this is a tabular row.
    pub fn is_row(&self) -> bool {
        matches!(self, Line::Row(_))
    }

    /// Plain text of the line (cells joined by tabs).
    pub fn plain_text(&self) -> String {
        match self {
            Line::Text(text) => text.clone(),
            Line::Row(cells) => cells.join("\t"),
        }
    }
}

/// A numbered note heading found in the Notes section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMarker {
    /// Note number (3..=30)
    pub number: u8,

    /// Index of the heading line within the Notes section
    pub line_index: usize,

    /// Heading title after the number, if any
    pub title: Option<String>,
}

/// Lines belonging to one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContent {
    /// The section
    pub section: Section,

    /// Lines in document order
    pub lines: Vec<Line>,
}

/// Result of classifying a document stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedDocument {
    /// All sections, in creation order, including empty ones
    pub sections: Vec<SectionContent>,

    /// Numbered note headings of the Notes section
    pub notes: Vec<NoteMarker>,
}

impl ClassifiedDocument {
    /// Create a document with every section present and empty.
    pub fn new() -> Self {
        Self {
            sections: Section::ALL
                .iter()
                .map(|&section| SectionContent {
                    section,
                    lines: Vec::new(),
                })
                .collect(),
            notes: Vec::new(),
        }
    }

    /// Append a line to a section.
    pub fn push(&mut self, section: Section, line: Line) {
        self.sections[section.index()].lines.push(line);
    }

    /// Lines of a section.
    pub fn lines(&self, section: Section) -> &[Line] {
        &self.sections[section.index()].lines
    }

    /// Sections that received at least one line.
    pub fn populated(&self) -> impl Iterator<Item = &SectionContent> {
        self.sections.iter().filter(|s| !s.lines.is_empty())
    }

    /// Total number of lines across sections.
    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    /// Check if no section received a line.
    pub fn is_empty(&self) -> bool {
        self.line_count() == 0
    }
}

impl Default for ClassifiedDocument {
    fn default() -> Self {
        Self::new()
    }
}
