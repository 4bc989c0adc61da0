//! Section classification of the merged document stream.
//!
//! The classifier is a small state machine: a primary phase (not started, or
//! inside one section) plus three orthogonal flags. [`transition`] is a pure
//! function of `(state, element)`; [`Classifier`] drives it over a whole
//! document and collects the lines per section.
//!
//! ```
//! use atskaite::classify::classify_document;
//! use atskaite::model::{Paragraph, Section, SourceDocument, Table};
//!
//! let mut source = SourceDocument::new();
//! source.add_paragraph(Paragraph::new("Vadības ziņojums", 0));
//! source.add_paragraph(Paragraph::new("Bilance", 20));
//! source.add_table(Table::new(30).with_row(["Kopā aktīvi", "100", "90"]));
//!
//! let doc = classify_document(source);
//! assert_eq!(doc.lines(Section::Face).len(), 2);
//! ```

pub mod flatten;
pub mod merge;

pub use flatten::{clean_cell, flatten_row, flatten_table};
pub use merge::{merge_stream, MergedStream};

use crate::model::{ClassifiedDocument, DocumentElement, Line, NoteMarker, Section, SourceDocument};
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Heading that opens the report body.
pub const MANAGEMENT_LETTER_HEADING: &str = "Vadības ziņojums";

/// Lowercased opening phrase of the repeated page-footer boilerplate.
pub const FOOTER_START: &str = "pielikums ir šī finanšu pārskata";

/// Lowercased closing phrase of the page-footer boilerplate.
pub const FOOTER_END: &str = "šis dokuments ir elektroniski parakstīts";

/// Heading prefixes and the section each one opens, in match order.
pub const SECTION_HEADINGS: [(&str, Section); 5] = [
    ("Peļņas vai zaudējumu", Section::Face),
    ("Bilance", Section::Face),
    ("Naudas plūsmas", Section::CashFlow),
    ("Pašu kapitāla", Section::Equity),
    ("Finanšu pārskata pielikums", Section::Notes),
];

/// Note headings are numbered 3 through 30.
const NOTE_PATTERN: &str = r"^([3-9]|[1-2][0-9]|30)\.\s*(.+)?";

/// Primary classifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Front matter; nothing is kept yet
    #[default]
    NotStarted,
    /// Inside a section
    Active(Section),
}

/// Orthogonal sub-states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags {
    /// Inside page-footer boilerplate
    pub skipping_footer: bool,
    /// The notes heading has been seen
    pub notes_started: bool,
    /// Still in the management-letter phase
    pub management_letter: bool,
}

/// Complete classifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassifierState {
    /// Primary phase
    pub phase: Phase,
    /// Sub-state flags
    pub flags: Flags,
}

impl ClassifierState {
    /// Section currently receiving content.
    pub fn current(&self) -> Option<Section> {
        match self.phase {
            Phase::NotStarted => None,
            Phase::Active(section) => Some(section),
        }
    }

    /// Whether the report body has started.
    pub fn started(&self) -> bool {
        self.phase != Phase::NotStarted
    }
}

/// Why an element contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    /// Paragraph inside a table; its text arrives with the table rows
    WithinTable,
    /// Paragraph without visible text
    Empty,
    /// Footer boilerplate opening or closing phrase
    FooterMarker,
    /// Content between the footer markers
    Footer,
    /// The management-letter heading that starts the report body
    StartMarker,
    /// Content before the report body
    FrontMatter,
}

/// Outcome of classifying one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Element dropped
    Discarded(DiscardReason),
    /// Element contributes lines to a section
    Assigned {
        /// Receiving section
        section: Section,
        /// Lines in order (one for a paragraph, one per row for a table)
        lines: Vec<Line>,
    },
}

/// Compute the next state and the classification of one element.
pub fn transition(
    state: ClassifierState,
    element: &DocumentElement,
) -> (ClassifierState, Classification) {
    match element {
        DocumentElement::Paragraph(paragraph) => {
            if paragraph.within_table {
                return (state, Classification::Discarded(DiscardReason::WithinTable));
            }
            let text: String = paragraph.display_text().nfc().collect();
            classify_paragraph(state, text)
        }
        DocumentElement::Table(table) => {
            if state.flags.skipping_footer {
                return (state, Classification::Discarded(DiscardReason::Footer));
            }
            let Some(section) = state.current() else {
                return (state, Classification::Discarded(DiscardReason::FrontMatter));
            };
            let lines = flatten_table(table)
                .iter()
                .map(|row| Line::parse(&row.nfc().collect::<String>()))
                .collect();
            (state, Classification::Assigned { section, lines })
        }
    }
}

fn classify_paragraph(mut state: ClassifierState, text: String) -> (ClassifierState, Classification) {
    if text.is_empty() {
        return (state, Classification::Discarded(DiscardReason::Empty));
    }

    let lower = text.to_lowercase();
    if lower.starts_with(FOOTER_START) {
        state.flags.skipping_footer = true;
        return (state, Classification::Discarded(DiscardReason::FooterMarker));
    }
    if lower.starts_with(FOOTER_END) {
        state.flags.skipping_footer = false;
        return (state, Classification::Discarded(DiscardReason::FooterMarker));
    }
    if state.flags.skipping_footer {
        return (state, Classification::Discarded(DiscardReason::Footer));
    }

    let current = match state.phase {
        Phase::NotStarted if text == MANAGEMENT_LETTER_HEADING => {
            state.phase = Phase::Active(Section::ManagementLetter);
            state.flags.management_letter = true;
            return (state, Classification::Discarded(DiscardReason::StartMarker));
        }
        Phase::NotStarted => {
            return (state, Classification::Discarded(DiscardReason::FrontMatter));
        }
        Phase::Active(section) => section,
    };

    let heading = SECTION_HEADINGS
        .iter()
        .find(|(prefix, _)| text.starts_with(prefix))
        .map(|(_, section)| *section)
        .filter(|section| !state.flags.notes_started || *section == Section::Notes);

    let section = if let Some(section) = heading {
        state.flags.management_letter = false;
        if section == Section::Notes {
            state.flags.notes_started = true;
        }
        section
    } else if state.flags.notes_started {
        Section::Notes
    } else if state.flags.management_letter {
        Section::ManagementLetter
    } else {
        current
    };

    state.phase = Phase::Active(section);
    (
        state,
        Classification::Assigned {
            section,
            lines: vec![Line::Text(text)],
        },
    )
}

/// Counters collected during classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifySummary {
    /// Paragraphs seen
    pub paragraphs: usize,
    /// Tables seen
    pub tables: usize,
    /// Elements dropped
    pub discarded: usize,
}

/// Drives [`transition`] over a document and collects the result.
#[derive(Debug)]
pub struct Classifier {
    state: ClassifierState,
    note_pattern: Regex,
    last_note: u8,
    summary: ClassifySummary,
}

impl Classifier {
    /// Create a classifier in the initial state.
    pub fn new() -> Self {
        Self {
            state: ClassifierState::default(),
            note_pattern: Regex::new(NOTE_PATTERN).expect("note pattern is valid"),
            last_note: 0,
            summary: ClassifySummary::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> ClassifierState {
        self.state
    }

    /// Counters so far.
    pub fn summary(&self) -> &ClassifySummary {
        &self.summary
    }

    /// Classify one element, appending its lines to `doc`.
    pub fn feed(&mut self, element: &DocumentElement, doc: &mut ClassifiedDocument) -> Classification {
        if element.is_paragraph() {
            self.summary.paragraphs += 1;
        } else {
            self.summary.tables += 1;
        }

        let (next, outcome) = transition(self.state, element);
        if next.phase != self.state.phase {
            log::debug!(
                "Classifier: {:?} -> {:?} at position {}",
                self.state.phase,
                next.phase,
                element.position()
            );
        }
        self.state = next;

        match &outcome {
            Classification::Discarded(reason) => {
                self.summary.discarded += 1;
                log::trace!("Discarded element at {}: {:?}", element.position(), reason);
            }
            Classification::Assigned { section, lines } => {
                for line in lines {
                    if *section == Section::Notes {
                        self.record_note(line, doc);
                    }
                    doc.push(*section, line.clone());
                }
            }
        }
        outcome
    }

    /// Classify a whole source document.
    pub fn run(&mut self, source: SourceDocument) -> ClassifiedDocument {
        let mut doc = ClassifiedDocument::new();
        for element in merge_stream(source) {
            self.feed(&element, &mut doc);
        }
        log::debug!(
            "Classified {} paragraphs and {} tables into {} lines ({} discarded)",
            self.summary.paragraphs,
            self.summary.tables,
            doc.line_count(),
            self.summary.discarded
        );
        doc
    }

    /// Note headings must increase; in-note enumerations restart at low numbers.
    fn record_note(&mut self, line: &Line, doc: &mut ClassifiedDocument) {
        let Line::Text(text) = line else {
            return;
        };
        let Some(caps) = self.note_pattern.captures(text) else {
            return;
        };
        let Ok(number) = caps[1].parse::<u8>() else {
            return;
        };
        if number <= self.last_note {
            return;
        }
        self.last_note = number;
        doc.notes.push(NoteMarker {
            number,
            line_index: doc.lines(Section::Notes).len(),
            title: caps.get(2).map(|m| m.as_str().trim().to_string()),
        });
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a source document with a fresh classifier.
pub fn classify_document(source: SourceDocument) -> ClassifiedDocument {
    Classifier::new().run(source)
}
