//! DOCX parsing module.

mod docx;
mod numbering;
mod options;
mod styles;

pub use docx::{DocxParser, DOCUMENT_PART, NUMBERING_PART, STYLES_PART};
pub use numbering::{
    LevelDefinition, ListCounters, NumFormat, NumberingDefinitions, NumberingError, MAX_LEVEL,
};
pub use options::{ErrorMode, ParseOptions};
pub use styles::StyleNumbering;
