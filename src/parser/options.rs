//! Parsing options and configuration.

/// Options for reading Word documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Prefix list paragraphs with their rendered list label
    pub numbering: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (degrade instead of failing).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable strict mode (fail on unreadable optional parts).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Enable or disable list labels.
    pub fn with_numbering(mut self, numbering: bool) -> Self {
        self.numbering = numbering;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            numbering: true,
        }
    }
}

/// Error handling mode during parsing.
///
/// Only affects optional parts. A missing or broken `word/document.xml` is
/// always fatal. Unreadable `word/numbering.xml` or `word/styles.xml` yields
/// unnumbered paragraphs in lenient mode and fails in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    Strict,
    /// Skip invalid content and continue
    #[default]
    Lenient,
}
