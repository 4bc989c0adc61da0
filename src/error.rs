//! Error types for atskaite library.

use std::io;
use thiserror::Error;

/// Result type alias for atskaite operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a report.
///
/// Only failures that make the whole run meaningless live here. Local
/// problems (a list number that cannot be resolved, a SUM range that cannot
/// be inferred) are recovered where they happen and never surface as `Error`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a ZIP-packaged Word document.
    #[error("Unknown file format: not a valid DOCX document")]
    UnknownFormat,

    /// The ZIP container could not be read.
    #[error("Archive error: {0}")]
    Archive(String),

    /// A required package part is missing.
    #[error("Missing document part: {0}")]
    MissingPart(String),

    /// Error parsing WordprocessingML.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// The numbering or style definitions could not be read (strict mode only).
    #[error("Numbering definitions error: {0}")]
    Numbering(String),

    /// Classification finished without a single populated section.
    #[error("No report sections found (is the \"Vadības ziņojums\" heading present?)")]
    NoContent,

    /// Error from the spreadsheet writer.
    #[error("Workbook error: {0}")]
    Sink(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::MissingPart("requested archive entry".to_string())
            }
            zip::result::ZipError::InvalidArchive(_) => Error::UnknownFormat,
            _ => Error::Archive(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        match err {
            rust_xlsxwriter::XlsxError::IoError(e) => Error::Io(e),
            _ => Error::Sink(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(
            err.to_string(),
            "Unknown file format: not a valid DOCX document"
        );

        let err = Error::MissingPart("word/document.xml".into());
        assert_eq!(err.to_string(), "Missing document part: word/document.xml");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_zip_io_error_conversion() {
        let zip_err =
            zip::result::ZipError::Io(io::Error::new(io::ErrorKind::Other, "broken pipe"));
        let err: Error = zip_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
