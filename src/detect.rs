//! DOCX format detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use crate::parser::DOCUMENT_PART;

/// DOCX container information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Number of entries in the ZIP container
    pub entries: usize,
    /// Whether the package carries list numbering definitions
    pub has_numbering: bool,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DOCX ({} parts)", self.entries)
    }
}

/// ZIP local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Check the ZIP magic of a file.
///
/// # Example
/// ```no_run
/// use atskaite::detect::detect_format_from_path;
///
/// detect_format_from_path("report.docx").unwrap();
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 4];
    reader.read_exact(&mut header).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::UnknownFormat,
        _ => Error::Io(e),
    })?;
    check_magic(&header)
}

/// Check that data starts with a ZIP local file header.
pub fn check_magic(data: &[u8]) -> Result<()> {
    if data.starts_with(ZIP_MAGIC) {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Inspect a whole DOCX package held in memory.
///
/// The data must be a ZIP container holding `word/document.xml`.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    check_magic(data)?;

    let archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut has_document = false;
    let mut has_numbering = false;
    for name in archive.file_names() {
        match name {
            DOCUMENT_PART => has_document = true,
            "word/numbering.xml" => has_numbering = true,
            _ => {}
        }
    }
    if !has_document {
        return Err(Error::UnknownFormat);
    }

    Ok(DocxFormat {
        entries: archive.len(),
        has_numbering,
    })
}

/// Check if a file is a DOCX package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    std::fs::read(path)
        .map(|data| detect_format_from_bytes(&data).is_ok())
        .unwrap_or(false)
}

/// Check if bytes hold a DOCX package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
