//! Source document elements as delivered by a document reader.

use serde::{Deserialize, Serialize};

/// A paragraph of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Raw paragraph text
    pub text: String,

    /// Document position of the paragraph start
    pub position: u64,

    /// Whether the paragraph lies inside a table cell
    pub within_table: bool,

    /// Rendered list number (e.g. "12."), if the paragraph is a list item
    pub list_label: Option<String>,
}

impl Paragraph {
    /// Create a body-level paragraph.
    pub fn new(text: impl Into<String>, position: u64) -> Self {
        Self {
            text: text.into(),
            position,
            within_table: false,
            list_label: None,
        }
    }

    /// Mark the paragraph as part of a table cell.
    pub fn in_table(mut self) -> Self {
        self.within_table = true;
        self
    }

    /// Set the list-numbering label.
    pub fn with_list_label(mut self, label: impl Into<String>) -> Self {
        self.list_label = Some(label.into());
        self
    }

    /// Visible text: trimmed paragraph text, prefixed with the list label.
    pub fn display_text(&self) -> String {
        let text = self.text.trim();
        match self.list_label.as_deref() {
            Some(label) if !label.is_empty() => format!("{} {}", label, text),
            _ => text.to_string(),
        }
    }
}

/// A top-level table of the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Document position of the table start
    pub position: u64,

    /// Rows in document order
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create an empty table at the given position.
    pub fn new(position: u64) -> Self {
        Self {
            position,
            rows: Vec::new(),
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Builder-style row addition.
    pub fn with_row<S: Into<String>>(mut self, cells: impl IntoIterator<Item = S>) -> Self {
        self.rows.push(TableRow::from_strings(cells));
        self
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A table row: cell texts in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Raw cell texts
    pub cells: Vec<String>,
}

impl TableRow {
    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            cells: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// One element of the merged document stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentElement {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
}

impl DocumentElement {
    /// Document position of the element.
    pub fn position(&self) -> u64 {
        match self {
            DocumentElement::Paragraph(p) => p.position,
            DocumentElement::Table(t) => t.position,
        }
    }

    /// Check if this is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, DocumentElement::Paragraph(_))
    }
}

/// Everything a document reader yields: two independently ordered lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Paragraphs in document order (including those inside tables)
    pub paragraphs: Vec<Paragraph>,

    /// Top-level tables in document order
    pub tables: Vec<Table>,
}

impl SourceDocument {
    /// Create an empty source document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Add a table.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        self.paragraphs.len() + self.tables.len()
    }

    /// Check if the document has no elements.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_with_label() {
        let p = Paragraph::new("  Nauda  ", 0).with_list_label("12.");
        assert_eq!(p.display_text(), "12. Nauda");
    }

    #[test]
    fn test_display_text_without_label() {
        let p = Paragraph::new(" Bilance\n", 0);
        assert_eq!(p.display_text(), "Bilance");

        let p = Paragraph::new("Bilance", 0).with_list_label("");
        assert_eq!(p.display_text(), "Bilance");
    }

    #[test]
    fn test_table_builder() {
        let table = Table::new(10)
            .with_row(["", "2023", "2022"])
            .with_row(["Nauda", "60", "50"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1].cells[0], "Nauda");
        assert_eq!(DocumentElement::Table(table).position(), 10);
    }
}
