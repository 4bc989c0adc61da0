//! Interleaving of the paragraph and table lists by document position.

use crate::model::{DocumentElement, Paragraph, SourceDocument, Table};
use std::iter::Peekable;

/// Single forward pass over two position-ordered lists.
///
/// At equal positions the paragraph is emitted first.
pub struct MergedStream<P, T>
where
    P: Iterator<Item = Paragraph>,
    T: Iterator<Item = Table>,
{
    paragraphs: Peekable<P>,
    tables: Peekable<T>,
}

impl<P, T> MergedStream<P, T>
where
    P: Iterator<Item = Paragraph>,
    T: Iterator<Item = Table>,
{
    /// Create a merged stream from two ordered iterators.
    pub fn new(paragraphs: P, tables: T) -> Self {
        Self {
            paragraphs: paragraphs.peekable(),
            tables: tables.peekable(),
        }
    }
}

impl<P, T> Iterator for MergedStream<P, T>
where
    P: Iterator<Item = Paragraph>,
    T: Iterator<Item = Table>,
{
    type Item = DocumentElement;

    fn next(&mut self) -> Option<Self::Item> {
        let take_paragraph = match (self.paragraphs.peek(), self.tables.peek()) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(p), Some(t)) => p.position <= t.position,
        };

        if take_paragraph {
            self.paragraphs.next().map(DocumentElement::Paragraph)
        } else {
            self.tables.next().map(DocumentElement::Table)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (p_lo, p_hi) = self.paragraphs.size_hint();
        let (t_lo, t_hi) = self.tables.size_hint();
        let hi = match (p_hi, t_hi) {
            (Some(a), Some(b)) => a.checked_add(b),
            _ => None,
        };
        (p_lo.saturating_add(t_lo), hi)
    }
}

/// Merge a source document into one position-ordered element stream.
pub fn merge_stream(
    source: SourceDocument,
) -> MergedStream<std::vec::IntoIter<Paragraph>, std::vec::IntoIter<Table>> {
    MergedStream::new(source.paragraphs.into_iter(), source.tables.into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(source: SourceDocument) -> Vec<(bool, u64)> {
        merge_stream(source)
            .map(|e| (e.is_paragraph(), e.position()))
            .collect()
    }

    #[test]
    fn test_interleaves_by_position() {
        let mut source = SourceDocument::new();
        source.add_paragraph(Paragraph::new("a", 0));
        source.add_paragraph(Paragraph::new("b", 40));
        source.add_table(Table::new(10));
        source.add_table(Table::new(50));

        assert_eq!(
            positions(source),
            vec![(true, 0), (false, 10), (true, 40), (false, 50)]
        );
    }

    #[test]
    fn test_paragraph_wins_ties() {
        let mut source = SourceDocument::new();
        source.add_table(Table::new(5));
        source.add_paragraph(Paragraph::new("cell", 5).in_table());

        assert_eq!(positions(source), vec![(true, 5), (false, 5)]);
    }

    #[test]
    fn test_one_list_exhausted() {
        let mut source = SourceDocument::new();
        source.add_table(Table::new(1));
        source.add_table(Table::new(2));

        assert_eq!(positions(source), vec![(false, 1), (false, 2)]);
        assert_eq!(merge_stream(SourceDocument::new()).count(), 0);
    }
}
