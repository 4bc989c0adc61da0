//! Paragraph-style numbering from `word/styles.xml`.
//!
//! Numbered headings usually carry no `w:numPr` of their own: the paragraph
//! names a style (`w:pStyle`) and the style, or one it is based on, holds the
//! list instance and level.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

use super::numbering::{attr, attr_u32, NumberingError, MAX_LEVEL};

/// Longest `w:basedOn` chain followed.
const MAX_BASED_ON_DEPTH: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct StyleEntry {
    num_id: Option<u32>,
    level: Option<u8>,
    based_on: Option<String>,
}

/// List numbering attached to paragraph styles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleNumbering {
    styles: HashMap<String, StyleEntry>,
}

impl StyleNumbering {
    /// No styled numbering at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the contents of `word/styles.xml`.
    pub fn parse(xml: &str) -> Result<Self, NumberingError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut parsed = Self::default();
        let mut current: Option<(String, StyleEntry)> = None;
        let mut in_props = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"w:style" => {
                        current = attr(e, b"w:styleId").map(|id| (id, StyleEntry::default()));
                    }
                    b"w:pPr" if current.is_some() => in_props = true,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    let Some((_, entry)) = current.as_mut() else {
                        buf.clear();
                        continue;
                    };
                    match e.name().as_ref() {
                        b"w:basedOn" => entry.based_on = attr(e, b"w:val"),
                        b"w:numId" if in_props => entry.num_id = attr_u32(e, b"w:val"),
                        b"w:ilvl" if in_props => {
                            entry.level = attr_u32(e, b"w:val")
                                .map(|l| l.min(u32::from(MAX_LEVEL)) as u8);
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"w:pPr" => in_props = false,
                    b"w:style" => {
                        if let Some((id, entry)) = current.take() {
                            parsed.styles.insert(id, entry);
                        }
                        in_props = false;
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(NumberingError::MalformedStyles(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        log::debug!(
            "Styles: {} parsed, {} with list numbering",
            parsed.styles.len(),
            parsed.styles.values().filter(|s| s.num_id.is_some()).count()
        );
        Ok(parsed)
    }

    /// List instance and level a paragraph style applies.
    ///
    /// The nearest style in the `w:basedOn` chain that names an instance
    /// wins; `numId` 0 switches numbering off.
    pub fn resolve(&self, style_id: &str) -> Option<(u32, u8)> {
        let mut num_id = None;
        let mut level = None;
        let mut next = Some(style_id);

        for _ in 0..MAX_BASED_ON_DEPTH {
            let Some(entry) = next.and_then(|id| self.styles.get(id)) else {
                break;
            };
            num_id = num_id.or(entry.num_id);
            level = level.or(entry.level);
            if num_id.is_some() && level.is_some() {
                break;
            }
            next = entry.based_on.as_deref();
        }

        num_id
            .filter(|&id| id != 0)
            .map(|id| (id, level.unwrap_or(0)))
    }

    /// Check if no style was read.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
