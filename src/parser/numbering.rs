//! List numbering from `word/numbering.xml`.
//!
//! Word stores list numbers as definitions, not text: a paragraph names a
//! numbering instance (`w:numId`) and a level (`w:ilvl`), the instance points
//! at an abstract definition, and the level carries a format and a `w:lvlText`
//! pattern such as `"%1.%2."`. The label a reader sees is produced by counting
//! paragraphs per instance and rendering the pattern.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Deepest list level Word supports.
pub const MAX_LEVEL: u8 = 8;

/// Failures while reading or applying numbering definitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumberingError {
    /// numbering.xml is not well-formed.
    #[error("malformed numbering.xml: {0}")]
    Malformed(String),

    /// styles.xml is not well-formed.
    #[error("malformed styles.xml: {0}")]
    MalformedStyles(String),

    /// A paragraph references an instance that is not defined.
    #[error("numbering instance {0} is not defined")]
    UnknownInstance(u32),

    /// The instance's abstract definition lacks the requested level.
    #[error("numbering instance {num_id} has no level {level}")]
    UnknownLevel {
        /// Instance id
        num_id: u32,
        /// Requested level
        level: u8,
    },
}

/// Number format of a list level (`w:numFmt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumFormat {
    /// 1, 2, 3
    #[default]
    Decimal,
    /// 01, 02, 03
    DecimalZero,
    /// a, b, c
    LowerLetter,
    /// A, B, C
    UpperLetter,
    /// i, ii, iii
    LowerRoman,
    /// I, II, III
    UpperRoman,
    /// Symbol from `w:lvlText`
    Bullet,
    /// No label
    None,
}

impl NumFormat {
    /// Parse a `w:numFmt` value. Unknown formats fall back to decimal.
    pub fn from_xml(value: &str) -> Self {
        match value {
            "decimalZero" => Self::DecimalZero,
            "lowerLetter" => Self::LowerLetter,
            "upperLetter" => Self::UpperLetter,
            "lowerRoman" => Self::LowerRoman,
            "upperRoman" => Self::UpperRoman,
            "bullet" => Self::Bullet,
            "none" => Self::None,
            _ => Self::Decimal,
        }
    }

    /// Render a counter value in this format.
    pub fn render(&self, value: u32) -> String {
        match self {
            Self::Decimal => value.to_string(),
            Self::DecimalZero => format!("{:02}", value),
            Self::LowerLetter => letters(value).to_lowercase(),
            Self::UpperLetter => letters(value),
            Self::LowerRoman => roman(value).to_lowercase(),
            Self::UpperRoman => roman(value),
            Self::Bullet | Self::None => String::new(),
        }
    }
}

/// Word's letter numbering: A..Z, then AA..ZZ, then AAA..
fn letters(value: u32) -> String {
    if value == 0 {
        return String::new();
    }
    let letter = char::from(b'A' + ((value - 1) % 26) as u8);
    let repeat = ((value - 1) / 26 + 1) as usize;
    std::iter::repeat(letter).take(repeat).collect()
}

fn roman(mut value: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (n, numeral) in NUMERALS {
        while value >= n {
            out.push_str(numeral);
            value -= n;
        }
    }
    out
}

/// One `w:lvl` of an abstract definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Counter format
    pub format: NumFormat,
    /// First counter value
    pub start: u32,
    /// Label pattern with `%1`..`%9` placeholders
    pub text: String,
}

impl Default for LevelDefinition {
    fn default() -> Self {
        Self {
            format: NumFormat::Decimal,
            start: 1,
            text: String::new(),
        }
    }
}

/// Parsed numbering definitions of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingDefinitions {
    /// numId → abstractNumId
    instances: HashMap<u32, u32>,
    /// abstractNumId → level → definition
    abstracts: HashMap<u32, HashMap<u8, LevelDefinition>>,
    /// (numId, level) → start override
    start_overrides: HashMap<(u32, u8), u32>,
}

pub(super) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

pub(super) fn attr_u32(e: &BytesStart<'_>, key: &[u8]) -> Option<u32> {
    attr(e, key).and_then(|v| v.trim().parse().ok())
}

impl NumberingDefinitions {
    /// Definitions without any list.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the contents of `word/numbering.xml`.
    pub fn parse(xml: &str) -> Result<Self, NumberingError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut defs = Self::default();
        let mut abstract_id: Option<u32> = None;
        let mut level: Option<(u8, LevelDefinition)> = None;
        let mut num_id: Option<u32> = None;
        let mut override_level: Option<u8> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"w:abstractNum" => {
                        abstract_id = attr_u32(e, b"w:abstractNumId");
                    }
                    b"w:lvl" if abstract_id.is_some() => {
                        let ilvl = attr_u32(e, b"w:ilvl").unwrap_or(0).min(u32::from(MAX_LEVEL));
                        level = Some((ilvl as u8, LevelDefinition::default()));
                    }
                    b"w:start" => {
                        if let (Some((_, def)), Some(start)) = (level.as_mut(), attr_u32(e, b"w:val")) {
                            def.start = start;
                        }
                    }
                    b"w:numFmt" => {
                        if let (Some((_, def)), Some(fmt)) = (level.as_mut(), attr(e, b"w:val")) {
                            def.format = NumFormat::from_xml(&fmt);
                        }
                    }
                    b"w:lvlText" => {
                        if let (Some((_, def)), Some(text)) = (level.as_mut(), attr(e, b"w:val")) {
                            def.text = text;
                        }
                    }
                    b"w:num" => {
                        num_id = attr_u32(e, b"w:numId");
                    }
                    b"w:abstractNumId" => {
                        if let (Some(id), Some(target)) = (num_id, attr_u32(e, b"w:val")) {
                            defs.instances.insert(id, target);
                        }
                    }
                    b"w:lvlOverride" => {
                        override_level = attr_u32(e, b"w:ilvl").map(|l| l.min(u32::from(MAX_LEVEL)) as u8);
                    }
                    b"w:startOverride" => {
                        if let (Some(id), Some(ilvl), Some(start)) =
                            (num_id, override_level, attr_u32(e, b"w:val"))
                        {
                            defs.start_overrides.insert((id, ilvl), start);
                        }
                    }
                    _ => {}
                },
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"w:lvl" => {
                        if let (Some(id), Some((ilvl, def))) = (abstract_id, level.take()) {
                            defs.abstracts.entry(id).or_default().insert(ilvl, def);
                        }
                    }
                    b"w:abstractNum" => abstract_id = None,
                    b"w:num" => num_id = None,
                    b"w:lvlOverride" => override_level = None,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(NumberingError::Malformed(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        log::debug!(
            "Numbering: {} instances, {} abstract definitions",
            defs.instances.len(),
            defs.abstracts.len()
        );
        Ok(defs)
    }

    /// Level definition of an instance.
    pub fn level(&self, num_id: u32, level: u8) -> Result<&LevelDefinition, NumberingError> {
        let abstract_id = self
            .instances
            .get(&num_id)
            .ok_or(NumberingError::UnknownInstance(num_id))?;
        self.abstracts
            .get(abstract_id)
            .and_then(|levels| levels.get(&level))
            .ok_or(NumberingError::UnknownLevel { num_id, level })
    }

    /// First counter value of an instance level, honouring overrides.
    fn start(&self, num_id: u32, level: u8) -> u32 {
        self.start_overrides
            .get(&(num_id, level))
            .copied()
            .or_else(|| self.level(num_id, level).ok().map(|def| def.start))
            .unwrap_or(1)
    }

    /// Number of defined instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Check if no list is defined.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Running list counters of one document pass.
#[derive(Debug, Clone, Default)]
pub struct ListCounters {
    counters: HashMap<(u32, u8), u32>,
}

impl ListCounters {
    /// Create counters starting from nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter of `(num_id, level)` and render its label.
    ///
    /// Deeper levels of the same instance restart. An empty label is
    /// returned for `none` formats and empty patterns.
    pub fn next_label(
        &mut self,
        defs: &NumberingDefinitions,
        num_id: u32,
        level: u8,
    ) -> Result<String, NumberingError> {
        let def = defs.level(num_id, level)?;

        let value = match self.counters.get(&(num_id, level)) {
            Some(current) => current + 1,
            None => defs.start(num_id, level),
        };
        self.counters.insert((num_id, level), value);
        self.counters
            .retain(|&(id, l), _| id != num_id || l <= level);

        if def.format == NumFormat::None {
            return Ok(String::new());
        }
        if def.format == NumFormat::Bullet {
            return Ok(def.text.clone());
        }

        let mut label = def.text.clone();
        for placeholder in (0..=level).rev() {
            let token = format!("%{}", placeholder + 1);
            if !label.contains(&token) {
                continue;
            }
            let rendered = if placeholder == level {
                def.format.render(value)
            } else {
                let outer = defs.level(num_id, placeholder)?;
                let outer_value = self
                    .counters
                    .get(&(num_id, placeholder))
                    .copied()
                    .unwrap_or_else(|| defs.start(num_id, placeholder));
                outer.format.render(outer_value)
            };
            label = label.replace(&token, &rendered);
        }
        Ok(label)
    }
}
