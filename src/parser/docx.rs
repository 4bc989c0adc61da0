//! Word document reader built on zip and quick-xml.
//!
//! Walks `word/document.xml` once and produces the two flat lists the
//! classifier merges: every paragraph (including those inside table cells,
//! flagged as such) and every top-level table. Positions come from a running
//! character cursor, so a table's position equals the position of its first
//! cell paragraph.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::detect::{check_magic, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::{Paragraph, SourceDocument, Table, TableRow};

use super::numbering::{
    attr, attr_u32, ListCounters, NumberingDefinitions, NumberingError, MAX_LEVEL,
};
use super::options::{ErrorMode, ParseOptions};
use super::styles::StyleNumbering;

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// List numbering part (optional).
pub const NUMBERING_PART: &str = "word/numbering.xml";

/// Style definitions part (optional).
pub const STYLES_PART: &str = "word/styles.xml";

/// DOCX document parser.
#[derive(Debug)]
pub struct DocxParser {
    document_xml: String,
    numbering: NumberingDefinitions,
    styles: StyleNumbering,
    options: ParseOptions,
}

/// Read and parse an optional numbering-related part.
///
/// A missing part yields empty definitions. An unreadable one is fatal in
/// strict mode and ignored with a warning in lenient mode.
fn load_optional<R, T, F>(
    archive: &mut ZipArchive<R>,
    part: &str,
    mode: ErrorMode,
    parse: F,
) -> Result<T>
where
    R: Read + Seek,
    T: Default,
    F: FnOnce(&str) -> std::result::Result<T, NumberingError>,
{
    let loaded = read_part(archive, part).and_then(|xml| match xml {
        Some(xml) => parse(&xml).map_err(|e| Error::Numbering(e.to_string())),
        None => Ok(T::default()),
    });

    match loaded {
        Ok(parsed) => Ok(parsed),
        Err(e) if mode == ErrorMode::Lenient => {
            log::warn!("Ignoring {}: {}", part, e);
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

/// Read a part into a string; `None` if the archive lacks it.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

impl DocxParser {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a DOCX file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        detect_format_from_path(path)?;
        let data = std::fs::read(path)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Parse a DOCX from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a DOCX from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        check_magic(data)?;
        let mut archive = ZipArchive::new(Cursor::new(data))?;

        let document_xml = read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| Error::MissingPart(DOCUMENT_PART.to_string()))?;

        let (numbering, styles) = if options.numbering {
            (
                load_optional(&mut archive, NUMBERING_PART, options.error_mode, NumberingDefinitions::parse)?,
                load_optional(&mut archive, STYLES_PART, options.error_mode, StyleNumbering::parse)?,
            )
        } else {
            (NumberingDefinitions::empty(), StyleNumbering::empty())
        };

        Ok(Self {
            document_xml,
            numbering,
            styles,
            options,
        })
    }

    /// Parse a DOCX from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a DOCX from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Numbering definitions in use.
    pub fn numbering(&self) -> &NumberingDefinitions {
        &self.numbering
    }

    /// Style numbering in use.
    pub fn styles(&self) -> &StyleNumbering {
        &self.styles
    }

    /// Parse the body into paragraphs and tables.
    pub fn parse(&self) -> Result<SourceDocument> {
        let numbering = self.options.numbering.then_some(&self.numbering);
        let mut walker = BodyWalker::new(numbering, &self.styles);

        let mut reader = Reader::from_str(&self.document_xml);
        reader.trim_text(false);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => walker.start(e, false),
                Event::Empty(ref e) => walker.start(e, true),
                Event::End(ref e) => walker.end(e.name().as_ref()),
                Event::Text(ref e) => {
                    if walker.collecting_text() {
                        walker.push_text(&e.unescape()?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let document = walker.finish();
        log::debug!(
            "Parsed {} paragraphs and {} tables",
            document.paragraphs.len(),
            document.tables.len()
        );
        Ok(document)
    }
}

#[derive(Debug)]
struct PendingParagraph {
    position: u64,
    text: String,
    style_id: Option<String>,
    num_id: Option<u32>,
    level: Option<u8>,
}

impl PendingParagraph {
    /// List instance and level: direct `w:numPr` first, then the paragraph style.
    fn list(&self, styles: &StyleNumbering) -> Option<(u32, u8)> {
        match self.num_id {
            Some(0) => None,
            Some(num_id) => Some((num_id, self.level.unwrap_or(0))),
            None => {
                let (num_id, level) = styles.resolve(self.style_id.as_deref()?)?;
                Some((num_id, self.level.unwrap_or(level)))
            }
        }
    }
}

#[derive(Debug, Default)]
struct PendingTable {
    table: Table,
    row: Option<Vec<String>>,
    cell: Option<Vec<String>>,
}

/// Event-driven state of one pass over the document body.
#[derive(Debug)]
struct BodyWalker<'a> {
    numbering: Option<&'a NumberingDefinitions>,
    styles: &'a StyleNumbering,
    counters: ListCounters,
    document: SourceDocument,
    cursor: u64,
    paragraph: Option<PendingParagraph>,
    table: Option<PendingTable>,
    table_depth: usize,
    textbox_depth: usize,
    in_paragraph_props: bool,
    in_text: bool,
}

impl<'a> BodyWalker<'a> {
    fn new(numbering: Option<&'a NumberingDefinitions>, styles: &'a StyleNumbering) -> Self {
        Self {
            numbering,
            styles,
            counters: ListCounters::new(),
            document: SourceDocument::new(),
            cursor: 0,
            paragraph: None,
            table: None,
            table_depth: 0,
            textbox_depth: 0,
            in_paragraph_props: false,
            in_text: false,
        }
    }

    fn collecting_text(&self) -> bool {
        self.in_text && self.textbox_depth == 0 && self.paragraph.is_some()
    }

    fn push_text(&mut self, text: &str) {
        if let Some(p) = self.paragraph.as_mut() {
            p.text.push_str(text);
        }
    }

    fn push_char(&mut self, c: char) {
        if self.in_paragraph_props {
            return;
        }
        if let Some(p) = self.paragraph.as_mut() {
            p.text.push(c);
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, empty: bool) {
        let name = e.name();
        let name = name.as_ref();

        if self.textbox_depth > 0 {
            if name == b"w:txbxContent" && !empty {
                self.textbox_depth += 1;
            }
            return;
        }

        match name {
            b"w:txbxContent" if !empty => self.textbox_depth += 1,
            b"w:tbl" if !empty => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Some(PendingTable {
                        table: Table::new(self.cursor),
                        ..PendingTable::default()
                    });
                }
            }
            b"w:tr" if !empty && self.table_depth == 1 => {
                if let Some(t) = self.table.as_mut() {
                    t.row = Some(Vec::new());
                }
            }
            b"w:tc" if !empty && self.table_depth == 1 => {
                if let Some(t) = self.table.as_mut() {
                    t.cell = Some(Vec::new());
                }
            }
            b"w:p" => {
                self.paragraph = Some(PendingParagraph {
                    position: self.cursor,
                    text: String::new(),
                    style_id: None,
                    num_id: None,
                    level: None,
                });
                if empty {
                    self.finish_paragraph();
                }
            }
            b"w:pPr" if !empty && self.paragraph.is_some() => self.in_paragraph_props = true,
            b"w:pStyle" if self.in_paragraph_props => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.style_id = attr(e, b"w:val");
                }
            }
            b"w:numId" if self.in_paragraph_props => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.num_id = attr_u32(e, b"w:val");
                }
            }
            b"w:ilvl" if self.in_paragraph_props => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.level = attr_u32(e, b"w:val").map(|l| l.min(u32::from(MAX_LEVEL)) as u8);
                }
            }
            b"w:t" if !empty => self.in_text = true,
            b"w:tab" => self.push_char('\t'),
            b"w:br" | b"w:cr" => self.push_char('\n'),
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        if self.textbox_depth > 0 {
            if name == b"w:txbxContent" {
                self.textbox_depth -= 1;
            }
            return;
        }

        match name {
            b"w:t" => self.in_text = false,
            b"w:pPr" => self.in_paragraph_props = false,
            b"w:p" => self.finish_paragraph(),
            b"w:tc" if self.table_depth == 1 => {
                if let Some(t) = self.table.as_mut() {
                    if let (Some(cell), Some(row)) = (t.cell.take(), t.row.as_mut()) {
                        row.push(cell.join("\n"));
                    }
                }
            }
            b"w:tr" if self.table_depth == 1 => {
                if let Some(t) = self.table.as_mut() {
                    if let Some(row) = t.row.take() {
                        t.table.add_row(TableRow { cells: row });
                    }
                }
            }
            b"w:tbl" => {
                if self.table_depth == 1 {
                    if let Some(t) = self.table.take() {
                        self.document.add_table(t.table);
                    }
                    self.cursor += 1;
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(pending) = self.paragraph.take() else {
            return;
        };
        self.in_paragraph_props = false;
        self.in_text = false;

        let label = match (self.numbering, pending.list(self.styles)) {
            (Some(defs), Some((num_id, level))) => match self.counters.next_label(defs, num_id, level) {
                Ok(label) => Some(label),
                Err(e) => {
                    log::warn!("List label at position {} dropped: {}", pending.position, e);
                    None
                }
            },
            _ => None,
        };

        let within_table = self.table_depth > 0;
        if within_table {
            if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
                cell.push(pending.text.clone());
            }
        }

        self.cursor += pending.text.chars().count() as u64 + 1;

        let mut paragraph = Paragraph::new(pending.text, pending.position);
        if within_table {
            paragraph = paragraph.in_table();
        }
        if let Some(label) = label.filter(|l| !l.is_empty()) {
            paragraph = paragraph.with_list_label(label);
        }
        self.document.add_paragraph(paragraph);
    }

    fn finish(self) -> SourceDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn package(body: &str, parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.start_file(DOCUMENT_PART, options).unwrap();
        write!(zip, r#"<w:document {}><w:body>{}</w:body></w:document>"#, NS, body).unwrap();
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn docx(body: &str, numbering: Option<&str>) -> Vec<u8> {
        match numbering {
            Some(numbering) => package(body, &[(NUMBERING_PART, numbering)]),
            None => package(body, &[]),
        }
    }

    const NOTE_NUMBERING: &str = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
        <w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:start w:val="3"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl></w:abstractNum>
        <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
    </w:numbering>"#;

    const HEADING_STYLES: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
        <w:style w:type="paragraph" w:styleId="Heading2"><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr></w:style>
        <w:style w:type="paragraph" w:styleId="NoteTitle"><w:basedOn w:val="Heading2"/></w:style>
    </w:styles>"#;

    fn styled(style: &str, text: &str) -> String {
        format!(
            "<w:p><w:pPr><w:pStyle w:val=\"{}\"/></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>",
            style, text
        )
    }

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", text)
    }

    #[test]
    fn test_paragraphs_and_positions() {
        let data = docx(&format!("{}{}", para("Vadības ziņojums"), para("Teksts")), None);
        let doc = DocxParser::from_bytes(&data).unwrap().parse().unwrap();

        assert_eq!(doc.paragraphs.len(), 2);
        assert_eq!(doc.paragraphs[0].text, "Vadības ziņojums");
        assert_eq!(doc.paragraphs[0].position, 0);
        assert_eq!(doc.paragraphs[1].position, 17);
        assert!(doc.tables.is_empty());
    }

    #[test]
    fn test_table_cells_and_flags() {
        let body = format!(
            "{}<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}{}</w:tc></w:tr></w:tbl>{}",
            para("Bilance"),
            para("Nauda"),
            para("60"),
            para("50"),
            para("Pēc")
        );
        let doc = DocxParser::from_bytes(&docx(&body, None)).unwrap().parse().unwrap();

        assert_eq!(doc.tables.len(), 1);
        let table = &doc.tables[0];
        assert_eq!(table.position, 8);
        assert_eq!(table.rows[0].cells, vec!["Nauda".to_string(), "60\n50".to_string()]);

        assert!(doc.paragraphs[1].within_table);
        assert_eq!(doc.paragraphs[1].position, table.position);
        assert!(!doc.paragraphs[4].within_table);
        assert!(doc.paragraphs[4].position > doc.paragraphs[3].position);
    }

    #[test]
    fn test_nested_table_folds_into_cell() {
        let body = format!(
            "<w:tbl><w:tr><w:tc>{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>{}</w:tc></w:tr></w:tbl>",
            para("a"),
            para("b"),
            para("c")
        );
        let doc = DocxParser::from_bytes(&docx(&body, None)).unwrap().parse().unwrap();

        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0].rows.len(), 1);
        assert_eq!(doc.tables[0].rows[0].cells, vec!["a\nb\nc".to_string()]);
    }

    #[test]
    fn test_tabs_breaks_and_textboxes() {
        let body = concat!(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>",
            "<w:r><w:t>A</w:t><w:tab/><w:t>B</w:t><w:br/><w:t>C</w:t></w:r>",
            "<w:r><w:pict><v:textbox xmlns:v=\"urn:schemas-microsoft-com:vml\"><w:txbxContent>",
            "<w:p><w:r><w:t>hidden</w:t></w:r></w:p></w:txbxContent></v:textbox></w:pict></w:r></w:p>"
        );
        let doc = DocxParser::from_bytes(&docx(body, None)).unwrap().parse().unwrap();

        assert_eq!(doc.paragraphs.len(), 1);
        assert_eq!(doc.paragraphs[0].text, "A\tB\nC");
    }

    #[test]
    fn test_list_labels() {
        let numbering = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:start w:val="3"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl></w:abstractNum>
            <w:num w:numId="5"><w:abstractNumId w:val="0"/></w:num>
        </w:numbering>"#;
        let item = |text: &str| {
            format!(
                "<w:p><w:pPr><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"5\"/></w:numPr></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>",
                text
            )
        };
        let body = format!("{}{}{}", item("Nauda"), item("Krājumi"), para("Bez numura"));
        let doc = DocxParser::from_bytes(&docx(&body, Some(numbering)))
            .unwrap()
            .parse()
            .unwrap();

        assert_eq!(doc.paragraphs[0].display_text(), "3. Nauda");
        assert_eq!(doc.paragraphs[1].display_text(), "4. Krājumi");
        assert_eq!(doc.paragraphs[2].list_label, None);

        let plain = DocxParser::from_bytes_with_options(
            &docx(&body, Some(numbering)),
            ParseOptions::new().with_numbering(false),
        )
        .unwrap()
        .parse()
        .unwrap();
        assert_eq!(plain.paragraphs[0].display_text(), "Nauda");
    }

    #[test]
    fn test_style_numbered_headings() {
        let body = [
            styled("Heading2", "Nauda"),
            styled("NoteTitle", "Krājumi"),
            styled("Normal", "Teksts"),
            "<w:p><w:pPr><w:pStyle w:val=\"Heading2\"/><w:numPr><w:numId w:val=\"0\"/></w:numPr></w:pPr><w:r><w:t>Bez numura</w:t></w:r></w:p>".to_string(),
            styled("Heading2", "Debitori"),
        ]
        .concat();
        let data = package(
            &body,
            &[(NUMBERING_PART, NOTE_NUMBERING), (STYLES_PART, HEADING_STYLES)],
        );
        let parser = DocxParser::from_bytes(&data).unwrap();
        assert!(!parser.styles().is_empty());

        let doc = parser.parse().unwrap();
        assert_eq!(doc.paragraphs[0].display_text(), "3. Nauda");
        assert_eq!(doc.paragraphs[1].display_text(), "4. Krājumi");
        assert_eq!(doc.paragraphs[2].list_label, None);
        assert_eq!(doc.paragraphs[3].list_label, None);
        assert_eq!(doc.paragraphs[4].display_text(), "5. Debitori");
    }

    #[test]
    fn test_direct_numbering_overrides_style() {
        let numbering = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:start w:val="3"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl></w:abstractNum>
            <w:abstractNum w:abstractNumId="1"><w:lvl w:ilvl="0"><w:numFmt w:val="lowerLetter"/><w:lvlText w:val="%1)"/></w:lvl></w:abstractNum>
            <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
            <w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>
        </w:numbering>"#;
        let body = "<w:p><w:pPr><w:pStyle w:val=\"Heading2\"/><w:numPr><w:numId w:val=\"2\"/></w:numPr></w:pPr><w:r><w:t>Punkts</w:t></w:r></w:p>";
        let data = package(body, &[(NUMBERING_PART, numbering), (STYLES_PART, HEADING_STYLES)]);

        let doc = DocxParser::from_bytes(&data).unwrap().parse().unwrap();
        assert_eq!(doc.paragraphs[0].display_text(), "a) Punkts");
    }

    #[test]
    fn test_unknown_list_instance_falls_back() {
        let body = "<w:p><w:pPr><w:numPr><w:numId w:val=\"7\"/></w:numPr></w:pPr><w:r><w:t>Teksts</w:t></w:r></w:p>";
        let doc = DocxParser::from_bytes(&docx(body, None)).unwrap().parse().unwrap();
        assert_eq!(doc.paragraphs[0].display_text(), "Teksts");
    }

    #[test]
    fn test_broken_numbering_strict_and_lenient() {
        let data = docx(&para("x"), Some("<w:numbering><w:num></w:abstractNum>"));

        let lenient = DocxParser::from_bytes(&data).unwrap();
        assert!(lenient.numbering().is_empty());
        assert_eq!(lenient.parse().unwrap().paragraphs.len(), 1);

        let strict = DocxParser::from_bytes_with_options(&data, ParseOptions::new().strict());
        assert!(matches!(strict, Err(Error::Numbering(_))));
    }

    #[test]
    fn test_broken_styles_strict_and_lenient() {
        let body = styled("Heading2", "Nauda");
        let data = package(
            &body,
            &[(NUMBERING_PART, NOTE_NUMBERING), (STYLES_PART, "<w:styles><w:style></w:pPr>")],
        );

        let lenient = DocxParser::from_bytes(&data).unwrap();
        assert!(lenient.styles().is_empty());
        assert!(!lenient.numbering().is_empty());
        assert_eq!(lenient.parse().unwrap().paragraphs[0].display_text(), "Nauda");

        let strict = DocxParser::from_bytes_with_options(&data, ParseOptions::new().strict());
        assert!(matches!(strict, Err(Error::Numbering(ref msg)) if msg.contains("styles.xml")));
    }

    #[test]
    fn test_missing_document_part() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/styles.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"<w:styles/>").unwrap();
        let data = zip.finish().unwrap().into_inner();

        let result = DocxParser::from_bytes(&data);
        assert!(matches!(result, Err(Error::MissingPart(ref part)) if part == DOCUMENT_PART));
    }

    #[test]
    fn test_not_a_zip() {
        let result = DocxParser::from_bytes(b"plain text, not a package");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }
}
