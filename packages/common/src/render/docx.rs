//! Reader for WordprocessingML (`.docx`) packages.
//!
//! Only the parts needed for a faithful reading view are interpreted: the main
//! document body, hyperlink relationships and list numbering definitions.
//! Everything else in the package (styles, images, headers, comments) is
//! ignored.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use super::error::RenderError;

const DOCUMENT_PART: &str = "word/document.xml";
const RELS_PART: &str = "word/_rels/document.xml.rels";
const NUMBERING_PART: &str = "word/numbering.xml";

/// Maximum decompressed size of a single package part (64 MiB).
const MAX_PART_SIZE: u64 = 64 * 1024 * 1024;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Paragraph {
    /// Heading level 1-6 when the paragraph uses a heading or title style.
    pub heading: Option<u8>,
    pub list: Option<ListItem>,
    pub inlines: Vec<Inline>,
}

impl Paragraph {
    pub fn is_empty(&self) -> bool {
        self.inlines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItem {
    /// Zero-based nesting level.
    pub level: u8,
    pub ordered: bool,
}

/// Rows of cells; each cell holds its own blocks.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<Vec<Block>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text { text: String, style: RunStyle },
    Break,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub superscript: bool,
    pub subscript: bool,
    pub link: Option<String>,
}

/// Parse a `.docx` package.
pub fn parse(bytes: &[u8]) -> Result<Document, RenderError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let document = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or(RenderError::MissingPart(DOCUMENT_PART))?;
    let links = match read_part(&mut archive, RELS_PART)? {
        Some(xml) => parse_hyperlink_rels(&xml)?,
        None => HashMap::new(),
    };
    let numbering = match read_part(&mut archive, NUMBERING_PART)? {
        Some(xml) => Numbering::parse(&xml)?,
        None => Numbering::default(),
    };

    let ctx = Context { links, numbering };
    parse_document(&document, &ctx)
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &'static str,
) -> Result<Option<String>, RenderError> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut buf = Vec::new();
    file.take(MAX_PART_SIZE + 1).read_to_end(&mut buf)?;
    if buf.len() as u64 > MAX_PART_SIZE {
        return Err(RenderError::PartTooLarge {
            part: name,
            limit: MAX_PART_SIZE,
        });
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| RenderError::Xml(format!("{name} is not UTF-8: {e}")))
}

struct Context {
    /// Relationship id -> hyperlink target.
    links: HashMap<String, String>,
    numbering: Numbering,
}

impl Context {
    fn hyperlink_target(&self, e: &BytesStart<'_>) -> Result<Option<String>, RenderError> {
        if let Some(id) = attr(e, b"id")? {
            return Ok(self.links.get(&id).cloned());
        }
        Ok(attr(e, b"anchor")?.map(|anchor| format!("#{anchor}")))
    }
}

/// List numbering definitions from `word/numbering.xml`.
#[derive(Debug, Default)]
struct Numbering {
    /// numId -> abstractNumId
    instances: HashMap<String, String>,
    /// (abstractNumId, level) -> numFmt
    formats: HashMap<(String, u8), String>,
}

impl Numbering {
    fn parse(xml: &str) -> Result<Self, RenderError> {
        let mut numbering = Self::default();
        let mut reader = Reader::from_str(xml);

        let mut abstract_id: Option<String> = None;
        let mut level: Option<u8> = None;
        let mut num_id: Option<String> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"abstractNum" => abstract_id = attr(&e, b"abstractNumId")?,
                    b"lvl" => level = attr(&e, b"ilvl")?.and_then(|v| v.parse().ok()),
                    b"num" => num_id = attr(&e, b"numId")?,
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"numFmt" => {
                        if let (Some(abs), Some(lvl), Some(fmt)) =
                            (&abstract_id, level, attr(&e, b"val")?)
                        {
                            numbering.formats.insert((abs.clone(), lvl), fmt);
                        }
                    }
                    b"abstractNumId" => {
                        if let (Some(num), Some(abs)) = (&num_id, attr(&e, b"val")?) {
                            numbering.instances.insert(num.clone(), abs);
                        }
                    }
                    _ => {}
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"abstractNum" => abstract_id = None,
                    b"lvl" => level = None,
                    b"num" => num_id = None,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(numbering)
    }

    /// Unknown numbering is treated as a bulleted list.
    fn is_ordered(&self, num_id: &str, level: u8) -> bool {
        self.instances
            .get(num_id)
            .and_then(|abs| self.formats.get(&(abs.clone(), level)))
            .is_some_and(|fmt| fmt != "bullet" && fmt != "none")
    }
}

fn parse_hyperlink_rels(xml: &str) -> Result<HashMap<String, String>, RenderError> {
    let mut links = HashMap::new();
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                let is_hyperlink = attr(&e, b"Type")?.is_some_and(|t| t.ends_with("/hyperlink"));
                if let (true, Some(id), Some(target)) =
                    (is_hyperlink, attr(&e, b"Id")?, attr(&e, b"Target")?)
                {
                    links.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(links)
}

fn parse_document(xml: &str, ctx: &Context) -> Result<Document, RenderError> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"body" => {
                let blocks = parse_blocks(&mut reader, ctx, b"body")?;
                return Ok(Document { blocks });
            }
            Event::Empty(e) if e.local_name().as_ref() == b"body" => {
                return Ok(Document::default());
            }
            Event::Eof => return Err(RenderError::Xml("document has no body".into())),
            _ => {}
        }
    }
}

/// Read block-level content until the closing tag named `end`.
fn parse_blocks(
    reader: &mut Reader<&[u8]>,
    ctx: &Context,
    end: &[u8],
) -> Result<Vec<Block>, RenderError> {
    let mut blocks = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => blocks.push(Block::Paragraph(parse_paragraph(reader, ctx)?)),
                b"tbl" => blocks.push(Block::Table(parse_table(reader, ctx)?)),
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                blocks.push(Block::Paragraph(Paragraph::default()));
            }
            Event::End(e) if e.local_name().as_ref() == end => break,
            Event::Eof => return Err(unexpected_eof(end)),
            _ => {}
        }
    }

    Ok(blocks)
}

fn parse_table(reader: &mut Reader<&[u8]>, ctx: &Context) -> Result<Table, RenderError> {
    let mut table = Table::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tr" => table.rows.push(Vec::new()),
                b"tc" => {
                    let cell = parse_blocks(reader, ctx, b"tc")?;
                    match table.rows.last_mut() {
                        Some(row) => row.push(cell),
                        None => table.rows.push(vec![cell]),
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"tbl" => break,
            Event::Eof => return Err(unexpected_eof(b"tbl")),
            _ => {}
        }
    }

    Ok(table)
}

fn parse_paragraph(reader: &mut Reader<&[u8]>, ctx: &Context) -> Result<Paragraph, RenderError> {
    let mut paragraph = Paragraph::default();
    let mut style_id: Option<String> = None;
    let mut num_id: Option<String> = None;
    let mut level: u8 = 0;

    let mut in_ppr = false;
    let mut in_rpr = false;
    let mut in_text = false;
    let mut style = RunStyle::default();
    let mut link: Option<String> = None;
    // Text boxes nest whole paragraphs inside a run.
    let mut nested = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => nested += 1,
                b"pPr" => in_ppr = true,
                b"rPr" => in_rpr = true,
                b"r" => {
                    style = RunStyle {
                        link: link.clone(),
                        ..RunStyle::default()
                    }
                }
                b"t" => in_text = true,
                b"hyperlink" => link = ctx.hyperlink_target(&e)?,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"pStyle" if in_ppr && !in_rpr => style_id = attr(&e, b"val")?,
                b"numId" if in_ppr => num_id = attr(&e, b"val")?,
                b"ilvl" if in_ppr => {
                    level = attr(&e, b"val")?.and_then(|v| v.parse().ok()).unwrap_or(0)
                }
                b"b" if in_rpr => style.bold = toggle(&e)?,
                b"i" if in_rpr => style.italic = toggle(&e)?,
                b"strike" | b"dstrike" if in_rpr => style.strike = toggle(&e)?,
                b"vertAlign" if in_rpr => {
                    let align = attr(&e, b"val")?;
                    style.superscript = align.as_deref() == Some("superscript");
                    style.subscript = align.as_deref() == Some("subscript");
                }
                b"tab" if !in_ppr => push_text(&mut paragraph.inlines, "\t", &style),
                b"br" | b"cr" if !in_ppr => paragraph.inlines.push(Inline::Break),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape()?;
                push_text(&mut paragraph.inlines, &text, &style);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"p" if nested == 0 => break,
                b"p" => nested -= 1,
                b"pPr" => in_ppr = false,
                b"rPr" => in_rpr = false,
                b"t" => in_text = false,
                b"hyperlink" => link = None,
                _ => {}
            },
            Event::Eof => return Err(unexpected_eof(b"p")),
            _ => {}
        }
    }

    paragraph.heading = style_id.as_deref().and_then(heading_level);
    paragraph.list = num_id
        .filter(|id| id != "0")
        .map(|id| ListItem {
            level,
            ordered: ctx.numbering.is_ordered(&id, level),
        });

    Ok(paragraph)
}

/// Append text, merging with the previous run when the formatting matches.
fn push_text(inlines: &mut Vec<Inline>, text: &str, style: &RunStyle) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text {
        text: prev,
        style: prev_style,
    }) = inlines.last_mut()
        && prev_style == style
    {
        prev.push_str(text);
        return;
    }
    inlines.push(Inline::Text {
        text: text.to_string(),
        style: style.clone(),
    });
}

fn heading_level(style_id: &str) -> Option<u8> {
    let id = style_id.to_ascii_lowercase();
    if id == "title" {
        return Some(1);
    }
    let level: u8 = id.strip_prefix("heading")?.trim().parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Value of the attribute whose local name is `local`.
fn attr(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, RenderError> {
    for a in e.attributes() {
        let a = a?;
        if a.key.local_name().as_ref() == local {
            return Ok(Some(a.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// On/off run property: present means on unless `w:val` says otherwise.
fn toggle(e: &BytesStart<'_>) -> Result<bool, RenderError> {
    Ok(!matches!(
        attr(e, b"val")?.as_deref(),
        Some("0" | "false" | "off" | "none")
    ))
}

fn unexpected_eof(inside: &[u8]) -> RenderError {
    RenderError::Xml(format!(
        "unexpected end of document inside <{}>",
        String::from_utf8_lossy(inside)
    ))
}
