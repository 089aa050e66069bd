use std::fmt::Write;

use quick_xml::escape::escape;

use super::docx::{Block, Document, Inline, ListItem, Paragraph, RunStyle, Table};

/// Render a parsed document as an HTML fragment.
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    write_blocks(&mut out, &doc.blocks);
    out
}

/// Wrap a fragment in a minimal UTF-8 HTML page.
pub fn envelope(fragment: &str) -> String {
    format!("<html><head><meta charset=\"utf-8\"></head><body>{fragment}</body></html>")
}

fn write_blocks(out: &mut String, blocks: &[Block]) {
    let mut lists = OpenLists::default();

    for block in blocks {
        match block {
            Block::Paragraph(p) if p.is_empty() => {}
            Block::Paragraph(p) => match p.list {
                Some(item) => {
                    lists.item(out, item);
                    write_inlines(out, &p.inlines);
                }
                None => {
                    lists.close_all(out);
                    write_paragraph(out, p);
                }
            },
            Block::Table(table) => {
                lists.close_all(out);
                write_table(out, table);
            }
        }
    }

    lists.close_all(out);
}

fn write_paragraph(out: &mut String, p: &Paragraph) {
    let tag = match p.heading {
        Some(level) => format!("h{level}"),
        None => "p".to_string(),
    };
    let _ = write!(out, "<{tag}>");
    write_inlines(out, &p.inlines);
    let _ = write!(out, "</{tag}>");
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str("<table>");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            write_blocks(out, cell);
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
}

fn write_inlines(out: &mut String, inlines: &[Inline]) {
    let mut open_link: Option<&str> = None;

    for inline in inlines {
        let link = match inline {
            Inline::Text { style, .. } => style.link.as_deref(),
            Inline::Break => open_link,
        };
        if link != open_link {
            if open_link.is_some() {
                out.push_str("</a>");
            }
            if let Some(href) = link {
                let _ = write!(out, "<a href=\"{}\">", escape(href));
            }
            open_link = link;
        }

        match inline {
            Inline::Break => out.push_str("<br />"),
            Inline::Text { text, style } => {
                let tags = style_tags(style);
                for tag in &tags {
                    let _ = write!(out, "<{tag}>");
                }
                out.push_str(&escape(text.as_str()));
                for tag in tags.iter().rev() {
                    let _ = write!(out, "</{tag}>");
                }
            }
        }
    }

    if open_link.is_some() {
        out.push_str("</a>");
    }
}

fn style_tags(style: &RunStyle) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if style.bold {
        tags.push("strong");
    }
    if style.italic {
        tags.push("em");
    }
    if style.strike {
        tags.push("s");
    }
    if style.superscript {
        tags.push("sup");
    } else if style.subscript {
        tags.push("sub");
    }
    tags
}

/// Stack of open `<ul>`/`<ol>` elements, each possibly holding an open `<li>`.
#[derive(Default)]
struct OpenLists {
    stack: Vec<(bool, bool)>, // (ordered, li_open)
}

impl OpenLists {
    fn item(&mut self, out: &mut String, item: ListItem) {
        let depth = item.level as usize + 1;

        while self.stack.len() > depth {
            self.pop(out);
        }
        if self.stack.len() == depth
            && let Some(&(ordered, _)) = self.stack.last()
            && ordered != item.ordered
        {
            self.pop(out);
        }
        if self.stack.len() == depth
            && let Some(top) = self.stack.last_mut()
            && top.1
        {
            out.push_str("</li>");
            top.1 = false;
        }
        while self.stack.len() < depth {
            out.push_str(if item.ordered { "<ol>" } else { "<ul>" });
            self.stack.push((item.ordered, false));
        }

        out.push_str("<li>");
        if let Some(top) = self.stack.last_mut() {
            top.1 = true;
        }
    }

    fn pop(&mut self, out: &mut String) {
        if let Some((ordered, li_open)) = self.stack.pop() {
            if li_open {
                out.push_str("</li>");
            }
            out.push_str(if ordered { "</ol>" } else { "</ul>" });
        }
    }

    fn close_all(&mut self, out: &mut String) {
        while !self.stack.is_empty() {
            self.pop(out);
        }
    }
}
