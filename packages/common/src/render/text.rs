use super::docx::{Block, Document, Inline};

/// Flatten a parsed document to plain text, one blank line after each paragraph.
pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    write_blocks(&mut out, &doc.blocks);
    out
}

fn write_blocks(out: &mut String, blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => {
                for inline in &p.inlines {
                    match inline {
                        Inline::Text { text, .. } => out.push_str(text),
                        Inline::Break => out.push('\n'),
                    }
                }
                out.push_str("\n\n");
            }
            Block::Table(table) => {
                for cell in table.rows.iter().flatten() {
                    write_blocks(out, cell);
                }
            }
        }
    }
}
