//! DOCX encoder.
//!
//! The stored HTML is reduced to headings (levels 1 to 3), paragraphs and list
//! items; every other element is dropped. The package is written with `zip`
//! and hand-built WordprocessingML parts.

mod parts;

use std::collections::HashMap;
use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::html::{self, Block};
use crate::domain::export::{ExportFormat, WATERMARK_TEXT};
use crate::domain::ports::{DocumentEncoder, EncodeError, EncodeInput};

use parts::escape_xml;

/// Failure while building the DOCX package.
#[derive(Debug, thiserror::Error)]
pub enum DocxEncodeError {
    #[error("docx archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("docx write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run text with line breaks turned into `w:br`.
fn run(text: &str) -> String {
    let mut xml = String::from("<w:r>");
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            xml.push_str("<w:br/>");
        }
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&escape_xml(line));
        xml.push_str("</w:t>");
    }
    xml.push_str("</w:r>");
    xml
}

fn paragraph(properties: &str, text: &str) -> String {
    let properties = if properties.is_empty() {
        String::new()
    } else {
        format!("<w:pPr>{properties}</w:pPr>")
    };
    format!("<w:p>{properties}{}</w:p>", run(text))
}

/// Body paragraphs and the number of ordered lists they reference.
#[derive(Debug, Default)]
struct Body {
    xml: String,
    ordered_lists: usize,
}

fn body(blocks: &[Block]) -> Body {
    let mut out = Body::default();
    let mut numbering: HashMap<usize, usize> = HashMap::new();
    for block in blocks {
        match block {
            Block::Heading { level, text } if (1..=3).contains(level) => {
                let style = format!(r#"<w:pStyle w:val="Heading{level}"/>"#);
                out.xml.push_str(&paragraph(&style, text));
            }
            Block::Paragraph(text) => out.xml.push_str(&paragraph("", text)),
            Block::ListItem {
                ordered: false,
                text,
                ..
            } => {
                out.xml
                    .push_str(&paragraph(r#"<w:pStyle w:val="ListBullet"/>"#, text));
            }
            Block::ListItem {
                ordered: true,
                list,
                text,
                ..
            } => {
                let next = numbering.len() + 2;
                let num_id = *numbering.entry(*list).or_insert(next);
                let properties = format!(
                    r#"<w:pStyle w:val="ListNumber"/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="{num_id}"/></w:numPr>"#
                );
                out.xml.push_str(&paragraph(&properties, text));
            }
            Block::Heading { .. } | Block::Loose(_) => {}
        }
    }
    out.ordered_lists = numbering.len();
    out
}

/// Build the complete `.docx` package for `content_html`.
///
/// Markup that stops tokenising part-way is cut at that point rather than
/// refused, so a damaged draft still exports what precedes the damage.
pub fn encode_docx(content_html: &str, watermark: bool) -> Result<Vec<u8>, DocxEncodeError> {
    let parsed = html::parse_lenient(content_html);
    let body = body(&parsed.blocks);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut write_part = |path: &str, content: &str| -> Result<(), DocxEncodeError> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(path, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    };

    write_part("[Content_Types].xml", &parts::content_types(watermark))?;
    write_part("_rels/.rels", &parts::root_rels())?;
    write_part("word/document.xml", &parts::document(&body.xml, watermark))?;
    write_part("word/styles.xml", &parts::styles())?;
    write_part("word/numbering.xml", &parts::numbering(body.ordered_lists))?;
    write_part("word/_rels/document.xml.rels", &parts::document_rels(watermark))?;
    if watermark {
        write_part("word/header1.xml", &parts::watermark_header(WATERMARK_TEXT))?;
    }

    Ok(zip.finish()?.into_inner())
}

/// [`DocumentEncoder`] for the `docx` format.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxEncoder;

impl DocumentEncoder for DocxEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    fn encode(&self, input: &EncodeInput) -> Result<Vec<u8>, EncodeError> {
        encode_docx(&input.content_html, input.watermark)
            .map_err(|error| EncodeError::encoding(error.to_string()))
    }
}
