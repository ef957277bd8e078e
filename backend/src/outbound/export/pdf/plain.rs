//! Last-resort PDF strategy: unstyled text in Times-Roman 12pt.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::layout::{INCH, PageFlow, text_operations, wrap};
use super::metrics::FontFace;
use super::writer::write_document;
use super::{PdfEncodeError, PdfStrategy};
use crate::domain::ports::EncodeInput;
use crate::outbound::export::html::resolve_entity;

const FONT_SIZE: f32 = 12.0;
const LEADING: f32 = 14.4;

static HIDDEN_RE: OnceLock<Regex> = OnceLock::new();
static BREAK_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();
static ENTITY_RE: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern).unwrap_or_else(|error| panic!("markup regex failed to compile: {error}"))
    })
}

fn decode_entities(text: &str) -> String {
    let entity = compiled(&ENTITY_RE, r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);");
    entity
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            let numeric = if let Some(hex) = name.strip_prefix("#x").or(name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(decimal) = name.strip_prefix('#') {
                decimal.parse().ok()
            } else {
                None
            };
            match numeric.and_then(char::from_u32) {
                Some(ch) => ch.to_string(),
                None => resolve_entity(name).map_or_else(|| caps[0].to_owned(), str::to_owned),
            }
        })
        .into_owned()
}

/// Strip markup from stored content, one line per text run.
pub fn plain_lines(content_html: &str) -> Vec<String> {
    let hidden = compiled(
        &HIDDEN_RE,
        r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<head\b.*?</head\s*>|<!--.*?-->",
    );
    let breaks = compiled(
        &BREAK_RE,
        r"(?i)<br\s*/?>|</?(p|div|h[1-6]|li|ul|ol|tr|table|blockquote|section|article)\b[^>]*>",
    );
    let tags = compiled(&TAG_RE, r"<[^>]*>");

    let visible = hidden.replace_all(content_html, "");
    let broken = breaks.replace_all(&visible, "\n");
    let text = decode_entities(&tags.replace_all(&broken, ""));
    text.lines()
        .map(|line| line.split_ascii_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Writes the document's text from a one-inch top-left origin with no
/// styling and no watermark.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextPdfStrategy;

impl PdfStrategy for PlainTextPdfStrategy {
    fn name(&self) -> &'static str {
        "plain_text"
    }

    fn render(&self, input: &EncodeInput) -> Result<Vec<u8>, PdfEncodeError> {
        let mut flow = PageFlow::new(INCH);
        let width = flow.content_width();
        for paragraph in plain_lines(&input.content_html) {
            for line in wrap(&paragraph, FontFace::Regular, FONT_SIZE, width) {
                let y = flow.line(FONT_SIZE, LEADING);
                flow.draw(text_operations(FontFace::Regular, FONT_SIZE, INCH, y, &line));
            }
        }
        write_document(flow.finish())
    }
}
