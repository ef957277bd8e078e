//! Lenient HTML block extraction for the encoders.
//!
//! Editor output is HTML, not XML, so the reader runs with end-name checks
//! disabled and keeps its own element stack: void elements are never pushed
//! and a stray closing tag pops back to its nearest matching opener or is
//! dropped.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};

use crate::domain::export::WATERMARK_CLASS;

/// Raised when the markup cannot be tokenised at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed markup: {message}")]
pub struct HtmlParseError {
    pub message: String,
}

/// A top-level block of document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `h1` to `h6`.
    Heading { level: u8, text: String },
    /// `p`.
    Paragraph(String),
    /// `li`; `list` identifies the enclosing list, `index` is 1-based.
    ListItem {
        ordered: bool,
        list: usize,
        index: usize,
        text: String,
    },
    /// Text outside any recognised block.
    Loose(String),
}

impl Block {
    /// Plain text of the block.
    pub fn text(&self) -> &str {
        match self {
            Self::Heading { text, .. }
            | Self::Paragraph(text)
            | Self::ListItem { text, .. }
            | Self::Loose(text) => text,
        }
    }
}

/// Result of [`parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHtml {
    pub blocks: Vec<Block>,
    /// Text of overlay elements carrying the watermark class.
    pub overlays: Vec<String>,
    /// Raw contents of `<style>` elements, in document order.
    pub stylesheets: Vec<String>,
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const SKIPPED_ELEMENTS: [&str; 4] = ["noscript", "script", "template", "title"];

const INLINE_ELEMENTS: [&str; 17] = [
    "a", "abbr", "b", "cite", "code", "em", "font", "i", "kbd", "mark", "q", "s", "small", "span",
    "strong", "sub", "sup",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Plain,
    Inline,
    Skip,
    Style,
    Overlay,
    Block,
    List,
}

#[derive(Debug)]
struct Frame {
    name: String,
    kind: FrameKind,
}

#[derive(Debug, Clone, Copy)]
enum PendingKind {
    Heading(u8),
    Paragraph,
    ListItem {
        ordered: bool,
        list: usize,
        index: usize,
    },
}

#[derive(Debug)]
struct ListFrame {
    ordered: bool,
    id: usize,
    counter: usize,
}

/// Accumulates text with HTML whitespace collapsing.
#[derive(Debug, Default)]
struct TextBuffer(String);

impl TextBuffer {
    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_ascii_whitespace() {
                if !self.0.is_empty() && !self.0.ends_with([' ', '\n']) {
                    self.0.push(' ');
                }
            } else {
                self.0.push(ch);
            }
        }
    }

    fn line_break(&mut self) {
        let trimmed = self.0.trim_end_matches(' ').len();
        self.0.truncate(trimmed);
        self.0.push('\n');
    }

    fn take(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.0);
        let text = raw
            .split('\n')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
            .trim_matches('\n')
            .to_owned();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Default)]
struct Collector {
    stack: Vec<Frame>,
    lists: Vec<ListFrame>,
    next_list_id: usize,
    pending: Option<PendingKind>,
    block_text: TextBuffer,
    loose_text: TextBuffer,
    special_text: String,
    parsed: ParsedHtml,
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase()
}

fn has_class(start: &BytesStart<'_>, class: &str) -> bool {
    start
        .attributes()
        .with_checks(false)
        .flatten()
        .filter(|attr| attr.key.as_ref().eq_ignore_ascii_case(b"class"))
        .any(|attr| {
            String::from_utf8_lossy(&attr.value)
                .split_ascii_whitespace()
                .any(|value| value == class)
        })
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

pub(crate) fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        "ndash" => Some("\u{2013}"),
        "mdash" => Some("\u{2014}"),
        "lsquo" => Some("\u{2018}"),
        "rsquo" => Some("\u{2019}"),
        "ldquo" => Some("\u{201c}"),
        "rdquo" => Some("\u{201d}"),
        "hellip" => Some("\u{2026}"),
        "copy" => Some("\u{a9}"),
        "reg" => Some("\u{ae}"),
        "trade" => Some("\u{2122}"),
        "bull" => Some("\u{2022}"),
        "middot" => Some("\u{b7}"),
        "deg" => Some("\u{b0}"),
        "euro" => Some("\u{20ac}"),
        "pound" => Some("\u{a3}"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}

/// Unescape a text node, keeping the raw text when it holds a bare `&` or an
/// unknown entity.
fn decode_text<'a>(text: &'a BytesText<'a>) -> Cow<'a, str> {
    match text.unescape_with(resolve_entity) {
        Ok(decoded) => decoded,
        Err(_) => String::from_utf8_lossy(text),
    }
}

impl Collector {
    fn innermost_special(&self) -> Option<FrameKind> {
        self.stack
            .iter()
            .rev()
            .map(|frame| frame.kind)
            .find(|kind| matches!(kind, FrameKind::Skip | FrameKind::Style | FrameKind::Overlay))
    }

    fn flush_loose(&mut self) {
        if let Some(text) = self.loose_text.take() {
            self.parsed.blocks.push(Block::Loose(text));
        }
    }

    fn flush_block(&mut self) {
        let Some(kind) = self.pending.take() else {
            return;
        };
        let Some(text) = self.block_text.take() else {
            return;
        };
        let block = match kind {
            PendingKind::Heading(level) => Block::Heading { level, text },
            PendingKind::Paragraph => Block::Paragraph(text),
            PendingKind::ListItem {
                ordered,
                list,
                index,
            } => Block::ListItem {
                ordered,
                list,
                index,
                text,
            },
        };
        self.parsed.blocks.push(block);
    }

    fn open_block(&mut self, kind: PendingKind) {
        self.flush_loose();
        self.flush_block();
        self.pending = Some(kind);
    }

    fn open_list(&mut self, ordered: bool) {
        self.next_list_id += 1;
        self.lists.push(ListFrame {
            ordered,
            id: self.next_list_id,
            counter: 0,
        });
    }

    fn list_item(&mut self) -> PendingKind {
        if self.lists.is_empty() {
            self.open_list(false);
        }
        match self.lists.last_mut() {
            Some(list) => {
                list.counter += 1;
                PendingKind::ListItem {
                    ordered: list.ordered,
                    list: list.id,
                    index: list.counter,
                }
            }
            None => PendingKind::Paragraph,
        }
    }

    fn start(&mut self, start: &BytesStart<'_>) {
        let name = element_name(start);
        if self.innermost_special().is_some() {
            if !VOID_ELEMENTS.contains(&name.as_str()) {
                self.stack.push(Frame {
                    name,
                    kind: FrameKind::Plain,
                });
            }
            return;
        }
        if name == "br" {
            if self.pending.is_some() {
                self.block_text.line_break();
            } else {
                self.loose_text.line_break();
            }
            return;
        }
        if VOID_ELEMENTS.contains(&name.as_str()) {
            return;
        }

        let kind = if name == "style" {
            FrameKind::Style
        } else if SKIPPED_ELEMENTS.contains(&name.as_str()) {
            FrameKind::Skip
        } else if has_class(start, WATERMARK_CLASS) {
            FrameKind::Overlay
        } else if let Some(level) = heading_level(&name) {
            self.open_block(PendingKind::Heading(level));
            FrameKind::Block
        } else if name == "p" {
            self.open_block(PendingKind::Paragraph);
            FrameKind::Block
        } else if name == "li" {
            let item = self.list_item();
            self.open_block(item);
            FrameKind::Block
        } else if name == "ul" || name == "ol" {
            self.flush_loose();
            self.open_list(name == "ol");
            FrameKind::List
        } else if INLINE_ELEMENTS.contains(&name.as_str()) {
            FrameKind::Inline
        } else {
            if self.pending.is_none() {
                self.flush_loose();
            }
            FrameKind::Plain
        };
        self.stack.push(Frame { name, kind });
    }

    fn end(&mut self, name: &str) {
        let Some(position) = self.stack.iter().rposition(|frame| frame.name == name) else {
            return;
        };
        let closed: Vec<Frame> = self.stack.drain(position..).collect();
        for frame in closed.into_iter().rev() {
            self.close(frame);
        }
    }

    fn close(&mut self, frame: Frame) {
        match frame.kind {
            FrameKind::Block => self.flush_block(),
            FrameKind::List => {
                self.flush_block();
                self.lists.pop();
            }
            FrameKind::Style => {
                let css = std::mem::take(&mut self.special_text);
                self.parsed.stylesheets.push(css);
            }
            FrameKind::Overlay => {
                let text = std::mem::take(&mut self.special_text);
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !text.is_empty() {
                    self.parsed.overlays.push(text);
                }
            }
            FrameKind::Skip => self.special_text.clear(),
            FrameKind::Plain if self.pending.is_none() => self.flush_loose(),
            FrameKind::Plain | FrameKind::Inline => {}
        }
    }

    fn text(&mut self, text: &str) {
        match self.innermost_special() {
            Some(FrameKind::Style | FrameKind::Overlay) => self.special_text.push_str(text),
            Some(_) => {}
            None if self.pending.is_some() => self.block_text.push_text(text),
            None => self.loose_text.push_text(text),
        }
    }

    fn finish(mut self) -> ParsedHtml {
        let open: Vec<Frame> = self.stack.drain(..).collect();
        for frame in open.into_iter().rev() {
            self.close(frame);
        }
        self.flush_block();
        self.flush_loose();
        self.parsed
    }
}

/// Extract blocks, overlays and stylesheets from an HTML fragment or page.
///
/// # Examples
/// ```
/// use assignment_formatter::outbound::export::html::{parse, Block};
///
/// let parsed = parse("<h1>Title</h1><p>Body <b>text</b></p>").expect("parses");
/// assert_eq!(
///     parsed.blocks,
///     vec![
///         Block::Heading { level: 1, text: "Title".into() },
///         Block::Paragraph("Body text".into()),
///     ]
/// );
/// ```
pub fn parse(html: &str) -> Result<ParsedHtml, HtmlParseError> {
    match collect(html) {
        (parsed, None) => Ok(parsed),
        (_, Some(error)) => Err(error),
    }
}

/// Like [`parse`], but a syntax error only ends the scan: blocks read before
/// it are kept, including the one still open.
///
/// # Examples
/// ```
/// use assignment_formatter::outbound::export::html::{parse_lenient, Block};
///
/// let parsed = parse_lenient("<p>kept</p><!-- never closed");
/// assert_eq!(parsed.blocks, vec![Block::Paragraph("kept".into())]);
/// ```
pub fn parse_lenient(html: &str) -> ParsedHtml {
    let (parsed, error) = collect(html);
    if let Some(error) = error {
        tracing::warn!(%error, blocks = parsed.blocks.len(), "markup truncated at syntax error");
    }
    parsed
}

fn collect(html: &str) -> (ParsedHtml, Option<HtmlParseError>) {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.expand_empty_elements = true;
    config.trim_text(false);

    let mut collector = Collector::default();
    let error = loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => collector.start(&start),
            Ok(Event::End(end)) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).to_ascii_lowercase();
                collector.end(&name);
            }
            Ok(Event::Empty(start)) => {
                collector.start(&start);
                collector.end(&element_name(&start));
            }
            Ok(Event::Text(text)) => collector.text(&decode_text(&text)),
            Ok(Event::CData(data)) => {
                collector.text(&String::from_utf8_lossy(&data));
            }
            Ok(Event::Eof) => break None,
            Ok(_) => {}
            Err(err) => {
                break Some(HtmlParseError {
                    message: err.to_string(),
                });
            }
        }
    };
    (collector.finish(), error)
}
