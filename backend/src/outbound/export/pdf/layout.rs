//! Line wrapping and page flow on an A4 sheet.

use lopdf::Object;
use lopdf::content::Operation;

use super::metrics::{FontFace, encode_win_ansi};

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.0;
/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 842.0;
/// One inch in points.
pub const INCH: f32 = 72.0;

/// Break `text` into lines no wider than `max_width`.
///
/// Newlines are hard breaks. Words wider than a full line are split between
/// characters.
pub fn wrap(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for hard_line in text.split('\n') {
        let mut current = String::new();
        for word in hard_line.split(' ').filter(|word| !word.is_empty()) {
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            if face.text_width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if face.text_width(word, size) <= max_width {
                current = word.to_owned();
                continue;
            }
            for ch in word.chars() {
                let mut extended = current.clone();
                extended.push(ch);
                if !current.is_empty() && face.text_width(&extended, size) > max_width {
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                } else {
                    current = extended;
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Content operations for one line of text at a baseline position.
pub fn text_operations(face: FontFace, size: f32, x: f32, y: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![face.resource_name().into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(text))]),
        Operation::new("ET", vec![]),
    ]
}

/// Flows lines down the page, starting new pages at the bottom margin.
#[derive(Debug)]
pub struct PageFlow {
    margin: f32,
    cursor_y: f32,
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
}

impl PageFlow {
    pub fn new(margin: f32) -> Self {
        Self {
            margin,
            cursor_y: PAGE_HEIGHT - margin,
            pages: Vec::new(),
            current: Vec::new(),
        }
    }

    pub fn left(&self) -> f32 {
        self.margin
    }

    pub fn content_width(&self) -> f32 {
        PAGE_WIDTH - 2.0 * self.margin
    }

    fn at_page_top(&self) -> bool {
        self.cursor_y >= PAGE_HEIGHT - self.margin
    }

    pub fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor_y = PAGE_HEIGHT - self.margin;
    }

    /// Reserve a line box of `line_height` and return its baseline.
    pub fn line(&mut self, size: f32, line_height: f32) -> f32 {
        if self.cursor_y - line_height < self.margin && !self.at_page_top() {
            self.break_page();
        }
        let half_leading = (line_height - size).max(0.0) / 2.0;
        let baseline = self.cursor_y - half_leading - size * 0.8;
        self.cursor_y -= line_height;
        baseline
    }

    /// Vertical gap between blocks. Dropped at the top of a page.
    pub fn gap(&mut self, height: f32) {
        if !self.at_page_top() {
            self.cursor_y -= height;
        }
    }

    pub fn draw(&mut self, operations: Vec<Operation>) {
        self.current.extend(operations);
    }

    /// Finished pages; always at least one.
    pub fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}
