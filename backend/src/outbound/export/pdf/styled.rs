//! Primary PDF strategy: lays out the print-ready page with its styles.

use lopdf::content::Operation;

use super::layout::{PAGE_HEIGHT, PAGE_WIDTH, PageFlow, text_operations, wrap};
use super::metrics::{FontFace, encode_win_ansi};
use super::stylesheet::{PrintStyle, print_style};
use super::writer::{OVERLAY_STATE, write_document};
use super::{PdfEncodeError, PdfStrategy};
use crate::domain::ports::EncodeInput;
use crate::outbound::export::html::{self, Block};

/// Overlay font size, `3em` of the 12pt body.
const OVERLAY_SIZE: f32 = 36.0;
const LIST_INDENT: f32 = 24.0;
const MARKER_INDENT: f32 = 6.0;

/// Renders headings, paragraphs and lists from the print shell, honouring its
/// `body` metrics, and stamps any overlay on every page.
#[derive(Debug, Default, Clone, Copy)]
pub struct StyledPdfStrategy;

const fn heading_scale(level: u8) -> f32 {
    match level {
        1 => 2.0,
        2 => 1.5,
        3 => 1.17,
        4 => 1.0,
        5 => 0.83,
        _ => 0.67,
    }
}

fn draw_lines(
    flow: &mut PageFlow,
    lines: &[String],
    face: FontFace,
    size: f32,
    line_height: f32,
    x: f32,
) {
    for line in lines {
        let y = flow.line(size, line_height);
        if !line.is_empty() {
            flow.draw(text_operations(face, size, x, y, line));
        }
    }
}

fn draw_block(flow: &mut PageFlow, block: &Block, style: &PrintStyle) {
    let body = style.font_size;
    match block {
        Block::Heading { level, text } => {
            let size = body * heading_scale(*level);
            flow.gap(size * 0.67);
            let lines = wrap(text, FontFace::Bold, size, flow.content_width());
            let left = flow.left();
            draw_lines(
                flow,
                &lines,
                FontFace::Bold,
                size,
                size * style.line_height,
                left,
            );
            flow.gap(size * 0.33);
        }
        Block::Paragraph(text) | Block::Loose(text) => {
            let lines = wrap(text, FontFace::Regular, body, flow.content_width());
            let left = flow.left();
            draw_lines(
                flow,
                &lines,
                FontFace::Regular,
                body,
                body * style.line_height,
                left,
            );
            flow.gap(body * 0.8);
        }
        Block::ListItem {
            ordered,
            index,
            text,
            ..
        } => {
            let marker = if *ordered {
                format!("{index}.")
            } else {
                "\u{2022}".to_owned()
            };
            let width = flow.content_width() - LIST_INDENT;
            let lines = wrap(text, FontFace::Regular, body, width);
            let left = flow.left();
            let line_height = body * style.line_height;
            for (position, line) in lines.iter().enumerate() {
                let y = flow.line(body, line_height);
                if position == 0 {
                    flow.draw(text_operations(
                        FontFace::Regular,
                        body,
                        left + MARKER_INDENT,
                        y,
                        &marker,
                    ));
                }
                if !line.is_empty() {
                    flow.draw(text_operations(
                        FontFace::Regular,
                        body,
                        left + LIST_INDENT,
                        y,
                        line,
                    ));
                }
            }
            flow.gap(body * 0.2);
        }
    }
}

/// Translucent text centred on the page, rising 45 degrees from bottom left
/// to top right (the print shell's `rotate(-45deg)` in y-down space).
fn overlay_operations(text: &str) -> Vec<Operation> {
    let (sin, cos) = std::f32::consts::FRAC_PI_4.sin_cos();
    let half_width = FontFace::Regular.text_width(text, OVERLAY_SIZE) / 2.0;
    let x = PAGE_WIDTH / 2.0 - half_width * cos;
    let y = PAGE_HEIGHT / 2.0 - half_width * sin;
    vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec![OVERLAY_STATE.into()]),
        Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                FontFace::Regular.resource_name().into(),
                OVERLAY_SIZE.into(),
            ],
        ),
        Operation::new(
            "Tm",
            vec![
                cos.into(),
                sin.into(),
                (-sin).into(),
                cos.into(),
                x.into(),
                y.into(),
            ],
        ),
        Operation::new(
            "Tj",
            vec![lopdf::Object::string_literal(encode_win_ansi(text))],
        ),
        Operation::new("ET", vec![]),
        Operation::new("Q", vec![]),
    ]
}

impl PdfStrategy for StyledPdfStrategy {
    fn name(&self) -> &'static str {
        "styled"
    }

    fn render(&self, input: &EncodeInput) -> Result<Vec<u8>, PdfEncodeError> {
        let parsed = html::parse(&input.print_ready_html)?;
        let style = print_style(&parsed.stylesheets)?;

        let mut flow = PageFlow::new(style.margin);
        for block in &parsed.blocks {
            draw_block(&mut flow, block, &style);
        }
        let mut pages = flow.finish();
        for page in &mut pages {
            for overlay in &parsed.overlays {
                page.extend(overlay_operations(overlay));
            }
        }
        write_document(pages)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn text_matrix(operations: &[Operation]) -> Vec<f32> {
        operations
            .iter()
            .find(|operation| operation.operator == "Tm")
            .expect("text matrix")
            .operands
            .iter()
            .map(|operand| operand.as_float().expect("numeric operand"))
            .collect()
    }

    #[rstest]
    fn overlay_rises_towards_the_top_right() {
        let matrix = text_matrix(&overlay_operations("DRAFT"));

        let &[a, b, c, d, ..] = matrix.as_slice() else {
            panic!("six operands expected");
        };
        assert!(a > 0.0 && d > 0.0);
        assert!(b > 0.0, "baseline must climb in PDF space");
        assert!(c < 0.0);
        assert!((b - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[rstest]
    fn overlay_is_centred_on_the_page() {
        let text = "DRAFT";
        let matrix = text_matrix(&overlay_operations(text));
        let half_width = FontFace::Regular.text_width(text, OVERLAY_SIZE) / 2.0;

        let centre_x = matrix[4] + half_width * matrix[0];
        let centre_y = matrix[5] + half_width * matrix[1];

        assert!((centre_x - PAGE_WIDTH / 2.0).abs() < 0.01);
        assert!((centre_y - PAGE_HEIGHT / 2.0).abs() < 0.01);
    }
}
