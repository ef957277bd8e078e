//! Encoder-level tests for the PDF strategies.

use lopdf::Document;
use lopdf::content::Content;
use rstest::{fixture, rstest};

use super::layout::{INCH, PAGE_HEIGHT};
use super::*;
use crate::domain::export::{WATERMARK_TEXT, render_print_ready};

const CONTENT: &str = "<h1>Title</h1><p>Body text</p><ul><li>A</li><li>B</li></ul>";

fn input(content: &str, watermark: bool) -> EncodeInput {
    EncodeInput {
        content_html: content.to_owned(),
        print_ready_html: render_print_ready(content, watermark),
        watermark,
    }
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes)
        .expect("output is a readable pdf")
        .get_pages()
        .len()
}

#[fixture]
fn encoder() -> PdfEncoder {
    PdfEncoder::default()
}

struct FailingStrategy;

impl PdfStrategy for FailingStrategy {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn render(&self, _input: &EncodeInput) -> Result<Vec<u8>, PdfEncodeError> {
        Err(PdfEncodeError::styling("always fails"))
    }
}

#[rstest]
fn styled_output_is_a_single_a4_page(encoder: PdfEncoder) {
    let bytes = encoder.encode(&input(CONTENT, false)).expect("pdf");

    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(page_count(&bytes), 1);
    assert!(contains(&bytes, "(Body text)"));
    assert!(contains(&bytes, "/MediaBox"));
    assert!(!contains(&bytes, WATERMARK_TEXT));
}

#[rstest]
fn watermark_is_stamped_on_every_page(encoder: PdfEncoder) {
    let long = "<p>Line of filler text for pagination.</p>".repeat(120);
    let bytes = encoder.encode(&input(&long, true)).expect("pdf");

    let pages = page_count(&bytes);
    assert!(pages > 1);
    let stamps = bytes
        .windows(WATERMARK_TEXT.len())
        .filter(|window| *window == WATERMARK_TEXT.as_bytes())
        .count();
    assert_eq!(stamps, pages);
}

#[rstest]
fn malformed_styles_fall_back_to_plain_text(encoder: PdfEncoder) {
    let broken = EncodeInput {
        content_html: CONTENT.to_owned(),
        print_ready_html: format!("<style>body {{ font-size: 12pt</style>{CONTENT}"),
        watermark: true,
    };
    assert!(matches!(
        StyledPdfStrategy.render(&broken),
        Err(PdfEncodeError::Styling { .. })
    ));

    let bytes = encoder.encode(&broken).expect("fallback pdf");

    assert_eq!(page_count(&bytes), 1);
    assert!(contains(&bytes, "(Body text)"));
    assert!(contains(&bytes, "/Times-Roman"));
    assert!(!contains(&bytes, WATERMARK_TEXT));
}

#[rstest]
fn plain_text_starts_one_inch_from_the_top_left() {
    let bytes = PlainTextPdfStrategy
        .render(&input("<p>Body text</p>", true))
        .expect("pdf");
    let document = Document::load_mem(&bytes).expect("readable pdf");
    let (_, page_id) = document
        .get_pages()
        .into_iter()
        .next()
        .expect("one page");
    let content = document.get_page_content(page_id).expect("page content");
    let operations = Content::decode(&content).expect("decodable stream").operations;

    let font = operations
        .iter()
        .find(|op| op.operator == "Tf")
        .expect("font selected");
    assert_eq!(font.operands[0].as_name().expect("font name"), b"F1");
    assert_eq!(font.operands[1].as_float().expect("font size"), 12.0);

    let origin = operations
        .iter()
        .find(|op| op.operator == "Td")
        .expect("text positioned");
    let x = origin.operands[0].as_float().expect("x");
    let y = origin.operands[1].as_float().expect("y");
    assert_eq!(x, INCH);
    assert!(y < PAGE_HEIGHT - INCH && y > PAGE_HEIGHT - INCH - 14.4);
    assert!(!operations.iter().any(|op| op.operator == "gs"));
    assert!(!String::from_utf8_lossy(&content).contains(WATERMARK_TEXT));
}

#[rstest]
fn exhausted_strategies_report_the_last_failure() {
    let encoder = PdfEncoder::new(vec![Box::new(FailingStrategy)]);

    let err = encoder
        .encode(&input(CONTENT, false))
        .expect_err("no strategy succeeds");

    assert_eq!(
        err,
        EncodeError::fallback_exhausted("stylesheet rejected: always fails")
    );
}

#[rstest]
fn empty_documents_still_produce_a_page(encoder: PdfEncoder) {
    let bytes = encoder.encode(&input("", false)).expect("pdf");
    assert_eq!(page_count(&bytes), 1);
}
