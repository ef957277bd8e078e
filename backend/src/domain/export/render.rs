//! Print-ready HTML shell around stored document content.
//!
//! Output is a pure function of its inputs. The stylesheet is identical for
//! watermarked and plain renders; only the overlay element differs, so
//! downstream layout never shifts because of the watermark.

/// Text of the watermark overlay.
pub const WATERMARK_TEXT: &str = "Assignment Formatter - Watermark";

/// Class carried by the overlay element. Encoders use it to tell the overlay
/// apart from document content.
pub const WATERMARK_CLASS: &str = "watermark";

const SHELL_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<style>
body { font-family: "Times New Roman", serif; font-size: 12pt; margin: 1in; line-height: 1.5; color: #111; }
h1, h2, h3 { font-weight: bold; }
p { margin: 0 0 0.8em 0; }
.watermark { position: fixed; top: 50%; left: 50%; transform: translate(-50%, -50%) rotate(-45deg); font-size: 3em; color: rgba(0, 0, 0, 0.1); z-index: 9999; pointer-events: none; white-space: nowrap; }
</style>
</head>
<body>
"#;

const SHELL_TAIL: &str = "\n</body>\n</html>\n";

/// Wrap document content in the print shell, optionally adding the overlay.
///
/// # Examples
/// ```
/// use assignment_formatter::domain::export::{render_print_ready, WATERMARK_TEXT};
///
/// let plain = render_print_ready("<p>Hi</p>", false);
/// let marked = render_print_ready("<p>Hi</p>", true);
/// assert!(!plain.contains(WATERMARK_TEXT));
/// assert!(marked.contains(WATERMARK_TEXT));
/// ```
#[must_use]
pub fn render_print_ready(content_html: &str, watermark: bool) -> String {
    let overlay = watermark_element();
    let mut html = String::with_capacity(
        SHELL_HEAD.len() + content_html.len() + overlay.len() + SHELL_TAIL.len(),
    );
    html.push_str(SHELL_HEAD);
    html.push_str(content_html);
    if watermark {
        html.push_str(&overlay);
    }
    html.push_str(SHELL_TAIL);
    html
}

/// The overlay markup injected into watermarked renders.
#[must_use]
pub fn watermark_element() -> String {
    format!("\n<div class=\"{WATERMARK_CLASS}\" aria-hidden=\"true\">{WATERMARK_TEXT}</div>")
}
