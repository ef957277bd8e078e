//! Plain-text section preview.
//!
//! Turns pasted text into a print-styled HTML page, optionally promoting
//! short heading-like lines to section headings.

/// Lines equal to one of these (case-insensitive) start a section.
pub const SECTION_KEYWORDS: [&str; 6] = [
    "introduction",
    "abstract",
    "conclusion",
    "methodology",
    "results",
    "references",
];

/// Heading used for text before the first detected heading.
pub const DEFAULT_SECTION: &str = "Body";

const MAX_HEADING_WORDS: usize = 6;

/// A heading and the text under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

fn is_upper(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

fn is_heading(line: &str) -> bool {
    if line.split_whitespace().count() > MAX_HEADING_WORDS {
        return false;
    }
    let lower = line.to_lowercase();
    SECTION_KEYWORDS.contains(&lower.as_str()) || lower.ends_with(':') || is_upper(line)
}

/// Group the non-blank, trimmed lines of `text` into sections.
///
/// Headings with no body lines after them produce no section.
///
/// # Examples
/// ```
/// use assignment_formatter::domain::preview::detect_sections;
///
/// let sections = detect_sections("Introduction\nIt begins.\nMETHOD\nWe measured.");
/// assert_eq!(sections.len(), 2);
/// assert_eq!(sections[1].heading, "METHOD");
/// ```
#[must_use]
pub fn detect_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut heading = DEFAULT_SECTION.to_owned();
    let mut body: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if is_heading(line) {
            if !body.is_empty() {
                sections.push(Section {
                    heading: std::mem::replace(&mut heading, line.to_owned()),
                    body: body.join("\n"),
                });
                body.clear();
            } else {
                line.clone_into(&mut heading);
            }
        } else {
            body.push(line);
        }
    }
    if !body.is_empty() {
        sections.push(Section {
            heading,
            body: body.join("\n"),
        });
    }
    sections
}

/// Escape text for inclusion in HTML element content or attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Render the preview page.
///
/// Without detection the whole text becomes a single `Body` section. Each
/// section body splits into paragraphs on blank lines; single newlines
/// become `<br>`.
#[must_use]
pub fn preview_html(text: &str, detect: bool) -> String {
    let sections = if detect {
        detect_sections(text)
    } else {
        vec![Section {
            heading: DEFAULT_SECTION.to_owned(),
            body: text.to_owned(),
        }]
    };

    let mut html = String::from(concat!(
        "<!doctype html><html><head><meta charset='utf-8'><title>Preview</title>",
        "<style>body{font-family: 'Times New Roman', serif; font-size:12pt; margin:0.7in} ",
        "h2{font-weight:bold}</style></head><body>"
    ));
    for section in &sections {
        html.push_str("<h2>");
        html.push_str(&escape_html(&section.heading));
        html.push_str("</h2>");
        for paragraph in section.body.split("\n\n") {
            html.push_str("<p>");
            html.push_str(&escape_html(paragraph).replace('\n', "<br>"));
            html.push_str("</p>");
        }
    }
    html.push_str("</body></html>");
    html
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Introduction", true)]
    #[case("RESULTS", true)]
    #[case("Related work:", true)]
    #[case("A SHOUTED LINE WITH FAR TOO MANY WORDS", false)]
    #[case("An ordinary sentence.", false)]
    #[case("2024", false)]
    fn heading_detection(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_heading(line), expected);
    }

    #[rstest]
    fn text_before_first_heading_lands_in_body() {
        let sections = detect_sections("Opening line\n\nAbstract\nSummary here\nmore");
        assert_eq!(
            sections,
            vec![
                Section {
                    heading: "Body".into(),
                    body: "Opening line".into(),
                },
                Section {
                    heading: "Abstract".into(),
                    body: "Summary here\nmore".into(),
                },
            ]
        );
    }

    #[rstest]
    fn consecutive_headings_keep_the_last() {
        let sections = detect_sections("Part one:\nIntroduction\ntext");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading, "Introduction");
    }

    #[rstest]
    fn undetected_preview_splits_paragraphs() {
        let html = preview_html("first\nline\n\nsecond", false);
        assert!(html.contains("<h2>Body</h2><p>first<br>line</p><p>second</p>"));
        assert!(html.contains("margin:0.7in"));
    }

    #[rstest]
    fn preview_escapes_markup() {
        let html = preview_html("<script>alert(1)</script>", false);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
