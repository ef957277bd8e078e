//! Minimal reader for the print stylesheet.
//!
//! Only the `body` rule feeds layout (font size, margin, line height); every
//! other rule is checked for well-formedness and otherwise ignored. The
//! grammar is a small set of `nom` combinators: comments are blanked first,
//! then the sheet is read as plain rules and at-rule groups.

use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_till, take_till1, take_until, take_while1};
use nom::character::complete::{char, digit1, multispace0, space1};
use nom::combinator::{all_consuming, cut, map, map_res, opt, recognize, value, verify};
use nom::multi::{fold_many0, many0, separated_list1};
use nom::sequence::{delimited, preceded, terminated};
use nom::{IResult, Parser};

use super::PdfEncodeError;
use super::layout::INCH;

type ParseError<'a> = nom::error::Error<&'a str>;

/// Print metrics taken from the `body` rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintStyle {
    pub font_size: f32,
    pub margin: f32,
    pub line_height: f32,
}

impl Default for PrintStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            margin: INCH,
            line_height: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Rule<'a> {
    selectors: &'a str,
    declarations: &'a str,
}

fn rejected(error: nom::Err<ParseError<'_>>, what: &str) -> PdfEncodeError {
    let near = match &error {
        nom::Err::Error(inner) | nom::Err::Failure(inner) => {
            inner.input.chars().take(24).collect::<String>()
        }
        nom::Err::Incomplete(_) => String::new(),
    };
    PdfEncodeError::styling(format!("{what} near `{}`", near.trim()))
}

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = ParseError<'a>>
where
    F: Parser<&'a str, Output = O, Error = ParseError<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

// --- Comments ---

fn comment(input: &str) -> IResult<&str, &str> {
    preceded(tag("/*"), cut(terminated(take_until("*/"), tag("*/")))).parse(input)
}

/// Replace every comment with a space; an unterminated one is an error.
fn without_comments(css: &str) -> Result<String, PdfEncodeError> {
    let pieces = fold_many0(
        alt((value(" ", comment), take_till1(|c: char| c == '/'), tag("/"))),
        String::new,
        |mut stripped: String, piece: &str| {
            stripped.push_str(piece);
            stripped
        },
    );
    all_consuming(pieces)
        .parse(css)
        .map(|(_, stripped)| stripped)
        .map_err(|err| rejected(err, "unterminated comment"))
}

// --- Rules ---

fn selectors(input: &str) -> IResult<&str, &str> {
    map(take_till1(|c: char| matches!(c, '{' | '}' | ';')), str::trim).parse(input)
}

fn plain_rule(input: &str) -> IResult<&str, Vec<Rule<'_>>> {
    map(
        (
            selectors,
            char('{'),
            take_till(|c: char| c == '{' || c == '}'),
            char('}'),
        ),
        |(selectors, _, declarations, _)| {
            vec![Rule {
                selectors,
                declarations,
            }]
        },
    )
    .parse(input)
}

/// `@media print { .. }` and friends: the nested rules are read in place.
fn at_rule_group(input: &str) -> IResult<&str, Vec<Rule<'_>>> {
    map(
        (
            recognize((char('@'), take_till(|c: char| matches!(c, '{' | '}' | ';')))),
            char('{'),
            many0(ws(rule)),
            multispace0,
            char('}'),
        ),
        |(_, _, nested, _, _)| nested.into_iter().flatten().collect(),
    )
    .parse(input)
}

fn rule(input: &str) -> IResult<&str, Vec<Rule<'_>>> {
    alt((at_rule_group, plain_rule)).parse(input)
}

fn rules(css: &str) -> Result<Vec<Rule<'_>>, PdfEncodeError> {
    all_consuming(preceded(multispace0, many0(ws(rule))))
        .parse(css)
        .map(|(_, groups)| groups.into_iter().flatten().collect())
        .map_err(|err| rejected(err, "malformed rule"))
}

// --- Declarations ---

fn property(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-').parse(input)
}

fn declaration(input: &str) -> IResult<&str, (&str, &str)> {
    map(
        (
            ws(property),
            char(':'),
            verify(map(take_till1(|c: char| c == ';'), str::trim), |value: &str| {
                !value.is_empty()
            }),
        ),
        |(property, _, value)| (property, value),
    )
    .parse(input)
}

fn declarations(block: &str) -> Result<Vec<(String, &str)>, PdfEncodeError> {
    let entries = many0(alt((
        value(None, (multispace0, char(';'))),
        map(terminated(ws(declaration), opt(char(';'))), Some),
    )));
    all_consuming(terminated(entries, multispace0))
        .parse(block)
        .map(|(_, entries)| {
            entries
                .into_iter()
                .flatten()
                .map(|(property, value)| (property.to_ascii_lowercase(), value))
                .collect()
        })
        .map_err(|err| rejected(err, "malformed declaration"))
}

// --- Lengths ---

fn number(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize((
            opt(alt((char('+'), char('-')))),
            alt((
                recognize((digit1, opt((char('.'), digit1)))),
                recognize((char('.'), digit1)),
            )),
        )),
        str::parse::<f32>,
    )
    .parse(input)
}

/// Points per unit; `em` is relative to `font_size`.
fn unit<'a>(font_size: f32) -> impl Parser<&'a str, Output = f32, Error = ParseError<'a>> {
    alt((
        value(1.0, tag_no_case("pt")),
        value(0.75, tag_no_case("px")),
        value(INCH, tag_no_case("in")),
        value(INCH / 2.54, tag_no_case("cm")),
        value(INCH / 25.4, tag_no_case("mm")),
        value(font_size, tag_no_case("em")),
    ))
}

fn length<'a>(font_size: f32) -> impl Parser<&'a str, Output = f32, Error = ParseError<'a>> {
    map((number, unit(font_size)), |(amount, scale)| amount * scale)
}

/// Convert a CSS length to points.
fn length_to_points(value: &str, font_size: f32) -> Option<f32> {
    all_consuming(ws(length(font_size)))
        .parse(value)
        .ok()
        .map(|(_, points)| points)
}

/// Top edge of a 1 to 4 value `margin` shorthand.
fn margin_to_points(value: &str, font_size: f32) -> Option<f32> {
    all_consuming(ws(separated_list1(space1, length(font_size))))
        .parse(value)
        .ok()
        .and_then(|(_, edges)| edges.first().copied())
}

fn line_height(value: &str, font_size: f32) -> Option<f32> {
    match all_consuming(ws(number)).parse(value) {
        Ok((_, factor)) => Some(factor),
        Err(_) => length_to_points(value, font_size).map(|points| points / font_size),
    }
}

/// Validate every stylesheet and derive the print metrics.
pub fn print_style(stylesheets: &[String]) -> Result<PrintStyle, PdfEncodeError> {
    let mut style = PrintStyle::default();
    for sheet in stylesheets {
        let css = without_comments(sheet)?;
        for rule in rules(&css)? {
            let declarations = declarations(rule.declarations)?;
            let targets_body = rule
                .selectors
                .split(',')
                .any(|selector| selector.trim().eq_ignore_ascii_case("body"));
            if !targets_body {
                continue;
            }
            for (property, value) in declarations {
                match property.as_str() {
                    "font-size" => {
                        if let Some(size) = length_to_points(value, style.font_size) {
                            style.font_size = size;
                        }
                    }
                    "margin" => {
                        if let Some(margin) = margin_to_points(value, style.font_size) {
                            style.margin = margin;
                        }
                    }
                    "line-height" => {
                        if let Some(factor) = line_height(value, style.font_size) {
                            style.line_height = factor;
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(style)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn reads_body_metrics() {
        let css = "body { font-size: 11pt; margin: 2cm 1in; line-height: 1.2 } p { margin: 0 }";
        let style = print_style(&[css.to_owned()]).expect("valid css");
        assert!((style.font_size - 11.0).abs() < f32::EPSILON);
        assert!((style.margin - 56.692_9).abs() < 0.01);
        assert!((style.line_height - 1.2).abs() < f32::EPSILON);
    }

    #[rstest]
    fn accepts_at_rules_with_nested_blocks() {
        let css = "@media print { body { font-size: 10pt } } /* note */ h1 { font-weight: bold }";
        let style = print_style(&[css.to_owned()]).expect("valid css");
        assert!((style.font_size - 10.0).abs() < f32::EPSILON);
    }

    #[rstest]
    fn at_rules_without_nested_rules_are_plain_blocks() {
        let parsed = rules("@page { margin: 1in }").expect("valid css");
        assert_eq!(
            parsed,
            vec![Rule {
                selectors: "@page",
                declarations: " margin: 1in ",
            }]
        );
    }

    #[rstest]
    fn reads_the_print_shell_stylesheet() {
        let css = crate::domain::export::render_print_ready("", true);
        let start = css.find("<style>").expect("style open") + "<style>".len();
        let end = css.find("</style>").expect("style close");
        let style = print_style(&[css[start..end].to_owned()]).expect("shell css");
        assert_eq!(style, PrintStyle::default());
    }

    #[rstest]
    fn comments_become_whitespace() {
        assert_eq!(
            without_comments("a/* x */b / c").expect("closed comment"),
            "a b / c"
        );
    }

    #[rstest]
    #[case("12pt", 12.0, Some(12.0))]
    #[case(" 1in ", 12.0, Some(72.0))]
    #[case("16px", 12.0, Some(12.0))]
    #[case("2em", 10.0, Some(20.0))]
    #[case("-.5PT", 12.0, Some(-0.5))]
    #[case("12", 12.0, None)]
    #[case("12pt 3pt", 12.0, None)]
    #[case("pt", 12.0, None)]
    fn lengths_convert_to_points(
        #[case] raw: &str,
        #[case] font_size: f32,
        #[case] expected: Option<f32>,
    ) {
        let points = length_to_points(raw, font_size);
        match (points, expected) {
            (Some(points), Some(expected)) => assert!((points - expected).abs() < 0.001),
            (points, expected) => assert_eq!(points, expected),
        }
    }

    #[rstest]
    fn line_height_accepts_factors_and_lengths() {
        assert_eq!(line_height("1.25", 12.0), Some(1.25));
        assert_eq!(line_height("18pt", 12.0), Some(1.5));
        assert_eq!(line_height("normal", 12.0), None);
    }

    #[rstest]
    #[case("body { font-size: 12pt")]
    #[case("body font-size: 12pt }")]
    #[case("p { color }")]
    #[case("p { color: ; }")]
    #[case("{ color: red }")]
    #[case("p { div { color: red } }")]
    #[case("/* open")]
    fn rejects_malformed_css(#[case] css: &str) {
        assert!(matches!(
            print_style(&[css.to_owned()]),
            Err(PdfEncodeError::Styling { .. })
        ));
    }

    #[rstest]
    fn defaults_without_stylesheets() {
        assert_eq!(print_style(&[]).expect("no css"), PrintStyle::default());
    }
}
