//! PDF encoder built from an ordered list of strategies.
//!
//! Strategies are tried in order and the first to produce bytes wins. The
//! default list lays out the styled print page first and falls back to
//! unstyled text, so a stylesheet the layout cannot read still yields a
//! document.

mod layout;
mod metrics;
mod plain;
mod styled;
mod stylesheet;
mod writer;

use tracing::warn;

pub use plain::{PlainTextPdfStrategy, plain_lines};
pub use styled::StyledPdfStrategy;

use super::html::HtmlParseError;
use crate::domain::export::ExportFormat;
use crate::domain::ports::{DocumentEncoder, EncodeError, EncodeInput};

/// Failure of a single PDF strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PdfEncodeError {
    #[error(transparent)]
    Markup(#[from] HtmlParseError),
    /// The stylesheet could not be read.
    #[error("stylesheet rejected: {message}")]
    Styling { message: String },
    /// The PDF object graph could not be serialised.
    #[error("pdf serialisation failed: {message}")]
    Write { message: String },
}

impl PdfEncodeError {
    pub fn styling(message: impl Into<String>) -> Self {
        Self::Styling {
            message: message.into(),
        }
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }
}

/// One way of producing a PDF.
pub trait PdfStrategy: Send + Sync {
    /// Name recorded in logs.
    fn name(&self) -> &'static str;

    fn render(&self, input: &EncodeInput) -> Result<Vec<u8>, PdfEncodeError>;
}

/// PDF encoder trying its strategies in order.
pub struct PdfEncoder {
    strategies: Vec<Box<dyn PdfStrategy>>,
}

impl PdfEncoder {
    pub fn new(strategies: Vec<Box<dyn PdfStrategy>>) -> Self {
        Self { strategies }
    }
}

impl Default for PdfEncoder {
    fn default() -> Self {
        Self::new(vec![
            Box::new(StyledPdfStrategy),
            Box::new(PlainTextPdfStrategy),
        ])
    }
}

impl DocumentEncoder for PdfEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn encode(&self, input: &EncodeInput) -> Result<Vec<u8>, EncodeError> {
        let mut last_error = None;
        for strategy in &self.strategies {
            match strategy.render(input) {
                Ok(bytes) => {
                    if let Some(error) = &last_error {
                        warn!(strategy = strategy.name(), %error, "pdf rendered by fallback strategy");
                    }
                    return Ok(bytes);
                }
                Err(error) => {
                    warn!(strategy = strategy.name(), %error, "pdf strategy failed");
                    last_error = Some(error);
                }
            }
        }
        Err(EncodeError::fallback_exhausted(last_error.map_or_else(
            || "no pdf strategies configured".to_owned(),
            |error| error.to_string(),
        )))
    }
}

#[cfg(test)]
mod tests;
