//! Port for turning rendered content into a downloadable binary format.

use crate::domain::export::ExportFormat;

use super::define_port_error;

define_port_error! {
    /// Errors raised by document encoders.
    pub enum EncodeError {
        /// The encoder could not produce output for this input.
        Encoding { message: String } => "document encoding failed: {message}",
        /// Every strategy of a layered encoder failed, including the last resort.
        FallbackExhausted { message: String } => "all encoding strategies failed: {message}",
    }
}

/// Input handed to every encoder.
///
/// Encoders pick what they need: page-oriented encoders lay out the print
/// shell, structural encoders read the raw content and the watermark flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeInput {
    /// Stored document HTML, as authored.
    pub content_html: String,
    /// Content wrapped in the print shell, overlay included when watermarked.
    pub print_ready_html: String,
    pub watermark: bool,
}

/// Synchronous, CPU-bound encoder for one output format.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentEncoder: Send + Sync {
    /// Format this encoder produces.
    fn format(&self) -> ExportFormat;

    /// Encode the input into the format's bytes.
    fn encode(&self, input: &EncodeInput) -> Result<Vec<u8>, EncodeError>;
}
