//! Document encoders for the export pipeline.

pub mod docx;
pub mod html;
pub mod pdf;

use std::sync::Arc;

use crate::domain::export::EncoderRegistry;

pub use docx::{DocxEncodeError, DocxEncoder, encode_docx};
pub use pdf::{PdfEncodeError, PdfEncoder};

/// Registry holding the PDF encoder with its plain-text fallback and the
/// DOCX encoder.
pub fn default_encoders() -> EncoderRegistry {
    EncoderRegistry::new(vec![
        Arc::new(PdfEncoder::default()),
        Arc::new(DocxEncoder),
    ])
}
