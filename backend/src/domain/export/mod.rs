//! Export pipeline: quota check, print rendering, encoding and commit.
//!
//! A request moves through `Pending -> QuotaChecked -> Rendered -> Encoded ->
//! Committed`; any refusal ends in `Rejected` and any fault in `Failed`, with
//! no store mutation in either case.

mod quota;
mod render;
mod service;

use std::str::FromStr;

use serde::Serialize;

pub use quota::{QuotaDecision, QuotaDenial, credit_delta, evaluate, local_day_start};
pub use render::{WATERMARK_CLASS, WATERMARK_TEXT, render_print_ready, watermark_element};
pub use service::{DocumentExportService, EncoderRegistry, ExportError};

use super::DocumentId;

/// Content type served for DOCX downloads.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Content type served for PDF downloads.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    /// File extension without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    /// MIME type of the encoded bytes.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => PDF_CONTENT_TYPE,
            Self::Docx => DOCX_CONTENT_TYPE,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Raised for any `type` other than `pdf` or `docx`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported export type: {0}")]
pub struct UnsupportedFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnsupportedFormat;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(UnsupportedFormat(s.to_owned())),
        }
    }
}

/// Pipeline stage, recorded on log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Pending,
    QuotaChecked,
    Rendered,
    Encoded,
    Committed,
    Rejected,
    Failed,
}

impl ExportStage {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::QuotaChecked => "quota_checked",
            Self::Rendered => "rendered",
            Self::Encoded => "encoded",
            Self::Committed => "committed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ExportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded document ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub format: ExportFormat,
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Credit balance after the commit.
    pub remaining_credits: i32,
}

/// Download name for an exported document: `assignment_<id>.<ext>`.
///
/// # Examples
/// ```
/// use assignment_formatter::domain::DocumentId;
/// use assignment_formatter::domain::export::{ExportFormat, export_filename};
///
/// let id = DocumentId::new(42).expect("valid id");
/// assert_eq!(export_filename(id, ExportFormat::Docx), "assignment_42.docx");
/// ```
#[must_use]
pub fn export_filename(document_id: DocumentId, format: ExportFormat) -> String {
    format!("assignment_{document_id}.{}", format.extension())
}
