//! Authored assignment documents.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DocumentId, UserId};

/// Titles longer than this are truncated on save.
pub const MAX_TITLE_CHARS: usize = 250;

/// Lifecycle of a document.
///
/// `Exported` is only reached after an encoder produced bytes and the export
/// commit succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Submitted,
    Exported,
}

impl DocumentStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Exported => "exported",
        }
    }
}

/// Raised when a stored status is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document status: {0}")]
pub struct UnknownDocumentStatus(pub String);

impl FromStr for DocumentStatus {
    type Err = UnknownDocumentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "exported" => Ok(Self::Exported),
            other => Err(UnknownDocumentStatus(other.to_owned())),
        }
    }
}

/// A stored document with its HTML body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub user_id: UserId,
    pub title: String,
    /// Rich-text body as produced by the editor.
    pub content: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection used by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(value: &Document) -> Self {
        Self {
            id: value.id,
            title: value.title.clone(),
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Truncate a title to [`MAX_TITLE_CHARS`] characters.
///
/// # Examples
/// ```
/// use assignment_formatter::domain::truncate_title;
///
/// assert_eq!(truncate_title("Essay"), "Essay");
/// assert_eq!(truncate_title(&"x".repeat(300)).chars().count(), 250);
/// ```
#[must_use]
pub fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DocumentStatus::Draft)]
    #[case(DocumentStatus::Submitted)]
    #[case(DocumentStatus::Exported)]
    fn status_parses_its_storage_form(#[case] status: DocumentStatus) {
        assert_eq!(status.as_str().parse::<DocumentStatus>(), Ok(status));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("archived".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let title = "é".repeat(260);
        let truncated = truncate_title(&title);
        assert_eq!(truncated.chars().count(), MAX_TITLE_CHARS);
    }
}
