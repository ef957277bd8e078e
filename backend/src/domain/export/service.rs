//! Export orchestrator implementing [`DocumentExportCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{
    ExportFormat, ExportStage, ExportedFile, QuotaDecision, QuotaDenial, UnsupportedFormat,
    credit_delta, evaluate, export_filename, local_day_start, render_print_ready,
};
use crate::domain::ports::{
    DailyCap, DocumentEncoder, DocumentExportCommand, EncodeError, EncodeInput, ExportCommit,
    ExportRequest, ExportStore, ExportStoreError,
};
use crate::domain::{Document, Error, Plan, PlanType, UserAccount};

/// Failure of an export request. No variant leaves the store mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// The user, their plan or the document could not be resolved.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The plan refused the export.
    #[error("export refused: {0}")]
    QuotaExceeded(QuotaDenial),
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormat),
    /// No encoder is registered for a supported format.
    #[error("no encoder registered for {0}")]
    EncoderMissing(ExportFormat),
    #[error(transparent)]
    Encoding(#[from] EncodeError),
    /// The blocking encoder task panicked or was cancelled.
    #[error("encoder task failed: {0}")]
    Worker(String),
    #[error(transparent)]
    Store(#[from] ExportStoreError),
}

impl ExportError {
    /// The quota denial carried by this error, if any.
    #[must_use]
    pub const fn quota_denial(&self) -> Option<&QuotaDenial> {
        match self {
            Self::QuotaExceeded(denial) => Some(denial),
            _ => None,
        }
    }

    /// Whether the request was refused rather than having failed.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::QuotaExceeded(_) | Self::UnsupportedFormat(_)
        )
    }
}

impl From<ExportError> for Error {
    fn from(value: ExportError) -> Self {
        match value {
            ExportError::NotFound(what) => Error::not_found(format!("{what} not found")),
            ExportError::QuotaExceeded(denial) => {
                let limit = match denial {
                    QuotaDenial::DailyLimitReached { limit } => Some(limit),
                    _ => None,
                };
                Error::quota_exceeded(denial.notice())
                    .with_details(json!({ "reason": denial.reason(), "limit": limit }))
            }
            ExportError::UnsupportedFormat(UnsupportedFormat(raw)) => {
                Error::invalid_request("unsupported export type")
                    .with_details(json!({ "type": raw }))
            }
            ExportError::Store(ExportStoreError::Connection { message }) => {
                Error::internal(format!("export store unavailable: {message}"))
            }
            other => Error::internal(other.to_string()),
        }
    }
}

/// Encoders keyed by the format they produce.
#[derive(Clone, Default)]
pub struct EncoderRegistry {
    encoders: Vec<Arc<dyn DocumentEncoder>>,
}

impl EncoderRegistry {
    pub fn new(encoders: Vec<Arc<dyn DocumentEncoder>>) -> Self {
        Self { encoders }
    }

    /// First encoder registered for `format`.
    pub fn find(&self, format: ExportFormat) -> Option<Arc<dyn DocumentEncoder>> {
        self.encoders
            .iter()
            .find(|encoder| encoder.format() == format)
            .cloned()
    }
}

/// Export service coordinating quota, rendering, encoding and the commit.
#[derive(Clone)]
pub struct DocumentExportService<S> {
    store: Arc<S>,
    encoders: EncoderRegistry,
    clock: Arc<dyn Clock>,
}

impl<S> DocumentExportService<S> {
    pub fn new(store: Arc<S>, encoders: EncoderRegistry, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            encoders,
            clock,
        }
    }
}

struct Resolved {
    user: UserAccount,
    plan: Plan,
    document: Document,
}

impl<S> DocumentExportService<S>
where
    S: ExportStore,
{
    async fn resolve(&self, request: &ExportRequest) -> Result<Resolved, ExportError> {
        let user = self
            .store
            .get_user(request.user_id)
            .await?
            .ok_or(ExportError::NotFound("user"))?;
        let plan = self
            .store
            .get_plan(user.current_plan_id)
            .await?
            .ok_or(ExportError::NotFound("plan"))?;
        let document = self
            .store
            .get_document(request.document_id, request.user_id)
            .await?
            .ok_or(ExportError::NotFound("document"))?;
        Ok(Resolved {
            user,
            plan,
            document,
        })
    }

    /// Daily cap applicable to this plan, with today's boundary.
    fn daily_cap(&self, plan: &Plan) -> Option<DailyCap> {
        match (plan.plan_type, plan.max_documents_per_day) {
            (PlanType::MonthlySubscription, Some(limit)) => Some(DailyCap {
                limit,
                day_start: local_day_start(self.clock.as_ref()),
            }),
            _ => None,
        }
    }

    async fn check_quota(
        &self,
        resolved: &Resolved,
        cap: Option<DailyCap>,
    ) -> Result<(), ExportError> {
        let today = match cap {
            Some(cap) => {
                self.store
                    .count_exported_today(resolved.user.id, cap.day_start)
                    .await?
            }
            None => 0,
        };
        match evaluate(&resolved.plan, &resolved.user, today) {
            QuotaDecision::Allow => Ok(()),
            QuotaDecision::Deny(denial) => Err(ExportError::QuotaExceeded(denial)),
        }
    }

    async fn encode(
        &self,
        format: ExportFormat,
        input: EncodeInput,
    ) -> Result<Vec<u8>, ExportError> {
        let encoder = self
            .encoders
            .find(format)
            .ok_or(ExportError::EncoderMissing(format))?;
        let span = tracing::Span::current();
        let bytes = tokio::task::spawn_blocking(move || span.in_scope(|| encoder.encode(&input)))
            .await
            .map_err(|err| ExportError::Worker(err.to_string()))??;
        Ok(bytes)
    }

    fn map_commit_error(error: ExportStoreError, plan_type: PlanType) -> ExportError {
        match error {
            ExportStoreError::CreditsExhausted => {
                ExportError::QuotaExceeded(QuotaDenial::credits_exhausted_for(plan_type))
            }
            ExportStoreError::DailyLimitReached { limit } => {
                ExportError::QuotaExceeded(QuotaDenial::DailyLimitReached { limit })
            }
            ExportStoreError::DocumentMissing => ExportError::NotFound("document"),
            other => ExportError::Store(other),
        }
    }

    async fn run(&self, request: &ExportRequest) -> Result<ExportedFile, ExportError> {
        let resolved = self.resolve(request).await?;
        let cap = self.daily_cap(&resolved.plan);
        self.check_quota(&resolved, cap).await?;
        debug!(stage = %ExportStage::QuotaChecked, plan = %resolved.plan.plan_type);

        let watermark = resolved.plan.is_watermarked_export;
        let print_ready_html = render_print_ready(&resolved.document.content, watermark);
        debug!(stage = %ExportStage::Rendered, watermark);

        let format: ExportFormat = request.format.parse()?;
        let input = EncodeInput {
            content_html: resolved.document.content.clone(),
            print_ready_html,
            watermark,
        };
        let bytes = self.encode(format, input).await?;
        debug!(stage = %ExportStage::Encoded, %format, size = bytes.len());

        let commit = ExportCommit {
            document_id: resolved.document.id,
            user_id: resolved.user.id,
            credit_delta: credit_delta(resolved.plan.plan_type, resolved.user.document_credits),
            daily_cap: cap,
            exported_at: self.clock.utc(),
        };
        let receipt = self
            .store
            .apply_export(&commit)
            .await
            .map_err(|err| Self::map_commit_error(err, resolved.plan.plan_type))?;

        Ok(ExportedFile {
            format,
            filename: export_filename(resolved.document.id, format),
            bytes,
            remaining_credits: receipt.remaining_credits,
        })
    }
}

#[async_trait]
impl<S> DocumentExportCommand for DocumentExportService<S>
where
    S: ExportStore,
{
    #[tracing::instrument(
        name = "export",
        skip_all,
        fields(user_id = %request.user_id, document_id = %request.document_id)
    )]
    async fn export(&self, request: ExportRequest) -> Result<ExportedFile, ExportError> {
        debug!(stage = %ExportStage::Pending, requested = %request.format);
        match self.run(&request).await {
            Ok(file) => {
                info!(
                    stage = %ExportStage::Committed,
                    format = %file.format,
                    remaining_credits = file.remaining_credits,
                    "document exported"
                );
                Ok(file)
            }
            Err(err) if err.is_rejection() => {
                info!(stage = %ExportStage::Rejected, error = %err, "export rejected");
                Err(err)
            }
            Err(err) => {
                warn!(stage = %ExportStage::Failed, error = %err, "export failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
