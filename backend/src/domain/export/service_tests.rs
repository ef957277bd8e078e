//! Tests for the export orchestrator.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::rstest;

use super::*;
use crate::domain::export::WATERMARK_TEXT;
use crate::domain::ports::{ExportReceipt, MockDocumentEncoder, MockExportStore};
use crate::domain::{DocumentId, DocumentStatus, ErrorCode, PlanId, UserId};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

fn user_id() -> UserId {
    UserId::new(7).expect("valid id")
}

fn document_id() -> DocumentId {
    DocumentId::new(42).expect("valid id")
}

fn plan(plan_type: PlanType, cap: Option<u32>, watermarked: bool) -> Plan {
    Plan {
        id: PlanId::new(2).expect("valid id"),
        name: "Fixture".to_owned(),
        plan_type,
        price_minor: 0,
        currency: "USD".to_owned(),
        document_cost_minor: 0,
        is_watermarked_export: watermarked,
        max_documents_per_day: cap,
        initial_credits: 0,
        features: Vec::new(),
    }
}

fn account(credits: i32) -> UserAccount {
    UserAccount {
        id: user_id(),
        name: "Ada".to_owned(),
        document_credits: credits,
        current_plan_id: PlanId::new(2).expect("valid id"),
        subscription_end: None,
    }
}

fn document() -> Document {
    let at = FixtureClock.utc();
    Document {
        id: document_id(),
        user_id: user_id(),
        title: "Essay".to_owned(),
        content: "<h1>Essay</h1><p>Body text</p>".to_owned(),
        status: DocumentStatus::Submitted,
        created_at: at,
        updated_at: at,
    }
}

fn request(format: &str) -> ExportRequest {
    ExportRequest {
        user_id: user_id(),
        document_id: document_id(),
        format: format.to_owned(),
    }
}

/// Store that resolves the user, plan and document.
fn resolving_store(plan: Plan, credits: i32) -> MockExportStore {
    let mut store = MockExportStore::new();
    store
        .expect_get_user()
        .returning(move |_| Ok(Some(account(credits))));
    store
        .expect_get_plan()
        .returning(move |_| Ok(Some(plan.clone())));
    store
        .expect_get_document()
        .returning(|_, _| Ok(Some(document())));
    store
}

fn encoder(format: ExportFormat, calls: usize) -> MockDocumentEncoder {
    let mut encoder = MockDocumentEncoder::new();
    encoder.expect_format().return_const(format);
    encoder
        .expect_encode()
        .times(calls)
        .returning(|_| Ok(b"encoded".to_vec()));
    encoder
}

fn service(
    store: MockExportStore,
    encoders: Vec<MockDocumentEncoder>,
) -> DocumentExportService<MockExportStore> {
    let encoders = encoders
        .into_iter()
        .map(|encoder| Arc::new(encoder) as Arc<dyn DocumentEncoder>)
        .collect();
    DocumentExportService::new(
        Arc::new(store),
        EncoderRegistry::new(encoders),
        Arc::new(FixtureClock),
    )
}

#[tokio::test]
async fn free_plan_export_spends_a_credit_and_names_the_file() {
    let mut store = resolving_store(plan(PlanType::Free, None, true), 2);
    store
        .expect_apply_export()
        .withf(|commit| {
            commit.credit_delta == -1
                && commit.daily_cap.is_none()
                && commit.document_id == document_id()
                && commit.exported_at == FixtureClock.utc()
        })
        .times(1)
        .returning(|_| Ok(ExportReceipt { remaining_credits: 1 }));
    store.expect_count_exported_today().times(0);

    let file = service(store, vec![encoder(ExportFormat::Pdf, 1)])
        .export(request("pdf"))
        .await
        .expect("export succeeds");

    assert_eq!(file.filename, "assignment_42.pdf");
    assert_eq!(file.format, ExportFormat::Pdf);
    assert_eq!(file.bytes, b"encoded");
    assert_eq!(file.remaining_credits, 1);
}

#[tokio::test]
async fn watermark_flag_follows_the_plan() {
    let mut store = resolving_store(plan(PlanType::Free, None, true), 1);
    store
        .expect_apply_export()
        .returning(|_| Ok(ExportReceipt { remaining_credits: 0 }));
    let mut docx = MockDocumentEncoder::new();
    docx.expect_format().return_const(ExportFormat::Docx);
    docx.expect_encode()
        .withf(|input| {
            input.watermark
                && input.print_ready_html.contains(WATERMARK_TEXT)
                && input.content_html == "<h1>Essay</h1><p>Body text</p>"
        })
        .times(1)
        .returning(|_| Ok(b"PK".to_vec()));

    let file = service(store, vec![encoder(ExportFormat::Pdf, 0), docx])
        .export(request("DOCX"))
        .await
        .expect("export succeeds");

    assert_eq!(file.filename, "assignment_42.docx");
}

#[rstest]
#[case(PlanType::Free, QuotaDenial::NoFreeCredits)]
#[case(PlanType::OneTimeDocument, QuotaDenial::NoPurchasedCredits)]
#[tokio::test]
async fn exhausted_credits_are_rejected_without_side_effects(
    #[case] plan_type: PlanType,
    #[case] expected: QuotaDenial,
) {
    let mut store = resolving_store(plan(plan_type, None, false), 0);
    store.expect_apply_export().times(0);

    let err = service(store, vec![encoder(ExportFormat::Pdf, 0)])
        .export(request("pdf"))
        .await
        .expect_err("quota denial");

    assert_eq!(err, ExportError::QuotaExceeded(expected));
    assert!(err.is_rejection());
}

#[tokio::test]
async fn monthly_cap_counts_todays_exports() {
    let mut store = resolving_store(plan(PlanType::MonthlySubscription, Some(3), false), 0);
    store
        .expect_count_exported_today()
        .times(1)
        .returning(|_, _| Ok(3));
    store.expect_apply_export().times(0);

    let err = service(store, vec![encoder(ExportFormat::Pdf, 0)])
        .export(request("pdf"))
        .await
        .expect_err("daily cap reached");

    assert_eq!(
        err.quota_denial(),
        Some(&QuotaDenial::DailyLimitReached { limit: 3 })
    );
}

#[tokio::test]
async fn monthly_export_below_cap_never_spends_credits() {
    let mut store = resolving_store(plan(PlanType::MonthlySubscription, Some(3), false), 5);
    store
        .expect_count_exported_today()
        .times(1)
        .returning(|_, _| Ok(2));
    store
        .expect_apply_export()
        .withf(|commit| {
            commit.credit_delta == 0 && commit.daily_cap.is_some_and(|cap| cap.limit == 3)
        })
        .times(1)
        .returning(|_| Ok(ExportReceipt { remaining_credits: 5 }));

    let file = service(store, vec![encoder(ExportFormat::Pdf, 1)])
        .export(request("pdf"))
        .await
        .expect("export succeeds");

    assert_eq!(file.remaining_credits, 5);
}

#[tokio::test]
async fn uncapped_subscription_skips_the_daily_count() {
    let mut store = resolving_store(plan(PlanType::MonthlySubscription, None, false), 0);
    store.expect_count_exported_today().times(0);
    store
        .expect_apply_export()
        .withf(|commit| commit.daily_cap.is_none())
        .times(1)
        .returning(|_| Ok(ExportReceipt { remaining_credits: 0 }));

    service(store, vec![encoder(ExportFormat::Pdf, 1)])
        .export(request("pdf"))
        .await
        .expect("export succeeds");
}

#[rstest]
#[case("xml")]
#[case("")]
#[tokio::test]
async fn unsupported_type_fails_before_encoding_or_commit(#[case] raw: &str) {
    let mut store = resolving_store(plan(PlanType::OneTimeDocument, None, false), 4);
    store.expect_apply_export().times(0);

    let err = service(store, vec![encoder(ExportFormat::Pdf, 0)])
        .export(request(raw))
        .await
        .expect_err("unsupported type");

    assert_eq!(
        err,
        ExportError::UnsupportedFormat(UnsupportedFormat(raw.to_owned()))
    );
}

#[tokio::test]
async fn quota_is_checked_before_the_type() {
    let store = resolving_store(plan(PlanType::Free, None, true), 0);

    let err = service(store, Vec::new())
        .export(request("xml"))
        .await
        .expect_err("quota denial wins");

    assert_eq!(err, ExportError::QuotaExceeded(QuotaDenial::NoFreeCredits));
}

#[tokio::test]
async fn missing_document_is_not_found() {
    let mut store = MockExportStore::new();
    store
        .expect_get_user()
        .returning(|_| Ok(Some(account(3))));
    store
        .expect_get_plan()
        .returning(|_| Ok(Some(plan(PlanType::Free, None, true))));
    store.expect_get_document().returning(|_, _| Ok(None));
    store.expect_apply_export().times(0);

    let err = service(store, vec![encoder(ExportFormat::Pdf, 0)])
        .export(request("pdf"))
        .await
        .expect_err("missing document");

    assert_eq!(err, ExportError::NotFound("document"));
    assert_eq!(Error::from(err).code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn encoder_failure_leaves_the_store_untouched() {
    let mut store = resolving_store(plan(PlanType::OneTimeDocument, None, false), 4);
    store.expect_apply_export().times(0);
    let mut failing = MockDocumentEncoder::new();
    failing.expect_format().return_const(ExportFormat::Pdf);
    failing
        .expect_encode()
        .times(1)
        .returning(|_| Err(EncodeError::fallback_exhausted("boom")));

    let err = service(store, vec![failing])
        .export(request("pdf"))
        .await
        .expect_err("encoding fails");

    assert!(matches!(err, ExportError::Encoding(_)));
    assert!(!err.is_rejection());
    assert_eq!(Error::from(err).code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn missing_encoder_is_an_internal_failure() {
    let mut store = resolving_store(plan(PlanType::OneTimeDocument, None, false), 4);
    store.expect_apply_export().times(0);

    let err = service(store, vec![encoder(ExportFormat::Pdf, 0)])
        .export(request("docx"))
        .await
        .expect_err("no docx encoder");

    assert_eq!(err, ExportError::EncoderMissing(ExportFormat::Docx));
}

#[rstest]
#[case(
    ExportStoreError::credits_exhausted(),
    ExportError::QuotaExceeded(QuotaDenial::NoPurchasedCredits)
)]
#[case(
    ExportStoreError::daily_limit_reached(1_u32),
    ExportError::QuotaExceeded(QuotaDenial::DailyLimitReached { limit: 1 })
)]
#[case(ExportStoreError::document_missing(), ExportError::NotFound("document"))]
#[case(
    ExportStoreError::query("rolled back"),
    ExportError::Store(ExportStoreError::query("rolled back"))
)]
#[tokio::test]
async fn commit_failures_are_translated(
    #[case] failure: ExportStoreError,
    #[case] expected: ExportError,
) {
    let mut store = resolving_store(plan(PlanType::OneTimeDocument, None, false), 1);
    store
        .expect_apply_export()
        .times(1)
        .return_once(move |_| Err(failure));

    let err = service(store, vec![encoder(ExportFormat::Pdf, 1)])
        .export(request("pdf"))
        .await
        .expect_err("commit fails");

    assert_eq!(err, expected);
}

#[rstest]
fn quota_errors_carry_reason_details() {
    let error = Error::from(ExportError::QuotaExceeded(QuotaDenial::DailyLimitReached {
        limit: 10,
    }));

    assert_eq!(error.code(), ErrorCode::QuotaExceeded);
    let details = error.details().expect("details present");
    assert_eq!(details["reason"], "daily limit reached");
    assert_eq!(details["limit"], 10);
}

#[rstest]
fn unsupported_type_maps_to_invalid_request() {
    let error = Error::from(ExportError::UnsupportedFormat(UnsupportedFormat(
        "xml".to_owned(),
    )));

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "unsupported export type");
}

#[rstest]
fn store_outage_maps_to_internal_error() {
    let error = Error::from(ExportError::Store(ExportStoreError::connection("refused")));
    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.message(), "export store unavailable: refused");
}
