//! End-to-end export flows against the in-memory store.

mod support;

use std::io::Read;
use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use assignment_formatter::domain::{
    DocumentId, DocumentStatus, Plan, PlanId, PlanType, UserId,
};
use assignment_formatter::outbound::memory::{
    FREE_PLAN_ID, InMemoryStore, MONTHLY_PLAN_ID, PAY_PER_DOCUMENT_PLAN_ID,
};
use chrono::{DateTime, Local, TimeZone, Utc};
use rstest::rstest;
use serde_json::Value;
use support::{FixtureClock, app_for, app_with_clock, draft, get, login, store, user};

const USER: i64 = 1;
const DOC: i64 = 10;

fn user_id(raw: i64) -> UserId {
    UserId::new(raw).expect("user id")
}

fn doc_id(raw: i64) -> DocumentId {
    DocumentId::new(raw).expect("document id")
}

#[actix_web::test]
async fn free_user_exports_a_watermarked_pdf() {
    let store = store(|state| {
        state.insert_user(user(USER, FREE_PLAN_ID, 3));
        state.insert_document(draft(DOC, USER));
    });
    let app = test::init_service(app_for(&store)).await;
    let cookie = login(&app, USER).await;

    let response = get(&app, "/api/v1/documents/10/export?type=pdf", &cookie).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/pdf")
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(disposition.contains("assignment_10.pdf"));
    let body = test::read_body(response).await;
    assert!(body.starts_with(b"%PDF"));

    let account = store.user(user_id(USER)).expect("user");
    assert_eq!(account.document_credits, 2);
    let document = store.document(doc_id(DOC)).expect("document");
    assert_eq!(document.status, DocumentStatus::Exported);
}

#[actix_web::test]
async fn docx_export_carries_content_and_watermark_header() {
    let store = store(|state| {
        state.insert_user(user(USER, FREE_PLAN_ID, 3));
        state.insert_document(draft(DOC, USER));
    });
    let app = test::init_service(app_for(&store)).await;
    let cookie = login(&app, USER).await;

    let response = get(&app, "/export/10?type=docx", &cookie).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = test::read_body(response).await;
    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(body.to_vec())).expect("docx is a zip");
    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .expect("main part")
        .read_to_string(&mut document_xml)
        .expect("utf-8 part");
    assert!(document_xml.contains("Title"));
    assert!(document_xml.contains("Body text"));
    let has_header = archive
        .file_names()
        .any(|name| name.starts_with("word/header"));
    assert!(has_header);
}

#[actix_web::test]
async fn exhausted_credits_are_refused_on_both_paths() {
    let store = store(|state| {
        state.insert_user(user(USER, FREE_PLAN_ID, 0));
        state.insert_document(draft(DOC, USER));
    });
    let app = test::init_service(app_for(&store)).await;
    let cookie = login(&app, USER).await;

    let api = get(&app, "/api/v1/documents/10/export?type=pdf", &cookie).await;
    assert_eq!(api.status(), StatusCode::PAYMENT_REQUIRED);
    let body: Value = test::read_body_json(api).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["details"]["reason"], "no free credits");

    let browser = get(&app, "/export/10?type=pdf", &cookie).await;
    assert_eq!(browser.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        browser
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/editor/10")
    );
    let cookie = support::session_cookie(&browser).unwrap_or(cookie);

    let notices = get(&app, "/api/v1/notices", &cookie).await;
    let notices: Value = test::read_body_json(notices).await;
    assert_eq!(notices["notices"].as_array().map(Vec::len), Some(1));

    let account = store.user(user_id(USER)).expect("user");
    assert_eq!(account.document_credits, 0);
    let document = store.document(doc_id(DOC)).expect("document");
    assert_eq!(document.status, DocumentStatus::Draft);
}

/// User on a monthly plan capped at three exports a day, with four drafts.
fn capped_monthly_store() -> Arc<InMemoryStore> {
    let capped = PlanId::new(4).expect("plan id");
    store(|state| {
        state.insert_plan(Plan {
            id: capped,
            name: "Monthly Lite".to_owned(),
            plan_type: PlanType::MonthlySubscription,
            price_minor: 499,
            currency: "USD".to_owned(),
            document_cost_minor: 0,
            is_watermarked_export: false,
            max_documents_per_day: Some(3),
            initial_credits: 0,
            features: Vec::new(),
        });
        state.insert_user(user(USER, capped.get(), 0));
        for id in 1..=4 {
            state.insert_document(draft(id, USER));
        }
    })
}

fn local_instant(day: u32, hour: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(2026, 5, day, hour, 30, 0)
        .earliest()
        .expect("local fixture time")
        .with_timezone(&Utc)
}

#[actix_web::test]
async fn daily_cap_refuses_the_export_past_the_limit() {
    let store = capped_monthly_store();
    let app = test::init_service(app_for(&store)).await;
    let cookie = login(&app, USER).await;

    for id in 1..=3 {
        let response = get(
            &app,
            &format!("/api/v1/documents/{id}/export?type=pdf"),
            &cookie,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "export {id}");
    }

    let response = get(&app, "/api/v1/documents/4/export?type=pdf", &cookie).await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["details"]["reason"], "daily limit reached");
    assert_eq!(body["details"]["limit"], 3);
    let document = store.document(doc_id(4)).expect("document");
    assert_eq!(document.status, DocumentStatus::Draft);
}

#[actix_web::test]
async fn failed_commit_leaves_the_store_untouched() {
    let store = store(|state| {
        state.insert_user(user(USER, PAY_PER_DOCUMENT_PLAN_ID, 2));
        state.insert_document(draft(DOC, USER));
    });
    let app = test::init_service(app_for(&store)).await;
    let cookie = login(&app, USER).await;
    store.fail_next_commit();

    let response = get(&app, "/api/v1/documents/10/export?type=pdf", &cookie).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(
        store.user(user_id(USER)).expect("user").document_credits,
        2
    );
    assert_eq!(
        store.document(doc_id(DOC)).expect("document").status,
        DocumentStatus::Draft
    );
}

#[rstest]
#[case("/api/v1/documents/10/export?type=xml", StatusCode::BAD_REQUEST)]
#[case("/api/v1/documents/11/export?type=pdf", StatusCode::NOT_FOUND)]
#[case("/api/v1/documents/0/export?type=pdf", StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn refused_exports_do_not_mutate(#[case] uri: &str, #[case] expected: StatusCode) {
    let store = store(|state| {
        state.insert_user(user(USER, FREE_PLAN_ID, 3));
        state.insert_user(user(2, MONTHLY_PLAN_ID, 0));
        state.insert_document(draft(DOC, USER));
        state.insert_document(draft(11, 2));
    });
    let app = test::init_service(app_for(&store)).await;
    let cookie = login(&app, USER).await;

    let response = get(&app, uri, &cookie).await;

    assert_eq!(response.status(), expected);
    assert_eq!(
        store.user(user_id(USER)).expect("user").document_credits,
        3
    );
    assert_eq!(
        store.document(doc_id(11)).expect("document").status,
        DocumentStatus::Draft
    );
}

#[actix_web::test]
async fn anonymous_exports_are_unauthorised() {
    let store = store(|state| {
        state.insert_user(user(USER, FREE_PLAN_ID, 3));
        state.insert_document(draft(DOC, USER));
    });
    let app = test::init_service(app_for(&store)).await;

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/documents/10/export?type=pdf")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn daily_cap_resets_at_local_midnight() {
    let store = capped_monthly_store();
    let clock = FixtureClock::at(local_instant(4, 22));
    let app = test::init_service(app_with_clock(&store, clock.clone())).await;
    let cookie = login(&app, USER).await;

    for id in 1..=3 {
        let uri = format!("/api/v1/documents/{id}/export?type=pdf");
        let response = get(&app, &uri, &cookie).await;
        assert_eq!(response.status(), StatusCode::OK, "export {id}");
    }
    let refused = get(&app, "/api/v1/documents/4/export?type=pdf", &cookie).await;
    assert_eq!(refused.status(), StatusCode::PAYMENT_REQUIRED);

    clock.set(local_instant(5, 0));
    let response = get(&app, "/api/v1/documents/4/export?type=pdf", &cookie).await;

    assert_eq!(response.status(), StatusCode::OK);
    let document = store.document(doc_id(4)).expect("document");
    assert_eq!(document.status, DocumentStatus::Exported);
    assert_eq!(document.updated_at, local_instant(5, 0));
}
