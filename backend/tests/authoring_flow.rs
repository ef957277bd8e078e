//! Draft, dashboard and simulated payment flows against the in-memory store.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use assignment_formatter::domain::{DocumentId, DocumentStatus, UserId};
use assignment_formatter::outbound::memory::{FREE_PLAN_ID, PAY_PER_DOCUMENT_PLAN_ID};
use serde_json::{Value, json};
use support::{CONTENT, app_for, get, login, store, user};

const USER: i64 = 1;

#[actix_web::test]
async fn draft_then_export_appears_on_the_dashboard() {
    let store = store(|state| state.insert_user(user(USER, FREE_PLAN_ID, 3)));
    let app = test::init_service(app_for(&store)).await;
    let cookie = login(&app, USER).await;

    let saved = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/documents/drafts")
            .cookie(cookie.clone())
            .set_json(json!({"title": "Essay", "content": CONTENT}))
            .to_request(),
    )
    .await;
    assert_eq!(saved.status(), StatusCode::OK);
    let ack: Value = test::read_body_json(saved).await;
    assert_eq!(ack["ok"], true);
    let id = ack["documentId"].as_i64().expect("document id");

    let exported = get(&app, &format!("/export/{id}?type=docx"), &cookie).await;
    assert_eq!(exported.status(), StatusCode::OK);

    let dashboard = get(&app, "/api/v1/documents", &cookie).await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    let dashboard: Value = test::read_body_json(dashboard).await;
    assert_eq!(dashboard["documentCredits"], 2);
    assert_eq!(dashboard["documents"].as_array().map(Vec::len), Some(1));

    let document = store
        .document(DocumentId::new(id).expect("id"))
        .expect("document");
    assert_eq!(document.status, DocumentStatus::Exported);
    assert_eq!(document.title, "Essay");
}

#[actix_web::test]
async fn purchased_credits_unlock_exports() {
    let store = store(|state| {
        state.insert_user(user(USER, PAY_PER_DOCUMENT_PLAN_ID, 0));
        state.insert_document(support::draft(5, USER));
    });
    let app = test::init_service(app_for(&store)).await;
    let cookie = login(&app, USER).await;

    let refused = get(&app, "/api/v1/documents/5/export?type=pdf", &cookie).await;
    assert_eq!(refused.status(), StatusCode::PAYMENT_REQUIRED);
    let refused: Value = test::read_body_json(refused).await;
    assert_eq!(refused["details"]["reason"], "no purchased credits");

    let paid = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payments")
            .cookie(cookie.clone())
            .set_json(json!({"planId": PAY_PER_DOCUMENT_PLAN_ID, "quantity": 2}))
            .to_request(),
    )
    .await;
    assert_eq!(paid.status(), StatusCode::OK);
    let paid: Value = test::read_body_json(paid).await;
    assert_eq!(paid["reference"], "SIMULATED_REF_1");
    assert_eq!(paid["amountMinor"], 398);

    let user_id = UserId::new(USER).expect("id");
    assert_eq!(store.user(user_id).expect("user").document_credits, 2);

    let exported = get(&app, "/api/v1/documents/5/export?type=pdf", &cookie).await;
    assert_eq!(exported.status(), StatusCode::OK);
    assert_eq!(store.user(user_id).expect("user").document_credits, 1);
    assert_eq!(store.transactions().len(), 1);
}

#[actix_web::test]
async fn health_checks_are_not_cached() {
    let store = store(|_| {});
    let app = test::init_service(app_for(&store)).await;

    for uri in ["/health/ready", "/health/live"] {
        let response =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(
            response
                .headers()
                .get(actix_web::http::header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("no-store")
        );
    }
}
