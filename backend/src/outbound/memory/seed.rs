//! Demo data for running the server without a database.

use chrono::{DateTime, Utc};

use crate::domain::{
    Document, DocumentId, DocumentStatus, Plan, PlanId, PlanType, UserAccount, UserId,
};

use super::StoreState;

pub const FREE_PLAN_ID: i64 = 1;
pub const PAY_PER_DOCUMENT_PLAN_ID: i64 = 2;
pub const MONTHLY_PLAN_ID: i64 = 3;
pub const DEMO_USER_ID: i64 = 1;

fn plan_id(raw: i64) -> Option<PlanId> {
    PlanId::new(raw).ok()
}

/// The three plans every deployment starts with.
pub fn default_plans() -> Vec<Plan> {
    let mut plans = Vec::new();
    if let Some(id) = plan_id(FREE_PLAN_ID) {
        plans.push(Plan {
            id,
            name: "Free".to_owned(),
            plan_type: PlanType::Free,
            price_minor: 0,
            currency: "USD".to_owned(),
            document_cost_minor: 0,
            is_watermarked_export: true,
            max_documents_per_day: None,
            initial_credits: 3,
            features: vec![
                "3 document exports".to_owned(),
                "Watermarked PDF and DOCX".to_owned(),
            ],
        });
    }
    if let Some(id) = plan_id(PAY_PER_DOCUMENT_PLAN_ID) {
        plans.push(Plan {
            id,
            name: "Pay Per Document".to_owned(),
            plan_type: PlanType::OneTimeDocument,
            price_minor: 0,
            currency: "USD".to_owned(),
            document_cost_minor: 199,
            is_watermarked_export: false,
            max_documents_per_day: None,
            initial_credits: 0,
            features: vec![
                "Pay per export".to_owned(),
                "No watermark".to_owned(),
            ],
        });
    }
    if let Some(id) = plan_id(MONTHLY_PLAN_ID) {
        plans.push(Plan {
            id,
            name: "Monthly Standard".to_owned(),
            plan_type: PlanType::MonthlySubscription,
            price_minor: 999,
            currency: "USD".to_owned(),
            document_cost_minor: 0,
            is_watermarked_export: false,
            max_documents_per_day: Some(10),
            initial_credits: 0,
            features: vec![
                "Up to 10 exports per day".to_owned(),
                "No watermark".to_owned(),
            ],
        });
    }
    plans
}

/// Plans plus one free-tier user owning a sample draft.
pub fn demo_state(now: DateTime<Utc>) -> StoreState {
    let mut state = StoreState::with_plans(default_plans());
    let (Ok(user_id), Some(free)) = (UserId::new(DEMO_USER_ID), plan_id(FREE_PLAN_ID)) else {
        return state;
    };
    state.insert_user(UserAccount {
        id: user_id,
        name: "Demo Student".to_owned(),
        document_credits: 3,
        current_plan_id: free,
        subscription_end: None,
    });
    if let Ok(document_id) = DocumentId::new(1) {
        state.insert_document(Document {
            id: document_id,
            user_id,
            title: "Sample Essay".to_owned(),
            content: "<h1>Sample Essay</h1><p>Introduction paragraph.</p>\
                      <ul><li>First point</li><li>Second point</li></ul>"
                .to_owned(),
            status: DocumentStatus::Draft,
            created_at: now,
            updated_at: now,
        });
    }
    state
}
