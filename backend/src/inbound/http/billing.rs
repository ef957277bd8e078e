//! Plan listing and simulated checkout.
//!
//! ```text
//! GET  /api/v1/plans
//! POST /api/v1/payments {"planId":2,"quantity":3}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{PurchaseRequest, PurchaseResponse};
use crate::domain::{ErrorResponse, Plan, PlanId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, parse_count_field, parse_id_field};

/// Checkout payload. `quantity` defaults to one.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[schema(example = 2)]
    pub plan_id: Option<i64>,
    #[schema(example = 1)]
    pub quantity: Option<i64>,
}

/// List every plan, ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/plans",
    responses(
        (status = 200, description = "Plans", body = [Plan]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["billing"],
    operation_id = "listPlans",
    security([])
)]
#[get("/plans")]
pub async fn list_plans(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Plan>>> {
    Ok(web::Json(state.plans.list_plans().await?))
}

/// Record a simulated payment and apply it to the session user.
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment completed", body = PurchaseResponse),
        (status = 400, description = "Invalid plan or quantity", body = ErrorResponse),
        (status = 401, description = "Unauthorised", body = ErrorResponse),
        (status = 404, description = "Plan not found", body = ErrorResponse)
    ),
    tags = ["billing"],
    operation_id = "createPayment"
)]
#[post("/payments")]
pub async fn create_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PaymentRequest>,
) -> ApiResult<web::Json<PurchaseResponse>> {
    let user_id = session.require_user_id()?;
    let PaymentRequest { plan_id, quantity } = payload.into_inner();
    let plan_id = plan_id.ok_or_else(|| missing_field_error("planId"))?;
    let plan_id: PlanId = parse_id_field(plan_id, "planId")?;
    let quantity = parse_count_field(quantity.unwrap_or(1), "quantity")?;
    let response = state
        .billing
        .purchase(PurchaseRequest {
            user_id,
            plan_id,
            quantity,
        })
        .await?;
    Ok(web::Json(response))
}
