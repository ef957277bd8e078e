//! Flash notice handler.
//!
//! ```text
//! GET /api/v1/notices
//! ```

use actix_web::{HttpResponse, get};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache;
use crate::inbound::http::session::SessionContext;

/// Notices queued for the current session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NoticesResponse {
    #[schema(example = json!(["You have no document credits. Please purchase more to export."]))]
    pub notices: Vec<String>,
}

/// Return and clear queued notices.
///
/// Anonymous sessions simply have none.
#[utoipa::path(
    get,
    path = "/api/v1/notices",
    responses(
        (status = 200, description = "Pending notices", body = NoticesResponse),
        (status = 500, description = "Internal server error", body = crate::domain::ErrorResponse)
    ),
    tags = ["notices"],
    operation_id = "listNotices",
    security([])
)]
#[get("/notices")]
pub async fn list_notices(session: SessionContext) -> ApiResult<HttpResponse> {
    let notices = session.take_notices()?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache())
        .json(NoticesResponse { notices }))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test, web};

    use super::*;
    use crate::inbound::http::test_utils::test_session_middleware;

    #[actix_web::test]
    async fn empty_sessions_have_no_notices() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .service(web::scope("/api/v1").service(list_notices)),
        )
        .await;

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/api/v1/notices").to_request())
                .await;

        assert!(response.status().is_success());
        let body: NoticesResponse = test::read_body_json(response).await;
        assert!(body.notices.is_empty());
    }
}
