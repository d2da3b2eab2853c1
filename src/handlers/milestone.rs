use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::MilestoneService;

#[utoipa::path(
    get,
    path = "/milestones/{milestone_type}",
    tag = "milestones",
    params(("milestone_type" = String, Path, description = "Milestone type, e.g. 50_percent")),
    responses(
        (status = 200, description = "Milestone status", body = MilestoneStatusResponse),
        (status = 404, description = "Unknown milestone type")
    )
)]
pub async fn milestone_status(
    milestone_service: web::Data<MilestoneService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match milestone_service.status(&path).await {
        Ok(status) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": status
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn milestone_config(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/milestones/{milestone_type}",
        web::get().to(milestone_status),
    );
}
