use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::ActivityService;

#[utoipa::path(
    post,
    path = "/logs",
    tag = "activity",
    request_body = RecordActivityRequest,
    responses(
        (status = 200, description = "Activity recorded", body = RecordActivityResponse),
        (status = 400, description = "Invalid step count or date"),
        (status = 404, description = "Participant not found")
    )
)]
pub async fn record_activity(
    activity_service: web::Data<ActivityService>,
    request: web::Json<RecordActivityRequest>,
) -> Result<HttpResponse> {
    match activity_service.record(&request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/logs",
    tag = "activity",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Page size"),
        ("participant_id" = Option<i64>, Query, description = "Restrict to one participant")
    ),
    responses(
        (status = 200, description = "Paginated activity logs")
    )
)]
pub async fn list_logs(
    activity_service: web::Data<ActivityService>,
    query: web::Query<ActivityLogQuery>,
) -> Result<HttpResponse> {
    match activity_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/logs/{id}",
    tag = "activity",
    request_body = UpdateActivityLogRequest,
    params(("id" = i64, Path, description = "Activity log id")),
    responses(
        (status = 200, description = "Log updated", body = ActivityLogResponse),
        (status = 400, description = "Invalid step count or date"),
        (status = 404, description = "Log not found")
    )
)]
pub async fn update_log(
    activity_service: web::Data<ActivityService>,
    path: web::Path<i64>,
    request: web::Json<UpdateActivityLogRequest>,
) -> Result<HttpResponse> {
    match activity_service
        .update_log(path.into_inner(), &request)
        .await
    {
        Ok(log) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": log
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/logs/{id}",
    tag = "activity",
    params(("id" = i64, Path, description = "Activity log id")),
    responses(
        (status = 200, description = "Log deleted"),
        (status = 404, description = "Log not found")
    )
)]
pub async fn delete_log(
    activity_service: web::Data<ActivityService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match activity_service.delete_log(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Activity log deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn activity_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/logs")
            .route("", web::post().to(record_activity))
            .route("", web::get().to(list_logs))
            .route("/{id}", web::patch().to(update_log))
            .route("/{id}", web::delete().to(delete_log)),
    );
}
