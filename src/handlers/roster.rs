use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::RosterService;

#[utoipa::path(
    get,
    path = "/teams",
    tag = "roster",
    responses((status = 200, description = "All teams"))
)]
pub async fn list_teams(roster_service: web::Data<RosterService>) -> Result<HttpResponse> {
    match roster_service.teams().await {
        Ok(teams) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": teams
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/participants",
    tag = "roster",
    responses((status = 200, description = "All participants"))
)]
pub async fn list_participants(roster_service: web::Data<RosterService>) -> Result<HttpResponse> {
    match roster_service.participants().await {
        Ok(participants) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": participants
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/participants/{id}/summary",
    tag = "roster",
    params(("id" = i64, Path, description = "Participant id")),
    responses(
        (status = 200, description = "Progress summary", body = ParticipantSummaryResponse),
        (status = 404, description = "Participant not found")
    )
)]
pub async fn participant_summary(
    roster_service: web::Data<RosterService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match roster_service.summary(path.into_inner()).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/participants/{id}",
    tag = "roster",
    request_body = ReassignTeamRequest,
    params(("id" = i64, Path, description = "Participant id")),
    responses(
        (status = 200, description = "Participant moved", body = ParticipantResponse),
        (status = 404, description = "Participant or team not found")
    )
)]
pub async fn reassign_team(
    roster_service: web::Data<RosterService>,
    path: web::Path<i64>,
    request: web::Json<ReassignTeamRequest>,
) -> Result<HttpResponse> {
    match roster_service
        .reassign_team(path.into_inner(), &request)
        .await
    {
        Ok(participant) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": participant
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "roster",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Participant found", body = ParticipantResponse),
        (status = 404, description = "No such participant on that team")
    )
)]
pub async fn login(
    roster_service: web::Data<RosterService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match roster_service.login(&request).await {
        Ok(participant) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": participant
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn roster_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/teams", web::get().to(list_teams))
        .route("/participants", web::get().to(list_participants))
        .route(
            "/participants/{id}/summary",
            web::get().to(participant_summary),
        )
        .route("/participants/{id}", web::patch().to(reassign_team))
        .route("/login", web::post().to(login));
}
