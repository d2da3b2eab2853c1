use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::RaffleService;

#[utoipa::path(
    get,
    path = "/prizes",
    tag = "prizes",
    responses((status = 200, description = "All prizes with winners"))
)]
pub async fn list_prizes(raffle_service: web::Data<RaffleService>) -> Result<HttpResponse> {
    match raffle_service.list_prizes().await {
        Ok(prizes) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": prizes
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/prizes/{week}/entries",
    tag = "prizes",
    params(("week" = u32, Path, description = "Challenge week")),
    responses(
        (status = 200, description = "Raffle entries for the week"),
        (status = 404, description = "No prize for that week")
    )
)]
pub async fn week_entries(
    raffle_service: web::Data<RaffleService>,
    path: web::Path<u32>,
) -> Result<HttpResponse> {
    match raffle_service.entries_for_week(path.into_inner()).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": entries
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/prizes/{week}/opt",
    tag = "prizes",
    request_body = PrizeOptRequest,
    params(("week" = u32, Path, description = "Challenge week")),
    responses(
        (status = 200, description = "Opt-in state updated", body = PrizeEntryResponse),
        (status = 404, description = "Prize or participant not found")
    )
)]
pub async fn set_opt_in(
    raffle_service: web::Data<RaffleService>,
    path: web::Path<u32>,
    request: web::Json<PrizeOptRequest>,
) -> Result<HttpResponse> {
    match raffle_service.set_opt_in(path.into_inner(), &request).await {
        Ok(entry) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": entry
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/prizes/{week}/preview-draw",
    tag = "prizes",
    params(("week" = u32, Path, description = "Challenge week")),
    responses(
        (status = 200, description = "Who is in the hat", body = DrawPreview),
        (status = 404, description = "No prize for that week")
    )
)]
pub async fn preview_weekly_draw(
    raffle_service: web::Data<RaffleService>,
    path: web::Path<u32>,
) -> Result<HttpResponse> {
    match raffle_service.preview_weekly(path.into_inner()).await {
        Ok(preview) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": preview
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/prizes/{week}/draw",
    tag = "prizes",
    params(
        ("week" = u32, Path, description = "Challenge week"),
        ("announce" = Option<bool>, Query, description = "Post the winner to Slack")
    ),
    responses(
        (status = 200, description = "Draw outcome", body = DrawReport),
        (status = 400, description = "Week out of range"),
        (status = 404, description = "No prize for that week")
    )
)]
pub async fn draw_weekly(
    raffle_service: web::Data<RaffleService>,
    path: web::Path<u32>,
    query: web::Query<DrawQuery>,
) -> Result<HttpResponse> {
    let announce = query.announce.unwrap_or(false);
    match raffle_service
        .draw_weekly(path.into_inner(), announce)
        .await
    {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": report
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/prizes/grand/preview",
    tag = "prizes",
    responses(
        (status = 200, description = "Who is in the grand prize hat", body = DrawPreview),
        (status = 404, description = "No grand prize configured")
    )
)]
pub async fn preview_grand_draw(raffle_service: web::Data<RaffleService>) -> Result<HttpResponse> {
    match raffle_service.preview_grand().await {
        Ok(preview) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": preview
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/prizes/grand/draw",
    tag = "prizes",
    params(("announce" = Option<bool>, Query, description = "Post the winner to Slack")),
    responses(
        (status = 200, description = "Draw outcome", body = DrawReport),
        (status = 404, description = "No grand prize configured")
    )
)]
pub async fn draw_grand(
    raffle_service: web::Data<RaffleService>,
    query: web::Query<DrawQuery>,
) -> Result<HttpResponse> {
    let announce = query.announce.unwrap_or(false);
    match raffle_service.draw_grand(announce).await {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": report
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn prize_config(cfg: &mut web::ServiceConfig) {
    // Grand routes first so "grand" never matches the {week} segment.
    cfg.service(
        web::scope("/prizes")
            .route("", web::get().to(list_prizes))
            .route("/grand/preview", web::get().to(preview_grand_draw))
            .route("/grand/draw", web::post().to(draw_grand))
            .route("/{week}/entries", web::get().to(week_entries))
            .route("/{week}/opt", web::post().to(set_opt_in))
            .route("/{week}/preview-draw", web::get().to(preview_weekly_draw))
            .route("/{week}/draw", web::post().to(draw_weekly)),
    );
}
