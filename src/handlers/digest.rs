use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::external::SlackService;
use crate::models::*;
use crate::services::StatsService;

/// Assemble and post the evening digest. Triggered by an external scheduler
/// (cron hitting this endpoint); there is no in-process timer.
#[utoipa::path(
    post,
    path = "/digest/daily",
    tag = "digest",
    responses(
        (status = 200, description = "Digest posted", body = DigestSummary),
        (status = 502, description = "Slack rejected the post")
    )
)]
pub async fn post_daily_digest(
    stats_service: web::Data<StatsService>,
    slack_service: web::Data<SlackService>,
) -> Result<HttpResponse> {
    let digest = match stats_service.daily_digest().await {
        Ok(d) => d,
        Err(e) => return Ok(e.error_response()),
    };
    if let Err(e) = slack_service.post_daily_digest(&digest).await {
        return Ok(e.error_response());
    }
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": digest
    })))
}

pub fn digest_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/digest/daily", web::post().to(post_daily_digest));
}
