use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::prizes::PrizeType;
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::activity::record_activity,
        handlers::activity::list_logs,
        handlers::activity::update_log,
        handlers::activity::delete_log,
        handlers::roster::list_teams,
        handlers::roster::list_participants,
        handlers::roster::participant_summary,
        handlers::roster::reassign_team,
        handlers::roster::login,
        handlers::prize::list_prizes,
        handlers::prize::week_entries,
        handlers::prize::set_opt_in,
        handlers::prize::preview_weekly_draw,
        handlers::prize::draw_weekly,
        handlers::prize::preview_grand_draw,
        handlers::prize::draw_grand,
        handlers::milestone::milestone_status,
        handlers::digest::post_daily_digest,
    ),
    components(
        schemas(
            RecordActivityRequest,
            UpdateActivityLogRequest,
            ActivityLogResponse,
            RecordActivityResponse,
            TeamResponse,
            ParticipantResponse,
            ParticipantSummaryResponse,
            LoginRequest,
            ReassignTeamRequest,
            PrizeType,
            PrizeResponse,
            PrizeEntryResponse,
            PrizeOptRequest,
            DrawReport,
            DrawPreview,
            WinnerSummary,
            MilestoneStatusResponse,
            DigestSummary,
            TeamDigestRow,
            TopWalker,
            ApiError,
        )
    ),
    tags(
        (name = "activity", description = "Step logging"),
        (name = "roster", description = "Teams and participants"),
        (name = "prizes", description = "Raffles and draws"),
        (name = "milestones", description = "Org-wide milestones"),
        (name = "digest", description = "Daily Slack digest"),
    ),
    info(
        title = "TeamTrek Backend API",
        version = "1.0.0",
        description = "Corporate step-count challenge REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
