use crate::challenge::Challenge;
use crate::entities::{
    activity_log_entity as logs, participant_entity as participants, team_entity as teams,
};
use crate::error::{AppError, AppResult};
use crate::external::SlackService;
use crate::models::{
    ActivityLogQuery, ActivityLogResponse, PaginatedResponse, PaginationParams,
    RecordActivityRequest, RecordActivityResponse, UpdateActivityLogRequest,
};
use crate::services::{MilestoneService, QualificationService, stats_service};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Upper bound on one log entry. Anything above this is a typo, not a walk.
const MAX_STEPS_PER_LOG: i64 = 100_000;

/// Writes to `activity_logs` plus the `banked_steps` cache, in one
/// transaction per operation.
///
/// `record` also snapshots the org-wide total inside the same transaction so
/// the milestone check sees a consistent before/after pair; all notification
/// and qualification work runs detached after the commit and can never fail
/// the write.
#[derive(Clone)]
pub struct ActivityService {
    pool: DatabaseConnection,
    challenge: Challenge,
    qualification: QualificationService,
    milestone: MilestoneService,
    slack: SlackService,
}

impl ActivityService {
    pub fn new(
        pool: DatabaseConnection,
        challenge: Challenge,
        qualification: QualificationService,
        milestone: MilestoneService,
        slack: SlackService,
    ) -> Self {
        Self {
            pool,
            challenge,
            qualification,
            milestone,
            slack,
        }
    }

    fn check_steps(&self, step_count: i64) -> AppResult<()> {
        if step_count <= 0 {
            return Err(AppError::ValidationError(
                "step_count must be a positive number".to_string(),
            ));
        }
        if step_count > MAX_STEPS_PER_LOG {
            return Err(AppError::ValidationError(format!(
                "step_count cannot exceed {MAX_STEPS_PER_LOG} per entry"
            )));
        }
        Ok(())
    }

    fn check_date(&self, date: chrono::NaiveDate) -> AppResult<()> {
        if !self.challenge.in_window(date) {
            return Err(AppError::ValidationError(format!(
                "{date} is outside the challenge window ({} to {})",
                self.challenge.start_date(),
                self.challenge.end_date()
            )));
        }
        Ok(())
    }

    pub async fn record(&self, req: &RecordActivityRequest) -> AppResult<RecordActivityResponse> {
        self.check_steps(req.step_count)?;
        let date = req.date_logged.unwrap_or_else(|| self.challenge.today());
        self.check_date(date)?;

        let participant = participants::Entity::find_by_id(req.participant_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Participant {} not found", req.participant_id))
            })?;

        let txn = self.pool.begin().await?;
        let org_before = stats_service::org_total(&txn).await?;

        let log = logs::ActiveModel {
            participant_id: Set(participant.id),
            step_count: Set(req.step_count),
            date_logged: Set(date),
            activity_type: Set(req.activity_type.as_str().to_string()),
            created_at: Set(Some(chrono::Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        participants::Entity::update_many()
            .col_expr(
                participants::Column::BankedSteps,
                Expr::col(participants::Column::BankedSteps).add(req.step_count),
            )
            .filter(participants::Column::Id.eq(participant.id))
            .exec(&txn)
            .await?;

        let daily_total = stats_service::participant_total_on(&txn, participant.id, date).await?;
        txn.commit().await?;

        let banked_steps = participant.banked_steps + req.step_count;
        self.spawn_post_record(
            participant,
            log.id,
            req.step_count,
            log.activity_type.clone(),
            org_before,
            daily_total,
            banked_steps,
        );

        Ok(RecordActivityResponse {
            log: log.into(),
            banked_steps,
            daily_total,
        })
    }

    /// Detached follow-up work for a committed log: milestone check,
    /// raffle/grand qualification, channel post. Failures are logged only.
    #[allow(clippy::too_many_arguments)]
    fn spawn_post_record(
        &self,
        participant: participants::Model,
        log_id: i64,
        step_count: i64,
        activity_type: String,
        org_before: i64,
        daily_total: i64,
        banked_steps: i64,
    ) {
        let milestone = self.milestone.clone();
        let qualification = self.qualification.clone();
        let slack = self.slack.clone();
        let pool = self.pool.clone();
        tokio::spawn(async move {
            if let Err(e) = milestone
                .maybe_announce_halfway(
                    org_before,
                    org_before + step_count,
                    Some(&participant),
                    Some(log_id),
                )
                .await
            {
                log::error!("Milestone check failed for log {log_id}: {e}");
            }
            if let Err(e) = qualification
                .evaluate_after_log(&participant, step_count)
                .await
            {
                log::error!("Qualification evaluation failed for log {log_id}: {e}");
            }
            match teams::Entity::find_by_id(participant.team_id).one(&pool).await {
                Ok(Some(team)) => {
                    slack
                        .notify_activity_log(
                            &participant,
                            &team,
                            step_count,
                            &activity_type,
                            daily_total,
                            banked_steps,
                        )
                        .await;
                }
                Ok(None) => log::warn!("Team {} not found for channel post", participant.team_id),
                Err(e) => log::error!("Failed to load team for channel post: {e}"),
            }
        });
    }

    /// Corrective edit. The cache moves by the step delta in the same
    /// transaction; an upward correction re-runs qualification.
    pub async fn update_log(
        &self,
        id: i64,
        req: &UpdateActivityLogRequest,
    ) -> AppResult<ActivityLogResponse> {
        self.check_steps(req.step_count)?;
        self.check_date(req.date_logged)?;

        let log = logs::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activity log {id} not found")))?;
        let delta = req.step_count - log.step_count;
        let participant_id = log.participant_id;

        let txn = self.pool.begin().await?;
        let mut active = log.into_active_model();
        active.step_count = Set(req.step_count);
        active.activity_type = Set(req.activity_type.as_str().to_string());
        active.date_logged = Set(req.date_logged);
        let updated = active.update(&txn).await?;

        if delta != 0 {
            participants::Entity::update_many()
                .col_expr(
                    participants::Column::BankedSteps,
                    Expr::col(participants::Column::BankedSteps).add(delta),
                )
                .filter(participants::Column::Id.eq(participant_id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        if delta > 0 {
            if let Some(participant) = participants::Entity::find_by_id(participant_id)
                .one(&self.pool)
                .await?
            {
                let qualification = self.qualification.clone();
                tokio::spawn(async move {
                    if let Err(e) = qualification.evaluate_after_log(&participant, delta).await {
                        log::error!("Qualification re-check failed for log {id}: {e}");
                    }
                });
            }
        }

        Ok(updated.into())
    }

    pub async fn delete_log(&self, id: i64) -> AppResult<()> {
        let log = logs::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activity log {id} not found")))?;

        let txn = self.pool.begin().await?;
        let step_count = log.step_count;
        let participant_id = log.participant_id;
        log.into_active_model().delete(&txn).await?;
        participants::Entity::update_many()
            .col_expr(
                participants::Column::BankedSteps,
                Expr::col(participants::Column::BankedSteps).sub(step_count),
            )
            .filter(participants::Column::Id.eq(participant_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn list(
        &self,
        query: &ActivityLogQuery,
    ) -> AppResult<PaginatedResponse<ActivityLogResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut find = logs::Entity::find();
        if let Some(pid) = query.participant_id {
            find = find.filter(logs::Column::ParticipantId.eq(pid));
        }

        let total = find.clone().count(&self.pool).await? as i64;
        let items = find
            .order_by_desc(logs::Column::DateLogged)
            .order_by_desc(logs::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }
}
