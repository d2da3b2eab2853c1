use crate::challenge::Challenge;
use crate::entities::{participant_entity as participants, team_entity as teams};
use crate::error::{AppError, AppResult};
use crate::models::{
    LoginRequest, ParticipantResponse, ParticipantSummaryResponse, ReassignTeamRequest,
    TeamResponse,
};
use crate::services::stats_service;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

/// Teams and participants. The roster is seeded by migration; this service
/// only reads it and moves people between teams.
#[derive(Clone)]
pub struct RosterService {
    pool: DatabaseConnection,
    challenge: Challenge,
}

impl RosterService {
    pub fn new(pool: DatabaseConnection, challenge: Challenge) -> Self {
        Self { pool, challenge }
    }

    pub async fn teams(&self) -> AppResult<Vec<TeamResponse>> {
        let list = teams::Entity::find()
            .order_by_asc(teams::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn participants(&self) -> AppResult<Vec<ParticipantResponse>> {
        let list = participants::Entity::find()
            .order_by_asc(participants::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// Name + team lookup. This is the whole login story.
    pub async fn login(&self, req: &LoginRequest) -> AppResult<ParticipantResponse> {
        let participant = participants::Entity::find()
            .filter(participants::Column::Username.eq(req.username.trim()))
            .filter(participants::Column::TeamId.eq(req.team_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No participant named '{}' on team {}",
                    req.username.trim(),
                    req.team_id
                ))
            })?;
        Ok(participant.into())
    }

    pub async fn reassign_team(
        &self,
        participant_id: i64,
        req: &ReassignTeamRequest,
    ) -> AppResult<ParticipantResponse> {
        teams::Entity::find_by_id(req.team_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", req.team_id)))?;
        let participant = participants::Entity::find_by_id(participant_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Participant {participant_id} not found"))
            })?;

        let mut active = participant.into_active_model();
        active.team_id = Set(req.team_id);
        let updated = active.update(&self.pool).await?;
        Ok(updated.into())
    }

    /// Progress snapshot for one participant against every live threshold.
    pub async fn summary(&self, participant_id: i64) -> AppResult<ParticipantSummaryResponse> {
        let participant = participants::Entity::find_by_id(participant_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Participant {participant_id} not found"))
            })?;

        let today = self.challenge.today();
        let week = self.challenge.current_week();
        let (from, to) = self.challenge.week_bounds(week);

        let today_steps =
            stats_service::participant_total_on(&self.pool, participant.id, today).await?;
        let week_steps =
            stats_service::participant_total_between(&self.pool, participant.id, from, to).await?;
        let challenge_steps = stats_service::participant_total_between(
            &self.pool,
            participant.id,
            self.challenge.start_date(),
            self.challenge.end_date(),
        )
        .await?;

        let raffle_threshold = self.challenge.raffle_threshold();
        let grand_prize_threshold = self.challenge.grand_prize_threshold();
        let grand_qualified = participant.grand_prize_entry;
        Ok(ParticipantSummaryResponse {
            participant: participant.into(),
            today_steps,
            current_week: week,
            week_steps,
            raffle_threshold,
            steps_to_raffle: (raffle_threshold - week_steps).max(0),
            week_qualified: week_steps >= raffle_threshold,
            challenge_steps,
            grand_prize_threshold,
            steps_to_grand: (grand_prize_threshold - challenge_steps).max(0),
            grand_qualified,
        })
    }
}
