use crate::challenge::Challenge;
use crate::entities::{activity_log_entity as logs, participant_entity, team_entity};
use crate::error::AppResult;
use crate::models::{DigestSummary, TeamDigestRow, TopWalker};
use chrono::NaiveDate;
use sea_orm::sea_query::{Alias, Expr, ExprTrait};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;

#[derive(FromQueryResult)]
struct SumRow {
    total: Option<i64>,
}

#[derive(FromQueryResult)]
struct ParticipantSumRow {
    participant_id: i64,
    total: Option<i64>,
}

/// SUM(bigint) comes back from Postgres as numeric, so the aggregate is
/// cast to BIGINT before it is decoded into an i64.
async fn sum_steps<C: ConnectionTrait>(db: &C, cond: Condition) -> AppResult<i64> {
    let row = logs::Entity::find()
        .select_only()
        .column_as(
            Expr::col(logs::Column::StepCount)
                .sum()
                .cast_as(Alias::new("BIGINT")),
            "total",
        )
        .filter(cond)
        .into_model::<SumRow>()
        .one(db)
        .await?;
    Ok(row.and_then(|r| r.total).unwrap_or(0))
}

/// Org-wide step total over all logs.
pub(crate) async fn org_total<C: ConnectionTrait>(db: &C) -> AppResult<i64> {
    sum_steps(db, Condition::all()).await
}

/// One participant's total over an inclusive date range.
pub(crate) async fn participant_total_between<C: ConnectionTrait>(
    db: &C,
    participant_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<i64> {
    sum_steps(
        db,
        Condition::all()
            .add(logs::Column::ParticipantId.eq(participant_id))
            .add(logs::Column::DateLogged.gte(from))
            .add(logs::Column::DateLogged.lte(to)),
    )
    .await
}

/// One participant's total for a single civil date.
pub(crate) async fn participant_total_on<C: ConnectionTrait>(
    db: &C,
    participant_id: i64,
    date: NaiveDate,
) -> AppResult<i64> {
    sum_steps(
        db,
        Condition::all()
            .add(logs::Column::ParticipantId.eq(participant_id))
            .add(logs::Column::DateLogged.eq(date)),
    )
    .await
}

/// Read-side aggregates over `activity_logs`. Empty result sets are zero,
/// never an error.
#[derive(Clone)]
pub struct StatsService {
    pool: DatabaseConnection,
    challenge: Challenge,
}

impl StatsService {
    pub fn new(pool: DatabaseConnection, challenge: Challenge) -> Self {
        Self { pool, challenge }
    }

    pub async fn org_total(&self) -> AppResult<i64> {
        org_total(&self.pool).await
    }

    pub async fn participant_daily_total(
        &self,
        participant_id: i64,
        date: NaiveDate,
    ) -> AppResult<i64> {
        participant_total_on(&self.pool, participant_id, date).await
    }

    pub async fn participant_week_total(&self, participant_id: i64, week: u32) -> AppResult<i64> {
        let (from, to) = self.challenge.week_bounds(week);
        participant_total_between(&self.pool, participant_id, from, to).await
    }

    pub async fn participant_challenge_total(&self, participant_id: i64) -> AppResult<i64> {
        participant_total_between(
            &self.pool,
            participant_id,
            self.challenge.start_date(),
            self.challenge.end_date(),
        )
        .await
    }

    /// Per-team totals, highest first. Teams with no logs still appear.
    pub async fn team_totals(&self) -> AppResult<Vec<TeamDigestRow>> {
        let teams = team_entity::Entity::find()
            .order_by_asc(team_entity::Column::Id)
            .all(&self.pool)
            .await?;
        let participants = participant_entity::Entity::find().all(&self.pool).await?;

        let per_participant: Vec<ParticipantSumRow> = logs::Entity::find()
            .select_only()
            .column(logs::Column::ParticipantId)
            .column_as(
                Expr::col(logs::Column::StepCount)
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "total",
            )
            .group_by(logs::Column::ParticipantId)
            .into_model::<ParticipantSumRow>()
            .all(&self.pool)
            .await?;
        let totals: HashMap<i64, i64> = per_participant
            .into_iter()
            .map(|r| (r.participant_id, r.total.unwrap_or(0)))
            .collect();

        let mut rows: Vec<TeamDigestRow> = teams
            .into_iter()
            .map(|team| {
                let total_steps = participants
                    .iter()
                    .filter(|p| p.team_id == team.id)
                    .map(|p| totals.get(&p.id).copied().unwrap_or(0))
                    .sum();
                TeamDigestRow {
                    team_id: team.id,
                    name: team.name,
                    icon: team.icon,
                    total_steps,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.total_steps.cmp(&a.total_steps));
        Ok(rows)
    }

    /// Highest single-day stepper for a date, if anyone logged at all.
    pub async fn top_walker(&self, date: NaiveDate) -> AppResult<Option<TopWalker>> {
        let row = logs::Entity::find()
            .select_only()
            .column(logs::Column::ParticipantId)
            .column_as(
                Expr::col(logs::Column::StepCount)
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "total",
            )
            .filter(logs::Column::DateLogged.eq(date))
            .group_by(logs::Column::ParticipantId)
            .order_by_desc(Expr::col(Alias::new("total")))
            .limit(1)
            .into_model::<ParticipantSumRow>()
            .one(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let participant = participant_entity::Entity::find_by_id(row.participant_id)
            .one(&self.pool)
            .await?;
        Ok(participant.map(|p| TopWalker {
            participant_id: p.id,
            username: p.username,
            avatar_emoji: p.avatar_emoji,
            steps: row.total.unwrap_or(0),
        }))
    }

    /// Everything the evening digest post needs, in one bundle.
    pub async fn daily_digest(&self) -> AppResult<DigestSummary> {
        let date = self.challenge.today();
        let global_total = self.org_total().await?;
        let global_goal = self.challenge.global_goal();
        let team_totals = self.team_totals().await?;
        let top_walker = self.top_walker(date).await?;
        Ok(DigestSummary {
            date,
            global_total,
            global_goal,
            percentage: global_total as f64 / global_goal as f64 * 100.0,
            team_totals,
            top_walker,
        })
    }
}
