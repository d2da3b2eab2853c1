use crate::challenge::{Challenge, evaluate};
use crate::entities::{
    participant_entity as participants, prize_entity as prizes, prize_entry_entity as entries,
    prizes::PrizeType,
};
use crate::error::AppResult;
use crate::external::SlackService;
use crate::services::stats_service;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};

/// Re-evaluates a participant's totals against the raffle and grand-prize
/// thresholds after a step write.
///
/// Both checks are monotonic: `qualified` and `grand_prize_entry` are only
/// ever set, never cleared, so running this again on an already-qualified
/// participant is a no-op. Celebrations fire only on the write that crossed
/// the threshold.
#[derive(Clone)]
pub struct QualificationService {
    pool: DatabaseConnection,
    challenge: Challenge,
    slack: SlackService,
}

impl QualificationService {
    pub fn new(pool: DatabaseConnection, challenge: Challenge, slack: SlackService) -> Self {
        Self {
            pool,
            challenge,
            slack,
        }
    }

    /// Run both checks after a log write that added `step_delta` steps.
    pub async fn evaluate_after_log(
        &self,
        participant: &participants::Model,
        step_delta: i64,
    ) -> AppResult<()> {
        self.evaluate_weekly(participant, step_delta).await?;
        self.evaluate_grand(participant, step_delta).await?;
        Ok(())
    }

    /// Weekly raffle entry: the wall-clock current week's total against 60%
    /// of the weekly goal. Back-dated logs count toward the current week.
    pub async fn evaluate_weekly(
        &self,
        participant: &participants::Model,
        step_delta: i64,
    ) -> AppResult<()> {
        let week = self.challenge.current_week();
        let (from, to) = self.challenge.week_bounds(week);
        let after =
            stats_service::participant_total_between(&self.pool, participant.id, from, to).await?;
        let threshold = self.challenge.raffle_threshold();
        let check = evaluate(after - step_delta, after, threshold);
        if !check.qualifies {
            return Ok(());
        }

        let Some(prize) = prizes::Entity::find()
            .filter(prizes::Column::PrizeType.eq(PrizeType::Weekly))
            .filter(prizes::Column::WeekNumber.eq(week as i32))
            .one(&self.pool)
            .await?
        else {
            log::warn!("No weekly prize configured for week {week}, skipping raffle entry");
            return Ok(());
        };

        let existing = entries::Entity::find()
            .filter(entries::Column::ParticipantId.eq(participant.id))
            .filter(entries::Column::PrizeId.eq(prize.id))
            .one(&self.pool)
            .await?;
        let already_qualified = existing.as_ref().map(|e| e.qualified).unwrap_or(false);

        match existing {
            Some(entry) if !entry.qualified => {
                let mut active = entry.into_active_model();
                active.qualified = Set(true);
                active.update(&self.pool).await?;
            }
            Some(_) => {}
            None => {
                // Auto opt-in on first qualification. The upsert keeps a
                // concurrent duplicate from failing the whole evaluation.
                let active = entries::ActiveModel {
                    participant_id: Set(participant.id),
                    prize_id: Set(prize.id),
                    week_number: Set(Some(week as i32)),
                    opted_in: Set(true),
                    qualified: Set(true),
                    created_at: Set(Some(chrono::Utc::now())),
                    ..Default::default()
                };
                let res = entries::Entity::insert(active)
                    .on_conflict(
                        OnConflict::columns([
                            entries::Column::ParticipantId,
                            entries::Column::PrizeId,
                        ])
                        .update_column(entries::Column::Qualified)
                        .to_owned(),
                    )
                    .exec(&self.pool)
                    .await;
                match res {
                    Ok(_) | Err(DbErr::RecordNotInserted) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        if check.crossed && !already_qualified {
            log::info!(
                "Participant {} qualified for the week {week} raffle ({after} steps)",
                participant.username
            );
            self.slack
                .notify_weekly_qualification(participant, week, after, threshold)
                .await;
        }
        Ok(())
    }

    /// Grand prize entry: the whole-challenge total against 70% of the
    /// individual goal. The conditional update is the celebration guard;
    /// only the writer that flips false to true announces.
    pub async fn evaluate_grand(
        &self,
        participant: &participants::Model,
        step_delta: i64,
    ) -> AppResult<()> {
        let after = stats_service::participant_total_between(
            &self.pool,
            participant.id,
            self.challenge.start_date(),
            self.challenge.end_date(),
        )
        .await?;
        let threshold = self.challenge.grand_prize_threshold();
        let check = evaluate(after - step_delta, after, threshold);
        if !check.qualifies {
            return Ok(());
        }

        let updated = participants::Entity::update_many()
            .col_expr(participants::Column::GrandPrizeEntry, Expr::value(true))
            .filter(participants::Column::Id.eq(participant.id))
            .filter(participants::Column::GrandPrizeEntry.eq(false))
            .exec(&self.pool)
            .await?;

        if updated.rows_affected == 1 {
            log::info!(
                "Participant {} qualified for the grand prize ({after} steps)",
                participant.username
            );
            self.slack
                .notify_grand_qualification(participant, after, threshold)
                .await;
        }
        Ok(())
    }
}
