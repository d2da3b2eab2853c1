use crate::challenge::Challenge;
use crate::entities::{
    participant_entity as participants, prize_entity as prizes, prize_entry_entity as entries,
    prizes::PrizeType,
};
use crate::error::{AppError, AppResult};
use crate::external::SlackService;
use crate::models::{
    DrawPreview, DrawReport, PrizeEntryResponse, PrizeOptRequest, PrizeResponse, WinnerSummary,
};
use crate::services::stats_service;
use rand::Rng;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

/// Uniform pick over a slice. `None` on an empty slice.
fn pick_uniform<'a, R: Rng, T>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_range(0..items.len()))
}

/// Weekly and grand prize draws.
///
/// A draw settles through a conditional update (`winner_participant_id IS
/// NULL`), so concurrent draw calls converge on a single winner: the loser
/// of the race re-reads the prize and reports the winner that landed.
#[derive(Clone)]
pub struct RaffleService {
    pool: DatabaseConnection,
    challenge: Challenge,
    slack: SlackService,
}

impl RaffleService {
    pub fn new(pool: DatabaseConnection, challenge: Challenge, slack: SlackService) -> Self {
        Self {
            pool,
            challenge,
            slack,
        }
    }

    fn check_week(&self, week: u32) -> AppResult<()> {
        if week < 1 || week > self.challenge.weeks() {
            return Err(AppError::ValidationError(format!(
                "Week must be between 1 and {}",
                self.challenge.weeks()
            )));
        }
        Ok(())
    }

    async fn weekly_prize(&self, week: u32) -> AppResult<prizes::Model> {
        self.check_week(week)?;
        prizes::Entity::find()
            .filter(prizes::Column::PrizeType.eq(PrizeType::Weekly))
            .filter(prizes::Column::WeekNumber.eq(week as i32))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No prize configured for week {week}")))
    }

    async fn grand_prize(&self) -> AppResult<prizes::Model> {
        prizes::Entity::find()
            .filter(prizes::Column::PrizeType.eq(PrizeType::Grand))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("No grand prize configured".to_string()))
    }

    async fn participant(&self, id: i64) -> AppResult<participants::Model> {
        participants::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Participant {id} not found")))
    }

    /// Qualified and opted-in entrants for a weekly prize, ordered by id so
    /// the hat is deterministic for a given database state.
    async fn weekly_entrants(&self, prize_id: i64) -> AppResult<Vec<participants::Model>> {
        let entry_rows = entries::Entity::find()
            .filter(entries::Column::PrizeId.eq(prize_id))
            .filter(entries::Column::Qualified.eq(true))
            .filter(entries::Column::OptedIn.eq(true))
            .all(&self.pool)
            .await?;
        let ids: Vec<i64> = entry_rows.iter().map(|e| e.participant_id).collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(participants::Entity::find()
            .filter(participants::Column::Id.is_in(ids))
            .order_by_asc(participants::Column::Id)
            .all(&self.pool)
            .await?)
    }

    async fn grand_entrants(&self) -> AppResult<Vec<participants::Model>> {
        Ok(participants::Entity::find()
            .filter(participants::Column::GrandPrizeEntry.eq(true))
            .order_by_asc(participants::Column::Id)
            .all(&self.pool)
            .await?)
    }

    /// Write the winner, but only if nobody has. Returns whether this call
    /// won the race.
    async fn settle(&self, prize_id: i64, winner_id: i64) -> AppResult<bool> {
        let updated = prizes::Entity::update_many()
            .col_expr(
                prizes::Column::WinnerParticipantId,
                Expr::value(Some(winner_id)),
            )
            .col_expr(
                prizes::Column::DrawnAt,
                Expr::value(Some(chrono::Utc::now())),
            )
            .filter(prizes::Column::Id.eq(prize_id))
            .filter(prizes::Column::WinnerParticipantId.is_null())
            .exec(&self.pool)
            .await?;
        Ok(updated.rows_affected == 1)
    }

    async fn already_drawn_report(&self, prize: &prizes::Model) -> AppResult<DrawReport> {
        let winner = match prize.winner_participant_id {
            Some(id) => Some(WinnerSummary::from(&self.participant(id).await?)),
            None => None,
        };
        Ok(DrawReport {
            already_drawn: true,
            qualified_count: 0,
            winner,
            prize_title: prize.title.clone(),
        })
    }

    pub async fn draw_weekly(&self, week: u32, announce: bool) -> AppResult<DrawReport> {
        let prize = self.weekly_prize(week).await?;
        if prize.is_drawn() {
            return self.already_drawn_report(&prize).await;
        }

        let entrants = self.weekly_entrants(prize.id).await?;
        let qualified_count = entrants.len() as i64;
        let winner = {
            let mut rng = rand::rng();
            pick_uniform(&mut rng, &entrants).cloned()
        };
        let Some(winner) = winner else {
            log::info!("Week {week} draw attempted with no eligible entrants");
            return Ok(DrawReport {
                already_drawn: false,
                qualified_count: 0,
                winner: None,
                prize_title: prize.title,
            });
        };

        if !self.settle(prize.id, winner.id).await? {
            let prize = self.weekly_prize(week).await?;
            return self.already_drawn_report(&prize).await;
        }
        log::info!(
            "Week {week} prize '{}' drawn: {} from {qualified_count} entrants",
            prize.title,
            winner.username
        );

        if announce {
            let slack = self.slack.clone();
            let threshold = self.challenge.raffle_threshold();
            let winner_clone = winner.clone();
            let prize_clone = prize.clone();
            tokio::spawn(async move {
                slack
                    .announce_weekly_winner(
                        &winner_clone,
                        &prize_clone,
                        week,
                        qualified_count,
                        threshold,
                    )
                    .await;
            });
        }

        Ok(DrawReport {
            already_drawn: false,
            qualified_count,
            winner: Some(WinnerSummary::from(&winner)),
            prize_title: prize.title,
        })
    }

    pub async fn draw_grand(&self, announce: bool) -> AppResult<DrawReport> {
        let prize = self.grand_prize().await?;
        if prize.is_drawn() {
            return self.already_drawn_report(&prize).await;
        }

        let entrants = self.grand_entrants().await?;
        let qualified_count = entrants.len() as i64;
        let winner = {
            let mut rng = rand::rng();
            pick_uniform(&mut rng, &entrants).cloned()
        };
        let Some(winner) = winner else {
            log::info!("Grand prize draw attempted with no eligible entrants");
            return Ok(DrawReport {
                already_drawn: false,
                qualified_count: 0,
                winner: None,
                prize_title: prize.title,
            });
        };

        if !self.settle(prize.id, winner.id).await? {
            let prize = self.grand_prize().await?;
            return self.already_drawn_report(&prize).await;
        }
        log::info!(
            "Grand prize '{}' drawn: {} from {qualified_count} entrants",
            prize.title,
            winner.username
        );

        if announce {
            let total = stats_service::participant_total_between(
                &self.pool,
                winner.id,
                self.challenge.start_date(),
                self.challenge.end_date(),
            )
            .await?;
            let slack = self.slack.clone();
            let threshold = self.challenge.grand_prize_threshold();
            let winner_clone = winner.clone();
            let prize_clone = prize.clone();
            tokio::spawn(async move {
                slack
                    .announce_grand_winner(
                        &winner_clone,
                        &prize_clone,
                        qualified_count,
                        total,
                        threshold,
                    )
                    .await;
            });
        }

        Ok(DrawReport {
            already_drawn: false,
            qualified_count,
            winner: Some(WinnerSummary::from(&winner)),
            prize_title: prize.title,
        })
    }

    pub async fn preview_weekly(&self, week: u32) -> AppResult<DrawPreview> {
        let prize = self.weekly_prize(week).await?;
        let entrants = self.weekly_entrants(prize.id).await?;
        self.build_preview(prize, entrants, self.challenge.raffle_threshold())
            .await
    }

    pub async fn preview_grand(&self) -> AppResult<DrawPreview> {
        let prize = self.grand_prize().await?;
        let entrants = self.grand_entrants().await?;
        self.build_preview(prize, entrants, self.challenge.grand_prize_threshold())
            .await
    }

    async fn build_preview(
        &self,
        prize: prizes::Model,
        entrants: Vec<participants::Model>,
        threshold: i64,
    ) -> AppResult<DrawPreview> {
        let winner = match prize.winner_participant_id {
            Some(id) => Some(self.participant(id).await?),
            None => None,
        };
        let qualified_entrants: Vec<WinnerSummary> =
            entrants.iter().map(WinnerSummary::from).collect();
        Ok(DrawPreview {
            entrant_count: qualified_entrants.len() as i64,
            qualified_entrants,
            prize: PrizeResponse::from_prize(prize, winner.as_ref()),
            threshold,
        })
    }

    /// All prizes with their winners resolved, weeklies first.
    pub async fn list_prizes(&self) -> AppResult<Vec<PrizeResponse>> {
        let all = prizes::Entity::find()
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;
        let winner_ids: Vec<i64> = all.iter().filter_map(|p| p.winner_participant_id).collect();
        let winners: HashMap<i64, participants::Model> = if winner_ids.is_empty() {
            HashMap::new()
        } else {
            participants::Entity::find()
                .filter(participants::Column::Id.is_in(winner_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };
        Ok(all
            .into_iter()
            .map(|prize| {
                let winner = prize.winner_participant_id.and_then(|id| winners.get(&id));
                PrizeResponse::from_prize(prize, winner)
            })
            .collect())
    }

    pub async fn entries_for_week(&self, week: u32) -> AppResult<Vec<PrizeEntryResponse>> {
        let prize = self.weekly_prize(week).await?;
        let entry_rows = entries::Entity::find()
            .filter(entries::Column::PrizeId.eq(prize.id))
            .order_by_asc(entries::Column::ParticipantId)
            .all(&self.pool)
            .await?;
        let ids: Vec<i64> = entry_rows.iter().map(|e| e.participant_id).collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let people: HashMap<i64, participants::Model> = participants::Entity::find()
            .filter(participants::Column::Id.is_in(ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        Ok(entry_rows
            .iter()
            .filter_map(|entry| {
                people
                    .get(&entry.participant_id)
                    .map(|p| PrizeEntryResponse::from_entry(entry, p))
            })
            .collect())
    }

    /// Explicit opt in/out of a weekly draw. Creates the entry (unqualified)
    /// when none exists yet so a participant can opt out ahead of time.
    pub async fn set_opt_in(
        &self,
        week: u32,
        req: &PrizeOptRequest,
    ) -> AppResult<PrizeEntryResponse> {
        let prize = self.weekly_prize(week).await?;
        let participant = self.participant(req.participant_id).await?;

        let active = entries::ActiveModel {
            participant_id: Set(participant.id),
            prize_id: Set(prize.id),
            week_number: Set(Some(week as i32)),
            opted_in: Set(req.opted_in),
            qualified: Set(false),
            created_at: Set(Some(chrono::Utc::now())),
            ..Default::default()
        };
        let res = entries::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([entries::Column::ParticipantId, entries::Column::PrizeId])
                    .update_column(entries::Column::OptedIn)
                    .to_owned(),
            )
            .exec(&self.pool)
            .await;
        match res {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        let entry = entries::Entity::find()
            .filter(entries::Column::ParticipantId.eq(participant.id))
            .filter(entries::Column::PrizeId.eq(prize.id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InternalError("Prize entry upsert vanished".to_string()))?;
        Ok(PrizeEntryResponse::from_entry(&entry, &participant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChallengeConfig, SlackConfig};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn service(pool: DatabaseConnection) -> RaffleService {
        let challenge = Challenge::from_config(&ChallengeConfig::default()).unwrap();
        RaffleService::new(pool, challenge, SlackService::new(SlackConfig::default()))
    }

    fn week_one_prize(winner: Option<i64>) -> prizes::Model {
        prizes::Model {
            id: 1,
            week_number: Some(1),
            prize_type: PrizeType::Weekly,
            title: "Hume Body Pod".to_string(),
            description: None,
            emoji: Some("⚡".to_string()),
            winner_participant_id: winner,
            drawn_at: winner.map(|_| chrono::Utc::now()),
        }
    }

    fn walker(id: i64, name: &str) -> participants::Model {
        participants::Model {
            id,
            username: name.to_string(),
            slack_username: None,
            slack_user_id: None,
            team_id: 1,
            avatar_emoji: None,
            banked_steps: 0,
            grand_prize_entry: false,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_repeat_draw_reports_already_drawn_with_same_winner() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![week_one_prize(Some(5))]])
            .append_query_results([vec![walker(5, "Claire")]])
            .into_connection();
        let report = service(conn).draw_weekly(1, false).await.unwrap();
        assert!(report.already_drawn);
        assert_eq!(report.winner.unwrap().participant_id, 5);
    }

    #[tokio::test]
    async fn test_draw_with_no_entrants_is_distinct_from_already_drawn() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![week_one_prize(None)]])
            .append_query_results([Vec::<entries::Model>::new()])
            .into_connection();
        let report = service(conn).draw_weekly(1, false).await.unwrap();
        assert!(!report.already_drawn);
        assert!(report.winner.is_none());
        assert_eq!(report.qualified_count, 0);
    }

    #[tokio::test]
    async fn test_losing_the_settle_race_reports_the_landed_winner() {
        // The conditional update affects zero rows: another caller settled
        // the prize between our read and our write.
        let entry = entries::Model {
            id: 1,
            participant_id: 3,
            prize_id: 1,
            week_number: Some(1),
            opted_in: true,
            qualified: true,
            created_at: None,
        };
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![week_one_prize(None)]])
            .append_query_results([vec![entry]])
            .append_query_results([vec![walker(3, "Jack")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![week_one_prize(Some(7))]])
            .append_query_results([vec![walker(7, "Courtney")]])
            .into_connection();
        let report = service(conn).draw_weekly(1, false).await.unwrap();
        assert!(report.already_drawn);
        assert_eq!(report.winner.unwrap().participant_id, 7);
    }

    #[tokio::test]
    async fn test_draw_rejects_out_of_range_week() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = service(conn).draw_weekly(9, false).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_pick_uniform_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [i32; 0] = [];
        assert!(pick_uniform(&mut rng, &empty).is_none());
    }

    #[test]
    fn test_pick_uniform_single() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_uniform(&mut rng, &[42]), Some(&42));
    }

    #[test]
    fn test_pick_uniform_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(0xDEC0DE);
        let items = [0usize, 1, 2, 3, 4];
        let mut counts = [0usize; 5];
        for _ in 0..10_000 {
            counts[*pick_uniform(&mut rng, &items).unwrap()] += 1;
        }
        // Expect ~2000 each; allow generous slack for a seeded run.
        for count in counts {
            assert!(
                (1700..=2300).contains(&count),
                "skewed draw distribution: {counts:?}"
            );
        }
    }
}
