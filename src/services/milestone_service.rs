use crate::challenge::{Challenge, MILESTONE_50_PERCENT, evaluate};
use crate::entities::{milestone_event_entity as events, participant_entity as participants};
use crate::error::{AppError, AppResult};
use crate::external::SlackService;
use crate::models::{MilestoneStatusResponse, WinnerSummary};
use crate::services::stats_service;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};

/// One-time org-wide milestone announcements.
///
/// The unique index on `milestone_events.milestone_type` is the mutex: every
/// writer that observes a crossing races to insert, exactly one insert lands,
/// and only that writer announces. Losing the race is a normal outcome, not
/// an error.
/// A unique violation on the claim INSERT is not a failure: it means
/// another writer landed the row first.
fn lost_claim_race(err: Option<SqlErr>) -> bool {
    matches!(err, Some(SqlErr::UniqueConstraintViolation(_)))
}

#[derive(Clone)]
pub struct MilestoneService {
    pool: DatabaseConnection,
    challenge: Challenge,
    slack: SlackService,
}

impl MilestoneService {
    pub fn new(pool: DatabaseConnection, challenge: Challenge, slack: SlackService) -> Self {
        Self {
            pool,
            challenge,
            slack,
        }
    }

    /// Insert the milestone record. `Ok(true)` means this caller owns the
    /// announcement; `Ok(false)` means another writer claimed it first.
    async fn claim(&self, event: events::ActiveModel) -> AppResult<bool> {
        match events::Entity::insert(event).exec(&self.pool).await {
            Ok(_) => Ok(true),
            Err(e) if lost_claim_race(e.sql_err()) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check the halfway milestone against an org-wide before/after pair
    /// taken from the writing transaction's snapshot, and announce at most
    /// once across all writers.
    pub async fn maybe_announce_halfway(
        &self,
        org_before: i64,
        org_after: i64,
        triggered_by: Option<&participants::Model>,
        triggered_by_log_id: Option<i64>,
    ) -> AppResult<()> {
        let threshold = self.challenge.halfway_threshold();
        if !evaluate(org_before, org_after, threshold).crossed {
            return Ok(());
        }

        let event = events::ActiveModel {
            milestone_type: Set(MILESTONE_50_PERCENT.to_string()),
            threshold_value: Set(threshold),
            total_steps_at_trigger: Set(org_after),
            triggered_by_participant_id: Set(triggered_by.map(|p| p.id)),
            triggered_by_log_id: Set(triggered_by_log_id),
            announced_at: Set(Some(chrono::Utc::now())),
            ..Default::default()
        };

        if !self.claim(event).await? {
            log::info!("Halfway milestone already claimed by another writer");
            return Ok(());
        }

        log::info!("Org crossed the halfway milestone at {org_after} steps");
        self.slack
            .notify_halfway_milestone(triggered_by, org_after, self.challenge.global_goal())
            .await;
        Ok(())
    }

    /// Status for one milestone type: the recorded event if achieved,
    /// otherwise live progress toward the threshold.
    pub async fn status(&self, milestone_type: &str) -> AppResult<MilestoneStatusResponse> {
        if milestone_type != MILESTONE_50_PERCENT {
            return Err(AppError::NotFound(format!(
                "Unknown milestone type: {milestone_type}"
            )));
        }
        let threshold = self.challenge.halfway_threshold();

        let event = events::Entity::find()
            .filter(events::Column::MilestoneType.eq(milestone_type))
            .one(&self.pool)
            .await?;

        match event {
            Some(event) => {
                let triggered_by = match event.triggered_by_participant_id {
                    Some(pid) => participants::Entity::find_by_id(pid)
                        .one(&self.pool)
                        .await?
                        .as_ref()
                        .map(WinnerSummary::from),
                    None => None,
                };
                Ok(MilestoneStatusResponse {
                    milestone_type: event.milestone_type,
                    achieved: true,
                    threshold: event.threshold_value,
                    achieved_at: event.announced_at,
                    total_steps_at_trigger: Some(event.total_steps_at_trigger),
                    triggered_by,
                    current_steps: None,
                    percentage: None,
                })
            }
            None => {
                let current = stats_service::org_total(&self.pool).await?;
                Ok(MilestoneStatusResponse {
                    milestone_type: milestone_type.to_string(),
                    achieved: false,
                    threshold,
                    achieved_at: None,
                    total_steps_at_trigger: None,
                    triggered_by: None,
                    current_steps: Some(current),
                    percentage: Some((current as f64 / threshold as f64 * 100.0).min(100.0)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChallengeConfig, SlackConfig};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::collections::BTreeMap;

    fn service(pool: DatabaseConnection) -> MilestoneService {
        let challenge = Challenge::from_config(&ChallengeConfig::default()).unwrap();
        MilestoneService::new(pool, challenge, SlackService::new(SlackConfig::default()))
    }

    #[test]
    fn test_unique_violation_means_lost_race() {
        assert!(lost_claim_race(Some(SqlErr::UniqueConstraintViolation(
            "duplicate key value violates unique constraint \"idx_milestone_events_type_unique\""
                .to_string()
        ))));
        assert!(!lost_claim_race(Some(
            SqlErr::ForeignKeyConstraintViolation("fk_milestone_event_participant".to_string())
        )));
        assert!(!lost_claim_race(None));
    }

    #[tokio::test]
    async fn test_non_crossing_totals_never_touch_the_database() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(conn.clone());
        // Already past the threshold before this write.
        svc.maybe_announce_halfway(1_090_000, 1_095_000, None, None)
            .await
            .unwrap();
        // Still below it after this write.
        svc.maybe_announce_halfway(0, 5_000, None, None).await.unwrap();
        assert!(conn.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_crossing_writer_claims_exactly_one_insert() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![events::Model {
                id: 1,
                milestone_type: MILESTONE_50_PERCENT.to_string(),
                threshold_value: 1_085_000,
                total_steps_at_trigger: 1_090_000,
                triggered_by_participant_id: None,
                triggered_by_log_id: None,
                announced_at: None,
            }]])
            .into_connection();
        let svc = service(conn.clone());
        svc.maybe_announce_halfway(1_080_000, 1_090_000, None, None)
            .await
            .unwrap();
        // One statement ran: the claim INSERT.
        assert_eq!(conn.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_progress_percentage_caps_at_100() {
        let mut total_row = BTreeMap::new();
        total_row.insert("total", sea_orm::Value::from(2_000_000i64));
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<events::Model>::new()])
            .append_query_results([vec![total_row]])
            .into_connection();
        let status = service(conn).status(MILESTONE_50_PERCENT).await.unwrap();
        assert!(!status.achieved);
        assert_eq!(status.current_steps, Some(2_000_000));
        assert_eq!(status.percentage, Some(100.0));
    }

    #[tokio::test]
    async fn test_unknown_milestone_type_is_not_found() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = service(conn).status("75_percent").await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::NotFound(_)));
    }
}
