use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::activity_log_entity as log_entity;

use super::ActivityType;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordActivityRequest {
    pub participant_id: i64,
    pub step_count: i64,
    #[schema(value_type = String, example = "Walking")]
    pub activity_type: ActivityType,
    /// Defaults to today in the challenge time zone.
    pub date_logged: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateActivityLogRequest {
    pub step_count: i64,
    #[schema(value_type = String, example = "Running")]
    pub activity_type: ActivityType,
    pub date_logged: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ActivityLogQuery {
    /// Page number (default 1)
    pub page: Option<u32>,
    /// Page size (default 20)
    pub per_page: Option<u32>,
    /// Restrict to one participant
    pub participant_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityLogResponse {
    pub id: i64,
    pub participant_id: i64,
    pub step_count: i64,
    pub date_logged: NaiveDate,
    #[schema(value_type = String)]
    pub activity_type: ActivityType,
}

impl From<log_entity::Model> for ActivityLogResponse {
    fn from(m: log_entity::Model) -> Self {
        ActivityLogResponse {
            id: m.id,
            participant_id: m.participant_id,
            step_count: m.step_count,
            date_logged: m.date_logged,
            activity_type: ActivityType::parse(&m.activity_type),
        }
    }
}

/// Returned from a successful log write: the stored fact plus the
/// participant's refreshed running totals.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordActivityResponse {
    pub log: ActivityLogResponse,
    /// Participant's cached all-time total after this write.
    pub banked_steps: i64,
    /// Participant's total for the logged date after this write.
    pub daily_total: i64,
}
