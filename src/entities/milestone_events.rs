use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One-time, org-wide milestone record.
///
/// The unique index on `milestone_type` makes the plain INSERT in
/// `MilestoneService::claim` the announcement mutex: under concurrent
/// writers exactly one insert succeeds and the rest see a constraint
/// violation, which is the "already claimed" signal rather than an error.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "milestone_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub milestone_type: String,
    pub threshold_value: i64,
    pub total_steps_at_trigger: i64,
    pub triggered_by_participant_id: Option<i64>,
    pub triggered_by_log_id: Option<i64>,
    pub announced_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
