use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A challenge member.
///
/// - `banked_steps`: denormalized cache of the participant's activity-log sum,
///   adjusted in the same transaction as every log insert/update/delete.
/// - `grand_prize_entry`: monotonic qualification flag, flipped true once the
///   participant's challenge total reaches the grand-prize threshold.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    pub slack_username: Option<String>,
    pub slack_user_id: Option<String>,
    pub team_id: i64,
    pub avatar_emoji: Option<String>,
    pub banked_steps: i64,
    pub grand_prize_entry: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
