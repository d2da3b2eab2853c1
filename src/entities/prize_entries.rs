use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A (participant, prize) opt-in/qualification record, unique per pair.
///
/// `qualified` is set by the qualification service and never unset;
/// `opted_in` defaults true once qualified (auto opt-in) but a participant
/// may explicitly opt out of a draw.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prize_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub participant_id: i64,
    pub prize_id: i64,
    pub week_number: Option<i32>,
    pub opted_in: bool,
    pub qualified: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
