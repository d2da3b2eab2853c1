use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum PrizeType {
    /// Tied to a specific challenge week (1..=weeks).
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Tied to the overall challenge; `week_number` is NULL.
    #[sea_orm(string_value = "grand")]
    Grand,
}

/// A reward definition. `winner_participant_id` and `drawn_at` start NULL and
/// are set at most once by the raffle's conditional update.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub week_number: Option<i32>,
    pub prize_type: PrizeType,
    pub title: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub winner_participant_id: Option<i64>,
    pub drawn_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_drawn(&self) -> bool {
        self.winner_participant_id.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
