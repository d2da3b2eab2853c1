use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{participant_entity, prize_entity, prize_entry_entity, prizes::PrizeType};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WinnerSummary {
    pub participant_id: i64,
    pub username: String,
    pub avatar_emoji: Option<String>,
}

impl From<&participant_entity::Model> for WinnerSummary {
    fn from(p: &participant_entity::Model) -> Self {
        WinnerSummary {
            participant_id: p.id,
            username: p.username.clone(),
            avatar_emoji: p.avatar_emoji.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeResponse {
    pub id: i64,
    pub week_number: Option<i32>,
    pub prize_type: PrizeType,
    pub title: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub winner: Option<WinnerSummary>,
    pub drawn_at: Option<DateTime<Utc>>,
}

impl PrizeResponse {
    pub fn from_prize(
        prize: prize_entity::Model,
        winner: Option<&participant_entity::Model>,
    ) -> Self {
        PrizeResponse {
            id: prize.id,
            week_number: prize.week_number,
            prize_type: prize.prize_type,
            title: prize.title,
            description: prize.description,
            emoji: prize.emoji,
            winner: winner.map(WinnerSummary::from),
            drawn_at: prize.drawn_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeEntryResponse {
    pub participant_id: i64,
    pub username: String,
    pub avatar_emoji: Option<String>,
    pub team_id: i64,
    pub opted_in: bool,
    pub qualified: bool,
}

impl PrizeEntryResponse {
    pub fn from_entry(
        entry: &prize_entry_entity::Model,
        participant: &participant_entity::Model,
    ) -> Self {
        PrizeEntryResponse {
            participant_id: participant.id,
            username: participant.username.clone(),
            avatar_emoji: participant.avatar_emoji.clone(),
            team_id: participant.team_id,
            opted_in: entry.opted_in,
            qualified: entry.qualified,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PrizeOptRequest {
    pub participant_id: i64,
    pub opted_in: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DrawQuery {
    /// Post the winner announcement to Slack as well.
    pub announce: Option<bool>,
}

/// Outcome of a draw attempt. The three cases the caller must be able to
/// tell apart:
/// - winner set, `already_drawn` false: this call performed the draw;
/// - `already_drawn` true: the prize was settled earlier (winner included);
/// - winner `None`, `already_drawn` false: nobody qualified; the draw can
///   be retried later.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawReport {
    pub already_drawn: bool,
    pub qualified_count: i64,
    pub winner: Option<WinnerSummary>,
    pub prize_title: String,
}

/// Read-only preview of who would be in the hat.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawPreview {
    pub prize: PrizeResponse,
    pub qualified_entrants: Vec<WinnerSummary>,
    pub entrant_count: i64,
    pub threshold: i64,
}
