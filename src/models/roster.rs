use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{participant_entity, team_entity};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamResponse {
    pub id: i64,
    pub name: String,
    pub color_hex: Option<String>,
    pub icon: Option<String>,
}

impl From<team_entity::Model> for TeamResponse {
    fn from(m: team_entity::Model) -> Self {
        TeamResponse {
            id: m.id,
            name: m.name,
            color_hex: m.color_hex,
            icon: m.icon,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i64,
    pub username: String,
    pub team_id: i64,
    pub avatar_emoji: Option<String>,
    pub banked_steps: i64,
    pub grand_prize_entry: bool,
}

impl From<participant_entity::Model> for ParticipantResponse {
    fn from(m: participant_entity::Model) -> Self {
        ParticipantResponse {
            id: m.id,
            username: m.username,
            team_id: m.team_id,
            avatar_emoji: m.avatar_emoji,
            banked_steps: m.banked_steps,
            grand_prize_entry: m.grand_prize_entry,
        }
    }
}

/// A participant's progress against each live threshold.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantSummaryResponse {
    pub participant: ParticipantResponse,
    pub today_steps: i64,
    pub current_week: u32,
    pub week_steps: i64,
    pub raffle_threshold: i64,
    /// Steps still needed this week for a raffle entry; 0 once qualified.
    pub steps_to_raffle: i64,
    pub week_qualified: bool,
    pub challenge_steps: i64,
    pub grand_prize_threshold: i64,
    pub steps_to_grand: i64,
    pub grand_qualified: bool,
}

/// Name-based login lookup; nothing stronger by design.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub team_id: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReassignTeamRequest {
    pub team_id: i64,
}
