use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::WinnerSummary;

/// Milestone status: either the recorded one-time event, or live progress
/// toward the threshold.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MilestoneStatusResponse {
    pub milestone_type: String,
    pub achieved: bool,
    pub threshold: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_steps_at_trigger: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<WinnerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_steps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// Aggregates for the daily Slack digest.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DigestSummary {
    pub date: chrono::NaiveDate,
    pub global_total: i64,
    pub global_goal: i64,
    pub percentage: f64,
    pub team_totals: Vec<TeamDigestRow>,
    pub top_walker: Option<TopWalker>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamDigestRow {
    pub team_id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub total_steps: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopWalker {
    pub participant_id: i64,
    pub username: String,
    pub avatar_emoji: Option<String>,
    pub steps: i64,
}
