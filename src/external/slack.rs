use crate::config::SlackConfig;
use crate::entities::{participant_entity, prize_entity, team_entity};
use crate::error::{AppError, AppResult};
use crate::models::DigestSummary;
use reqwest::Client;
use serde_json::{Value, json};

/// Best-effort Block Kit poster for the challenge channel.
///
/// Every `notify_*` method swallows and logs failures: a Slack outage must
/// never fail or roll back the database write that triggered the message.
/// Only `post_daily_digest` propagates errors, because the digest endpoint's
/// whole purpose is the post itself.
#[derive(Clone)]
pub struct SlackService {
    client: Client,
    config: SlackConfig,
}

fn mention(p: &participant_entity::Model) -> String {
    match &p.slack_user_id {
        Some(id) if !id.is_empty() => format!("<@{id}>"),
        _ => format!("*{}*", p.username),
    }
}

fn emoji(p: &participant_entity::Model) -> &str {
    p.avatar_emoji.as_deref().unwrap_or("🚶")
}

fn fmt_steps(n: i64) -> String {
    // 1234567 -> "1,234,567"
    let digits = n.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 { format!("-{out}") } else { out }
}

impl SlackService {
    pub fn new(config: SlackConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Post a Block Kit payload via `chat.postMessage`.
    pub async fn post_blocks(&self, blocks: Vec<Value>) -> AppResult<()> {
        if self.config.bot_token.is_empty() {
            log::info!("No Slack bot token configured, skipping notification");
            return Ok(());
        }

        let payload = json!({
            "channel": self.config.channel,
            "blocks": blocks,
        });

        let response = self
            .client
            .post("https://slack.com/api/chat.postMessage")
            .bearer_auth(&self.config.bot_token)
            .json(&payload)
            .send()
            .await?;

        let body: Value = response.json().await?;
        if body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            log::info!("Posted to Slack channel {}", self.config.channel);
            Ok(())
        } else {
            let err = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            Err(AppError::ExternalApiError(format!(
                "Slack chat.postMessage failed: {err}"
            )))
        }
    }

    async fn post_best_effort(&self, what: &str, blocks: Vec<Value>) {
        if let Err(e) = self.post_blocks(blocks).await {
            log::error!("Failed to post {what} to Slack: {e}");
        }
    }

    /// Channel note for a freshly logged activity.
    pub async fn notify_activity_log(
        &self,
        participant: &participant_entity::Model,
        team: &team_entity::Model,
        step_count: i64,
        activity_type: &str,
        daily_total: i64,
        banked_steps: i64,
    ) {
        let team_icon = team.icon.as_deref().unwrap_or("👥");
        let blocks = vec![json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "👟 *{}* logged *{} steps* ({})\n{} {} · today: {} · total: {}",
                    participant.username,
                    fmt_steps(step_count),
                    activity_type,
                    team_icon,
                    team.name,
                    fmt_steps(daily_total),
                    fmt_steps(banked_steps),
                ),
            }
        })];
        self.post_best_effort("activity log", blocks).await;
    }

    /// Celebration for a newly qualified weekly raffle entrant.
    pub async fn notify_weekly_qualification(
        &self,
        participant: &participant_entity::Model,
        week: u32,
        weekly_steps: i64,
        threshold: i64,
    ) {
        let blocks = vec![
            json!({
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": format!("🎟️ WEEK {week} RAFFLE QUALIFIER!"),
                    "emoji": true
                }
            }),
            json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "*{}* {} just hit *{}* steps this week and is entered in the Week {} prize raffle! 🎉",
                        mention(participant),
                        emoji(participant),
                        fmt_steps(weekly_steps),
                        week,
                    ),
                }
            }),
            json!({
                "type": "context",
                "elements": [{
                    "type": "mrkdwn",
                    "text": format!(
                        "Anyone who logs {}+ steps during Week {} gets a raffle entry. Keep stepping! 👟",
                        fmt_steps(threshold),
                        week,
                    ),
                }]
            }),
        ];
        self.post_best_effort("weekly qualification celebration", blocks)
            .await;
    }

    /// Celebration for a new grand-prize qualifier.
    pub async fn notify_grand_qualification(
        &self,
        participant: &participant_entity::Model,
        total_steps: i64,
        threshold: i64,
    ) {
        let blocks = vec![
            json!({
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": "🏆 GRAND PRIZE QUALIFIER!",
                    "emoji": true
                }
            }),
            json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "*{}* {} crossed *{}* total steps and is officially in the grand prize drawing! 🥳",
                        mention(participant),
                        emoji(participant),
                        fmt_steps(total_steps),
                    ),
                }
            }),
            json!({
                "type": "context",
                "elements": [{
                    "type": "mrkdwn",
                    "text": format!(
                        "Hit 70% of your challenge goal ({}+ steps) to join the grand prize pool.",
                        fmt_steps(threshold),
                    ),
                }]
            }),
        ];
        self.post_best_effort("grand prize qualification celebration", blocks)
            .await;
    }

    /// One-time announcement for the org-wide halfway milestone.
    pub async fn notify_halfway_milestone(
        &self,
        participant: Option<&participant_entity::Model>,
        total_steps: i64,
        global_goal: i64,
    ) {
        let pushed_over = participant
            .map(|p| format!("{} {} pushed us over the line!", mention(p), emoji(p)))
            .unwrap_or_else(|| "Together we pushed over the line!".to_string());
        let blocks = vec![
            json!({
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": "🎉 WE'RE HALFWAY THERE! 🎉",
                    "emoji": true
                }
            }),
            json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "The whole org just passed *50%* of the challenge goal — *{}* of {} steps! {}",
                        fmt_steps(total_steps),
                        fmt_steps(global_goal),
                        pushed_over,
                    ),
                }
            }),
        ];
        self.post_best_effort("halfway milestone announcement", blocks)
            .await;
    }

    /// Winner announcement for a weekly prize draw.
    pub async fn announce_weekly_winner(
        &self,
        winner: &participant_entity::Model,
        prize: &prize_entity::Model,
        week: u32,
        qualified_count: i64,
        threshold: i64,
    ) {
        let prize_emoji = prize.emoji.as_deref().unwrap_or("🎁");
        let mut blocks = vec![
            json!({
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": format!("🎉 WEEK {week} PRIZE WINNER! 🎉"),
                    "emoji": true
                }
            }),
            json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "*Congratulations {}!* {}\n\nYou've won the *{} {}*!",
                        mention(winner),
                        emoji(winner),
                        prize_emoji,
                        prize.title,
                    ),
                }
            }),
        ];
        if let Some(desc) = &prize.description {
            blocks.push(json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("_{desc}_") }
            }));
        }
        blocks.push(json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!(
                    "🎲 Randomly selected from *{}* qualified participants who hit {} steps during Week {}. Great job everyone! 👏",
                    qualified_count,
                    fmt_steps(threshold),
                    week,
                ),
            }]
        }));
        self.post_best_effort("weekly winner announcement", blocks)
            .await;
    }

    /// Winner announcement for the grand prize draw.
    pub async fn announce_grand_winner(
        &self,
        winner: &participant_entity::Model,
        prize: &prize_entity::Model,
        qualified_count: i64,
        total_steps: i64,
        threshold: i64,
    ) {
        let prize_emoji = prize.emoji.as_deref().unwrap_or("🏆");
        let mut blocks = vec![
            json!({
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": "🏆✨ THE GRAND PRIZE WINNER IS... ✨🏆",
                    "emoji": true
                }
            }),
            json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": "🥁 *DRUMROLL PLEASE...* 🥁" }
            }),
            json!({ "type": "divider" }),
            json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "🎊 *CONGRATULATIONS {}!* {} 🎊\n\nYou've won the *{} {}*!",
                        mention(winner),
                        emoji(winner),
                        prize_emoji,
                        prize.title,
                    ),
                }
            }),
        ];
        if let Some(desc) = &prize.description {
            blocks.push(json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("_{desc}_") }
            }));
        }
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "📊 *{}'s challenge stats:*\n• 🚶 *{} total steps*",
                    winner.username,
                    fmt_steps(total_steps),
                ),
            }
        }));
        blocks.push(json!({
            "type": "context",
            "elements": [{
                "type": "mrkdwn",
                "text": format!(
                    "🎲 Randomly selected from *{}* participants who hit 70% of their goal ({}+ steps). What a month! 🎉",
                    qualified_count,
                    fmt_steps(threshold),
                ),
            }]
        }));
        self.post_best_effort("grand prize winner announcement", blocks)
            .await;
    }

    /// Evening digest: global progress, team standings, today's top walker.
    /// Errors propagate; the calling endpoint exists to send this post.
    pub async fn post_daily_digest(&self, digest: &DigestSummary) -> AppResult<()> {
        let mut standings = String::new();
        for (i, row) in digest.team_totals.iter().enumerate() {
            let medal = match i {
                0 => "🥇",
                1 => "🥈",
                _ => "🥉",
            };
            standings.push_str(&format!(
                "{} {} *{}* — {} steps\n",
                medal,
                row.icon.as_deref().unwrap_or("👥"),
                row.name,
                fmt_steps(row.total_steps),
            ));
        }

        let mut blocks = vec![
            json!({
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": format!("📣 Daily Challenge Digest — {}", digest.date),
                    "emoji": true
                }
            }),
            json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "🌍 *Org progress:* {} of {} steps (*{:.1}%*)",
                        fmt_steps(digest.global_total),
                        fmt_steps(digest.global_goal),
                        digest.percentage,
                    ),
                }
            }),
            json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": standings }
            }),
        ];
        if let Some(top) = &digest.top_walker {
            blocks.push(json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(
                        "👑 *Today's top walker:* {} *{}* with {} steps!",
                        top.avatar_emoji.as_deref().unwrap_or("🚶"),
                        top.username,
                        fmt_steps(top.steps),
                    ),
                }
            }));
        }
        self.post_blocks(blocks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_steps_groups_thousands() {
        assert_eq!(fmt_steps(0), "0");
        assert_eq!(fmt_steps(999), "999");
        assert_eq!(fmt_steps(7000), "7,000");
        assert_eq!(fmt_steps(29400), "29,400");
        assert_eq!(fmt_steps(1_085_000), "1,085,000");
        assert_eq!(fmt_steps(-1234), "-1,234");
    }
}
