use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub challenge: ChallengeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Bot token; empty disables posting entirely.
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_slack_channel")]
    pub channel: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel: default_slack_channel(),
        }
    }
}

fn default_slack_channel() -> String {
    "#teamtrek".to_string()
}

/// Challenge window parameters. The time zone is a named civil zone because
/// it decides which calendar day (and therefore which weekly bucket) a log
/// belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    pub start_date: NaiveDate,
    pub duration_days: u32,
    pub weeks: u32,
    pub daily_goal: i64,
    pub roster_size: i64,
    pub timezone: String,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        // December 2025 challenge: 10 walkers, 7k steps/day, 31 days.
        Self {
            start_date: NaiveDate::from_ymd_opt(2025, 12, 1).expect("valid date"),
            duration_days: 31,
            weeks: 4,
            daily_goal: 7000,
            roster_size: 10,
            timezone: "America/Denver".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No config file: build from environment variables and defaults.
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    slack: SlackConfig {
                        bot_token: get_env("SLACK_BOT_TOKEN").unwrap_or_default(),
                        channel: get_env("SLACK_CHANNEL_ID").unwrap_or_else(default_slack_channel),
                    },
                    challenge: ChallengeConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // Environment variables override the file when both are present.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT") {
            if let Ok(p) = v.parse() {
                config.server.port = p;
            }
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS") {
            if let Ok(mc) = v.parse() {
                config.database.max_connections = mc;
            }
        }
        if let Ok(v) = env::var("SLACK_BOT_TOKEN") {
            config.slack.bot_token = v;
        }
        if let Ok(v) = env::var("SLACK_CHANNEL_ID") {
            config.slack.channel = v;
        }
        if let Ok(v) = env::var("CHALLENGE_START_DATE") {
            if let Ok(d) = v.parse() {
                config.challenge.start_date = d;
            }
        }
        if let Ok(v) = env::var("CHALLENGE_TIMEZONE") {
            config.challenge.timezone = v;
        }

        Ok(config)
    }
}
