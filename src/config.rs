use crate::error::SurveyError;
use log::info;
use std::env;
use std::path::PathBuf;

const DEFAULT_DATABASE_URL: &str = "sqlite:survey_bot.db";
const DEFAULT_QUESTIONS_PATH: &str = "data/questions.json";
const DEFAULT_DRAFT_TTL_MINUTES: i64 = 30;
const MAX_DRAFT_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub questions_path: PathBuf,
    pub draft_ttl_minutes: i64,
    /// Register commands on this guild only (faster to update while testing).
    pub guild_id: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, SurveyError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SurveyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SurveyError::Config("DISCORD_TOKEN must be set".to_string()))?;

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| {
            info!("DATABASE_URL not set, using {}", DEFAULT_DATABASE_URL);
            DEFAULT_DATABASE_URL.to_string()
        });

        let questions_path = lookup("QUESTIONS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_QUESTIONS_PATH));

        let draft_ttl_minutes = match lookup("DRAFT_TTL_MINUTES") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if (1..=MAX_DRAFT_TTL_MINUTES).contains(&minutes) => minutes,
                _ => {
                    return Err(SurveyError::Config(format!(
                        "DRAFT_TTL_MINUTES must be between 1 and {} minutes, got '{}'",
                        MAX_DRAFT_TTL_MINUTES, raw
                    )));
                }
            },
            None => DEFAULT_DRAFT_TTL_MINUTES,
        };

        let guild_id = match lookup("GUILD_ID") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                SurveyError::Config(format!("GUILD_ID '{}' is not a valid id: {}", raw, e))
            })?),
            None => None,
        };

        Ok(Self {
            discord_token,
            database_url,
            questions_path,
            draft_ttl_minutes,
            guild_id,
        })
    }
}
