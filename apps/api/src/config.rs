use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::scoring::MatchConfig;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub resume_storage_root: String,
    pub port: u16,
    pub rust_log: String,
    pub match_config: MatchConfig,
    pub stage_timeout_secs: u64,
    pub scoring_reply_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = MatchConfig::default();
        let match_config = MatchConfig {
            weight_high: optional_env("MATCH_WEIGHT_HIGH", defaults.weight_high)?,
            weight_normal: optional_env("MATCH_WEIGHT_NORMAL", defaults.weight_normal)?,
            shortlist_threshold: optional_env(
                "MATCH_SHORTLIST_THRESHOLD",
                defaults.shortlist_threshold,
            )?,
            review_threshold: optional_env("MATCH_REVIEW_THRESHOLD", defaults.review_threshold)?,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            resume_storage_root: std::env::var("RESUME_STORAGE_ROOT")
                .unwrap_or_else(|_| "uploads/resumes".to_string()),
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            match_config,
            stage_timeout_secs: optional_env("STAGE_TIMEOUT_SECS", 30)?,
            scoring_reply_timeout_secs: optional_env("SCORING_REPLY_TIMEOUT_SECS", 10)?,
        })
    }

    /// Upper bound on any single blocking intake stage (repository call,
    /// artifact write). An elapsed timeout fails the stage.
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    /// How long an intake request waits for the scoring worker's reply before
    /// returning the pending evaluation view.
    pub fn scoring_reply_timeout(&self) -> Duration {
        Duration::from_secs(self.scoring_reply_timeout_secs)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Environment variable '{key}' is invalid: {e}")),
        Err(_) => Ok(default),
    }
}
