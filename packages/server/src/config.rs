use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub indexer_url: String,
    pub indexer_api_key: String,
    pub rule_search_url: String,
    pub rule_search_api_key: String,
    pub openai_api_key: String,
    pub openai_model: Option<String>,
    pub rule_top_k: usize,
    pub poll_timeout: Duration,
    pub poll_interval: Duration,
    pub max_video_duration_secs: f64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| {
                    "http://localhost:5173,http://localhost:3000".to_string()
                })
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            indexer_url: env::var("INDEXER_URL").context("INDEXER_URL must be set")?,
            indexer_api_key: env::var("INDEXER_API_KEY")
                .context("INDEXER_API_KEY must be set")?,
            rule_search_url: env::var("RULE_SEARCH_URL")
                .context("RULE_SEARCH_URL must be set")?,
            rule_search_api_key: env::var("RULE_SEARCH_API_KEY")
                .context("RULE_SEARCH_API_KEY must be set")?,
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?,
            openai_model: env::var("OPENAI_MODEL").ok(),
            rule_top_k: env::var("RULE_TOP_K")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("RULE_TOP_K must be a valid number")?,
            poll_timeout: Duration::from_secs(
                env::var("INDEXER_POLL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .context("INDEXER_POLL_TIMEOUT_SECS must be a valid number")?,
            ),
            poll_interval: Duration::from_secs(
                env::var("INDEXER_POLL_INTERVAL_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("INDEXER_POLL_INTERVAL_SECS must be a valid number")?,
            ),
            max_video_duration_secs: env::var("MAX_VIDEO_DURATION_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("MAX_VIDEO_DURATION_SECS must be a valid number")?,
        })
    }
}
