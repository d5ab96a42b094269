//! Runtime configuration
//!
//! Read from the process environment after `.env` has been loaded.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::error::DashboardError;
use crate::Result;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_DATA_DIR: &str = "./data/processed";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Values shipped in `.env.example` files; treated as "not configured"
const PLACEHOLDER_KEYS: &[&str] = &["your-api-key-here", "your_gemini_api_key_here", "mock_key"];

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// `AIzaSyAb...wxyz` style rendering for the settings page
    pub fn masked_key(&self) -> String {
        match &self.api_key {
            Some(key) if key.chars().count() > 12 => {
                let head: String = key.chars().take(8).collect();
                let tail: String = key
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                format!("{}...{}", head, tail)
            }
            Some(_) => "****".to_string(),
            None => "Not set".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub llm: LlmConfig,
    pub data_dir: PathBuf,
    pub port: u16,
    pub chat_history_limit: usize,
}

impl DashboardConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("GOOGLE_API_KEY")
            .or_else(|| get("GEMINI_API_KEY"))
            .filter(|key| !PLACEHOLDER_KEYS.contains(&key.as_str()));

        if api_key.is_none() {
            warn!("No Google API key found. AI features disabled.");
        }

        let timeout_secs = parse_or(get("LLM_TIMEOUT_SECS"), "LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let port = parse_or(
            get("PORT").or_else(|| get("API_PORT")),
            "PORT",
            DEFAULT_PORT,
        )?;
        let chat_history_limit = parse_or(
            get("CHAT_HISTORY_LIMIT"),
            "CHAT_HISTORY_LIMIT",
            DEFAULT_HISTORY_LIMIT,
        )?;

        Ok(Self {
            llm: LlmConfig {
                api_key,
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(timeout_secs),
            },
            data_dir: get("KPI_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            port,
            chat_history_limit: chat_history_limit.max(1),
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, name: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw.parse().map_err(|_| {
            DashboardError::ConfigError(format!("{} has an invalid value: {}", name, raw))
        }),
        None => Ok(default),
    }
}
