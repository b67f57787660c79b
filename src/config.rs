use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_INDEX_PATH: &str = "static/index.html";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

// Compiled-in prompt, replaced at startup when SYSTEM_PROMPT_PATH is set
const DEFAULT_SYSTEM_PROMPT: &str = include_str!("../prompts/system_prompt.txt");

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
    pub api_url: String,
    pub index_path: PathBuf,
    pub system_prompt_path: Option<PathBuf>,
    pub upstream_timeout: Option<Duration>,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", v))?,
            None => DEFAULT_PORT,
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(v) => {
                let secs = v.trim().parse::<u64>().with_context(|| {
                    format!("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds, got {:?}", v)
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_BODY_BYTES must be a byte count, got {:?}", v))?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            api_key: get("GROQ_API_KEY"),
            api_url: get("GROQ_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            index_path: get("INDEX_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_PATH)),
            system_prompt_path: get("SYSTEM_PROMPT_PATH").map(PathBuf::from),
            upstream_timeout,
            max_body_bytes,
        })
    }

    /// Returns the system prompt text: the configured file if any, else the built-in one.
    pub fn load_system_prompt(&self) -> Result<String> {
        let Some(path) = &self.system_prompt_path else {
            return Ok(DEFAULT_SYSTEM_PROMPT.to_string());
        };

        let prompt = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read system prompt from {}", path.display()))?;
        if prompt.trim().is_empty() {
            return Err(anyhow!("System prompt file {} is empty", path.display()));
        }
        Ok(prompt)
    }
}
