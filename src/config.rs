//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::amadeus::env::AmadeusEnv;
use crate::sort::{ScoreWeights, SortMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Amadeus environment
    #[serde(default)]
    pub env: AmadeusEnv,

    /// Overrides the environment's API host (e.g. a local mock)
    #[serde(default)]
    pub host: Option<String>,

    /// OAuth2 client id
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Maximum number of offers to display
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Default result ordering
    #[serde(default)]
    pub sort: SortMode,

    /// Currency for trend output when no offer carries one
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Weights for the "best" ordering
    #[serde(default)]
    pub weights: ScoreWeights,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after a 429 response
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff between retries in milliseconds
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

fn default_max_results() -> usize {
    20
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: AmadeusEnv::Test,
            host: None,
            client_id: None,
            client_secret: None,
            max_results: default_max_results(),
            format: OutputFormat::Table,
            sort: SortMode::Best,
            currency: default_currency(),
            weights: ScoreWeights::default(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("fare-scout").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(id) = lookup("AMADEUS_CLIENT_ID").filter(|v| !v.is_empty()) {
            self.client_id = Some(id);
        }

        if let Some(secret) = lookup("AMADEUS_CLIENT_SECRET").filter(|v| !v.is_empty()) {
            self.client_secret = Some(secret);
        }

        if let Some(host) = lookup("AMADEUS_HOST").filter(|v| !v.is_empty()) {
            self.host = Some(host);
        }

        if let Some(env) = lookup("FARE_SCOUT_ENV") {
            match env.parse() {
                Ok(e) => self.env = e,
                Err(e) => warn!("Ignoring FARE_SCOUT_ENV: {}", e),
            }
        }

        self
    }

    /// Returns true if both OAuth2 credentials are present.
    pub fn has_credentials(&self) -> bool {
        self.client_id.as_deref().is_some_and(|v| !v.is_empty())
            && self.client_secret.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
