//! Process configuration
//!
//! Configuration is read once at startup from (lowest to highest priority)
//! built-in defaults, an optional TOML file (`shopkeep.toml`), and environment
//! variables. The resulting [`Config`] is immutable and shared via `Arc`.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from shopkeep.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub tools: ToolSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid value for environment variable '{name}': {value}")]
    InvalidEnvVar { name: String, value: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Environment variable name containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default)]
    pub temperature: Option<f32>,

    /// Wall-clock limit for a single chat-completion request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Resolved credential; never written back out
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            temperature: None,
            request_timeout_secs: default_request_timeout_secs(),
            api_key: None,
        }
    }
}

// ============= Tool Loop Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model round-trips per chat request
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

fn default_max_iterations() -> usize {
    6
}

fn default_tool_timeout_secs() -> u64 {
    30
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

// ============= Data Sources =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_faq_path")]
    pub faq_path: PathBuf,

    #[serde(default = "default_sales_path")]
    pub sales_path: PathBuf,

    #[serde(default = "default_inventory_path")]
    pub inventory_path: PathBuf,
}

fn default_faq_path() -> PathBuf {
    PathBuf::from("data/faq.json")
}

fn default_sales_path() -> PathBuf {
    PathBuf::from("data/sales.csv")
}

fn default_inventory_path() -> PathBuf {
    PathBuf::from("data/inventory.csv")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            faq_path: default_faq_path(),
            sales_path: default_sales_path(),
            inventory_path: default_inventory_path(),
        }
    }
}

// ============= Tool Tuning =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Minimum keyword-overlap score for an FAQ entry to count as a match
    #[serde(default = "default_faq_match_threshold")]
    pub faq_match_threshold: f64,

    /// Half-width of the price search band, as a fraction of the current price
    #[serde(default = "default_price_band")]
    pub price_band: f64,

    /// Number of evenly spaced candidate prices across the band
    #[serde(default = "default_price_steps")]
    pub price_steps: usize,

    #[serde(default = "default_elasticity")]
    pub default_elasticity: f64,

    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
}

fn default_faq_match_threshold() -> f64 {
    0.20
}

fn default_price_band() -> f64 {
    0.10
}

fn default_price_steps() -> usize {
    21
}

fn default_elasticity() -> f64 {
    -1.2
}

fn default_top_n() -> usize {
    5
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            faq_match_threshold: default_faq_match_threshold(),
            price_band: default_price_band(),
            price_steps: default_price_steps(),
            default_elasticity: default_elasticity(),
            default_top_n: default_top_n(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            Self::from_toml(&fs::read_to_string(path)?)?
        } else {
            Config::default()
        };

        config.apply_env_with(|name| env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnvVar {
                name: "PORT".to_string(),
                value: port,
            })?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.server.log_level = level;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(base) = lookup("OPENAI_API_BASE") {
            self.llm.api_base = base;
        }

        self.llm.api_key = lookup(&self.llm.api_key_env).filter(|key| !key.trim().is_empty());
        Ok(())
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.tools.faq_match_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "tools.faq_match_threshold must be within [0, 1], got {}",
                self.tools.faq_match_threshold
            )));
        }
        if !(self.tools.price_band > 0.0 && self.tools.price_band < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "tools.price_band must be within (0, 1), got {}",
                self.tools.price_band
            )));
        }
        if self.tools.price_steps < 2 {
            return Err(ConfigError::ValidationError(
                "tools.price_steps must be at least 2".to_string(),
            ));
        }
        if self.tools.default_top_n == 0 {
            return Err(ConfigError::ValidationError(
                "tools.default_top_n must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML (the API key is never included).
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ValidationError(format!("Failed to render config: {}", e)))
    }
}
