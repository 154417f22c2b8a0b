//! Configuration system for NAQLA
//!
//! Supports loading configuration from:
//! 1. CLI --config argument
//! 2. ~/.config/naqla/config.{NAQLA_ENV}.json
//! 3. Default values
//!
//! Where NAQLA_ENV can be: production (default), development, test
//!
//! # Examples
//!
//! ## Loading Configuration
//!
//! ```no_run
//! use naqla::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load with default priority
//! let config = AppConfig::load(None)?;
//! println!("Model: {} via {}", config.model.model, config.model.provider);
//!
//! // Load from specific file
//! let config = AppConfig::load(Some("./my-config.json".as_ref()))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Creating Configuration
//!
//! ```
//! use naqla::config::{AppConfig, ModelProvider};
//!
//! let mut config = AppConfig::default();
//! config.model.provider = ModelProvider::OpenAI;
//! config.model.url = "https://api.openai.com/v1".to_string();
//! config.model.model = "gpt-4o-mini".to_string();
//! config.model.api_key = Some("OPENAI_API_KEY".to_string());
//! config.clustering.seed = Some(42);
//!
//! config.validate().unwrap();
//! ```
//!
//! ## Environment Variables
//!
//! Environment variables override config file values:
//! - NAQLA_PROVIDER
//! - NAQLA_MODEL_URL
//! - NAQLA_MODEL
//! - NAQLA_API_KEY
//! - NAQLA_SEED
//! - NAQLA_MAX_ITERATIONS

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    #[default]
    Ollama,
    OpenAI,
    Groq,
    Gemini,
}

impl ModelProvider {
    /// Whether the provider speaks the OpenAI `/chat/completions` dialect
    pub fn is_openai_compatible(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::OpenAI => write!(f, "openai"),
            Self::Groq => write!(f, "groq"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "groq" => Ok(Self::Groq),
            "gemini" => Ok(Self::Gemini),
            _ => Err(ConfigError::ValidationError(format!(
                "Unknown provider: {}",
                s
            ))),
        }
    }
}

/// Language model connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider type
    pub provider: ModelProvider,

    /// Base URL of the provider API
    #[serde(default = "default_ollama_url")]
    pub url: String,

    /// Model name
    pub model: String,

    /// API key (can be environment variable name like "OPENAI_API_KEY")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Temperature (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top P sampling (0.0 - 1.0)
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,

    /// Timeout for a single completion request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_top_p() -> f32 {
    0.6
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Ollama,
            url: default_ollama_url(),
            model: "qwen3:8b".to_string(),
            api_key: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ModelConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ConfigError::ValidationError(format!(
                "Top P must be between 0.0 and 1.0, got {}",
                self.top_p
            )));
        }

        if self.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "URL cannot be empty".to_string(),
            ));
        }

        if self.model.is_empty() {
            return Err(ConfigError::ValidationError(
                "Model name cannot be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        // Hosted providers all need a key
        if self.provider.is_openai_compatible() && self.api_key.is_none() {
            return Err(ConfigError::ValidationError(format!(
                "API key required for {} provider",
                self.provider
            )));
        }

        Ok(())
    }

    /// Resolve API key from environment variable if needed
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.as_ref().and_then(|key| {
            if is_env_reference(key) {
                std::env::var(key).ok()
            } else {
                Some(key.clone())
            }
        })
    }
}

/// `API_KEY`-style names are looked up in the environment, anything else is a literal key
fn is_env_reference(key: &str) -> bool {
    key.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// What to do with an idea whose scoring call keeps failing after retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScoringFailurePolicy {
    /// Fail the whole clustering run
    #[default]
    Abort,
    /// Substitute a neutral feature vector and keep going
    Neutral,
}

/// K-means and pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Hard cap on K-means rounds
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Below this many ideas everything lands in a single cluster
    #[serde(default = "default_min_ideas")]
    pub min_ideas: usize,

    /// Roughly one cluster per this many ideas when no target is given
    #[serde(default = "default_ideas_per_cluster")]
    pub ideas_per_cluster: usize,

    /// Floor for the default cluster count
    #[serde(default = "default_min_clusters")]
    pub min_clusters: usize,

    /// Seed for centroid initialization; entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub on_scoring_failure: ScoringFailurePolicy,
}

fn default_max_iterations() -> usize {
    10
}

fn default_min_ideas() -> usize {
    3
}

fn default_ideas_per_cluster() -> usize {
    5
}

fn default_min_clusters() -> usize {
    3
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            min_ideas: default_min_ideas(),
            ideas_per_cluster: default_ideas_per_cluster(),
            min_clusters: default_min_clusters(),
            seed: None,
            on_scoring_failure: ScoringFailurePolicy::default(),
        }
    }
}

impl ClusteringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.ideas_per_cluster == 0 {
            return Err(ConfigError::ValidationError(
                "ideas_per_cluster must be greater than 0".to_string(),
            ));
        }

        if self.min_clusters == 0 {
            return Err(ConfigError::ValidationError(
                "min_clusters must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Default cluster count for `idea_count` ideas: `max(min_clusters, ceil(n / ideas_per_cluster))`
    pub fn default_cluster_count(&self, idea_count: usize) -> usize {
        self.min_clusters
            .max(idea_count.div_ceil(self.ideas_per_cluster))
    }
}

/// Retry settings for individual model calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Base delay for exponential backoff
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> usize {
    3
}

fn default_base_delay() -> u64 {
    200
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Language model used for scoring and labeling
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub clustering: ClusteringConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Overall timeout for one clustering run (CLI only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_timeout_secs: Option<u64>,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration with standard priority:
    /// 1. Explicit path
    /// 2. ~/.config/naqla/config.{NAQLA_ENV}.json
    /// 3. Defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit_path {
            if path.exists() {
                tracing::info!("Loading config from: {:?}", path);
                return Self::from_file(path);
            } else {
                return Err(ConfigError::ValidationError(format!(
                    "Config file not found: {:?}",
                    path
                )));
            }
        }

        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                tracing::info!("Loading config from: {:?}", config_path);
                return Self::from_file(&config_path);
            }
        }

        tracing::info!("Using default configuration with environment overrides");
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(provider) = std::env::var("NAQLA_PROVIDER") {
            self.model.provider = provider.parse()?;
        }

        if let Ok(url) = std::env::var("NAQLA_MODEL_URL") {
            self.model.url = url;
        }

        if let Ok(model) = std::env::var("NAQLA_MODEL") {
            self.model.model = model;
        }

        if let Ok(key) = std::env::var("NAQLA_API_KEY") {
            self.model.api_key = Some(key);
        }

        if let Ok(seed) = std::env::var("NAQLA_SEED") {
            let seed = seed.parse().map_err(|_| {
                ConfigError::ValidationError(format!("NAQLA_SEED is not a number: {}", seed))
            })?;
            self.clustering.seed = Some(seed);
        }

        if let Ok(iterations) = std::env::var("NAQLA_MAX_ITERATIONS") {
            self.clustering.max_iterations = iterations.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "NAQLA_MAX_ITERATIONS is not a number: {}",
                    iterations
                ))
            })?;
        }

        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.clustering.validate()?;

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.run_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "run_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("naqla"))
    }

    /// Standard config file for the current NAQLA_ENV
    pub fn default_path() -> Option<PathBuf> {
        let env = std::env::var("NAQLA_ENV").unwrap_or_else(|_| "production".to_string());
        Self::config_dir().map(|d| d.join(format!("config.{}.json", env)))
    }

    /// Copy safe to print: a literal API key is masked, an env var name is kept
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(key) = config.model.api_key.as_mut() {
            if !is_env_reference(key) {
                *key = "********".to_string();
            }
        }
        config
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
