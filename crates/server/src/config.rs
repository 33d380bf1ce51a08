//! # Application Configuration
//!
//! Defines the configuration structure for the `linkhint-server` and the
//! logic for loading it from an optional `config.yml` file plus environment
//! variables. Everything is resolved once at startup into a typed
//! `AppConfig`; adapters and the pipeline never re-read the environment.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use linkhint::aggregate::ScoringConfig;
use linkhint_confluence::ConfluenceConfig;
use linkhint_github::GithubConfig;
use linkhint_jira::JiraConfig;
use linkhint_servicenow::ServiceNowConfig;
use regex::Regex;
use serde::Deserialize;
use std::{env, fs};
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Result count when a request does not carry `max_results`.
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Optional embedding endpoint; the vector search route requires it.
    #[serde(default)]
    pub embedding: Option<EmbeddingConfig>,
    /// Dedup threshold and scoring multipliers; defaults are canonical.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

fn default_port() -> u16 {
    8088
}
fn default_db_url() -> String {
    "db/linkhint.db".to_string()
}
fn default_max_results() -> usize {
    10
}

/// Suggestion cache tunables.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u64,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_ttl_minutes() -> u64 {
    30
}
fn default_cleanup_interval_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

/// One section per external knowledge system; a section left empty leaves
/// that adapter disabled and serving its fallback set.
#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    /// Per-adapter call budget during the fan-out, in milliseconds.
    #[serde(default = "default_source_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub confluence: ConfluenceConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub servicenow: ServiceNowConfig,
}

fn default_source_timeout_ms() -> u64 {
    5000
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_source_timeout_ms(),
            jira: JiraConfig::default(),
            confluence: ConfluenceConfig::default(),
            github: GithubConfig::default(),
            servicenow: ServiceNowConfig::default(),
        }
    }
}

/// Configuration for the embedding model provider.
#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    pub api_url: String,
    pub model_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").unwrap();
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_else(|_| "".to_string())
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// The layers, lowest precedence first:
/// 1. `config.yml` next to the manifest (or the override path), with
///    `${VAR}` placeholders substituted from the environment.
/// 2. Plain environment variables for top-level keys (`PORT`, `DB_URL`).
/// 3. `LINKHINT_`-prefixed variables for nested keys, e.g.
///    `LINKHINT_SOURCES__JIRA__API_TOKEN`.
///
/// A missing config file is not an error: every field has a default, and a
/// default-configured server runs entirely on adapter fallback data.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder();

    let config_path = config_path_override
        .map(|p| p.to_string())
        .unwrap_or_else(|| format!("{base_path}/config.yml"));
    if let Some(content) = read_and_substitute(&config_path)? {
        info!("Loading configuration from '{config_path}'.");
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("LINKHINT")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
