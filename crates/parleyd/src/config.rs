//! Configuration management for parleyd.
//!
//! Loads settings from `parley.toml` (or an explicit path) or uses defaults.
//! Environment overrides: `PORT` for the listen port. The hosted-tier
//! credential is only ever read from the environment.

use anyhow::{Context, Result};
use parley_shared::matcher::{MatchPolicy, DEFAULT_MIN_OVERLAP};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "parley.toml";

/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "PORT";

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where dataset files live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_dir")]
    pub dir: PathBuf,
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("datasets")
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dir: default_dataset_dir(),
        }
    }
}

/// Matcher acceptance policy name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    AlwaysBest,
    MinOverlap,
}

/// Matcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default = "default_policy")]
    pub policy: PolicyKind,

    /// Only used by `min_overlap`
    #[serde(default = "default_min_overlap")]
    pub min_overlap: usize,
}

fn default_policy() -> PolicyKind {
    PolicyKind::MinOverlap
}

fn default_min_overlap() -> usize {
    DEFAULT_MIN_OVERLAP
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            min_overlap: default_min_overlap(),
        }
    }
}

impl MatcherConfig {
    pub fn match_policy(&self) -> MatchPolicy {
        match self.policy {
            PolicyKind::AlwaysBest => MatchPolicy::AlwaysBest,
            PolicyKind::MinOverlap => MatchPolicy::MinOverlap(self.min_overlap),
        }
    }
}

/// Local-network generation service (Ollama `/api/generate`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_local_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_local_model")]
    pub model: String,

    #[serde(default = "default_local_timeout")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_local_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_local_model() -> String {
    "llama3".to_string()
}

fn default_local_timeout() -> u64 {
    8
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_local_endpoint(),
            model: default_local_model(),
            timeout_secs: default_local_timeout(),
        }
    }
}

/// Hosted inference API (bearer-authenticated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_hosted_endpoint")]
    pub endpoint: String,

    /// Name of the environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    #[serde(default = "default_hosted_timeout")]
    pub timeout_secs: u64,
}

fn default_hosted_endpoint() -> String {
    "https://api-inference.huggingface.co/models/google/flan-t5-large".to_string()
}

fn default_token_env() -> String {
    "HF_TOKEN".to_string()
}

fn default_max_new_tokens() -> u32 {
    80
}

fn default_hosted_timeout() -> u64 {
    30
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_hosted_endpoint(),
            token_env: default_token_env(),
            max_new_tokens: default_max_new_tokens(),
            timeout_secs: default_hosted_timeout(),
        }
    }
}

impl HostedConfig {
    /// Bearer token from the environment; unset or blank means no credential
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Terminal reply when every tier comes up empty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_message")]
    pub message: String,
}

fn default_fallback_message() -> String {
    "I'm here to help. Tell me more.".to_string()
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            message: default_fallback_message(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub matcher: MatcherConfig,

    #[serde(default)]
    pub local: LocalConfig,

    #[serde(default)]
    pub hosted: HostedConfig,

    #[serde(default)]
    pub fallback: FallbackConfig,
}

impl Config {
    /// Load config from `path` when given (must exist), else from
    /// [`DEFAULT_CONFIG_PATH`] if present, else defaults. A file that exists
    /// but does not parse is an error. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from_path(p)?,
            None => Self::load_or_default(Path::new(DEFAULT_CONFIG_PATH))?,
        };
        config.apply_env();
        Ok(config)
    }

    /// Defaults when `path` is absent; a present file must parse
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No {} found, using defaults", path.display());
            return Ok(Config::default());
        }
        Self::load_from_path(path)
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var(PORT_ENV) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid {}={:?}", PORT_ENV, raw),
            }
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
