use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub plan: Option<PlanConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/history.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// Location of the meal-plan content served at `GET /api/plan`.
#[derive(Debug, Deserialize, Clone)]
pub struct PlanConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.storage.path.as_os_str().is_empty() {
        anyhow::bail!("storage.path must not be empty");
    }

    config
        .server
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("server.bind is not a socket address: '{}'", config.server.bind))?;

    if let Some(plan) = &config.plan {
        if plan.path.as_os_str().is_empty() {
            anyhow::bail!("plan.path must not be empty when [plan] is present");
        }
    }

    match config.log.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => anyhow::bail!(
            "Unknown log level: '{}'. Must be trace, debug, info, warn, or error.",
            other
        ),
    }

    Ok(())
}
