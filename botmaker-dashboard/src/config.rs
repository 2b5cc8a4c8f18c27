use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Context;
use botmaker_common::Field;
use serde::{Deserialize, Serialize};

use crate::module::templates::{ColumnLayout, LabelStyle};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "BOTMAKER_CONFIG";
pub const API_URL_ENV: &str = "API_URL";
pub const ACCESS_TOKEN_ENV: &str = "ACCESS_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_fields")]
    pub fields: Vec<Field>,

    #[serde(default)]
    pub labels: LabelStyle,
}

fn default_fields() -> Vec<Field> {
    Field::ALL.to_vec()
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            labels: LabelStyle::default(),
        }
    }
}

impl ColumnsConfig {
    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout::new(self.fields.clone(), self.labels)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Upstream endpoint; `API_URL` takes precedence
    #[serde(default)]
    pub api_url: String,

    /// Sent as the `access-token` header; `ACCESS_TOKEN` takes precedence
    #[serde(default)]
    pub access_token: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default)]
    pub columns: ColumnsConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            api_url: String::new(),
            access_token: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            columns: ColumnsConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: DashboardConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Replace upstream credentials with values from the environment, when set.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api_url = url;
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV) {
            self.access_token = token;
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

pub static CONFIG: OnceLock<DashboardConfig> = OnceLock::new();

/// Load `.env`, the config file and environment overrides into [`CONFIG`].
pub fn read_config() -> anyhow::Result<&'static DashboardConfig> {
    // A missing .env is normal outside development.
    let _ = dotenvy::dotenv();

    let explicit = std::env::var(CONFIG_PATH_ENV).ok();
    let config = load_config(explicit.as_deref(), DEFAULT_CONFIG_PATH, |key| std::env::var(key).ok())?;

    Ok(CONFIG.get_or_init(|| config))
}

/// A path named by `BOTMAKER_CONFIG` must exist; a missing `default_path` means defaults.
fn load_config<F>(explicit: Option<&str>, default_path: &str, lookup: F) -> anyhow::Result<DashboardConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match explicit {
        Some(path) => {
            if !Path::new(path).exists() {
                anyhow::bail!("Config file {} named by {} does not exist", path, CONFIG_PATH_ENV);
            }
            DashboardConfig::from_file(path)?
        }
        None if Path::new(default_path).exists() => DashboardConfig::from_file(default_path)?,
        None => DashboardConfig::default(),
    };
    config.apply_env_overrides(lookup);
    Ok(config)
}
