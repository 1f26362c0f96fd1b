use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::remote::JikanConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub jikan: JikanConfig,
    #[serde(default)]
    pub data_source: DataSourceConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            jikan: JikanConfig::default(),
            data_source: DataSourceConfig::default(),
            ingestion: IngestionConfig::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("animedex.db")
}

/// Data sourcing strategy selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataSourceConfig {
    /// Which sourcing strategy to use
    #[serde(default)]
    pub strategy: Strategy,
    /// Skip the cache for reads even under the hybrid strategy
    #[serde(default)]
    pub force_remote: bool,
    /// Disable cache reads and write-backs entirely
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            force_remote: false,
            cache_enabled: true,
        }
    }
}

/// Available sourcing strategies
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Serve only from the local cache.
    CacheOnly,
    /// Serve only from the remote catalog.
    RemoteOnly,
    /// Cache-first with remote fallback and write-back.
    #[default]
    Hybrid,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheOnly => "cache-only",
            Strategy::RemoteOnly => "remote-only",
            Strategy::Hybrid => "hybrid",
        }
    }
}

/// Bulk ingestion configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestionConfig {
    /// Start an ingestion run when the server boots (default: true)
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
    /// Delay between page fetches in milliseconds (default: 1000)
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// Retries per page before skipping it (default: 3)
    #[serde(default = "default_max_page_retries")]
    pub max_page_retries: u32,
    /// Delay before each retry in milliseconds (default: 2000)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Cap on pages per run, unset means walk the whole catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            run_on_startup: true,
            page_delay_ms: default_page_delay_ms(),
            max_page_retries: default_max_page_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_pages: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_max_page_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}
