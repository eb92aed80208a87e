use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use busnav_core::{CityGraphConfig, loading::NetworkSources};
use serde::Deserialize;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONCURRENCY_LIMIT: usize = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    pub data: DataConfig,
    #[serde(default)]
    pub city: CityGraphConfig,
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(flatten)]
    pub sources: NetworkSources,
    /// Serialized city graph, read instead of the CSV files when present
    pub cache: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub request_timeout_secs: u64,
    pub concurrency_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl ServerConfig {
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let config: Self = toml::from_str(&text)?;
        config.city.validate()?;
        Ok(config)
    }
}
