use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::connectivity::DEFAULT_ENDPOINTS;

/// Remote content API settings (`[api]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root; object requests go to `{base_url}/drive/v3/files/{id}`.
    pub base_url: String,
    /// Optional OAuth bearer token sent as `Authorization: Bearer ...`.
    /// Must be minted beforehand; service-account key files are not read.
    pub access_token: Option<String>,
    /// Optional API key appended as the `key` query parameter.
    pub api_key: Option<String>,
    /// Connect timeout per request, in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout (one chunk), in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com".to_string(),
            access_token: None,
            api_key: None,
            connect_timeout_secs: 30,
            request_timeout_secs: 600,
        }
    }
}

/// Preflight reachability check (`[connectivity]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// `host:port` endpoints; all must accept a TCP connection.
    pub endpoints: Vec<String>,
    /// Per-endpoint connect timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            timeout_secs: 5,
        }
    }
}

/// Global configuration loaded from `~/.config/zdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZdlConfig {
    /// Chunk size in megabytes when neither flags nor job file set one.
    pub default_chunk_size_mb: u32,
    /// Base directory for destination folders (None = current directory).
    pub download_dir: Option<PathBuf>,
    pub api: ApiConfig,
    pub connectivity: ConnectivityConfig,
}

impl Default for ZdlConfig {
    fn default() -> Self {
        Self {
            default_chunk_size_mb: 1,
            download_dir: None,
            api: ApiConfig::default(),
            connectivity: ConnectivityConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("zdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ZdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ZdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ZdlConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
