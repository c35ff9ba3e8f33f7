use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// HTTP client settings (optional `[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Seconds allowed for establishing the connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for the whole transfer, body included.
    pub timeout_secs: u64,
    /// Maximum number of redirects followed before giving up.
    pub max_redirections: u32,
    /// Optional `User-Agent` header; libcurl sends none when unset.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 300,
            max_redirections: 10,
            user_agent: None,
        }
    }
}

/// Print command (optional `[print]` section). The downloaded file path is
/// always appended after `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            program: "lp".to_string(),
            args: vec![
                "-s".to_string(),
                "-o".to_string(),
                "sides=two-sided-long-edge".to_string(),
                "--".to_string(),
            ],
        }
    }
}

/// Global configuration loaded from `~/.config/autoprint/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoprintConfig {
    /// Directory holding `etag-<hash>.txt` files. Defaults to the platform temp dir.
    pub token_dir: Option<PathBuf>,
    pub http: HttpConfig,
    pub print: PrintConfig,
}

impl AutoprintConfig {
    /// Token directory from config, or the platform temp dir.
    pub fn token_dir(&self) -> PathBuf {
        self.token_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Location of the default config file, if one exists.
pub fn config_path() -> Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("autoprint")?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from_path(path: &Path) -> Result<AutoprintConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AutoprintConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from `explicit` if given, else from the XDG config dir.
/// A missing default file yields the built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<AutoprintConfig> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    match config_path()? {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            load_from_path(&path)
        }
        None => Ok(AutoprintConfig::default()),
    }
}
