use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// =============================================================================
// Package layout constants
// =============================================================================

/// Default NuGet v3 flat container used to list remote releases
pub const DEFAULT_SOURCE: &str = "https://api.nuget.org/v3-flatcontainer";

/// Packages making up the legacy (2.x) release group
pub const LEGACY_PACKAGE_IDS: &[&str] = &["NuGet.Core"];

/// Packages making up the modern (3.x and later) release group
pub const MODERN_PACKAGE_IDS: &[&str] = &["NuGet.Frameworks", "NuGet.Versioning"];

/// Target frameworks the host can load, most specific first
pub const DEFAULT_TARGET_PREFERENCE: &[&str] = &[
    "net472",
    "net46",
    "net45",
    "net40-client",
    "net40",
    "netstandard2.0",
    "netstandard1.3",
    "netstandard1.0",
];

/// Sandbox configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SandboxConfig {
    /// Root of the materialized package folder; defaults to `<data_dir>/packages`
    pub packages_dir: Option<PathBuf>,
    /// Flat container base URLs
    pub sources: Vec<String>,
    pub target_preference: Vec<String>,
    pub log: LogConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            packages_dir: None,
            sources: vec![DEFAULT_SOURCE.to_string()],
            target_preference: DEFAULT_TARGET_PREFERENCE
                .iter()
                .map(|t| t.to_string())
                .collect(),
            log: LogConfig::default(),
        }
    }
}

impl SandboxConfig {
    /// Load the configuration file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.packages_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("packages"))
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LogFormat {
    /// Human-readable output on stderr
    #[default]
    Pretty,
    /// JSON lines appended to the log file
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    /// Filter directive (e.g. "info", "nuget_sandbox=debug"); `RUST_LOG` wins when set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Returns the path to the data directory for nuget-sandbox.
/// Uses $XDG_DATA_HOME/nuget-sandbox if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/nuget-sandbox,
/// or ./nuget-sandbox if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the configuration file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("nuget-sandbox.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("nuget-sandbox")
}
