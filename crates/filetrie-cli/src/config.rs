//! Configuration file management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Fingerprinting settings.
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Fingerprinting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Files read at the same time by `filetrie fingerprint`.
    #[serde(default = "default_max_concurrent_files")]
    pub max_concurrent_files: usize,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_concurrent_files() -> usize {
    4
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: default_max_concurrent_files(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
        }
    }
}

impl CliConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: CliConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("FILETRIE_CONFIG_DIR") {
            return PathBuf::from(dir).join("config.toml");
        }
        Self::default_config_dir().join("config.toml")
    }

    /// Platform-specific default config directory.
    fn default_config_dir() -> PathBuf {
        #[cfg(target_os = "macos")]
        {
            dirs_fallback("Library/Application Support/filetrie")
        }
        #[cfg(target_os = "windows")]
        {
            dirs_fallback("filetrie")
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            dirs_fallback(".config/filetrie")
        }
    }
}

/// Fallback home directory resolution.
fn dirs_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from(".filetrie"))
}
