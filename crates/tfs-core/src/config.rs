//! Shell configuration.
//!
//! Loaded from a TOML file; every field has a default so a partial or
//! missing file is fine. Command-line flags override file values.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tfs_logging::LogConfig;
use tfs_types::{Result, TfsError};

/// Where the node cache lives between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// In memory only; discarded at exit.
    #[default]
    Memory,
    /// Loaded from and saved to `cache_file`.
    Persisted,
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheMode::Memory => write!(f, "memory"),
            CacheMode::Persisted => write!(f, "persisted"),
        }
    }
}

impl FromStr for CacheMode {
    type Err = TfsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "rt" => Ok(CacheMode::Memory),
            "persisted" | "lazy" => Ok(CacheMode::Persisted),
            other => Err(TfsError::InvalidArgument(format!("unknown cache mode {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfsConfig {
    /// Base URL of the DBE server.
    #[serde(default = "default_server")]
    pub server: String,

    /// Host name sent with every hook call.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub mode: CacheMode,

    /// Cache file used in [`CacheMode::Persisted`].
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    /// Top-level names created at startup.
    #[serde(default = "default_mounts")]
    pub mounts: Vec<String>,

    /// Per-request timeout for the HTTP binding.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_server() -> String {
    "http://127.0.0.1:8888".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("/tmp/tfs.cache")
}

fn default_mounts() -> Vec<String> {
    ["master", "base", "ccubase", "Co_1"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for TfsConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            host: default_host(),
            mode: CacheMode::default(),
            cache_file: default_cache_file(),
            mounts: default_mounts(),
            request_timeout_secs: default_request_timeout_secs(),
            log: LogConfig::default(),
        }
    }
}

impl TfsConfig {
    /// Read a TOML config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)
            .map_err(|e| TfsError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| TfsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(TfsError::Config("host must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(TfsError::Config("request_timeout_secs must be positive".to_string()));
        }
        for mount in &self.mounts {
            crate::path::validate_name(mount)
                .map_err(|_| TfsError::Config(format!("invalid mount name {:?}", mount)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TfsConfig::default();
        assert_eq!(config.server, "http://127.0.0.1:8888");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.mode, CacheMode::Memory);
        assert_eq!(config.cache_file, PathBuf::from("/tmp/tfs.cache"));
        assert_eq!(config.mounts, vec!["master", "base", "ccubase", "Co_1"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = TfsConfig::from_toml(
            r#"
            host = "db01"
            mode = "persisted"
            mounts = ["master"]

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.host, "db01");
        assert_eq!(config.mode, CacheMode::Persisted);
        assert_eq!(config.mounts, vec!["master"]);
        assert_eq!(config.server, "http://127.0.0.1:8888");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.file_prefix, "tfs");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(TfsConfig::from_toml("host = ["), Err(TfsError::Config(_))));
        assert!(matches!(TfsConfig::from_toml("mounts = [\"a/b\"]"), Err(TfsError::Config(_))));
        assert!(matches!(
            TfsConfig::from_toml("request_timeout_secs = 0"),
            Err(TfsError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TfsConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.host, "localhost");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tfs.toml");
        std::fs::write(&path, "server = \"http://dbe:9000\"\n").unwrap();
        let config = TfsConfig::load(&path).unwrap();
        assert_eq!(config.server, "http://dbe:9000");
    }

    #[test]
    fn test_cache_mode_parse() {
        assert_eq!("memory".parse::<CacheMode>().unwrap(), CacheMode::Memory);
        assert_eq!("Persisted".parse::<CacheMode>().unwrap(), CacheMode::Persisted);
        assert_eq!("lazy".parse::<CacheMode>().unwrap(), CacheMode::Persisted);
        assert!("disk".parse::<CacheMode>().is_err());
        assert_eq!(CacheMode::Persisted.to_string(), "persisted");
    }
}
