//! Session options and backend selection.
//!
//! [`ShellOptions`] are the top-level flags of the shell. They layer over the
//! config file and pick the backend the hooks are bound to: the DBE server,
//! or an in-memory tree when running offline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tfs_client::DbeBackend;
use tfs_core::{CacheMode, Session, TfsConfig};
use tfs_hooks::{HookRegistry, MemTreeDb};
use tfs_types::{Result, TfsError};

#[derive(Debug, Clone, Default, clap::Args)]
pub struct ShellOptions {
    /// Path to the shell configuration file.
    #[arg(long, env = "TFS_CONFIG", default_value = "~/.tfs/tfs.toml")]
    pub config: String,

    /// Base URL of the DBE server.
    #[arg(long, env = "TFS_SERVER")]
    pub server: Option<String>,

    /// Host name sent with every hook call.
    #[arg(long, env = "TFS_HOST")]
    pub host: Option<String>,

    /// Cache mode: memory or persisted.
    #[arg(long)]
    pub mode: Option<CacheMode>,

    /// Cache file used in persisted mode.
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Bind the hooks to an in-memory tree instead of the server.
    #[arg(long, default_value_t = false)]
    pub offline: bool,
}

impl ShellOptions {
    /// Resolve the config path, expanding `~` to the home directory.
    pub fn resolved_config_path(&self) -> PathBuf {
        let path = &self.config;
        if let Some(rest) = path.strip_prefix("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Load the config file and apply the command-line overrides.
    pub fn load_config(&self) -> Result<TfsConfig> {
        let mut config = TfsConfig::load(self.resolved_config_path())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, config: &mut TfsConfig) {
        if let Some(server) = &self.server {
            config.server = server.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(cache_file) = &self.cache_file {
            config.cache_file = cache_file.clone();
        }
    }

    /// Bind the hooks for `config`.
    pub fn hooks(&self, config: &TfsConfig) -> Result<HookRegistry> {
        if self.offline {
            let db = MemTreeDb::new();
            for mount in &config.mounts {
                db.insert(&format!("/{}", mount), std::iter::empty::<(String, String)>());
            }
            tracing::info!(mounts = config.mounts.len(), "running offline");
            return Ok(HookRegistry::bind(Arc::new(db)));
        }
        let backend = DbeBackend::new(&config.server, Duration::from_secs(config.request_timeout_secs))
            .map_err(|e| TfsError::Config(e.to_string()))?;
        tracing::info!(server = %backend.base_url(), host = %config.host, "bound to dbe server");
        Ok(HookRegistry::bind(Arc::new(backend)))
    }

    pub async fn connect(&self, config: TfsConfig) -> Result<Session> {
        let hooks = self.hooks(&config)?;
        Session::start(config, hooks).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tfs.toml");
        std::fs::write(&path, "host = \"from-file\"\nserver = \"http://dbe:1\"\n").unwrap();
        let options = ShellOptions {
            config: path.display().to_string(),
            host: Some("db01".to_string()),
            mode: Some(CacheMode::Persisted),
            ..ShellOptions::default()
        };
        let config = options.load_config().unwrap();
        assert_eq!(config.host, "db01");
        assert_eq!(config.server, "http://dbe:1");
        assert_eq!(config.mode, CacheMode::Persisted);
    }

    #[test]
    fn test_bad_server_is_config_error() {
        let options = ShellOptions::default();
        let config = TfsConfig {
            server: "dbe:8888".to_string(),
            ..TfsConfig::default()
        };
        assert!(matches!(options.hooks(&config), Err(TfsError::Config(_))));
    }

    #[tokio::test]
    async fn test_offline_session_lists_mounts() {
        let options = ShellOptions {
            offline: true,
            ..ShellOptions::default()
        };
        let config = TfsConfig {
            mounts: vec!["master".to_string(), "base".to_string()],
            ..TfsConfig::default()
        };
        let mut session = options.connect(config).await.unwrap();
        assert_eq!(session.ls(None).await.unwrap(), vec!["base", "master"]);
        assert!(session.ls(Some("/master")).await.unwrap().is_empty());
    }
}
