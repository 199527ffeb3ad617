//! Configuration module for owsync-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments, and
//! environment variables.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::RuntimeConfig;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file (a missing file falls back to defaults)
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let mut file_config: FileConfig = if self.config_path.exists() {
            let config_content = std::fs::read_to_string(&self.config_path)?;
            toml::from_str(&config_content)?
        } else {
            tracing::info!(
                path = %self.config_path.display(),
                "config file not found, using defaults"
            );
            FileConfig::default()
        };

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        self.validate(&file_config)?;

        Ok(RuntimeConfig::from(file_config))
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<RuntimeConfig, ConfigError> {
        self.load()
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.sync.rpc_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sync.rpc_timeout_secs must be at least 1".to_string(),
            ));
        }
        if config.sync.max_concurrent_wallets == 0 || config.sync.max_concurrent_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "sync concurrency limits must be at least 1".to_string(),
            ));
        }
        for (index, section) in config.rpc.iter().enumerate() {
            let duplicated = config.rpc[..index]
                .iter()
                .any(|other| other.blockchain == section.blockchain);
            if duplicated {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate rpc override for chain {}",
                    section.blockchain
                )));
            }
        }
        Ok(())
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_rpc_override_is_rejected() {
        let loader = ConfigLoader::new("unused.toml", None);
        let config: FileConfig = toml::from_str(
            r#"
[[rpc]]
blockchain = "ethereum"
url = "https://a.example.com"

[[rpc]]
blockchain = "ethereum"
url = "https://b.example.com"
"#,
        )
        .unwrap();
        assert!(matches!(
            loader.validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let loader = ConfigLoader::new("unused.toml", None);
        let config: FileConfig = toml::from_str("[sync]\nmax_concurrent_wallets = 0\n").unwrap();
        assert!(loader.validate(&config).is_err());
    }
}
