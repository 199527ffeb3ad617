//! TOML file configuration structures.
//!
//! These structs directly map to the `owsync-config.toml` file format.

use owsync_sdk::objects::Blockchain;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub sync: SyncSection,
    /// Per-chain RPC endpoint overrides.
    #[serde(default)]
    pub rpc: Vec<RpcSection>,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Ingestion tuning section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    /// Per-RPC-call timeout in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
    /// Concurrent wallet syncs per ingestion batch.
    #[serde(default = "default_max_concurrent_wallets")]
    pub max_concurrent_wallets: usize,
    /// Concurrent token queries per wallet.
    #[serde(default = "default_max_concurrent_tokens")]
    pub max_concurrent_tokens: usize,
    /// When set, wallets older than this many seconds are re-fetched on
    /// resync. When absent, stored balances win (first write wins).
    #[serde(default)]
    pub refresh_if_older_than_secs: Option<u64>,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            rpc_timeout_secs: default_rpc_timeout_secs(),
            max_concurrent_wallets: default_max_concurrent_wallets(),
            max_concurrent_tokens: default_max_concurrent_tokens(),
            refresh_if_older_than_secs: None,
        }
    }
}

fn default_rpc_timeout_secs() -> u64 {
    15
}

fn default_max_concurrent_wallets() -> usize {
    4
}

fn default_max_concurrent_tokens() -> usize {
    4
}

/// One RPC endpoint override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSection {
    pub blockchain: Blockchain,
    pub url: Url,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[sync]
rpc_timeout_secs = 5
max_concurrent_wallets = 8
refresh_if_older_than_secs = 600

[[rpc]]
blockchain = "ethereum"
url = "https://eth.example.com/rpc"

[[rpc]]
blockchain = "polygon"
url = "https://polygon.example.com/rpc"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.sync.rpc_timeout_secs, 5);
        assert_eq!(config.sync.max_concurrent_wallets, 8);
        // Unspecified fields take their defaults.
        assert_eq!(config.sync.max_concurrent_tokens, 4);
        assert_eq!(config.sync.refresh_if_older_than_secs, Some(600));
        assert_eq!(config.rpc.len(), 2);
        assert_eq!(config.rpc[0].blockchain, Blockchain::Ethereum);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.sync.rpc_timeout_secs, 15);
        assert_eq!(config.sync.refresh_if_older_than_secs, None);
        assert!(config.rpc.is_empty());
    }
}
