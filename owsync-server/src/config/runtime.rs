//! Validated runtime configuration.
//!
//! Built from the TOML file config, with durations and endpoint overrides
//! converted into the types the core pipeline expects.

use crate::config::file::FileConfig;
use owsync_core::config::{RpcEndpointOverride, SyncConfig};
use owsync_core::rpc::ChainClientSet;
use std::net::SocketAddr;

/// The configuration the server actually runs with.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub listen: SocketAddr,
    pub sync: SyncConfig,
    pub rpc_overrides: Vec<RpcEndpointOverride>,
}

impl From<FileConfig> for RuntimeConfig {
    fn from(file: FileConfig) -> Self {
        let sync = SyncConfig {
            rpc_timeout: std::time::Duration::from_secs(file.sync.rpc_timeout_secs),
            max_concurrent_wallets: file.sync.max_concurrent_wallets,
            max_concurrent_tokens: file.sync.max_concurrent_tokens,
            refresh_if_older_than: file
                .sync
                .refresh_if_older_than_secs
                .map(|secs| time::Duration::seconds(secs as i64)),
        };
        let rpc_overrides = file
            .rpc
            .into_iter()
            .map(|section| RpcEndpointOverride {
                blockchain: section.blockchain,
                url: section.url,
            })
            .collect();
        Self {
            listen: file.server.listen,
            sync,
            rpc_overrides,
        }
    }
}

impl RuntimeConfig {
    /// Build one RPC client per registry chain from this configuration.
    ///
    /// The shared HTTP client carries the per-call timeout as a transport
    /// bound as well, so a hung connection cannot outlive the sync deadline
    /// by much.
    pub fn build_chain_clients(&self) -> Result<ChainClientSet, url::ParseError> {
        let http = reqwest::Client::builder()
            .timeout(self.sync.rpc_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        ChainClientSet::from_registry(http, &self.rpc_overrides)
    }
}
