//! Chain RPC clients.
//!
//! The only part of the system that performs network I/O. Each chain family
//! implements [`ChainClient`]; [`ChainClientSet`] holds one client per
//! supported chain so the sync pipeline can dispatch by registry key.

pub mod evm;
pub mod units;

use crate::config::RpcEndpointOverride;
use crate::registry::{self, TokenConfig};
use async_trait::async_trait;
use owsync_sdk::objects::Blockchain;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors that can occur while reading balances from a chain node.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Transport failure (connect, TLS, read, HTTP status).
    #[error("RPC request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The node answered, but not with anything usable.
    #[error("RPC response parsing error: {0}")]
    Parse(String),

    /// The node returned a JSON-RPC error object.
    #[error("RPC node error {code}: {message}")]
    Node { code: i64, message: String },

    /// The queried account address is not a valid EVM address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The call did not complete within the configured deadline.
    #[error("RPC call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Read-only balance queries against one chain.
///
/// One implementation per chain family; adding a non-EVM chain means
/// implementing this fixed capability set, not branching in the sync code.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The chain this client talks to.
    fn chain(&self) -> Blockchain;

    /// Balance of the chain's intrinsic currency, in human units.
    async fn native_balance(&self, address: &str) -> Result<Decimal, RpcError>;

    /// ERC-20 `balanceOf` converted through the token's decimals.
    async fn token_balance(&self, token: &TokenConfig, address: &str)
    -> Result<Decimal, RpcError>;
}

/// One [`ChainClient`] per supported chain.
pub struct ChainClientSet {
    clients: HashMap<Blockchain, Arc<dyn ChainClient>>,
}

impl ChainClientSet {
    /// Build clients for every registry chain.
    ///
    /// Endpoints default to the registry's public RPC URLs; `overrides`
    /// replace them per chain. The `http` client (and its timeout settings)
    /// is shared across all chains.
    pub fn from_registry(
        http: reqwest::Client,
        overrides: &[RpcEndpointOverride],
    ) -> Result<Self, url::ParseError> {
        let mut clients: HashMap<Blockchain, Arc<dyn ChainClient>> = HashMap::new();
        for chain in Blockchain::ALL {
            let endpoint = match overrides.iter().find(|o| o.blockchain == chain) {
                Some(o) => o.url.clone(),
                None => Url::parse(registry::chain_config(chain).rpc_url)?,
            };
            clients.insert(
                chain,
                Arc::new(evm::EvmChainClient::new(chain, endpoint, http.clone())),
            );
        }
        Ok(Self { clients })
    }

    /// An empty set, populated via [`ChainClientSet::insert`].
    pub fn empty() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Register (or replace) the client for its chain.
    pub fn insert(&mut self, client: Arc<dyn ChainClient>) {
        self.clients.insert(client.chain(), client);
    }

    /// The client for `chain`, if one is configured.
    pub fn client(&self, chain: Blockchain) -> Option<Arc<dyn ChainClient>> {
        self.clients.get(&chain).cloned()
    }
}
