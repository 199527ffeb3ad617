//! Runtime tuning for the ingestion pipeline.

use owsync_sdk::objects::Blockchain;
use url::Url;

/// Limits and policies applied to every ingestion batch.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Upper bound for a single RPC call (native or token balance).
    ///
    /// A call that exceeds this surfaces as an [`crate::rpc::RpcError`] and
    /// skips only its wallet, so one unresponsive chain node cannot stall
    /// the whole batch.
    pub rpc_timeout: std::time::Duration,
    /// How many wallet connections of one batch sync concurrently.
    pub max_concurrent_wallets: usize,
    /// How many token `balanceOf` queries run concurrently per wallet.
    pub max_concurrent_tokens: usize,
    /// Stale-balance policy for wallets that already exist.
    ///
    /// `None` keeps the stored balance and holdings untouched on resync
    /// (first write wins). `Some(age)` refreshes the native balance and
    /// replaces the holding set when the stored row is older than `age`.
    pub refresh_if_older_than: Option<time::Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            rpc_timeout: std::time::Duration::from_secs(15),
            max_concurrent_wallets: 4,
            max_concurrent_tokens: 4,
            refresh_if_older_than: None,
        }
    }
}

/// A per-chain RPC endpoint override.
///
/// The registry ships public default endpoints; deployments point supported
/// chains at their own RPC providers with these.
#[derive(Debug, Clone)]
pub struct RpcEndpointOverride {
    pub blockchain: Blockchain,
    pub url: Url,
}
