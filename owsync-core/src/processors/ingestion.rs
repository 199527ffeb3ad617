//! Wallet ingestion orchestration.
//!
//! The ingestion service is responsible for:
//! - Treating every connection in a batch as an independent unit of work
//! - Fanning the batch out over a bounded number of concurrent syncs and
//!   joining all of them before answering (fan-out/fan-in barrier)
//! - Converting non-fatal per-item failures into structured skip entries
//!   instead of failing the batch
//!
//! Only a persistence failure aborts the whole batch; a user connecting
//! five wallets where one chain node is down still sees balances for the
//! other four. Output ordering is not guaranteed to match input ordering.

use crate::config::SyncConfig;
use crate::entities::WalletOwner;
use crate::gateway::{StoreError, WalletStore};
use crate::processors::balance_sync::{BalanceSync, SyncError, SyncOutcome, SyncedWallet};
use crate::rpc::ChainClientSet;
use futures_util::stream::{self, StreamExt};
use owsync_sdk::auth::Principal;
use owsync_sdk::objects::{Blockchain, WalletConnection};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Why a connection was dropped from the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The named chain has no registry entry.
    UnsupportedChain(String),
    /// The chain node failed or timed out.
    RpcFailure(String),
    /// The connection tuple is missing required fields.
    InvalidConnection,
    /// The chain is supported but misconfigured (no tokens, no client).
    ChainMisconfigured(Blockchain),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnsupportedChain(name) => write!(f, "unsupported chain: {name}"),
            SkipReason::RpcFailure(message) => write!(f, "chain node unavailable: {message}"),
            SkipReason::InvalidConnection => write!(f, "missing required wallet fields"),
            SkipReason::ChainMisconfigured(chain) => write!(f, "chain {chain} is misconfigured"),
        }
    }
}

/// One connection that was dropped, with the reason why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedConnection {
    pub address: String,
    pub reason: SkipReason,
}

/// Aggregate result of one ingestion batch.
#[derive(Debug)]
pub struct IngestReport {
    pub synced: Vec<SyncedWallet>,
    pub skipped: Vec<SkippedConnection>,
}

/// Orchestrates wallet ingestion batches.
pub struct WalletIngestionService {
    store: Arc<dyn WalletStore>,
    clients: Arc<ChainClientSet>,
    config: SyncConfig,
}

impl WalletIngestionService {
    pub fn new(store: Arc<dyn WalletStore>, clients: Arc<ChainClientSet>, config: SyncConfig) -> Self {
        Self {
            store,
            clients,
            config,
        }
    }

    /// Swap the client set and tuning, e.g. after a config reload.
    pub fn with_config(&self, clients: Arc<ChainClientSet>, config: SyncConfig) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clients,
            config,
        }
    }

    /// Ingest a batch of wallet connections for one principal.
    ///
    /// Returns once every connection has settled. Per-item failures are
    /// reported in [`IngestReport::skipped`]; only storage failures abort
    /// the batch.
    pub async fn ingest(
        &self,
        principal: Principal,
        connections: Vec<WalletConnection>,
    ) -> Result<IngestReport, StoreError> {
        let batch_size = connections.len();
        let concurrency = self.config.max_concurrent_wallets.max(1);
        let sync = BalanceSync::new(self.store.as_ref(), &self.clients, &self.config);

        let results: Vec<(String, Result<SyncedWallet, SyncError>)> =
            stream::iter(connections.into_iter().map(|connection| {
                let sync = &sync;
                async move {
                    let address = connection.address.clone();
                    let result = sync.sync_connection(&principal, &connection).await;
                    (address, result)
                }
            }))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut synced = Vec::new();
        let mut skipped = Vec::new();
        for (address, result) in results {
            let error = match result {
                Ok(wallet) => {
                    synced.push(wallet);
                    continue;
                }
                Err(error) => error,
            };
            let reason = match error {
                SyncError::Store(store_error) => {
                    error!(error = %store_error, "persistence failure aborts the batch");
                    return Err(store_error);
                }
                SyncError::UnsupportedChain(unsupported) => {
                    SkipReason::UnsupportedChain(unsupported.0)
                }
                SyncError::IncompleteConnection => SkipReason::InvalidConnection,
                SyncError::NoTokensConfigured(chain) => SkipReason::ChainMisconfigured(chain),
                SyncError::MissingChainClient(chain) => SkipReason::ChainMisconfigured(chain),
                SyncError::Rpc(rpc_error) => SkipReason::RpcFailure(rpc_error.to_string()),
            };
            warn!(address = %address, reason = %reason, "skipping wallet connection");
            skipped.push(SkippedConnection { address, reason });
        }

        info!(
            batch = batch_size,
            synced = synced.len(),
            skipped = skipped.len(),
            "ingestion batch settled"
        );
        Ok(IngestReport { synced, skipped })
    }

    /// Load the principal's saved wallets with their holdings.
    pub async fn wallets_for_principal(
        &self,
        principal: &Principal,
    ) -> Result<Vec<SyncedWallet>, StoreError> {
        let owner = WalletOwner::from_principal(principal);
        let wallets = self.store.wallets_for_owner(owner).await?;
        let mut result = Vec::with_capacity(wallets.len());
        for wallet in wallets {
            let holdings = self.store.holdings_for_wallet(wallet.id).await?;
            result.push(SyncedWallet {
                wallet,
                holdings,
                outcome: SyncOutcome::Cached,
            });
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::registry;
    use crate::test_support::{MemoryWalletStore, ScriptedChainClient, test_principal};
    use rust_decimal::Decimal;

    fn connection(address: &str, blockchain: &str) -> WalletConnection {
        WalletConnection {
            address: address.to_string(),
            provider: "MetaMask".into(),
            blockchain: blockchain.to_string(),
            provider_image: None,
        }
    }

    fn ethereum_clients() -> Arc<ChainClientSet> {
        let usdc = registry::token_by_symbol(Blockchain::Ethereum, "USDC").unwrap();
        let mut clients = ChainClientSet::empty();
        clients.insert(Arc::new(
            ScriptedChainClient::new(Blockchain::Ethereum)
                .with_native("0xABC", Decimal::new(15, 1))
                .with_token(usdc.address.unwrap(), "0xABC", Decimal::from(250)),
        ));
        Arc::new(clients)
    }

    fn service(store: Arc<MemoryWalletStore>, clients: Arc<ChainClientSet>) -> WalletIngestionService {
        WalletIngestionService::new(store, clients, SyncConfig::default())
    }

    #[tokio::test]
    async fn test_new_wallet_syncs_native_and_token_balances() {
        let store = Arc::new(MemoryWalletStore::default());
        let service = service(Arc::clone(&store), ethereum_clients());

        let report = service
            .ingest(test_principal(), vec![connection("0xABC", "Ethereum")])
            .await
            .unwrap();

        assert_eq!(report.skipped.len(), 0);
        assert_eq!(report.synced.len(), 1);
        let synced = &report.synced[0];
        assert_eq!(synced.wallet.balance, Decimal::new(15, 1));
        assert_eq!(synced.wallet.blockchain, "ethereum");
        assert_eq!(synced.holdings.len(), 1);
        assert_eq!(synced.holdings[0].token_name, "USD Coin");
        assert_eq!(synced.holdings[0].balance, Decimal::from(250));
    }

    #[tokio::test]
    async fn test_reingesting_the_same_connection_is_idempotent() {
        let store = Arc::new(MemoryWalletStore::default());
        let service = service(Arc::clone(&store), ethereum_clients());
        let principal = test_principal();

        let first = service
            .ingest(principal, vec![connection("0xABC", "Ethereum")])
            .await
            .unwrap();
        let wallet_id = first.synced[0].wallet.id;
        let first_seen = store.activity(principal.user_id, wallet_id).unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let second = service
            .ingest(principal, vec![connection("0xABC", "Ethereum")])
            .await
            .unwrap();

        assert_eq!(second.synced.len(), 1);
        assert_eq!(second.synced[0].wallet.id, wallet_id);
        assert_eq!(store.wallet_count(), 1);
        assert_eq!(store.holdings_count(), 1);
        let last_seen = store.activity(principal.user_id, wallet_id).unwrap();
        assert!(last_seen > first_seen, "activity timestamp must advance");
    }

    #[tokio::test]
    async fn test_unsupported_chain_drops_only_its_item() {
        let store = Arc::new(MemoryWalletStore::default());
        let service = service(Arc::clone(&store), ethereum_clients());

        let report = service
            .ingest(
                test_principal(),
                vec![
                    connection("0xABC", "Ethereum"),
                    connection("0xDEF", "Dogecoin"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(report.synced.len(), 1);
        assert_eq!(report.synced[0].wallet.address, "0xABC");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].address, "0xDEF");
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::UnsupportedChain("Dogecoin".to_string())
        );
    }

    #[tokio::test]
    async fn test_failing_chain_node_drops_only_its_wallet() {
        let usdc = registry::token_by_symbol(Blockchain::Ethereum, "USDC").unwrap();
        let mut clients = ChainClientSet::empty();
        clients.insert(Arc::new(
            ScriptedChainClient::new(Blockchain::Ethereum)
                .with_native("0xABC", Decimal::ONE)
                .with_token(usdc.address.unwrap(), "0xABC", Decimal::from(40)),
        ));
        clients.insert(Arc::new(
            ScriptedChainClient::new(Blockchain::Polygon).failing(),
        ));
        let store = Arc::new(MemoryWalletStore::default());
        let service = service(Arc::clone(&store), Arc::new(clients));

        let report = service
            .ingest(
                test_principal(),
                vec![
                    connection("0xABC", "Ethereum"),
                    connection("0xABC", "Polygon"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(report.synced.len(), 1);
        assert_eq!(report.synced[0].wallet.blockchain, "ethereum");
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::RpcFailure(_)
        ));
        assert_eq!(store.wallet_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_connections_in_one_batch_create_one_wallet() {
        let store = Arc::new(MemoryWalletStore::default());
        let service = service(Arc::clone(&store), ethereum_clients());

        let report = service
            .ingest(
                test_principal(),
                vec![
                    connection("0xABC", "Ethereum"),
                    connection("0xABC", "Ethereum"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(report.synced.len(), 2);
        assert_eq!(report.skipped.len(), 0);
        assert_eq!(store.wallet_count(), 1);
        assert_eq!(
            report.synced[0].wallet.id, report.synced[1].wallet.id,
            "both items must resolve to the surviving row"
        );
    }

    #[tokio::test]
    async fn test_business_principal_attaches_wallets_to_the_company() {
        let store = Arc::new(MemoryWalletStore::default());
        let service = service(Arc::clone(&store), ethereum_clients());
        let user_id = uuid::Uuid::new_v4();
        let company_id = uuid::Uuid::new_v4();
        let principal = owsync_sdk::auth::Principal::business(user_id, company_id);

        let report = service
            .ingest(principal, vec![connection("0xABC", "Ethereum")])
            .await
            .unwrap();

        let wallet = &report.synced[0].wallet;
        assert_eq!(wallet.company_id, Some(company_id));
        assert_eq!(wallet.user_id, None);
        // Activity still tracks the acting user, not the company.
        assert!(store.activity(user_id, wallet.id).is_some());

        let listed = service.wallets_for_principal(&principal).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].wallet.id, wallet.id);
    }

    #[tokio::test]
    async fn test_sepolia_syncs_with_native_balance_only() {
        let mut clients = ChainClientSet::empty();
        clients.insert(Arc::new(
            ScriptedChainClient::new(Blockchain::Sepolia).with_native("0xABC", Decimal::new(7, 2)),
        ));
        let store = Arc::new(MemoryWalletStore::default());
        let service = service(Arc::clone(&store), Arc::new(clients));

        let report = service
            .ingest(test_principal(), vec![connection("0xABC", "Sepolia")])
            .await
            .unwrap();

        assert_eq!(report.synced.len(), 1);
        assert_eq!(report.synced[0].wallet.balance, Decimal::new(7, 2));
        assert!(report.synced[0].holdings.is_empty());
    }
}
