//! Balance synchronization for a single wallet connection.
//!
//! The sync routine is responsible for:
//! - Resolving the connection's chain name against the registry
//! - Fetching the native balance and every configured token balance
//!   through the chain client, each under a per-call timeout
//! - Reconciling the results into durable wallet / holding / activity rows
//!
//! Wallet rows are created at most once per (address, provider, chain)
//! triple. What happens on a later sighting is governed by the
//! `refresh_if_older_than` policy in [`SyncConfig`].

use crate::config::SyncConfig;
use crate::entities::WalletOwner;
use crate::entities::token_holding::{TokenHoldingInsert, TokenHoldingRecord};
use crate::entities::wallet::{WalletInsert, WalletRecord};
use crate::gateway::{StoreError, WalletStore};
use crate::registry::{self, TokenConfig};
use crate::rpc::{ChainClient, ChainClientSet, RpcError};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use owsync_sdk::auth::Principal;
use owsync_sdk::objects::{Blockchain, UnsupportedChain, WalletConnection};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while syncing one wallet connection.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The connection names a chain the registry does not know.
    #[error(transparent)]
    UnsupportedChain(#[from] UnsupportedChain),

    /// Address, provider or blockchain is missing from the connection.
    #[error("missing required wallet fields")]
    IncompleteConnection,

    /// A chain that is not native-only has no tokens configured.
    #[error("no tokens configured for chain {0}")]
    NoTokensConfigured(Blockchain),

    /// No RPC client was built for the chain.
    #[error("no RPC client configured for chain {0}")]
    MissingChainClient(Blockchain),

    /// RPC failure (network, timeout, malformed node response).
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Persistence failure; unlike the variants above this is batch-fatal.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How a synced wallet's data was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The wallet row was created by this sync.
    Created,
    /// The wallet existed and its balance/holdings were re-fetched.
    Refreshed,
    /// The wallet existed and stored data was served unchanged.
    Cached,
}

/// One successfully synchronized wallet with its current holding set.
#[derive(Debug, Clone)]
pub struct SyncedWallet {
    pub wallet: WalletRecord,
    pub holdings: Vec<TokenHoldingRecord>,
    pub outcome: SyncOutcome,
}

/// Sync routine for one wallet connection.
pub struct BalanceSync<'a> {
    store: &'a dyn WalletStore,
    clients: &'a ChainClientSet,
    config: &'a SyncConfig,
}

impl<'a> BalanceSync<'a> {
    pub fn new(
        store: &'a dyn WalletStore,
        clients: &'a ChainClientSet,
        config: &'a SyncConfig,
    ) -> Self {
        Self {
            store,
            clients,
            config,
        }
    }

    /// Synchronize one wallet connection for the given principal.
    pub async fn sync_connection(
        &self,
        principal: &Principal,
        connection: &WalletConnection,
    ) -> Result<SyncedWallet, SyncError> {
        validate_connection(connection)?;

        let chain = Blockchain::from_name(&connection.blockchain)?;
        ensure_tokens_configured(chain)?;
        let client = self
            .clients
            .client(chain)
            .ok_or(SyncError::MissingChainClient(chain))?;

        if let Some(existing) = self
            .store
            .find_wallet(&connection.address, connection.provider.as_str(), chain.key())
            .await?
        {
            return self.sync_existing(principal, connection, chain, &client, existing).await;
        }

        self.sync_new(principal, connection, chain, &client).await
    }

    /// A wallet row already exists for this identity triple.
    ///
    /// Without a refresh policy the stored balance and holdings win; with
    /// one, a row older than the configured age is re-fetched in place.
    async fn sync_existing(
        &self,
        principal: &Principal,
        connection: &WalletConnection,
        chain: Blockchain,
        client: &Arc<dyn ChainClient>,
        existing: WalletRecord,
    ) -> Result<SyncedWallet, SyncError> {
        if !self.should_refresh(&existing) {
            debug!(address = %existing.address, chain = %chain, "serving cached wallet");
            let holdings = self.store.holdings_for_wallet(existing.id).await?;
            self.store
                .upsert_activity(principal.user_id, existing.id)
                .await?;
            return Ok(SyncedWallet {
                wallet: existing,
                holdings,
                outcome: SyncOutcome::Cached,
            });
        }

        let balance = self.fetch_native(client, &connection.address).await?;
        let token_balances = self
            .fetch_token_balances(client, chain, &connection.address)
            .await?;

        self.store
            .update_wallet_balance(existing.id, balance)
            .await?;
        self.store
            .replace_holdings(existing.id, to_holding_inserts(existing.id, token_balances))
            .await?;
        self.store
            .upsert_activity(principal.user_id, existing.id)
            .await?;
        debug!(address = %existing.address, chain = %chain, %balance, "refreshed stale wallet");

        let wallet = match self
            .store
            .find_wallet(
                &existing.address,
                existing.provider.as_str(),
                existing.blockchain.as_str(),
            )
            .await?
        {
            Some(updated) => updated,
            None => WalletRecord {
                balance,
                ..existing
            },
        };
        let holdings = self.store.holdings_for_wallet(wallet.id).await?;
        Ok(SyncedWallet {
            wallet,
            holdings,
            outcome: SyncOutcome::Refreshed,
        })
    }

    /// First sighting of this identity triple.
    async fn sync_new(
        &self,
        principal: &Principal,
        connection: &WalletConnection,
        chain: Blockchain,
        client: &Arc<dyn ChainClient>,
    ) -> Result<SyncedWallet, SyncError> {
        let balance = self.fetch_native(client, &connection.address).await?;

        let upsert = self
            .store
            .create_wallet(WalletInsert {
                address: connection.address.clone(),
                provider: connection.provider.clone(),
                blockchain: chain.key().into(),
                balance,
                owner: WalletOwner::from_principal(principal),
                provider_image: connection.provider_image.clone(),
            })
            .await?;

        // Token holdings are only fetched for the row this call created;
        // a lost creation race means another worker owns the fetch.
        if upsert.created {
            let token_balances = self
                .fetch_token_balances(client, chain, &connection.address)
                .await?;
            debug!(
                address = %connection.address,
                chain = %chain,
                %balance,
                holdings = token_balances.len(),
                "created wallet"
            );
            self.store
                .replace_holdings(
                    upsert.wallet.id,
                    to_holding_inserts(upsert.wallet.id, token_balances),
                )
                .await?;
        }

        let holdings = self.store.holdings_for_wallet(upsert.wallet.id).await?;
        self.store
            .upsert_activity(principal.user_id, upsert.wallet.id)
            .await?;
        Ok(SyncedWallet {
            wallet: upsert.wallet,
            holdings,
            outcome: if upsert.created {
                SyncOutcome::Created
            } else {
                SyncOutcome::Cached
            },
        })
    }

    fn should_refresh(&self, wallet: &WalletRecord) -> bool {
        let Some(max_age) = self.config.refresh_if_older_than else {
            return false;
        };
        let now = time::OffsetDateTime::now_utc();
        let now = time::PrimitiveDateTime::new(now.date(), now.time());
        now - wallet.updated_at >= max_age
    }

    async fn fetch_native(
        &self,
        client: &Arc<dyn ChainClient>,
        address: &str,
    ) -> Result<Decimal, SyncError> {
        let balance =
            with_timeout(self.config.rpc_timeout, client.native_balance(address)).await?;
        Ok(balance)
    }

    /// Query every configured ERC-20 balance with bounded concurrency and
    /// keep only the strictly positive ones.
    async fn fetch_token_balances(
        &self,
        client: &Arc<dyn ChainClient>,
        chain: Blockchain,
        address: &str,
    ) -> Result<Vec<(&'static TokenConfig, Decimal)>, SyncError> {
        let concurrency = self.config.max_concurrent_tokens.max(1);
        let timeout = self.config.rpc_timeout;

        let balances: Vec<(&'static TokenConfig, Decimal)> =
            stream::iter(registry::erc20_tokens(chain).map(|token| {
                let client = Arc::clone(client);
                async move {
                    let balance = with_timeout(timeout, client.token_balance(token, address)).await?;
                    Ok::<_, SyncError>((token, balance))
                }
            }))
            .buffer_unordered(concurrency)
            .try_collect()
            .await?;

        Ok(balances
            .into_iter()
            .filter(|(_, balance)| *balance > Decimal::ZERO)
            .collect())
    }
}

fn to_holding_inserts(
    wallet_id: uuid::Uuid,
    token_balances: Vec<(&'static TokenConfig, Decimal)>,
) -> Vec<TokenHoldingInsert> {
    token_balances
        .into_iter()
        .map(|(token, balance)| TokenHoldingInsert {
            wallet_id,
            token_name: token.name.to_string(),
            symbol: token.symbol.into(),
            balance,
        })
        .collect()
}

fn validate_connection(connection: &WalletConnection) -> Result<(), SyncError> {
    if connection.address.trim().is_empty()
        || connection.provider.trim().is_empty()
        || connection.blockchain.trim().is_empty()
    {
        return Err(SyncError::IncompleteConnection);
    }
    Ok(())
}

/// A chain with zero ERC-20 tokens is a registry mistake unless the chain
/// is explicitly native-only (test networks).
fn ensure_tokens_configured(chain: Blockchain) -> Result<(), SyncError> {
    let config = registry::chain_config(chain);
    if !config.native_only && registry::erc20_tokens(chain).next().is_none() {
        return Err(SyncError::NoTokensConfigured(chain));
    }
    Ok(())
}

async fn with_timeout<T>(
    limit: std::time::Duration,
    fut: impl Future<Output = Result<T, RpcError>>,
) -> Result<T, RpcError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(RpcError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::test_support::{MemoryWalletStore, ScriptedChainClient, test_principal};
    use owsync_sdk::objects::Blockchain;

    fn connection(address: &str, blockchain: &str) -> WalletConnection {
        WalletConnection {
            address: address.to_string(),
            provider: "MetaMask".into(),
            blockchain: blockchain.to_string(),
            provider_image: None,
        }
    }

    fn client_set(client: ScriptedChainClient) -> ChainClientSet {
        let mut clients = ChainClientSet::empty();
        clients.insert(Arc::new(client));
        clients
    }

    #[tokio::test]
    async fn test_unsupported_chain_is_an_error_not_a_panic() {
        let store = MemoryWalletStore::default();
        let clients = ChainClientSet::empty();
        let config = SyncConfig::default();
        let sync = BalanceSync::new(&store, &clients, &config);

        let result = sync
            .sync_connection(&test_principal(), &connection("0xABC", "Dogecoin"))
            .await;
        assert!(matches!(result, Err(SyncError::UnsupportedChain(_))));
        assert_eq!(store.wallet_count(), 0);
    }

    #[tokio::test]
    async fn test_incomplete_connection_is_rejected() {
        let store = MemoryWalletStore::default();
        let clients = ChainClientSet::empty();
        let config = SyncConfig::default();
        let sync = BalanceSync::new(&store, &clients, &config);

        let result = sync
            .sync_connection(&test_principal(), &connection("", "Ethereum"))
            .await;
        assert!(matches!(result, Err(SyncError::IncompleteConnection)));
    }

    #[tokio::test]
    async fn test_zero_token_balances_produce_no_holdings() {
        let usdc = registry::token_by_symbol(Blockchain::Ethereum, "USDC").unwrap();
        let store = MemoryWalletStore::default();
        let clients = client_set(
            ScriptedChainClient::new(Blockchain::Ethereum)
                .with_native("0xABC", Decimal::ONE)
                // Smallest representable USDC unit; everything else stays 0.
                .with_token(usdc.address.unwrap(), "0xABC", Decimal::new(1, 6)),
        );
        let config = SyncConfig::default();
        let sync = BalanceSync::new(&store, &clients, &config);

        let synced = sync
            .sync_connection(&test_principal(), &connection("0xABC", "Ethereum"))
            .await
            .unwrap();

        assert_eq!(synced.outcome, SyncOutcome::Created);
        assert_eq!(synced.holdings.len(), 1);
        assert_eq!(synced.holdings[0].symbol, "USDC");
        assert_eq!(synced.holdings[0].balance, Decimal::new(1, 6));
    }

    #[tokio::test]
    async fn test_rpc_timeout_surfaces_as_rpc_error() {
        let store = MemoryWalletStore::default();
        let clients = client_set(
            ScriptedChainClient::new(Blockchain::Ethereum)
                .with_native("0xABC", Decimal::ONE)
                .with_delay(std::time::Duration::from_secs(60)),
        );
        let config = SyncConfig {
            rpc_timeout: std::time::Duration::from_millis(20),
            ..SyncConfig::default()
        };
        let sync = BalanceSync::new(&store, &clients, &config);

        let result = sync
            .sync_connection(&test_principal(), &connection("0xABC", "Ethereum"))
            .await;
        assert!(matches!(
            result,
            Err(SyncError::Rpc(RpcError::Timeout(_)))
        ));
        assert_eq!(store.wallet_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_policy_replaces_stale_balance_and_holdings() {
        let usdc = registry::token_by_symbol(Blockchain::Ethereum, "USDC").unwrap();
        let store = MemoryWalletStore::default();
        let principal = test_principal();

        let first_clients = client_set(
            ScriptedChainClient::new(Blockchain::Ethereum)
                .with_native("0xABC", Decimal::ONE)
                .with_token(usdc.address.unwrap(), "0xABC", Decimal::from(100)),
        );
        let no_refresh = SyncConfig::default();
        let sync = BalanceSync::new(&store, &first_clients, &no_refresh);
        let created = sync
            .sync_connection(&principal, &connection("0xABC", "Ethereum"))
            .await
            .unwrap();
        assert_eq!(created.outcome, SyncOutcome::Created);

        // On-chain state moves; without a refresh policy the cache wins.
        let second_clients = client_set(
            ScriptedChainClient::new(Blockchain::Ethereum)
                .with_native("0xABC", Decimal::from(2))
                .with_token(usdc.address.unwrap(), "0xABC", Decimal::from(7)),
        );
        let sync = BalanceSync::new(&store, &second_clients, &no_refresh);
        let cached = sync
            .sync_connection(&principal, &connection("0xABC", "Ethereum"))
            .await
            .unwrap();
        assert_eq!(cached.outcome, SyncOutcome::Cached);
        assert_eq!(cached.wallet.balance, Decimal::ONE);
        assert_eq!(cached.holdings[0].balance, Decimal::from(100));

        // An always-stale policy re-fetches in place.
        let refresh_always = SyncConfig {
            refresh_if_older_than: Some(time::Duration::ZERO),
            ..SyncConfig::default()
        };
        let sync = BalanceSync::new(&store, &second_clients, &refresh_always);
        let refreshed = sync
            .sync_connection(&principal, &connection("0xABC", "Ethereum"))
            .await
            .unwrap();
        assert_eq!(refreshed.outcome, SyncOutcome::Refreshed);
        assert_eq!(refreshed.wallet.id, created.wallet.id);
        assert_eq!(refreshed.wallet.balance, Decimal::from(2));
        assert_eq!(refreshed.holdings.len(), 1);
        assert_eq!(refreshed.holdings[0].balance, Decimal::from(7));
        assert_eq!(store.wallet_count(), 1);
    }
}
