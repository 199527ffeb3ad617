//! Test doubles for the ingestion pipeline.
//!
//! `MemoryWalletStore` implements the persistence gateway over plain maps
//! and `ScriptedChainClient` answers balance queries from a fixed script,
//! so the pipeline tests exercise real control flow without a database or
//! network.

#![allow(clippy::unwrap_used)]

use crate::entities::WalletOwner;
use crate::entities::token_holding::{TokenHoldingInsert, TokenHoldingRecord};
use crate::entities::wallet::{WalletInsert, WalletRecord};
use crate::gateway::{StoreError, WalletStore, WalletUpsert};
use crate::registry::TokenConfig;
use crate::rpc::{ChainClient, RpcError};
use async_trait::async_trait;
use owsync_sdk::auth::Principal;
use owsync_sdk::objects::Blockchain;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// A fixed personal principal for tests.
pub fn test_principal() -> Principal {
    Principal::personal(Uuid::from_u128(1))
}

fn now() -> time::PrimitiveDateTime {
    let now = time::OffsetDateTime::now_utc();
    time::PrimitiveDateTime::new(now.date(), now.time())
}

// ---------------------------------------------------------------------------
// MemoryWalletStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryState {
    wallets: Vec<WalletRecord>,
    holdings: Vec<TokenHoldingRecord>,
    activity: HashMap<(Uuid, Uuid), time::PrimitiveDateTime>,
    next_holding_id: i64,
}

/// In-memory [`WalletStore`] with the same uniqueness semantics as the
/// relational schema (unique identity triple, unique (user, wallet)
/// activity pair, (wallet, symbol) holdings).
#[derive(Default)]
pub struct MemoryWalletStore {
    state: Mutex<MemoryState>,
}

impl MemoryWalletStore {
    pub fn wallet_count(&self) -> usize {
        self.state.lock().unwrap().wallets.len()
    }

    pub fn holdings_count(&self) -> usize {
        self.state.lock().unwrap().holdings.len()
    }

    pub fn activity(&self, user_id: Uuid, wallet_id: Uuid) -> Option<time::PrimitiveDateTime> {
        self.state
            .lock()
            .unwrap()
            .activity
            .get(&(user_id, wallet_id))
            .copied()
    }
}

#[async_trait]
impl WalletStore for MemoryWalletStore {
    async fn find_wallet(
        &self,
        address: &str,
        provider: &str,
        blockchain: &str,
    ) -> Result<Option<WalletRecord>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .wallets
            .iter()
            .find(|w| w.address == address && w.provider == provider && w.blockchain == blockchain)
            .cloned())
    }

    async fn create_wallet(&self, wallet: WalletInsert) -> Result<WalletUpsert, StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state
            .wallets
            .iter()
            .find(|w| {
                w.address == wallet.address
                    && w.provider == wallet.provider
                    && w.blockchain == wallet.blockchain
            })
            .cloned()
        {
            return Ok(WalletUpsert {
                wallet: existing,
                created: false,
            });
        }

        let timestamp = now();
        let record = WalletRecord {
            id: Uuid::new_v4(),
            address: wallet.address,
            provider: wallet.provider,
            blockchain: wallet.blockchain,
            balance: wallet.balance,
            user_id: wallet.owner.user_id(),
            company_id: wallet.owner.company_id(),
            provider_image: wallet.provider_image,
            created_at: timestamp,
            updated_at: timestamp,
        };
        state.wallets.push(record.clone());
        Ok(WalletUpsert {
            wallet: record,
            created: true,
        })
    }

    async fn update_wallet_balance(
        &self,
        wallet_id: Uuid,
        balance: Decimal,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(wallet) = state.wallets.iter_mut().find(|w| w.id == wallet_id) {
            wallet.balance = balance;
            wallet.updated_at = now();
        }
        Ok(())
    }

    async fn replace_holdings(
        &self,
        wallet_id: Uuid,
        holdings: Vec<TokenHoldingInsert>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.holdings.retain(|h| h.wallet_id != wallet_id);
        for holding in holdings {
            state.next_holding_id += 1;
            let id = state.next_holding_id;
            state.holdings.push(TokenHoldingRecord {
                id,
                wallet_id: holding.wallet_id,
                token_name: holding.token_name,
                symbol: holding.symbol,
                balance: holding.balance,
                created_at: now(),
            });
        }
        Ok(())
    }

    async fn holdings_for_wallet(
        &self,
        wallet_id: Uuid,
    ) -> Result<Vec<TokenHoldingRecord>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut holdings: Vec<TokenHoldingRecord> = state
            .holdings
            .iter()
            .filter(|h| h.wallet_id == wallet_id)
            .cloned()
            .collect();
        holdings.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(holdings)
    }

    async fn upsert_activity(&self, user_id: Uuid, wallet_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.activity.insert((user_id, wallet_id), now());
        Ok(())
    }

    async fn wallets_for_owner(&self, owner: WalletOwner) -> Result<Vec<WalletRecord>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .wallets
            .iter()
            .filter(|w| match owner {
                WalletOwner::User(id) => w.user_id == Some(id),
                WalletOwner::Company(id) => w.company_id == Some(id),
            })
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// ScriptedChainClient
// ---------------------------------------------------------------------------

/// [`ChainClient`] answering from a fixed script.
///
/// Unknown addresses and tokens answer zero; `failing()` makes every call
/// error like an unreachable node; `with_delay` makes every call slow, for
/// exercising the per-call timeout.
pub struct ScriptedChainClient {
    chain: Blockchain,
    native: HashMap<String, Decimal>,
    tokens: HashMap<(String, String), Decimal>,
    fail: bool,
    delay: Option<std::time::Duration>,
}

impl ScriptedChainClient {
    pub fn new(chain: Blockchain) -> Self {
        Self {
            chain,
            native: HashMap::new(),
            tokens: HashMap::new(),
            fail: false,
            delay: None,
        }
    }

    pub fn with_native(mut self, address: &str, balance: Decimal) -> Self {
        self.native.insert(address.to_lowercase(), balance);
        self
    }

    pub fn with_token(mut self, contract: &str, address: &str, balance: Decimal) -> Self {
        self.tokens
            .insert((contract.to_lowercase(), address.to_lowercase()), balance);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn answer(&self, value: Decimal) -> Result<Decimal, RpcError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(RpcError::Node {
                code: -32000,
                message: "scripted failure".to_string(),
            });
        }
        Ok(value)
    }
}

#[async_trait]
impl ChainClient for ScriptedChainClient {
    fn chain(&self) -> Blockchain {
        self.chain
    }

    async fn native_balance(&self, address: &str) -> Result<Decimal, RpcError> {
        let value = self
            .native
            .get(&address.to_lowercase())
            .copied()
            .unwrap_or(Decimal::ZERO);
        self.answer(value).await
    }

    async fn token_balance(
        &self,
        token: &TokenConfig,
        address: &str,
    ) -> Result<Decimal, RpcError> {
        let contract = token.address.unwrap_or_default().to_lowercase();
        let value = self
            .tokens
            .get(&(contract, address.to_lowercase()))
            .copied()
            .unwrap_or(Decimal::ZERO);
        self.answer(value).await
    }
}
