//! The persistence gateway.
//!
//! [`WalletStore`] is the only surface through which the sync pipeline
//! touches durable storage: idempotent find-or-create for wallets, holding
//! replacement, and activity upserts. The relational schema behind it is an
//! external collaborator; this module only fixes the contract.

use crate::entities::WalletOwner;
use crate::entities::token_holding::{
    DeleteWalletHoldings, GetHoldingsForWallet, InsertTokenHoldings, TokenHoldingInsert,
    TokenHoldingRecord,
};
use crate::entities::wallet::{
    FindWalletByIdentity, GetWalletsForOwner, InsertWalletIfAbsent, UpdateWalletBalance,
    WalletInsert, WalletRecord,
};
use crate::entities::wallet_activity::UpsertWalletActivity;
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors from the persistence collaborator.
///
/// Unlike RPC failures these are batch-fatal: if the store is unreachable
/// there is no point syncing the remaining wallets.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of an idempotent wallet create.
#[derive(Debug, Clone)]
pub struct WalletUpsert {
    pub wallet: WalletRecord,
    /// Whether this call created the row (`false` = an equal identity
    /// triple already existed and was returned instead).
    pub created: bool,
}

/// Durable storage operations used by the sync pipeline.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Look up a wallet by its (address, provider, chain-key) identity.
    async fn find_wallet(
        &self,
        address: &str,
        provider: &str,
        blockchain: &str,
    ) -> Result<Option<WalletRecord>, StoreError>;

    /// Create a wallet, or return the existing row for its identity triple.
    ///
    /// A unique-constraint race between two concurrent creators resolves to
    /// exactly one durable row; the conflict never surfaces to callers.
    async fn create_wallet(&self, wallet: WalletInsert) -> Result<WalletUpsert, StoreError>;

    /// Refresh the stored native balance.
    async fn update_wallet_balance(
        &self,
        wallet_id: Uuid,
        balance: Decimal,
    ) -> Result<(), StoreError>;

    /// Replace the wallet's holding set.
    async fn replace_holdings(
        &self,
        wallet_id: Uuid,
        holdings: Vec<TokenHoldingInsert>,
    ) -> Result<(), StoreError>;

    /// The wallet's current holding set.
    async fn holdings_for_wallet(
        &self,
        wallet_id: Uuid,
    ) -> Result<Vec<TokenHoldingRecord>, StoreError>;

    /// Upsert the (user, wallet) last-used timestamp to now.
    async fn upsert_activity(&self, user_id: Uuid, wallet_id: Uuid) -> Result<(), StoreError>;

    /// All wallets attached to a user or company.
    async fn wallets_for_owner(&self, owner: WalletOwner) -> Result<Vec<WalletRecord>, StoreError>;
}

#[async_trait]
impl WalletStore for DatabaseProcessor {
    async fn find_wallet(
        &self,
        address: &str,
        provider: &str,
        blockchain: &str,
    ) -> Result<Option<WalletRecord>, StoreError> {
        let wallet = self
            .process(FindWalletByIdentity {
                address: address.to_string(),
                provider: provider.into(),
                blockchain: blockchain.into(),
            })
            .await?;
        Ok(wallet)
    }

    async fn create_wallet(&self, wallet: WalletInsert) -> Result<WalletUpsert, StoreError> {
        let identity = FindWalletByIdentity {
            address: wallet.address.clone(),
            provider: wallet.provider.clone(),
            blockchain: wallet.blockchain.clone(),
        };

        if let Some(created) = self.process(InsertWalletIfAbsent { wallet }).await? {
            return Ok(WalletUpsert {
                wallet: created,
                created: true,
            });
        }

        // Lost the insert race; the winner's row must exist now.
        let existing = self.process(identity).await?;
        existing
            .map(|wallet| WalletUpsert {
                wallet,
                created: false,
            })
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_wallet_balance(
        &self,
        wallet_id: Uuid,
        balance: Decimal,
    ) -> Result<(), StoreError> {
        self.process(UpdateWalletBalance { wallet_id, balance }).await?;
        Ok(())
    }

    async fn replace_holdings(
        &self,
        wallet_id: Uuid,
        holdings: Vec<TokenHoldingInsert>,
    ) -> Result<(), StoreError> {
        self.process(DeleteWalletHoldings { wallet_id }).await?;
        self.process(InsertTokenHoldings { holdings }).await?;
        Ok(())
    }

    async fn holdings_for_wallet(
        &self,
        wallet_id: Uuid,
    ) -> Result<Vec<TokenHoldingRecord>, StoreError> {
        let holdings = self.process(GetHoldingsForWallet { wallet_id }).await?;
        Ok(holdings)
    }

    async fn upsert_activity(&self, user_id: Uuid, wallet_id: Uuid) -> Result<(), StoreError> {
        self.process(UpsertWalletActivity { user_id, wallet_id }).await?;
        Ok(())
    }

    async fn wallets_for_owner(&self, owner: WalletOwner) -> Result<Vec<WalletRecord>, StoreError> {
        let wallets = self.process(GetWalletsForOwner { owner }).await?;
        Ok(wallets)
    }
}
