//! Wallet API handlers.
//!
//! These endpoints are called on behalf of an authenticated user; identity
//! arrives via the headers read by
//! [`AuthenticatedPrincipal`](crate::api::extractors::AuthenticatedPrincipal).
//!
//! # Endpoints
//!
//! - `POST /wallets/connect` – ingest a batch of wallet connections
//! - `GET  /wallets`         – list the principal's wallets with holdings

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use owsync_core::gateway::StoreError;
use owsync_core::processors::SyncedWallet;
use owsync_sdk::objects::{TokenBalanceData, WalletData};
use time::format_description::well_known::Rfc3339;

use crate::state::AppState;

mod connect_wallets;
mod list_wallets;

/// Build the Wallet API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wallets/connect", post(connect_wallets::connect_wallets))
        .route("/wallets", get(list_wallets::list_wallets))
}

/// Convert a synced wallet (DB model) into a `WalletData` (API model).
fn to_wallet_data(synced: &SyncedWallet) -> WalletData {
    let wallet = &synced.wallet;
    WalletData {
        id: wallet.id,
        address: wallet.address.clone(),
        blockchain: wallet.blockchain.clone(),
        provider: wallet.provider.clone(),
        provider_image: wallet.provider_image.clone(),
        balance: wallet.balance.normalize().to_string(),
        updated_at: wallet
            .updated_at
            .assume_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
        token_balances: synced
            .holdings
            .iter()
            .map(|holding| TokenBalanceData {
                token_name: holding.token_name.clone(),
                balance: holding.balance.normalize().to_string(),
                icon: None,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in Wallet API handlers.
#[derive(Debug)]
enum WalletApiError {
    /// The persistence collaborator failed; the whole request fails.
    Store(StoreError),
    /// The request body carries no wallet connections.
    EmptyWalletList,
}

impl From<StoreError> for WalletApiError {
    fn from(error: StoreError) -> Self {
        WalletApiError::Store(error)
    }
}

impl IntoResponse for WalletApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            WalletApiError::Store(e) => {
                tracing::error!(error = %e, "Wallet API storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            WalletApiError::EmptyWalletList => {
                (StatusCode::BAD_REQUEST, "wallet list is empty").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use owsync_core::entities::token_holding::TokenHoldingRecord;
    use owsync_core::entities::wallet::WalletRecord;
    use owsync_core::processors::SyncOutcome;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn midnight_2025() -> time::PrimitiveDateTime {
        let date = time::Date::from_calendar_date(2025, time::Month::January, 1).unwrap();
        time::PrimitiveDateTime::new(date, time::Time::MIDNIGHT)
    }

    #[test]
    fn test_wallet_data_mapping() {
        let wallet_id = Uuid::new_v4();
        let timestamp = midnight_2025();
        let synced = SyncedWallet {
            wallet: WalletRecord {
                id: wallet_id,
                address: "0xABC".to_string(),
                provider: "MetaMask".into(),
                blockchain: "ethereum".into(),
                balance: Decimal::new(15, 1),
                user_id: Some(Uuid::new_v4()),
                company_id: None,
                provider_image: None,
                created_at: timestamp,
                updated_at: timestamp,
            },
            holdings: vec![TokenHoldingRecord {
                id: 1,
                wallet_id,
                token_name: "USD Coin".to_string(),
                symbol: "USDC".into(),
                balance: Decimal::from(250),
                created_at: timestamp,
            }],
            outcome: SyncOutcome::Cached,
        };

        let data = to_wallet_data(&synced);
        assert_eq!(data.id, wallet_id);
        assert_eq!(data.balance, "1.5");
        assert_eq!(data.updated_at, "2025-01-01T00:00:00Z");
        assert_eq!(data.token_balances.len(), 1);
        assert_eq!(data.token_balances[0].token_name, "USD Coin");
        assert_eq!(data.token_balances[0].balance, "250");
    }
}
