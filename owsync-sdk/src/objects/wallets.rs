//! Wallet API request and response types.
//!
//! These types are exchanged between the wallet-integration frontend and
//! the owsync server when a user connects wallets and when their saved
//! wallets are listed.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One wallet connection as reported by the browser-side wallet integration.
///
/// `blockchain` is the free-form chain name the wallet provider reports
/// ("Ethereum", "BNB Chain", …); the server normalizes it against the chain
/// registry and rejects unsupported chains per item, not per batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnection {
    pub address: String,
    pub provider: CompactString,
    pub blockchain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_image: Option<String>,
}

/// Request body for `POST /wallets/connect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectWalletsRequest {
    pub wallets: Vec<WalletConnection>,
}

/// A single token holding inside a [`WalletData`] response entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceData {
    /// Token display name, e.g. "USD Coin".
    pub token_name: String,
    /// Human-readable amount, already adjusted for token decimals.
    pub balance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// One synchronized wallet with its current holding set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletData {
    pub id: Uuid,
    pub address: String,
    /// Registry key of the chain ("ethereum", "bsc", …).
    pub blockchain: CompactString,
    pub provider: CompactString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_image: Option<String>,
    /// Native balance as a decimal string.
    pub balance: String,
    /// RFC 3339 timestamp of the last balance write.
    pub updated_at: String,
    pub token_balances: Vec<TokenBalanceData>,
}

/// A wallet that was dropped from the batch, with the reason why.
///
/// Skips are non-fatal: the rest of the batch still syncs. Carrying the
/// reason keeps partial failure observable instead of silently omitting
/// the wallet from `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedWallet {
    pub address: String,
    pub reason: String,
}

/// Response body for `POST /wallets/connect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectWalletsResponse {
    pub success: bool,
    pub data: Vec<WalletData>,
    #[serde(default)]
    pub skipped: Vec<SkippedWallet>,
}

/// Response body for `GET /wallets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletsResponse {
    pub success: bool,
    pub data: Vec<WalletData>,
}
