use axum::{Json, extract::State, response::IntoResponse};
use owsync_sdk::objects::{ConnectWalletsRequest, ConnectWalletsResponse, SkippedWallet};

use super::{WalletApiError, to_wallet_data};
use crate::api::extractors::AuthenticatedPrincipal;
use crate::state::AppState;

/// `POST /wallets/connect` — ingest a batch of wallet connections.
///
/// Connections sync concurrently; the response carries every wallet that
/// could be synchronized plus a structured `skipped` list for the rest.
/// Result ordering is not guaranteed to match the request.
pub(super) async fn connect_wallets(
    state: State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Json(request): Json<ConnectWalletsRequest>,
) -> Result<impl IntoResponse, WalletApiError> {
    if request.wallets.is_empty() {
        return Err(WalletApiError::EmptyWalletList);
    }

    let ingestion = state.ingestion().await;
    let report = ingestion.ingest(principal, request.wallets).await?;

    Ok(Json(ConnectWalletsResponse {
        success: true,
        data: report.synced.iter().map(to_wallet_data).collect(),
        skipped: report
            .skipped
            .into_iter()
            .map(|skip| SkippedWallet {
                address: skip.address,
                reason: skip.reason.to_string(),
            })
            .collect(),
    }))
}
