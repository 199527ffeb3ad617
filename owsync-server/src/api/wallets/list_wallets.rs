use axum::{Json, extract::State, response::IntoResponse};
use owsync_sdk::objects::WalletsResponse;

use super::{WalletApiError, to_wallet_data};
use crate::api::extractors::AuthenticatedPrincipal;
use crate::state::AppState;

/// `GET /wallets` — list the principal's saved wallets with their holdings.
pub(super) async fn list_wallets(
    state: State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<impl IntoResponse, WalletApiError> {
    let ingestion = state.ingestion().await;
    let wallets = ingestion.wallets_for_principal(&principal).await?;

    Ok(Json(WalletsResponse {
        success: true,
        data: wallets.iter().map(to_wallet_data).collect(),
    }))
}
