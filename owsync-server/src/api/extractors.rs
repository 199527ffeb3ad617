//! Custom Axum extractors for request authentication.
//!
//! Session validation is an external collaborator: an upstream auth proxy
//! verifies the user and forwards the identity as headers. The
//! [`AuthenticatedPrincipal`] extractor reads those headers and trusts
//! them; it does not re-verify the session.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use owsync_sdk::auth::{
    AccountRole, COMPANY_ID_HEADER, Principal, ROLE_HEADER, USER_ID_HEADER,
};
use uuid::Uuid;

use crate::state::AppState;

/// An Axum extractor producing the authenticated [`Principal`].
///
/// # Headers
///
/// ```text
/// X-Auth-User-Id:    4b82…            (uuid, required)
/// X-Auth-Role:       personal|business (required)
/// X-Auth-Company-Id: 91fe…            (uuid, required for business)
/// ```
pub struct AuthenticatedPrincipal(pub Principal);

/// Errors returned by the [`AuthenticatedPrincipal`] extractor.
#[derive(Debug)]
pub enum AuthError {
    MissingIdentity,
    InvalidUserId,
    InvalidRole,
    MissingCompany,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingIdentity => (StatusCode::UNAUTHORIZED, "missing identity headers"),
            AuthError::InvalidUserId => (StatusCode::BAD_REQUEST, "invalid user id header"),
            AuthError::InvalidRole => (StatusCode::BAD_REQUEST, "invalid role header"),
            AuthError::MissingCompany => (
                StatusCode::BAD_REQUEST,
                "business principal without company id",
            ),
        };
        (status, message).into_response()
    }
}

impl FromRequestParts<AppState> for AuthenticatedPrincipal {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, USER_ID_HEADER)?
            .parse::<Uuid>()
            .map_err(|_| AuthError::InvalidUserId)?;
        let role = header_value(parts, ROLE_HEADER)?
            .parse::<AccountRole>()
            .map_err(|_| AuthError::InvalidRole)?;

        let principal = match role {
            AccountRole::Personal => Principal::personal(user_id),
            AccountRole::Business => {
                let company_id = parts
                    .headers
                    .get(COMPANY_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<Uuid>().ok())
                    .ok_or(AuthError::MissingCompany)?;
                Principal::business(user_id, company_id)
            }
        };

        Ok(AuthenticatedPrincipal(principal))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AuthError> {
    parts
        .headers
        .get(name)
        .ok_or(AuthError::MissingIdentity)?
        .to_str()
        .map_err(|_| AuthError::MissingIdentity)
}
