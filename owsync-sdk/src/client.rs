//! HTTP client for the owsync wallet API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

use reqwest::StatusCode;
use url::Url;

use crate::auth::{COMPANY_ID_HEADER, Principal, ROLE_HEADER, USER_ID_HEADER};
use crate::objects::{ConnectWalletsRequest, ConnectWalletsResponse, WalletsResponse};

/// Errors produced by the SDK HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Typed HTTP client for the owsync wallet API.
///
/// Every request carries the identity headers that the upstream auth proxy
/// would normally set, so this client is meant for trusted backend-to-backend
/// calls (and tests), not for browsers.
#[derive(Debug, Clone)]
pub struct WalletClient {
    http: reqwest::Client,
    base_url: Url,
    principal: Principal,
}

impl WalletClient {
    /// Create a new `WalletClient` acting as `principal`.
    pub fn new(base_url: Url, principal: Principal) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            principal,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    fn auth_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header(USER_ID_HEADER, self.principal.user_id.to_string())
            .header(ROLE_HEADER, self.principal.role.as_str());
        match self.principal.company_id {
            Some(company_id) => request.header(COMPANY_ID_HEADER, company_id.to_string()),
            None => request,
        }
    }

    /// `POST /wallets/connect` — submit a batch of wallet connections and
    /// receive the synchronized wallets plus any skipped entries.
    pub async fn connect_wallets(
        &self,
        request: &ConnectWalletsRequest,
    ) -> Result<ConnectWalletsResponse, ClientError> {
        let url = self.base_url.join("/wallets/connect")?;
        let response = self
            .auth_headers(self.http.post(url))
            .json(request)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// `GET /wallets` — list the principal's saved wallets with holdings.
    pub async fn list_wallets(&self) -> Result<WalletsResponse, ClientError> {
        let url = self.base_url.join("/wallets")?;
        let response = self.auth_headers(self.http.get(url)).send().await?;
        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }
        Ok(response.json().await?)
    }
}
