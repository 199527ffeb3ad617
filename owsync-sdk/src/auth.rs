//! Authenticated principal contract.
//!
//! Authentication itself is an external collaborator: an upstream proxy
//! validates the session and forwards the identity in these headers. The
//! owsync server trusts them and does not re-verify.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header carrying the authenticated user id (uuid).
pub const USER_ID_HEADER: &str = "X-Auth-User-Id";
/// Header carrying the account role (`personal` or `business`).
pub const ROLE_HEADER: &str = "X-Auth-Role";
/// Header carrying the company id for business accounts.
pub const COMPANY_ID_HEADER: &str = "X-Auth-Company-Id";

/// Account role of the authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Personal,
    Business,
}

impl AccountRole {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountRole::Personal => "personal",
            AccountRole::Business => "business",
        }
    }
}

impl std::str::FromStr for AccountRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(AccountRole::Personal),
            "business" => Ok(AccountRole::Business),
            _ => Err(()),
        }
    }
}

/// The authenticated identity a request acts as.
///
/// Business accounts attach wallets to their company, personal accounts to
/// the user; `company_id` is therefore present exactly when the role is
/// [`AccountRole::Business`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: AccountRole,
    pub company_id: Option<Uuid>,
}

impl Principal {
    /// A personal-account principal.
    pub fn personal(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: AccountRole::Personal,
            company_id: None,
        }
    }

    /// A business-account principal acting for `company_id`.
    pub fn business(user_id: Uuid, company_id: Uuid) -> Self {
        Self {
            user_id,
            role: AccountRole::Business,
            company_id: Some(company_id),
        }
    }
}
