pub mod token_holding;
pub mod wallet;
pub mod wallet_activity;

use owsync_sdk::auth::{AccountRole, Principal};
use uuid::Uuid;

/// The owning principal of a wallet row.
///
/// A wallet belongs to exactly one of a user or a company; business
/// accounts attach wallets to their company, personal accounts to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletOwner {
    User(Uuid),
    Company(Uuid),
}

impl WalletOwner {
    /// The owner a principal's new wallets are attached to.
    ///
    /// Business principals without a company id (which the API boundary
    /// rejects) fall back to user ownership rather than inventing a company.
    pub fn from_principal(principal: &Principal) -> Self {
        match (principal.role, principal.company_id) {
            (AccountRole::Business, Some(company_id)) => WalletOwner::Company(company_id),
            _ => WalletOwner::User(principal.user_id),
        }
    }

    pub fn user_id(self) -> Option<Uuid> {
        match self {
            WalletOwner::User(id) => Some(id),
            WalletOwner::Company(_) => None,
        }
    }

    pub fn company_id(self) -> Option<Uuid> {
        match self {
            WalletOwner::User(_) => None,
            WalletOwner::Company(id) => Some(id),
        }
    }
}
