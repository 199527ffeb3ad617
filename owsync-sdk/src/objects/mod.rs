pub mod blockchains;
pub mod wallets;

pub use blockchains::{Blockchain, UnsupportedChain};
pub use wallets::{
    ConnectWalletsRequest, ConnectWalletsResponse, SkippedWallet, TokenBalanceData,
    WalletConnection, WalletData, WalletsResponse,
};
