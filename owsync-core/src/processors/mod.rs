//! The ingestion pipeline.
//!
//! - `BalanceSync`: syncs one wallet connection (registry → RPC → store)
//! - `WalletIngestionService`: fans a batch of connections out over
//!   bounded concurrency and joins the results

pub mod balance_sync;
pub mod ingestion;

pub use balance_sync::{BalanceSync, SyncError, SyncOutcome, SyncedWallet};
pub use ingestion::{IngestReport, SkipReason, SkippedConnection, WalletIngestionService};
