//! Shared API types for Open Wallet Sync.
//!
//! This crate defines the wire objects exchanged between the owsync server
//! and its callers, plus (behind the `client` feature) a typed HTTP client.

pub mod auth;
pub mod objects;

#[cfg(feature = "client")]
pub mod client;
