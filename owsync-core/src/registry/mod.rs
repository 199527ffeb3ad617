//! Static chain and token catalogues.
//!
//! Both registries are process-wide read-only tables populated at compile
//! time; every accessor is a pure lookup with no I/O and no locking. Adding
//! a chain or token is an explicit edit to these tables.

mod chains;
mod tokens;

pub use chains::{
    ChainConfig, chain_config, chain_config_by_decimal_id, chain_config_by_hex_id,
    chain_config_by_name, is_supported_chain,
};
pub use tokens::{
    TokenConfig, TokenKind, erc20_tokens, native_token, stablecoins, token_by_address,
    token_by_symbol, tokens_for_chain, tokens_for_chain_key,
};
