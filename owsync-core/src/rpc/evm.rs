//! JSON-RPC client for EVM-compatible chains.
//!
//! Covers the two read-only calls the sync pipeline needs:
//! - `eth_getBalance` for the native balance
//! - `eth_call` with the ERC-20 `balanceOf(address)` selector for tokens
//!
//! Responses are hex quantities in base units; they are parsed into `u128`
//! and converted through [`crate::rpc::units`] so no precision is lost.

use super::{ChainClient, RpcError, units};
use crate::registry::{self, TokenConfig};
use async_trait::async_trait;
use owsync_sdk::objects::Blockchain;
use rust_decimal::Decimal;
use url::Url;

/// 4-byte selector of `balanceOf(address)`.
const BALANCE_OF_SELECTOR: &str = "0x70a08231";

/// [`ChainClient`] implementation for any EVM-compatible chain.
pub struct EvmChainClient {
    chain: Blockchain,
    endpoint: Url,
    http: reqwest::Client,
}

impl EvmChainClient {
    pub fn new(chain: Blockchain, endpoint: Url, http: reqwest::Client) -> Self {
        Self {
            chain,
            endpoint,
            http,
        }
    }

    /// Perform one JSON-RPC 2.0 call and return the raw `result` string.
    async fn call(&self, method: &str, params: serde_json::Value) -> Result<String, RpcError> {
        #[derive(Debug, serde::Deserialize)]
        struct JsonRpcResponse {
            result: Option<String>,
            error: Option<JsonRpcErrorObject>,
        }

        #[derive(Debug, serde::Deserialize)]
        struct JsonRpcErrorObject {
            code: i64,
            message: String,
        }

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;
        let response: JsonRpcResponse = response.json().await?;

        if let Some(error) = response.error {
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| RpcError::Parse(format!("{method}: response carries no result")))
    }
}

#[async_trait]
impl ChainClient for EvmChainClient {
    fn chain(&self) -> Blockchain {
        self.chain
    }

    async fn native_balance(&self, address: &str) -> Result<Decimal, RpcError> {
        let address = normalize_address(address)?;
        let result = self
            .call("eth_getBalance", serde_json::json!([address, "latest"]))
            .await?;
        let base_units = parse_hex_quantity(&result)?;
        let decimals = registry::chain_config(self.chain).native_decimals;
        units::from_base_units(base_units, decimals).map_err(|e| RpcError::Parse(e.to_string()))
    }

    async fn token_balance(
        &self,
        token: &TokenConfig,
        address: &str,
    ) -> Result<Decimal, RpcError> {
        let address = normalize_address(address)?;
        let Some(contract) = token.address else {
            return Err(RpcError::Parse(format!(
                "token {} has no contract address",
                token.symbol
            )));
        };
        let call = serde_json::json!([
            { "to": contract, "data": balance_of_calldata(&address) },
            "latest",
        ]);
        let result = self.call("eth_call", call).await?;
        let base_units = parse_hex_quantity(&result)?;
        units::from_base_units(base_units, token.decimals)
            .map_err(|e| RpcError::Parse(e.to_string()))
    }
}

/// Validate and lowercase an EVM account address.
fn normalize_address(address: &str) -> Result<String, RpcError> {
    let trimmed = address.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| RpcError::InvalidAddress(trimmed.to_string()))?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RpcError::InvalidAddress(trimmed.to_string()));
    }
    Ok(format!("0x{}", hex.to_lowercase()))
}

/// Parse a `0x…` hex quantity (possibly zero-padded to a 32-byte word).
///
/// An empty quantity (`0x`) decodes as zero; `eth_call` against an address
/// with no code answers that way.
fn parse_hex_quantity(hex: &str) -> Result<u128, RpcError> {
    let digits = hex
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::Parse(format!("quantity {hex} is not 0x-prefixed")))?;
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }
    if significant.len() > 32 {
        return Err(RpcError::Parse(format!(
            "quantity {hex} exceeds 128 bits"
        )));
    }
    u128::from_str_radix(significant, 16)
        .map_err(|e| RpcError::Parse(format!("invalid hex quantity {hex}: {e}")))
}

/// ABI-encode a `balanceOf(address)` call for the given (normalized) address.
fn balance_of_calldata(address: &str) -> String {
    let bare = address.trim_start_matches("0x");
    format!("{BALANCE_OF_SELECTOR}{:0>64}", bare)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parses_plain_and_padded_quantities() {
        assert_eq!(parse_hex_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_hex_quantity("0x").unwrap(), 0);
        assert_eq!(parse_hex_quantity("0x1").unwrap(), 1);
        assert_eq!(parse_hex_quantity("0x14d1120d7b160000").unwrap(), 1_500_000_000_000_000_000);
        // 32-byte word as returned by eth_call.
        let padded = format!("0x{:0>64}", "ee6b280");
        assert_eq!(parse_hex_quantity(&padded).unwrap(), 250_000_000);
    }

    #[test]
    fn rejects_malformed_quantities() {
        assert!(parse_hex_quantity("1234").is_err());
        assert!(parse_hex_quantity("0xzz").is_err());
        // 33 significant hex digits = beyond u128.
        let too_large = format!("0x1{}", "0".repeat(32));
        assert!(parse_hex_quantity(&too_large).is_err());
    }

    #[test]
    fn normalizes_valid_addresses() {
        let address = normalize_address(" 0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48 ").unwrap();
        assert_eq!(address, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for address in ["", "0x123", "a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "0xZZ"] {
            assert!(normalize_address(address).is_err(), "input {address:?}");
        }
    }

    #[test]
    fn balance_of_calldata_pads_address_to_one_word() {
        let data = balance_of_calldata("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        assert_eq!(data.len(), "0x70a08231".len() + 64);
        assert!(data.starts_with("0x70a08231000000000000000000000000a0b86991"));
    }
}
