use owsync_sdk::objects::Blockchain;

/// Static description of one supported chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain: Blockchain,
    /// Numeric chain id (EIP-155).
    pub chain_id: u64,
    /// Hex chain id as reported by wallet providers (`eth_chainId`).
    pub hex_chain_id: &'static str,
    /// Display name, matching what wallet integrations report.
    pub name: &'static str,
    /// Default public RPC endpoint; deployments usually override this.
    pub rpc_url: &'static str,
    pub block_explorer_url: &'static str,
    pub native_symbol: &'static str,
    pub native_decimals: u32,
    /// Chains where an empty ERC-20 token list is expected (test networks).
    pub native_only: bool,
}

static SUPPORTED_CHAINS: [ChainConfig; 4] = [
    ChainConfig {
        chain: Blockchain::Ethereum,
        chain_id: 1,
        hex_chain_id: "0x1",
        name: "Ethereum",
        rpc_url: "https://ethereum-rpc.publicnode.com",
        block_explorer_url: "https://etherscan.io",
        native_symbol: "ETH",
        native_decimals: 18,
        native_only: false,
    },
    ChainConfig {
        chain: Blockchain::BinanceSmartChain,
        chain_id: 56,
        hex_chain_id: "0x38",
        name: "Binance Smart Chain",
        rpc_url: "https://bsc-rpc.publicnode.com",
        block_explorer_url: "https://bscscan.com",
        native_symbol: "BNB",
        native_decimals: 18,
        native_only: false,
    },
    ChainConfig {
        chain: Blockchain::Polygon,
        chain_id: 137,
        hex_chain_id: "0x89",
        name: "Polygon",
        rpc_url: "https://polygon-bor-rpc.publicnode.com",
        block_explorer_url: "https://polygonscan.com",
        native_symbol: "MATIC",
        native_decimals: 18,
        native_only: false,
    },
    ChainConfig {
        chain: Blockchain::Sepolia,
        chain_id: 11155111,
        hex_chain_id: "0xaa36a7",
        name: "Sepolia",
        rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
        block_explorer_url: "https://sepolia.etherscan.io",
        native_symbol: "ETH",
        native_decimals: 18,
        native_only: true,
    },
];

/// Get the configuration for a supported chain.
pub fn chain_config(chain: Blockchain) -> &'static ChainConfig {
    match chain {
        Blockchain::Ethereum => &SUPPORTED_CHAINS[0],
        Blockchain::BinanceSmartChain => &SUPPORTED_CHAINS[1],
        Blockchain::Polygon => &SUPPORTED_CHAINS[2],
        Blockchain::Sepolia => &SUPPORTED_CHAINS[3],
    }
}

/// Look up a chain by its display name, case-insensitively.
pub fn chain_config_by_name(name: &str) -> Option<&'static ChainConfig> {
    SUPPORTED_CHAINS
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

/// Look up a chain by its hex id (`eth_chainId` result).
///
/// Hex ids are normalized to lowercase before comparison.
pub fn chain_config_by_hex_id(hex_id: &str) -> Option<&'static ChainConfig> {
    let normalized = hex_id.trim().to_lowercase();
    SUPPORTED_CHAINS
        .iter()
        .find(|c| c.hex_chain_id == normalized)
}

/// Look up a chain by its decimal id.
pub fn chain_config_by_decimal_id(chain_id: u64) -> Option<&'static ChainConfig> {
    SUPPORTED_CHAINS.iter().find(|c| c.chain_id == chain_id)
}

/// Whether a hex chain id belongs to a supported chain.
pub fn is_supported_chain(hex_id: &str) -> bool {
    chain_config_by_hex_id(hex_id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_blockchain_variant_has_a_config() {
        for chain in Blockchain::ALL {
            let config = chain_config(chain);
            assert_eq!(config.chain, chain);
            assert!(config.rpc_url.starts_with("https://"));
        }
    }

    #[test]
    fn lookup_by_name_is_case_insensitive() {
        let config = chain_config_by_name("binance smart chain");
        assert_eq!(config.map(|c| c.chain), Some(Blockchain::BinanceSmartChain));
        assert_eq!(
            chain_config_by_name(" ETHEREUM ").map(|c| c.chain_id),
            Some(1)
        );
        assert!(chain_config_by_name("Dogecoin").is_none());
    }

    #[test]
    fn lookup_by_hex_id_normalizes_case() {
        assert_eq!(
            chain_config_by_hex_id("0xAA36A7").map(|c| c.chain),
            Some(Blockchain::Sepolia)
        );
        assert!(is_supported_chain("0x38"));
        assert!(!is_supported_chain("0x2105"));
    }

    #[test]
    fn lookup_by_decimal_id() {
        assert_eq!(
            chain_config_by_decimal_id(137).map(|c| c.native_symbol),
            Some("MATIC")
        );
        assert!(chain_config_by_decimal_id(42).is_none());
    }
}
