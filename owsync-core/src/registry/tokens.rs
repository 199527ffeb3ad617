use owsync_sdk::objects::Blockchain;

/// Whether a token is the chain's intrinsic currency or an ERC-20 contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Native,
    Erc20,
}

/// Static description of one fungible token on one chain.
///
/// Identity is (chain, contract address); the native pseudo-token has no
/// contract address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub symbol: &'static str,
    /// Display name, e.g. "USD Coin".
    pub name: &'static str,
    pub decimals: u32,
    pub address: Option<&'static str>,
    pub chain: Blockchain,
    pub kind: TokenKind,
    pub stablecoin: bool,
}

static ETHEREUM_TOKENS: [TokenConfig; 4] = [
    TokenConfig {
        symbol: "ETH",
        name: "Ether",
        decimals: 18,
        address: None,
        chain: Blockchain::Ethereum,
        kind: TokenKind::Native,
        stablecoin: false,
    },
    TokenConfig {
        symbol: "USDC",
        name: "USD Coin",
        decimals: 6,
        address: Some("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        chain: Blockchain::Ethereum,
        kind: TokenKind::Erc20,
        stablecoin: true,
    },
    TokenConfig {
        symbol: "USDT",
        name: "Tether USD",
        decimals: 6,
        address: Some("0xdAC17F958D2ee523a2206206994597C13D831ec7"),
        chain: Blockchain::Ethereum,
        kind: TokenKind::Erc20,
        stablecoin: true,
    },
    TokenConfig {
        symbol: "WETH",
        name: "Wrapped Ether",
        decimals: 18,
        address: Some("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
        chain: Blockchain::Ethereum,
        kind: TokenKind::Erc20,
        stablecoin: false,
    },
];

static BSC_TOKENS: [TokenConfig; 4] = [
    TokenConfig {
        symbol: "BNB",
        name: "BNB",
        decimals: 18,
        address: None,
        chain: Blockchain::BinanceSmartChain,
        kind: TokenKind::Native,
        stablecoin: false,
    },
    TokenConfig {
        symbol: "USDC",
        name: "USD Coin",
        decimals: 18,
        address: Some("0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d"),
        chain: Blockchain::BinanceSmartChain,
        kind: TokenKind::Erc20,
        stablecoin: true,
    },
    TokenConfig {
        symbol: "USDT",
        name: "Tether USD",
        decimals: 18,
        address: Some("0x55d398326f99059ff775485246999027b3197955"),
        chain: Blockchain::BinanceSmartChain,
        kind: TokenKind::Erc20,
        stablecoin: true,
    },
    TokenConfig {
        symbol: "WBNB",
        name: "Wrapped BNB",
        decimals: 18,
        address: Some("0xBB4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"),
        chain: Blockchain::BinanceSmartChain,
        kind: TokenKind::Erc20,
        stablecoin: false,
    },
];

static POLYGON_TOKENS: [TokenConfig; 4] = [
    TokenConfig {
        symbol: "MATIC",
        name: "MATIC",
        decimals: 18,
        address: None,
        chain: Blockchain::Polygon,
        kind: TokenKind::Native,
        stablecoin: false,
    },
    TokenConfig {
        symbol: "USDC",
        name: "USD Coin",
        decimals: 6,
        address: Some("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
        chain: Blockchain::Polygon,
        kind: TokenKind::Erc20,
        stablecoin: true,
    },
    TokenConfig {
        symbol: "USDT",
        name: "Tether USD",
        decimals: 6,
        address: Some("0xc2132D05D31c914a87C6611C10748AEb04B58e8F"),
        chain: Blockchain::Polygon,
        kind: TokenKind::Erc20,
        stablecoin: true,
    },
    TokenConfig {
        symbol: "WMATIC",
        name: "Wrapped MATIC",
        decimals: 18,
        address: Some("0x7D1AfA7B718fb893dB30A3aBc0Cfc608AaCfeBB0"),
        chain: Blockchain::Polygon,
        kind: TokenKind::Erc20,
        stablecoin: false,
    },
];

static SEPOLIA_TOKENS: [TokenConfig; 1] = [TokenConfig {
    symbol: "ETH",
    name: "Sepolia Ether",
    decimals: 18,
    address: None,
    chain: Blockchain::Sepolia,
    kind: TokenKind::Native,
    stablecoin: false,
}];

/// All tokens configured for a chain, native pseudo-token first.
pub fn tokens_for_chain(chain: Blockchain) -> &'static [TokenConfig] {
    match chain {
        Blockchain::Ethereum => &ETHEREUM_TOKENS,
        Blockchain::BinanceSmartChain => &BSC_TOKENS,
        Blockchain::Polygon => &POLYGON_TOKENS,
        Blockchain::Sepolia => &SEPOLIA_TOKENS,
    }
}

/// All tokens for a chain registry key.
///
/// Unknown keys yield an empty slice, never an error: "no tokens
/// configured" is a valid, common case for callers.
pub fn tokens_for_chain_key(chain_key: &str) -> &'static [TokenConfig] {
    match chain_key.parse::<Blockchain>() {
        Ok(chain) => tokens_for_chain(chain),
        Err(_) => &[],
    }
}

/// The ERC-20 tokens to fan out over during a balance sync.
pub fn erc20_tokens(chain: Blockchain) -> impl Iterator<Item = &'static TokenConfig> {
    tokens_for_chain(chain)
        .iter()
        .filter(|t| t.kind == TokenKind::Erc20)
}

/// Find a token by contract address, case-insensitively.
pub fn token_by_address(chain: Blockchain, address: &str) -> Option<&'static TokenConfig> {
    tokens_for_chain(chain).iter().find(|t| {
        t.address
            .is_some_and(|a| a.eq_ignore_ascii_case(address.trim()))
    })
}

/// Find a token by symbol, case-insensitively.
pub fn token_by_symbol(chain: Blockchain, symbol: &str) -> Option<&'static TokenConfig> {
    tokens_for_chain(chain)
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol.trim()))
}

/// The chain's native pseudo-token.
pub fn native_token(chain: Blockchain) -> Option<&'static TokenConfig> {
    tokens_for_chain(chain)
        .iter()
        .find(|t| t.kind == TokenKind::Native)
}

/// The stablecoins configured on a chain.
pub fn stablecoins(chain: Blockchain) -> impl Iterator<Item = &'static TokenConfig> {
    tokens_for_chain(chain).iter().filter(|t| t.stablecoin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_token_exists_for_every_chain() {
        for chain in Blockchain::ALL {
            let native = native_token(chain);
            assert!(native.is_some(), "chain {chain} has no native token");
            assert_eq!(native.and_then(|t| t.address), None);
        }
    }

    #[test]
    fn erc20_list_excludes_the_native_token() {
        assert_eq!(erc20_tokens(Blockchain::Ethereum).count(), 3);
        assert_eq!(erc20_tokens(Blockchain::Sepolia).count(), 0);
        assert!(erc20_tokens(Blockchain::Polygon).all(|t| t.address.is_some()));
    }

    #[test]
    fn unknown_chain_key_yields_empty_token_list() {
        assert!(tokens_for_chain_key("dogecoin").is_empty());
        assert_eq!(tokens_for_chain_key("bsc").len(), 4);
    }

    #[test]
    fn address_lookup_is_case_insensitive() {
        let usdc = token_by_address(
            Blockchain::Ethereum,
            "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        );
        assert_eq!(usdc.map(|t| t.symbol), Some("USDC"));
        assert!(token_by_address(Blockchain::Ethereum, "0xdeadbeef").is_none());
    }

    #[test]
    fn symbol_lookup_is_case_insensitive() {
        assert_eq!(
            token_by_symbol(Blockchain::Polygon, "usdt").map(|t| t.name),
            Some("Tether USD")
        );
        assert!(token_by_symbol(Blockchain::Sepolia, "USDC").is_none());
    }

    #[test]
    fn stablecoin_flags_cover_usdc_and_usdt() {
        let symbols: Vec<_> = stablecoins(Blockchain::BinanceSmartChain)
            .map(|t| t.symbol)
            .collect();
        assert_eq!(symbols, ["USDC", "USDT"]);
        assert_eq!(stablecoins(Blockchain::Sepolia).count(), 0);
    }

    #[test]
    fn token_decimals_match_contract_definitions() {
        // USDC uses 6 decimals on Ethereum/Polygon but 18 on BSC.
        assert_eq!(
            token_by_symbol(Blockchain::Ethereum, "USDC").map(|t| t.decimals),
            Some(6)
        );
        assert_eq!(
            token_by_symbol(Blockchain::BinanceSmartChain, "USDC").map(|t| t.decimals),
            Some(18)
        );
    }
}
