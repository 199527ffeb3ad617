use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// All blockchains supported by owsync
pub enum Blockchain {
    #[serde(rename = "ethereum")]
    Ethereum,
    #[serde(rename = "bsc")]
    BinanceSmartChain,
    #[serde(rename = "polygon")]
    Polygon,
    #[serde(rename = "sepolia")]
    Sepolia,
}

/// The given chain name does not map to any supported blockchain.
///
/// Adding a chain requires an explicit registry entry; there is no
/// silent fallback for unrecognized names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported chain name: {0}")]
pub struct UnsupportedChain(pub String);

impl Blockchain {
    /// Every supported blockchain, in registry order.
    pub const ALL: [Blockchain; 4] = [
        Blockchain::Ethereum,
        Blockchain::BinanceSmartChain,
        Blockchain::Polygon,
        Blockchain::Sepolia,
    ];

    /// The stable registry key, identical to the serde rename.
    pub fn key(self) -> &'static str {
        match self {
            Blockchain::Ethereum => "ethereum",
            Blockchain::BinanceSmartChain => "bsc",
            Blockchain::Polygon => "polygon",
            Blockchain::Sepolia => "sepolia",
        }
    }

    /// Human-readable chain name as shown by wallet providers.
    pub fn display_name(self) -> &'static str {
        match self {
            Blockchain::Ethereum => "Ethereum",
            Blockchain::BinanceSmartChain => "Binance Smart Chain",
            Blockchain::Polygon => "Polygon",
            Blockchain::Sepolia => "Sepolia",
        }
    }

    /// Normalize a free-form chain name to a registry key.
    ///
    /// Wallet integrations report chain names in several spellings
    /// ("Ethereum", "eth", "BNB Chain", "matic", …). Matching is
    /// case-insensitive and ignores surrounding whitespace. Unrecognized
    /// names fail with [`UnsupportedChain`].
    pub fn from_name(name: &str) -> Result<Blockchain, UnsupportedChain> {
        match name.trim().to_lowercase().as_str() {
            "ethereum" | "eth" | "ether" => Ok(Blockchain::Ethereum),
            "bsc" | "bnb" | "bnb chain" | "binance smart chain" => {
                Ok(Blockchain::BinanceSmartChain)
            }
            "polygon" | "matic" => Ok(Blockchain::Polygon),
            "sepolia" => Ok(Blockchain::Sepolia),
            _ => Err(UnsupportedChain(name.trim().to_string())),
        }
    }
}

impl std::fmt::Display for Blockchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Blockchain {
    type Err = UnsupportedChain;

    /// Parse a registry key (`"ethereum"`, `"bsc"`, …) back into a variant.
    ///
    /// Unlike [`Blockchain::from_name`] this accepts only exact keys; it is
    /// the inverse of [`Blockchain::key`] for values read from storage.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Blockchain::ALL
            .into_iter()
            .find(|chain| chain.key() == s)
            .ok_or_else(|| UnsupportedChain(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_accepts_aliases_case_and_whitespace() {
        let cases = [
            ("Ethereum", Blockchain::Ethereum),
            ("  eth  ", Blockchain::Ethereum),
            ("ETHER", Blockchain::Ethereum),
            ("Binance Smart Chain", Blockchain::BinanceSmartChain),
            ("BNB Chain", Blockchain::BinanceSmartChain),
            ("bsc", Blockchain::BinanceSmartChain),
            ("Polygon", Blockchain::Polygon),
            ("MATIC", Blockchain::Polygon),
            ("sepolia", Blockchain::Sepolia),
            ("\tSepolia\n", Blockchain::Sepolia),
        ];
        for (name, expected) in cases {
            assert_eq!(Blockchain::from_name(name), Ok(expected), "input {name:?}");
        }
    }

    #[test]
    fn from_name_rejects_unknown_chains() {
        for name in ["Dogecoin", "solana", "", "ethereum classic"] {
            assert!(Blockchain::from_name(name).is_err(), "input {name:?}");
        }
    }

    #[test]
    fn key_round_trips_through_from_str() {
        for chain in Blockchain::ALL {
            assert_eq!(chain.key().parse::<Blockchain>(), Ok(chain));
        }
    }

    #[test]
    fn serde_uses_registry_keys() {
        let json = serde_json::to_string(&Blockchain::BinanceSmartChain).unwrap();
        assert_eq!(json, "\"bsc\"");
        let parsed: Blockchain = serde_json::from_str("\"polygon\"").unwrap();
        assert_eq!(parsed, Blockchain::Polygon);
    }
}
