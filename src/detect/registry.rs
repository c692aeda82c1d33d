//! Known centralized-exchange custody addresses
//!
//! # WARNING: This list is a static snapshot
//! Exchanges rotate hot wallets. Matching is exact and case-sensitive, so a
//! rotated address silently stops matching until the table is updated.

use std::collections::HashMap;

/// (address, exchange display name)
pub const KNOWN_EXCHANGES: &[(&str, &str)] = &[
    ("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM", "Binance"),
    ("5tzFkiKscXHK5ZXCGbXZxdw7gTjjD1mBwuoFbhUvuAi9", "Binance"),
    ("2ojv9BAiHUrvsm9gxDe7fJSzbNZSJcxZvf8dqmWGHG8S", "Binance"),
    ("H8sMJSCQxfKiFTCfDR3DUMLPwcRbM61LGFJ8N4dK3WjS", "Coinbase"),
    ("2AQdpHJ2JpcEgPiATUXjQxA8QmafFegfQwSLWSprPicm", "Coinbase"),
    ("GJRs4FwHtemZ5ZE9x3FNvJ8TMwitKTh21yxdRPqn7npE", "Coinbase"),
    ("FWznbcNXWQuHTawe9RxvQ2LdCENssh12dsznf4RiouN5", "Kraken"),
    ("5VCwKtCXgCJ6kit5FybXjvriW3xELsFDhYrPSqtJNmcD", "OKX"),
    ("AC5RDfQFmDS1deWZos921JfqscXdByf8BKHs5ACWjtW2", "Bybit"),
    ("BmFdpraQhkiDQE6SnfG5omcA1VwzqfXrwtNYBwWTymy6", "KuCoin"),
    ("u6PJ8DtQuPFnfmwHbGFULQ4u4EgjDiyYKjVEsynXq2w", "Gate.io"),
    ("ASTyfSima4LLAdDgoFGkgqoKowG1LZFDr9fAQrg7iaJZ", "MEXC"),
    ("88xTWZMeKfiTgbfEmPLdsUCQcZinwUfk25EBQZ21XMAZ", "Huobi"),
    ("2sBRFAtJEqoJENm9wAgnqDXR6uqM7dx4gjXdxaxDzACZ", "Crypto.com"),
];

lazy_static::lazy_static! {
    /// Default registry, built once
    static ref DEFAULT_REGISTRY: ExchangeRegistry = ExchangeRegistry::from_pairs(KNOWN_EXCHANGES);
}

/// Read-only lookup from custody address to exchange name
#[derive(Debug, Clone, Default)]
pub struct ExchangeRegistry {
    addresses: HashMap<String, String>,
}

impl ExchangeRegistry {
    /// Build a registry from (address, name) pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            addresses: pairs
                .iter()
                .map(|(address, name)| (address.to_string(), name.to_string()))
                .collect(),
        }
    }

    /// The built-in registry
    pub fn known() -> &'static ExchangeRegistry {
        &DEFAULT_REGISTRY
    }

    /// Exchange name for an address (exact match)
    pub fn lookup(&self, address: &str) -> Option<&str> {
        self.addresses.get(address).map(String::as_str)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_lookup() {
        let registry = ExchangeRegistry::known();
        assert_eq!(
            registry.lookup("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"),
            Some("Binance")
        );
        assert_eq!(
            registry.lookup("FWznbcNXWQuHTawe9RxvQ2LdCENssh12dsznf4RiouN5"),
            Some("Kraken")
        );
        assert!(registry.len() >= 10);
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = ExchangeRegistry::known();
        assert!(registry
            .lookup("9wzdxwbbmkg8ztbnmquxvqrayrzzdsgydlvl9zytawwm")
            .is_none());
        assert!(!registry.contains(""));
    }
}
