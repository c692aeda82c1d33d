//! On-chain data model and helpers shared by every detector

pub mod types;

use regex::Regex;
use std::collections::HashMap;

use crate::error::{Error, Result};

pub use types::{
    AccountData, NativeTransfer, NftEvent, NftRef, TokenStandard, TokenTransfer, Transaction,
    TransactionEvents, LAMPORTS_PER_SOL,
};

lazy_static::lazy_static! {
    /// Base58 alphabet, 32-44 characters (Solana pubkey text form)
    static ref ADDRESS_RE: Regex =
        Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("Invalid address regex");
}

/// Check that an address looks like a base58 Solana pubkey
pub fn validate_address(address: &str) -> Result<()> {
    if ADDRESS_RE.is_match(address) {
        Ok(())
    } else {
        Err(Error::InvalidAddress(format!(
            "expected 32-44 base58 characters, got {:?} ({} chars)",
            address,
            address.chars().count()
        )))
    }
}

/// Shorten an address for log output
pub fn short(address: &str) -> &str {
    address.get(..8).unwrap_or(address)
}

/// Count interactions with every counterparty of `target`
///
/// Each native or token transfer where `target` is on exactly one side counts
/// once for the address on the other side. Self-transfers and transfers that
/// do not involve `target` are ignored.
pub fn counterparty_interactions(
    transactions: &[Transaction],
    target: &str,
) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();

    for tx in transactions {
        let native = tx
            .native_transfers
            .iter()
            .map(|t| (t.from_user_account.as_str(), t.to_user_account.as_str()));
        let token = tx
            .token_transfers
            .iter()
            .map(|t| (t.from_user_account.as_str(), t.to_user_account.as_str()));

        for (from, to) in native.chain(token) {
            if let Some(counterparty) = counterparty_of(from, to, target) {
                *counts.entry(counterparty.to_string()).or_insert(0) += 1;
            }
        }
    }

    counts
}

/// The non-target side of a transfer, if the target is involved
pub(crate) fn counterparty_of<'a>(from: &'a str, to: &'a str, target: &str) -> Option<&'a str> {
    let counterparty = if from == target {
        to
    } else if to == target {
        from
    } else {
        return None;
    };

    if counterparty.is_empty() || counterparty == target {
        None
    } else {
        Some(counterparty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "7Np41oeYqPefeNQEHSv1UDhYrehxin3NStELsSKCT4K2";

    #[test]
    fn test_validate_address() {
        assert!(validate_address(WALLET).is_ok());
        assert!(validate_address("short1234").is_err());
        // 0, O, I and l are not in the base58 alphabet
        assert!(validate_address("0Np41oeYqPefeNQEHSv1UDhYrehxin3NStELsSKCT4K2").is_err());
        assert!(validate_address(&"1".repeat(45)).is_err());
        assert!(validate_address(&"1".repeat(32)).is_ok());
    }

    #[test]
    fn test_counterparty_interactions() {
        let txs = vec![
            Transaction::new("s1", 1)
                .with_native(WALLET, "alice", 10)
                .with_native("bob", WALLET, 10),
            Transaction::new("s2", 2)
                .with_token("alice", WALLET, "mint", 5.0, TokenStandard::Fungible)
                .with_native("carol", "dave", 10)
                .with_native(WALLET, WALLET, 10),
        ];

        let counts = counterparty_interactions(&txs, WALLET);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["alice"], 2);
        assert_eq!(counts["bob"], 1);
    }

    #[test]
    fn test_address_comparison_is_case_sensitive() {
        let upper = WALLET.to_uppercase();
        let txs = vec![Transaction::new("s1", 1).with_native(&upper, "alice", 10)];
        assert!(counterparty_interactions(&txs, WALLET).is_empty());
    }

    #[test]
    fn test_short() {
        assert_eq!(short(WALLET), "7Np41oeY");
        assert_eq!(short("abc"), "abc");
    }
}
