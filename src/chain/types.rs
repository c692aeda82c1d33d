//! Transaction data model
//!
//! Mirrors the Helius enhanced-transaction JSON shape so histories fetched
//! from the API (or saved to disk) deserialize directly. Values are treated
//! as immutable once produced by a data source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: f64 = 1e9;

/// A parsed on-chain transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub signature: String,
    /// Block time (unix seconds)
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fee_payer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub native_transfers: Vec<NativeTransfer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_transfers: Vec<TokenTransfer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_data: Vec<AccountData>,
    #[serde(default)]
    pub events: Option<TransactionEvents>,
}

/// SOL transfer (amount in lamports)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTransfer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub from_user_account: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub to_user_account: String,
    pub amount: u64,
}

/// SPL token transfer (amount already scaled by decimals)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub from_user_account: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub to_user_account: String,
    pub mint: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_amount: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_standard: TokenStandard,
}

/// Metaplex token standard tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStandard {
    Fungible,
    FungibleAsset,
    NonFungible,
    NonFungibleEdition,
    ProgrammableNonFungible,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TokenStandard {
    /// Check if tokens of this standard are unique (NFT-like)
    pub fn is_non_fungible(&self) -> bool {
        matches!(
            self,
            TokenStandard::NonFungible
                | TokenStandard::NonFungibleEdition
                | TokenStandard::ProgrammableNonFungible
        )
    }
}

/// Account touched by a transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    pub account: String,
    #[serde(default)]
    pub native_balance_change: i64,
}

/// Structured event payloads attached by the indexer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvents {
    #[serde(default)]
    pub nft: Option<NftEvent>,
}

/// NFT mint/sale/transfer event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftEvent {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub buyer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seller: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nfts: Vec<NftRef>,
}

/// Reference to an NFT inside an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftRef {
    pub mint: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_standard: TokenStandard,
}

impl NativeTransfer {
    /// Amount in SOL
    pub fn amount_sol(&self) -> f64 {
        self.amount as f64 / LAMPORTS_PER_SOL
    }
}

impl Transaction {
    /// Create an empty transaction with a signature and block time
    pub fn new(signature: impl Into<String>, timestamp: i64) -> Self {
        Self {
            signature: signature.into(),
            timestamp,
            ..Default::default()
        }
    }

    /// Block time as a UTC datetime
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// The NFT event, if the indexer attached one
    pub fn nft_event(&self) -> Option<&NftEvent> {
        self.events.as_ref().and_then(|e| e.nft.as_ref())
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_fee_payer(mut self, fee_payer: impl Into<String>) -> Self {
        self.fee_payer = fee_payer.into();
        self
    }

    pub fn with_native(mut self, from: &str, to: &str, lamports: u64) -> Self {
        self.native_transfers.push(NativeTransfer {
            from_user_account: from.to_string(),
            to_user_account: to.to_string(),
            amount: lamports,
        });
        self
    }

    pub fn with_token(
        mut self,
        from: &str,
        to: &str,
        mint: &str,
        amount: f64,
        standard: TokenStandard,
    ) -> Self {
        self.token_transfers.push(TokenTransfer {
            from_user_account: from.to_string(),
            to_user_account: to.to_string(),
            mint: mint.to_string(),
            token_amount: amount,
            token_standard: standard,
        });
        self
    }

    pub fn with_account(mut self, account: &str) -> Self {
        self.account_data.push(AccountData {
            account: account.to_string(),
            native_balance_change: 0,
        });
        self
    }

    pub fn with_nft_event(mut self, event: NftEvent) -> Self {
        self.events = Some(TransactionEvents { nft: Some(event) });
        self
    }
}

/// Treat explicit JSON `null` as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_helius_shape() {
        let json = r#"{
            "signature": "5abc",
            "timestamp": 1700000000,
            "description": "alice.sol registered",
            "feePayer": "payer",
            "nativeTransfers": [
                {"fromUserAccount": "a", "toUserAccount": null, "amount": 1500000000}
            ],
            "tokenTransfers": [
                {"fromUserAccount": "b", "toUserAccount": "c", "mint": "m",
                 "tokenAmount": 1, "tokenStandard": "ProgrammableNonFungible"}
            ],
            "accountData": [{"account": "x", "nativeBalanceChange": -5000}],
            "events": {"nft": {"type": "NFT_MINT", "buyer": "c", "nfts": [{"mint": "m"}]}}
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.fee_payer, "payer");
        assert_eq!(tx.native_transfers[0].to_user_account, "");
        assert!((tx.native_transfers[0].amount_sol() - 1.5).abs() < f64::EPSILON);
        assert!(tx.token_transfers[0].token_standard.is_non_fungible());
        assert_eq!(tx.nft_event().unwrap().buyer, "c");
        assert_eq!(tx.account_data[0].account, "x");
    }

    #[test]
    fn test_unknown_token_standard() {
        let standard: TokenStandard = serde_json::from_str(r#""Compressed""#).unwrap();
        assert_eq!(standard, TokenStandard::Unknown);
        assert!(!standard.is_non_fungible());
    }

    #[test]
    fn test_missing_optional_fields() {
        let tx: Transaction = serde_json::from_str(r#"{"signature": "s"}"#).unwrap();
        assert!(tx.native_transfers.is_empty());
        assert!(tx.nft_event().is_none());
        assert_eq!(tx.time().unwrap().timestamp(), 0);
    }
}
