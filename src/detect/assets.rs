//! Identity-revealing asset detection
//!
//! Finds holdings that advertise who owns a wallet: attendance badges
//! (POAPs) prove physical presence at an event, and name-service domains are
//! a public, human-readable alias that resolves to the address.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use crate::chain::Transaction;
use crate::detect::Detector;
use crate::error::Result;

/// Keywords marking an NFT as an attendance badge (matched lowercase)
pub const POAP_KEYWORDS: &[&str] = &[
    "poap",
    "proof of attendance",
    "event",
    "badge",
    "attendance",
    "participated",
    "hackathon",
    "conference",
    "meetup",
];

/// Description fragments marking a name-service transaction (matched lowercase)
const DOMAIN_KEYWORDS: &[&str] = &[".sol", "domain", "name service"];

/// SPL Name Service program
pub const NAME_SERVICE_PROGRAM_ID: &str = "namesLPneVptA9Z5rqUDD9tMTWEJwofgaYwp8cawRkX";
/// Bonfida .sol registrar program
pub const SOL_REGISTRAR_PROGRAM_ID: &str = "jCebN34bUfdeUYJT13J1yG16XWQpt5PDx6Mse9GUqhR";

/// Points per POAP
pub const POAP_POINTS: u32 = 5;
/// Points per domain
pub const DOMAIN_POINTS: u32 = 10;
/// Cap on this detector's contribution
pub const MAX_CONTRIBUTION: u32 = 30;

lazy_static::lazy_static! {
    static ref DOMAIN_RE: Regex = Regex::new(r"[a-zA-Z0-9_-]+\.sol").expect("Invalid domain regex");
}

/// Kind of identity asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Nft,
    Poap,
}

/// An NFT or badge received by the wallet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityAsset {
    pub mint: String,
    pub kind: AssetKind,
    pub signature: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Overall identity exposure bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl ExposureLevel {
    /// Bucket a weighted asset count: 0 none, 1-2 low, 3-5 medium, >5 high
    pub fn from_weight(weight: u32) -> Self {
        match weight {
            0 => ExposureLevel::None,
            1..=2 => ExposureLevel::Low,
            3..=5 => ExposureLevel::Medium,
            _ => ExposureLevel::High,
        }
    }
}

/// Identity asset detector output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetsResult {
    pub detected: bool,
    pub nfts: Vec<IdentityAsset>,
    pub poaps: Vec<IdentityAsset>,
    pub domains: Vec<String>,
    pub exposure_level: ExposureLevel,
    pub risk_contribution: u32,
}

impl AssetsResult {
    /// nft*1 + poap*2 + domain*3
    pub fn exposure_weight(&self) -> u32 {
        self.nfts.len() as u32 + self.poaps.len() as u32 * 2 + self.domains.len() as u32 * 3
    }
}

/// Detects POAPs, NFTs and name-service domains
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityAssetDetector;

impl IdentityAssetDetector {
    fn classify(description_lower: &str) -> AssetKind {
        if POAP_KEYWORDS.iter().any(|k| description_lower.contains(k)) {
            AssetKind::Poap
        } else {
            AssetKind::Nft
        }
    }

    fn asset(tx: &Transaction, mint: &str, kind: AssetKind) -> IdentityAsset {
        IdentityAsset {
            mint: mint.to_string(),
            kind,
            signature: tx.signature.clone(),
            timestamp: tx.time(),
        }
    }

    fn is_domain_related(tx: &Transaction, description_lower: &str) -> bool {
        DOMAIN_KEYWORDS.iter().any(|k| description_lower.contains(k))
            || tx.account_data.iter().any(|a| {
                a.account == NAME_SERVICE_PROGRAM_ID || a.account == SOL_REGISTRAR_PROGRAM_ID
            })
    }
}

impl Detector for IdentityAssetDetector {
    type Output = AssetsResult;

    fn name(&self) -> &'static str {
        "identity_assets"
    }

    fn detect(&self, transactions: &[Transaction], target: &str) -> Result<AssetsResult> {
        let mut seen_mints: HashSet<&str> = HashSet::new();
        let mut assets: Vec<IdentityAsset> = Vec::new();
        let mut domains: Vec<String> = Vec::new();

        // NFT events addressed to the wallet
        for tx in transactions {
            let Some(event) = tx.nft_event() else {
                continue;
            };
            let description = tx.description.to_lowercase();
            if event.buyer != target && !description.contains("received") {
                continue;
            }

            let kind = Self::classify(&description);
            for nft in &event.nfts {
                if !nft.mint.is_empty() && seen_mints.insert(nft.mint.as_str()) {
                    assets.push(Self::asset(tx, &nft.mint, kind));
                }
            }
        }

        // Single non-fungible tokens received directly
        for tx in transactions {
            let mut description = None;
            for transfer in &tx.token_transfers {
                let is_single_nft = transfer.to_user_account == target
                    && transfer.token_amount == 1.0
                    && transfer.token_standard.is_non_fungible();

                if is_single_nft
                    && !transfer.mint.is_empty()
                    && seen_mints.insert(transfer.mint.as_str())
                {
                    let description =
                        description.get_or_insert_with(|| tx.description.to_lowercase());
                    let kind = Self::classify(description.as_str());
                    assets.push(Self::asset(tx, &transfer.mint, kind));
                }
            }
        }

        // Name-service domains
        for tx in transactions {
            let description = tx.description.to_lowercase();
            if !Self::is_domain_related(tx, &description) {
                continue;
            }
            for found in DOMAIN_RE.find_iter(&tx.description) {
                let name = found.as_str();
                if !domains.iter().any(|d| d == name) {
                    domains.push(name.to_string());
                }
            }
        }

        let (poaps, nfts): (Vec<_>, Vec<_>) =
            assets.into_iter().partition(|a| a.kind == AssetKind::Poap);

        let risk_contribution = (poaps.len() as u32)
            .saturating_mul(POAP_POINTS)
            .saturating_add((domains.len() as u32).saturating_mul(DOMAIN_POINTS))
            .min(MAX_CONTRIBUTION);

        let mut result = AssetsResult {
            detected: !nfts.is_empty() || !poaps.is_empty() || !domains.is_empty(),
            nfts,
            poaps,
            domains,
            exposure_level: ExposureLevel::None,
            risk_contribution,
        };
        result.exposure_level = ExposureLevel::from_weight(result.exposure_weight());

        Ok(result)
    }
}
