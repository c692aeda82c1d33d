//! Compliance screening
//!
//! # WARNING: This is a deterministic stand-in, not a screening authority
//! `ComplianceScreener` classifies addresses against small fixed fixture lists
//! and derives a pseudo risk score from a string hash. The result is
//! reproducible across runs and carries no legal meaning. A real backend can
//! be plugged in through [`ScreeningService`].

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use crate::chain::short;
use crate::error::Result;

/// Fixture: addresses treated as sanctioned
pub const SANCTIONED_ADDRESSES: &[&str] = &[
    "4Yg8dFxP3hRqkLs9WvT2mJcZb7NeHu6aQp5XrKtD1wBs",
    "8SNDxRnEhUsq7mC2tGvP4kLbY9wZaJ3fHe6dXQ5rTu1N",
    "CLB7pVt3wXq9RfN2yHs8kMdZ4eJgU6aEbT5nP1xQcLrW",
];

/// Fixture: addresses treated as flagged (mixer / exploit linked)
pub const FLAGGED_ADDRESSES: &[&str] = &[
    "FLG2hPk8wRt4mNxQ9sVb3cJzE7yU5dAgT6nLqH1eXfKs",
    "6mUqZ3rXwT8fPb2NcLs9hK4yJdE7vGaR5tQnH1xWpBkV",
    "Dq7wL2xNfR9tHs4pKbZ3mYcJ8eG5uVaT6nQ1rXhEkPsW",
];

/// Score deduction when the wallet itself is sanctioned
pub const SANCTIONED_PENALTY: u32 = 50;
/// Score deduction when the wallet itself is flagged
pub const FLAGGED_PENALTY: u32 = 25;

const SANCTIONED_RISK_SCORE: u8 = 100;
const FLAGGED_RISK_SCORE: u8 = 65;
const CLEAN_SCORE_MODULUS: u32 = 30;

/// Screening classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ComplianceStatus {
    Clean,
    Flagged,
    Sanctioned,
    #[default]
    Unknown,
}

impl ComplianceStatus {
    /// Deduction applied when the analyzed wallet has this status
    pub fn penalty(&self) -> u32 {
        match self {
            ComplianceStatus::Sanctioned => SANCTIONED_PENALTY,
            ComplianceStatus::Flagged => FLAGGED_PENALTY,
            ComplianceStatus::Clean | ComplianceStatus::Unknown => 0,
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Screening result for one address
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplianceResult {
    pub address: String,
    pub status: ComplianceStatus,
    /// 0-100, higher = riskier
    pub risk_score: u8,
    pub flags: Vec<String>,
    pub detected: bool,
    pub risk_contribution: u32,
}

impl ComplianceResult {
    fn new(address: &str, status: ComplianceStatus, risk_score: u8, flags: &[&str]) -> Self {
        Self {
            address: address.to_string(),
            status,
            risk_score,
            flags: flags.iter().map(|f| f.to_string()).collect(),
            detected: matches!(
                status,
                ComplianceStatus::Sanctioned | ComplianceStatus::Flagged
            ),
            risk_contribution: status.penalty(),
        }
    }

    /// Result used when screening could not be performed
    pub fn unknown(address: &str, reason: impl Into<String>) -> Self {
        Self {
            flags: vec![reason.into()],
            ..Self::new(address, ComplianceStatus::Unknown, 0, &[])
        }
    }
}

/// Counterparty batch screening outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchScreening {
    /// Sanctioned counterparties, sorted
    pub sanctioned: Vec<String>,
    /// Flagged counterparties, sorted
    pub flagged: Vec<String>,
    pub total_checked: usize,
}

/// Screening backend
#[async_trait]
pub trait ScreeningService: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Screen a single address
    async fn screen(&self, address: &str) -> Result<ComplianceResult>;
}

/// Deterministic fixture-based screener
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceScreener;

impl ComplianceScreener {
    /// Classify an address. Pure function of the input.
    pub fn classify(address: &str) -> ComplianceResult {
        let len = address.chars().count();
        if !(32..=44).contains(&len) {
            return ComplianceResult::unknown(
                address,
                format!("Invalid address format: expected 32-44 characters, got {}", len),
            );
        }

        if SANCTIONED_ADDRESSES.contains(&address) {
            return ComplianceResult::new(
                address,
                ComplianceStatus::Sanctioned,
                SANCTIONED_RISK_SCORE,
                &[
                    "Address appears on sanctions list",
                    "Interaction may violate sanctions regulations",
                ],
            );
        }

        if FLAGGED_ADDRESSES.contains(&address) {
            return ComplianceResult::new(
                address,
                ComplianceStatus::Flagged,
                FLAGGED_RISK_SCORE,
                &[
                    "Address linked to mixer or exploit activity",
                    "Counterparties may apply enhanced due diligence",
                ],
            );
        }

        let score = (address_hash(address) % CLEAN_SCORE_MODULUS) as u8;
        ComplianceResult::new(address, ComplianceStatus::Clean, score, &[])
    }
}

#[async_trait]
impl ScreeningService for ComplianceScreener {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn screen(&self, address: &str) -> Result<ComplianceResult> {
        Ok(Self::classify(address))
    }
}

/// Polynomial rolling hash (`h = h * 31 + c`, wrapping 32-bit), magnitude
fn address_hash(address: &str) -> u32 {
    address
        .chars()
        .fold(0i32, |h, c| {
            h.wrapping_shl(5).wrapping_sub(h).wrapping_add(c as i32)
        })
        .unsigned_abs()
}

/// Screen many addresses concurrently
///
/// At most `concurrency` screenings are in flight; completion order is not
/// preserved. A failed screening is logged and counted as checked.
pub async fn screen_batch<S>(
    service: &S,
    addresses: Vec<String>,
    concurrency: usize,
) -> BatchScreening
where
    S: ScreeningService + ?Sized,
{
    let results: Vec<ComplianceResult> = stream::iter(addresses)
        .map(|address| async move {
            match service.screen(&address).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(
                        service = service.name(),
                        address = %short(&address),
                        error = %e,
                        "Screening failed"
                    );
                    ComplianceResult::unknown(&address, format!("Screening unavailable: {}", e))
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut batch = BatchScreening {
        total_checked: results.len(),
        ..Default::default()
    };

    for result in results {
        match result.status {
            ComplianceStatus::Sanctioned => batch.sanctioned.push(result.address),
            ComplianceStatus::Flagged => batch.flagged.push(result.address),
            ComplianceStatus::Clean | ComplianceStatus::Unknown => {}
        }
    }
    batch.sanctioned.sort();
    batch.flagged.sort();

    debug!(
        checked = batch.total_checked,
        sanctioned = batch.sanctioned.len(),
        flagged = batch.flagged.len(),
        "Counterparty screening complete"
    );

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const CLEAN: &str = "7Np41oeYqPefeNQEHSv1UDhYrehxin3NStELsSKCT4K2";

    #[test]
    fn test_sanctioned_fixture() {
        let result = ComplianceScreener::classify(SANCTIONED_ADDRESSES[0]);
        assert_eq!(result.status, ComplianceStatus::Sanctioned);
        assert_eq!(result.risk_score, 100);
        assert!(result.detected);
        assert_eq!(result.risk_contribution, 50);
        assert_eq!(result.flags.len(), 2);
    }

    #[test]
    fn test_flagged_fixture() {
        let result = ComplianceScreener::classify(FLAGGED_ADDRESSES[1]);
        assert_eq!(result.status, ComplianceStatus::Flagged);
        assert_eq!(result.risk_score, 65);
        assert_eq!(result.risk_contribution, 25);
    }

    #[test]
    fn test_clean_score_is_deterministic() {
        let first = ComplianceScreener::classify(CLEAN);
        let second = ComplianceScreener::classify(CLEAN);
        assert_eq!(first, second);
        assert_eq!(first.status, ComplianceStatus::Clean);
        assert!(first.risk_score < 30);
        assert!(!first.detected);
        assert_eq!(first.risk_contribution, 0);
    }

    #[test]
    fn test_hash_matches_rolling_formula() {
        // "ab": (0*31 + 97) * 31 + 98 = 3105
        assert_eq!(address_hash("ab"), 3105);
        assert_eq!(address_hash(""), 0);
    }

    #[test]
    fn test_malformed_address_is_unknown() {
        let result = ComplianceScreener::classify("tooshort");
        assert_eq!(result.status, ComplianceStatus::Unknown);
        assert_eq!(result.risk_score, 0);
        assert!(result.flags[0].contains("Invalid address format"));
        assert!(!result.detected);
    }

    #[tokio::test]
    async fn test_batch_partitions_results() {
        let addresses = vec![
            CLEAN.to_string(),
            FLAGGED_ADDRESSES[0].to_string(),
            SANCTIONED_ADDRESSES[1].to_string(),
            SANCTIONED_ADDRESSES[0].to_string(),
        ];

        let batch = screen_batch(&ComplianceScreener, addresses, 2).await;
        assert_eq!(batch.total_checked, 4);
        assert_eq!(
            batch.sanctioned,
            vec![
                SANCTIONED_ADDRESSES[0].to_string(),
                SANCTIONED_ADDRESSES[1].to_string()
            ]
        );
        assert_eq!(batch.flagged, vec![FLAGGED_ADDRESSES[0].to_string()]);
    }

    struct Unavailable;

    #[async_trait]
    impl ScreeningService for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }
        async fn screen(&self, address: &str) -> Result<ComplianceResult> {
            Err(Error::Screening {
                address: address.to_string(),
                reason: "backend down".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_batch_tolerates_failures() {
        let batch = screen_batch(&Unavailable, vec![SANCTIONED_ADDRESSES[0].to_string()], 4).await;
        assert_eq!(batch.total_checked, 1);
        assert!(batch.sanctioned.is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let batch = screen_batch(&ComplianceScreener, Vec::new(), 0).await;
        assert_eq!(batch, BatchScreening::default());
    }
}
