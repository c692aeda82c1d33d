//! Exchange interaction detection
//!
//! Flags direct transfers between the wallet and known exchange custody
//! addresses. Deposits *from* an exchange are weighted higher than
//! withdrawals *to* one: a deposit shows a KYC-verified account paying this
//! wallet, which ties the wallet to a real identity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::chain::Transaction;
use crate::detect::registry::ExchangeRegistry;
use crate::detect::Detector;
use crate::error::{Error, Result};

/// Points per deposit from an exchange
pub const DEPOSIT_POINTS: u32 = 15;
/// Points per withdrawal to an exchange
pub const WITHDRAWAL_POINTS: u32 = 10;
/// Cap on this detector's contribution
pub const MAX_CONTRIBUTION: u32 = 50;

/// Direction of value flow relative to the analyzed wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    /// Exchange -> wallet
    Deposit,
    /// Wallet -> exchange
    Withdrawal,
}

/// A single transfer between the wallet and an exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeInteraction {
    pub signature: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub exchange: String,
    pub exchange_address: String,
    pub direction: TransferDirection,
    /// Amount in the asset's natural unit (SOL, or UI token amount)
    pub amount: f64,
    /// "SOL" or the token mint
    pub asset: String,
}

/// Exchange detector output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CexResult {
    pub detected: bool,
    pub deposits: Vec<ExchangeInteraction>,
    pub withdrawals: Vec<ExchangeInteraction>,
    /// Distinct exchange names, sorted
    pub exchanges: Vec<String>,
    pub risk_contribution: u32,
}

impl CexResult {
    /// Total number of recorded exchange interactions
    pub fn interaction_count(&self) -> usize {
        self.deposits.len() + self.withdrawals.len()
    }
}

/// Detects transfers to and from known exchanges
pub struct ExchangeDetector<'a> {
    registry: &'a ExchangeRegistry,
}

impl Default for ExchangeDetector<'static> {
    fn default() -> Self {
        Self::new(ExchangeRegistry::known())
    }
}

impl<'a> ExchangeDetector<'a> {
    pub fn new(registry: &'a ExchangeRegistry) -> Self {
        Self { registry }
    }

    /// Record a transfer if its counterparty is a known exchange
    fn classify(
        &self,
        tx: &Transaction,
        from: &str,
        to: &str,
        amount: f64,
        asset: &str,
        target: &str,
    ) -> Option<ExchangeInteraction> {
        let (counterparty, direction) = if to == target && from != target {
            (from, TransferDirection::Deposit)
        } else if from == target && to != target {
            (to, TransferDirection::Withdrawal)
        } else {
            return None;
        };

        let exchange = self.registry.lookup(counterparty)?;

        Some(ExchangeInteraction {
            signature: tx.signature.clone(),
            timestamp: tx.time(),
            exchange: exchange.to_string(),
            exchange_address: counterparty.to_string(),
            direction,
            amount,
            asset: asset.to_string(),
        })
    }
}

impl Detector for ExchangeDetector<'_> {
    type Output = CexResult;

    fn name(&self) -> &'static str {
        "exchange"
    }

    fn detect(&self, transactions: &[Transaction], target: &str) -> Result<CexResult> {
        let mut deposits = Vec::new();
        let mut withdrawals = Vec::new();
        let mut captured: HashSet<&str> = HashSet::new();

        for tx in transactions {
            let mut found = Vec::new();

            for transfer in &tx.native_transfers {
                found.extend(self.classify(
                    tx,
                    &transfer.from_user_account,
                    &transfer.to_user_account,
                    transfer.amount_sol(),
                    "SOL",
                    target,
                ));
            }

            for transfer in &tx.token_transfers {
                if !transfer.token_amount.is_finite() {
                    return Err(Error::detector(
                        "exchange",
                        format!("non-finite token amount in {}", tx.signature),
                    ));
                }
                found.extend(self.classify(
                    tx,
                    &transfer.from_user_account,
                    &transfer.to_user_account,
                    transfer.token_amount,
                    &transfer.mint,
                    target,
                ));
            }

            if !found.is_empty() {
                captured.insert(tx.signature.as_str());
            }

            // Exchange paid the fee but moved nothing we saw: still a deposit
            if tx.fee_payer != target && !captured.contains(tx.signature.as_str()) {
                if let Some(exchange) = self.registry.lookup(&tx.fee_payer) {
                    captured.insert(tx.signature.as_str());
                    found.push(ExchangeInteraction {
                        signature: tx.signature.clone(),
                        timestamp: tx.time(),
                        exchange: exchange.to_string(),
                        exchange_address: tx.fee_payer.clone(),
                        direction: TransferDirection::Deposit,
                        amount: 0.0,
                        asset: "SOL".to_string(),
                    });
                }
            }

            for interaction in found {
                match interaction.direction {
                    TransferDirection::Deposit => deposits.push(interaction),
                    TransferDirection::Withdrawal => withdrawals.push(interaction),
                }
            }
        }

        let exchanges: BTreeSet<String> = deposits
            .iter()
            .chain(withdrawals.iter())
            .map(|i| i.exchange.clone())
            .collect();

        let risk_contribution = (deposits.len() as u32)
            .saturating_mul(DEPOSIT_POINTS)
            .saturating_add((withdrawals.len() as u32).saturating_mul(WITHDRAWAL_POINTS))
            .min(MAX_CONTRIBUTION);

        Ok(CexResult {
            detected: !deposits.is_empty() || !withdrawals.is_empty(),
            deposits,
            withdrawals,
            exchanges: exchanges.into_iter().collect(),
            risk_contribution,
        })
    }
}
