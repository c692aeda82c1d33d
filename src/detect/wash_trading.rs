//! Back-and-forth transfer detection
//!
//! Looks for SOL flowing repeatedly in both directions between the wallet and
//! one counterparty. For each counterparty the sent and received timestamps
//! are merged chronologically and every adjacent pair with a different
//! direction counts as one alternation.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::chain::{counterparty_of, Transaction};
use crate::detect::Detector;
use crate::error::Result;

/// Minimum transfers in each direction before a pair is considered
pub const MIN_TRANSFERS_EACH_WAY: usize = 2;
/// Alternations needed to flag a pair
pub const MIN_ALTERNATIONS: usize = 3;

/// A counterparty flagged for back-and-forth transfers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WashTradingPair {
    pub counterparty: String,
    pub sent: usize,
    pub received: usize,
    pub alternations: usize,
}

/// Wash-trading detector output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WashTradingResult {
    pub detected: bool,
    /// Flagged pairs, sorted by counterparty
    pub pairs: Vec<WashTradingPair>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Flow {
    Sent,
    Received,
}

/// Sent/received timestamps with one counterparty
#[derive(Default)]
struct FlowHistory {
    sent: Vec<i64>,
    received: Vec<i64>,
}

impl FlowHistory {
    fn alternations(&self) -> usize {
        let mut merged: Vec<(i64, Flow)> = self
            .sent
            .iter()
            .map(|ts| (*ts, Flow::Sent))
            .chain(self.received.iter().map(|ts| (*ts, Flow::Received)))
            .collect();
        // Stable order for equal timestamps: sent before received
        merged.sort();

        merged.windows(2).filter(|w| w[0].1 != w[1].1).count()
    }
}

/// Back-and-forth (wash trading) detector
#[derive(Debug, Clone, Copy, Default)]
pub struct WashTradingDetector;

impl Detector for WashTradingDetector {
    type Output = WashTradingResult;

    fn name(&self) -> &'static str {
        "wash_trading"
    }

    fn detect(&self, transactions: &[Transaction], target: &str) -> Result<WashTradingResult> {
        let mut flows: BTreeMap<&str, FlowHistory> = BTreeMap::new();

        for tx in transactions {
            for transfer in &tx.native_transfers {
                let from = transfer.from_user_account.as_str();
                let to = transfer.to_user_account.as_str();
                let Some(counterparty) = counterparty_of(from, to, target) else {
                    continue;
                };

                let history = flows.entry(counterparty).or_default();
                if from == target {
                    history.sent.push(tx.timestamp);
                } else {
                    history.received.push(tx.timestamp);
                }
            }
        }

        let pairs: Vec<WashTradingPair> = flows
            .into_iter()
            .filter(|(_, h)| {
                h.sent.len() >= MIN_TRANSFERS_EACH_WAY && h.received.len() >= MIN_TRANSFERS_EACH_WAY
            })
            .filter_map(|(counterparty, history)| {
                let alternations = history.alternations();
                (alternations >= MIN_ALTERNATIONS).then(|| WashTradingPair {
                    counterparty: counterparty.to_string(),
                    sent: history.sent.len(),
                    received: history.received.len(),
                    alternations,
                })
            })
            .collect();

        Ok(WashTradingResult {
            detected: !pairs.is_empty(),
            pairs,
        })
    }
}
