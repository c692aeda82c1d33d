//! Counterparty clustering - concentration of activity on few addresses
//!
//! A wallet that mostly transacts with one or a handful of addresses is easy
//! to link to them in a transaction graph. Patterns, first match wins:
//! - `single_counterparty`: top address holds >= 50% of interactions
//! - `small_cluster`: >= 3 counterparties, top 3 hold >= 80%
//! - `funnel`: >= 10 counterparties, top 5 hold >= 70%
//!
//! Share thresholds are compared on integer counts so the boundaries are
//! exact and inclusive.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chain::{counterparty_interactions, Transaction};
use crate::detect::Detector;
use crate::error::{Error, Result};

/// Points for a dominant single counterparty
pub const BASE_POINTS: u32 = 20;
/// Points for a wash-trading pattern
pub const WASH_TRADING_POINTS: u32 = 30;
/// Points when detection came only from the >= 50% rule
pub const HIGH_FREQUENCY_POINTS: u32 = 8;
/// Lowest accepted `min_interactions`
pub const MIN_INTERACTIONS_FLOOR: u32 = 5;

/// Configuration for counterparty clustering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Below this many interactions there is not enough data to judge
    #[serde(default = "default_min_interactions")]
    pub min_interactions: u32,

    /// Number of counterparties reported in `top_addresses`
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_min_interactions() -> u32 {
    MIN_INTERACTIONS_FLOOR
}
fn default_top_n() -> usize {
    5
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_interactions: default_min_interactions(),
            top_n: default_top_n(),
        }
    }
}

/// Concentration pattern classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringPattern {
    SingleCounterparty,
    SmallCluster,
    Funnel,
    /// Scored pattern for back-and-forth activity; classification here never
    /// produces it, wash trading is reported by its own detector
    WashTrading,
    #[default]
    None,
}

impl ClusteringPattern {
    /// Base contribution for this pattern (`None` handled by the caller)
    pub fn points(&self) -> u32 {
        match self {
            ClusteringPattern::SingleCounterparty => BASE_POINTS,
            ClusteringPattern::WashTrading => WASH_TRADING_POINTS,
            // floor(20 * 0.7)
            ClusteringPattern::SmallCluster => BASE_POINTS * 7 / 10,
            // floor(20 * 0.5)
            ClusteringPattern::Funnel => BASE_POINTS / 2,
            ClusteringPattern::None => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringPattern::SingleCounterparty => "single_counterparty",
            ClusteringPattern::SmallCluster => "small_cluster",
            ClusteringPattern::Funnel => "funnel",
            ClusteringPattern::WashTrading => "wash_trading",
            ClusteringPattern::None => "none",
        }
    }
}

impl fmt::Display for ClusteringPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interaction count for one counterparty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressFrequency {
    pub address: String,
    pub count: u32,
    /// Share of total counterparty interactions (0-100)
    pub percentage: f64,
}

/// Clustering detector output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusteringResult {
    pub detected: bool,
    pub pattern: ClusteringPattern,
    pub top_addresses: Vec<AddressFrequency>,
    pub highest_percentage: f64,
    pub total_interactions: u32,
    pub unique_counterparties: usize,
    pub risk_contribution: u32,
}

/// Counterparty concentration detector
#[derive(Debug, Clone, Default)]
pub struct ClusteringDetector {
    config: ClusteringConfig,
}

impl ClusteringDetector {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Classify a descending-sorted count list
    fn classify(sorted: &[(String, u32)], total: u32) -> ClusteringPattern {
        if total == 0 {
            return ClusteringPattern::None;
        }
        let total = u64::from(total);
        let top_sum = |n: usize| -> u64 {
            sorted.iter().take(n).map(|(_, c)| u64::from(*c)).sum()
        };
        // share(n) >= pct  <=>  top_sum(n) * 100 >= pct * total
        let share_at_least = |n: usize, pct: u64| top_sum(n) * 100 >= pct * total;

        if share_at_least(1, 50) {
            ClusteringPattern::SingleCounterparty
        } else if sorted.len() >= 3 && share_at_least(3, 80) {
            ClusteringPattern::SmallCluster
        } else if sorted.len() >= 10 && share_at_least(5, 70) {
            ClusteringPattern::Funnel
        } else {
            ClusteringPattern::None
        }
    }
}

impl Detector for ClusteringDetector {
    type Output = ClusteringResult;

    fn name(&self) -> &'static str {
        "clustering"
    }

    fn detect(&self, transactions: &[Transaction], target: &str) -> Result<ClusteringResult> {
        let counts = counterparty_interactions(transactions, target);

        let total = counts.values().try_fold(0u32, |acc, c| acc.checked_add(*c));
        let total =
            total.ok_or_else(|| Error::detector("clustering", "interaction count overflow"))?;

        if total == 0 || total < self.config.min_interactions {
            return Ok(ClusteringResult {
                total_interactions: total,
                unique_counterparties: counts.len(),
                ..Default::default()
            });
        }

        let mut sorted: Vec<(String, u32)> = counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let percentage = |count: u32| f64::from(count) / f64::from(total) * 100.0;

        let top_addresses: Vec<AddressFrequency> = sorted
            .iter()
            .take(self.config.top_n)
            .map(|(address, count)| AddressFrequency {
                address: address.clone(),
                count: *count,
                percentage: percentage(*count),
            })
            .collect();

        let highest_percentage = sorted.first().map(|(_, c)| percentage(*c)).unwrap_or(0.0);
        let top_is_majority = sorted
            .first()
            .map(|(_, c)| u64::from(*c) * 2 >= u64::from(total))
            .unwrap_or(false);

        let pattern = Self::classify(&sorted, total);
        let detected = top_is_majority || pattern != ClusteringPattern::None;

        let risk_contribution = match pattern {
            ClusteringPattern::None if detected => HIGH_FREQUENCY_POINTS,
            other => other.points(),
        };

        Ok(ClusteringResult {
            detected,
            pattern,
            top_addresses,
            highest_percentage,
            total_interactions: total,
            unique_counterparties: sorted.len(),
            risk_contribution,
        })
    }
}
