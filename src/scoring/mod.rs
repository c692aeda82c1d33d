//! Risk aggregation
//!
//! Combines every detector's findings into a single 0-100 privacy score
//! (100 = no exposure found), a risk tier, and the warnings and
//! recommendations shown to the user.
//!
//! Deductions are applied in a fixed order and each one is logged in the
//! score breakdown with a human-readable reason.

pub mod advice;

use serde::Serialize;
use std::fmt;

use crate::detect::{
    AssetsResult, BatchScreening, CexResult, ClusteringPattern, ClusteringResult,
    ComplianceResult, ComplianceStatus, WashTradingResult,
};

pub use advice::{Severity, Warning, WarningCategory};

/// Starting (best) score
pub const MAX_SCORE: u32 = 100;
/// Deduction per sanctioned counterparty
pub const SANCTIONED_COUNTERPARTY_POINTS: u32 = 20;
/// Cap on the sanctioned-counterparty deduction
pub const MAX_SANCTIONED_COUNTERPARTY_POINTS: u32 = 40;
/// Flat deduction when wash trading is detected
pub const WASH_TRADING_PENALTY: u32 = 15;

/// Every detector output for one wallet
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Findings {
    pub exchange: CexResult,
    pub clustering: ClusteringResult,
    pub wash_trading: WashTradingResult,
    pub identity_assets: AssetsResult,
    /// Screening of the analyzed wallet itself
    pub compliance: ComplianceResult,
    /// Screening of its counterparties
    pub counterparties: BatchScreening,
}

/// Risk tier derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Tier for a score; boundaries are inclusive on the riskier side
    pub fn from_score(score: u32) -> Self {
        if score <= 25 {
            RiskLevel::Critical
        } else if score <= 50 {
            RiskLevel::High
        } else if score <= 75 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Fixed description for the tier
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Critical => {
                "Critical privacy exposure - this wallet is very likely linked to a real-world identity"
            }
            RiskLevel::High => {
                "High privacy exposure - several patterns link this wallet to identifiable parties"
            }
            RiskLevel::Medium => {
                "Moderate privacy exposure - some activity could be used to link this wallet"
            }
            RiskLevel::Low => "Low privacy exposure - few identity-linking patterns were found",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        };
        f.write_str(label)
    }
}

/// One entry in the score breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deduction {
    pub reason: String,
    pub points: u32,
}

/// Ordered deductions and the resulting score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub deductions: Vec<Deduction>,
    pub score: u32,
}

impl Default for ScoreBreakdown {
    fn default() -> Self {
        Self {
            deductions: Vec::new(),
            score: MAX_SCORE,
        }
    }
}

impl ScoreBreakdown {
    fn deduct(&mut self, reason: impl Into<String>, points: u32) {
        if points > 0 {
            self.deductions.push(Deduction {
                reason: reason.into(),
                points,
            });
        }
    }

    /// Sum of all deductions
    pub fn total_deducted(&self) -> u32 {
        self.deductions
            .iter()
            .fold(0u32, |acc, d| acc.saturating_add(d.points))
    }
}

/// Aggregated assessment of one wallet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub score: u32,
    pub risk_level: RiskLevel,
    pub description: String,
    pub breakdown: ScoreBreakdown,
    pub warnings: Vec<Warning>,
    pub recommendations: Vec<String>,
}

/// Combines detector findings into a score
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskAggregator;

impl RiskAggregator {
    /// Compute the score breakdown in the fixed deduction order
    pub fn score(&self, findings: &Findings) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::default();

        let exchange = &findings.exchange;
        if exchange.detected {
            breakdown.deduct(
                format!(
                    "Direct exchange interaction ({} transactions)",
                    exchange.interaction_count()
                ),
                exchange.risk_contribution,
            );
        }

        let clustering = &findings.clustering;
        if clustering.detected {
            let pattern = match clustering.pattern {
                ClusteringPattern::None => "high-frequency counterparty".to_string(),
                other => other.to_string(),
            };
            breakdown.deduct(
                format!("Address clustering pattern: {}", pattern),
                clustering.risk_contribution,
            );
        }

        let assets = &findings.identity_assets;
        if assets.detected {
            breakdown.deduct(
                format!(
                    "Identity-linked assets ({} POAPs, {} domains)",
                    assets.poaps.len(),
                    assets.domains.len()
                ),
                assets.risk_contribution,
            );
        }

        match findings.compliance.status {
            ComplianceStatus::Sanctioned => breakdown.deduct(
                "Wallet is on a sanctions list",
                ComplianceStatus::Sanctioned.penalty(),
            ),
            ComplianceStatus::Flagged => breakdown.deduct(
                "Wallet is flagged for suspicious activity",
                ComplianceStatus::Flagged.penalty(),
            ),
            ComplianceStatus::Clean | ComplianceStatus::Unknown => {}
        }

        let sanctioned = findings.counterparties.sanctioned.len() as u32;
        if sanctioned > 0 {
            breakdown.deduct(
                format!("Interacted with {} sanctioned address(es)", sanctioned),
                sanctioned
                    .saturating_mul(SANCTIONED_COUNTERPARTY_POINTS)
                    .min(MAX_SANCTIONED_COUNTERPARTY_POINTS),
            );
        }

        if findings.wash_trading.detected {
            breakdown.deduct(
                format!(
                    "Wash trading with {} counterparty(ies)",
                    findings.wash_trading.pairs.len()
                ),
                WASH_TRADING_PENALTY,
            );
        }

        breakdown.score = MAX_SCORE.saturating_sub(breakdown.total_deducted()).min(MAX_SCORE);
        breakdown
    }

    /// Full assessment: score, tier, warnings and recommendations
    pub fn assess(&self, findings: &Findings) -> Assessment {
        let breakdown = self.score(findings);
        let risk_level = RiskLevel::from_score(breakdown.score);

        Assessment {
            score: breakdown.score,
            risk_level,
            description: risk_level.description().to_string(),
            warnings: advice::warnings(findings),
            recommendations: advice::recommendations(findings),
            breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{ComplianceScreener, ExposureLevel, WashTradingPair};
    use crate::detect::compliance::SANCTIONED_ADDRESSES;

    fn clean_findings() -> Findings {
        Findings {
            compliance: ComplianceScreener::classify(
                "7Np41oeYqPefeNQEHSv1UDhYrehxin3NStELsSKCT4K2",
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(25), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(26), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(51), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(75), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(76), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Low);
    }

    #[test]
    fn test_tier_is_monotonic() {
        let rank = |level: RiskLevel| match level {
            RiskLevel::Critical => 0,
            RiskLevel::High => 1,
            RiskLevel::Medium => 2,
            RiskLevel::Low => 3,
        };
        for score in 1..=100 {
            assert!(rank(RiskLevel::from_score(score)) >= rank(RiskLevel::from_score(score - 1)));
        }
    }

    #[test]
    fn test_clean_wallet_scores_100() {
        let assessment = RiskAggregator.assess(&clean_findings());
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert!(assessment.breakdown.deductions.is_empty());
        assert!(assessment.warnings.is_empty());
    }

    #[test]
    fn test_sanctioned_wallet_deducts_50() {
        let findings = Findings {
            compliance: ComplianceScreener::classify(SANCTIONED_ADDRESSES[0]),
            ..Default::default()
        };

        let breakdown = RiskAggregator.score(&findings);
        assert_eq!(breakdown.deductions.len(), 1);
        assert_eq!(breakdown.deductions[0].points, 50);
        assert_eq!(breakdown.score, 50);
        assert_eq!(RiskLevel::from_score(breakdown.score), RiskLevel::High);
    }

    #[test]
    fn test_deduction_order_and_clamp() {
        let findings = Findings {
            exchange: CexResult {
                detected: true,
                risk_contribution: 50,
                ..Default::default()
            },
            clustering: ClusteringResult {
                detected: true,
                pattern: ClusteringPattern::SingleCounterparty,
                risk_contribution: 20,
                ..Default::default()
            },
            wash_trading: WashTradingResult {
                detected: true,
                pairs: vec![WashTradingPair {
                    counterparty: "peer".to_string(),
                    sent: 2,
                    received: 2,
                    alternations: 3,
                }],
            },
            identity_assets: AssetsResult {
                detected: true,
                domains: vec!["alice.sol".to_string()],
                exposure_level: ExposureLevel::Medium,
                risk_contribution: 10,
                ..Default::default()
            },
            compliance: ComplianceScreener::classify(SANCTIONED_ADDRESSES[0]),
            counterparties: BatchScreening {
                sanctioned: vec!["a".into(), "b".into(), "c".into()],
                flagged: vec![],
                total_checked: 3,
            },
        };

        let breakdown = RiskAggregator.score(&findings);
        let points: Vec<u32> = breakdown.deductions.iter().map(|d| d.points).collect();
        assert_eq!(points, vec![50, 20, 10, 50, 40, 15]);
        assert!(breakdown.deductions[1].reason.contains("single_counterparty"));
        assert_eq!(breakdown.total_deducted(), 185);
        assert_eq!(breakdown.score, 0);
        assert_eq!(RiskLevel::from_score(breakdown.score), RiskLevel::Critical);
    }

    #[test]
    fn test_high_frequency_fallback_reason() {
        let findings = Findings {
            clustering: ClusteringResult {
                detected: true,
                pattern: ClusteringPattern::None,
                risk_contribution: 8,
                ..Default::default()
            },
            ..clean_findings()
        };

        let breakdown = RiskAggregator.score(&findings);
        assert_eq!(breakdown.score, 92);
        assert!(breakdown.deductions[0].reason.contains("high-frequency"));
    }

    #[test]
    fn test_display() {
        assert_eq!(RiskLevel::Critical.to_string(), "CRITICAL");
        assert_eq!(
            serde_json::to_string(&RiskLevel::Medium).unwrap(),
            "\"MEDIUM\""
        );
    }
}
