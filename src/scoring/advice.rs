//! Warnings and recommendations
//!
//! Templated, per-detector text. Output order is fixed: exchange,
//! clustering, wash trading, identity assets, compliance, counterparties.

use serde::Serialize;
use std::fmt;

use crate::chain::short;
use crate::detect::{ClusteringPattern, ComplianceStatus, ExposureLevel};
use crate::scoring::Findings;

/// Warning severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Which part of the analysis raised a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    Input,
    Exchange,
    Clustering,
    WashTrading,
    IdentityAssets,
    Compliance,
    Counterparties,
}

/// A user-facing warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub severity: Severity,
    pub category: WarningCategory,
    pub title: String,
    pub message: String,
}

impl Warning {
    pub fn new(
        severity: Severity,
        category: WarningCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Warnings for every detector that found something
pub fn warnings(findings: &Findings) -> Vec<Warning> {
    let mut out = Vec::new();

    let exchange = &findings.exchange;
    if exchange.detected {
        let severity = if exchange.deposits.is_empty() {
            Severity::Medium
        } else {
            Severity::High
        };
        out.push(Warning::new(
            severity,
            WarningCategory::Exchange,
            "Exchange interaction detected",
            format!(
                "{} direct transfer(s) with {} ({} from, {} to). Exchanges keep KYC records that can tie this wallet to your identity.",
                exchange.interaction_count(),
                exchange.exchanges.join(", "),
                exchange.deposits.len(),
                exchange.withdrawals.len()
            ),
        ));
    }

    let clustering = &findings.clustering;
    if clustering.detected {
        let (severity, title) = match clustering.pattern {
            ClusteringPattern::SingleCounterparty => {
                (Severity::High, "Single dominant counterparty")
            }
            ClusteringPattern::SmallCluster => (Severity::Medium, "Small counterparty cluster"),
            ClusteringPattern::Funnel => (Severity::Medium, "Funnel activity pattern"),
            ClusteringPattern::WashTrading => (Severity::High, "Back-and-forth activity pattern"),
            ClusteringPattern::None => (Severity::Low, "Frequent counterparty"),
        };
        let top = clustering
            .top_addresses
            .first()
            .map(|a| short(&a.address).to_string())
            .unwrap_or_default();
        out.push(Warning::new(
            severity,
            WarningCategory::Clustering,
            title,
            format!(
                "{:.1}% of {} counterparty interactions are with {}... across {} unique addresses. Concentrated activity makes this wallet easy to link in a transaction graph.",
                clustering.highest_percentage,
                clustering.total_interactions,
                top,
                clustering.unique_counterparties
            ),
        ));
    }

    let wash = &findings.wash_trading;
    if wash.detected {
        let peers: Vec<&str> = wash.pairs.iter().map(|p| short(&p.counterparty)).collect();
        out.push(Warning::new(
            Severity::High,
            WarningCategory::WashTrading,
            "Back-and-forth transfers detected",
            format!(
                "SOL repeatedly moved in both directions with {} address(es): {}. Round trips strongly link both wallets to the same owner.",
                wash.pairs.len(),
                peers.join(", ")
            ),
        ));
    }

    let assets = &findings.identity_assets;
    if assets.detected {
        let severity = match assets.exposure_level {
            ExposureLevel::High => Severity::High,
            ExposureLevel::Medium => Severity::Medium,
            ExposureLevel::Low | ExposureLevel::None => Severity::Low,
        };
        let mut message = format!(
            "Holds {} POAP(s), {} other NFT(s) and {} domain(s).",
            assets.poaps.len(),
            assets.nfts.len(),
            assets.domains.len()
        );
        if !assets.domains.is_empty() {
            message.push_str(&format!(
                " Domains {} resolve publicly to this address.",
                assets.domains.join(", ")
            ));
        }
        if !assets.poaps.is_empty() {
            message.push_str(" Event badges prove physical attendance.");
        }
        out.push(Warning::new(
            severity,
            WarningCategory::IdentityAssets,
            "Identity-revealing assets",
            message,
        ));
    }

    let compliance = &findings.compliance;
    match compliance.status {
        ComplianceStatus::Sanctioned => out.push(Warning::new(
            Severity::Critical,
            WarningCategory::Compliance,
            "Sanctioned wallet",
            format!("This wallet appears on a sanctions list. {}", compliance.flags.join(". ")),
        )),
        ComplianceStatus::Flagged => out.push(Warning::new(
            Severity::High,
            WarningCategory::Compliance,
            "Flagged wallet",
            format!(
                "This wallet is flagged for suspicious activity. {}",
                compliance.flags.join(". ")
            ),
        )),
        ComplianceStatus::Clean | ComplianceStatus::Unknown => {}
    }

    let counterparties = &findings.counterparties;
    if !counterparties.sanctioned.is_empty() {
        out.push(Warning::new(
            Severity::Critical,
            WarningCategory::Counterparties,
            "Interaction with sanctioned addresses",
            format!(
                "{} of {} screened counterparties are sanctioned.",
                counterparties.sanctioned.len(),
                counterparties.total_checked
            ),
        ));
    }
    if !counterparties.flagged.is_empty() {
        out.push(Warning::new(
            Severity::Low,
            WarningCategory::Counterparties,
            "Interaction with flagged addresses",
            format!(
                "{} of {} screened counterparties are flagged. This does not affect the score.",
                counterparties.flagged.len(),
                counterparties.total_checked
            ),
        ));
    }

    out
}

/// Remediation steps, deduplicated, in warning order
pub fn recommendations(findings: &Findings) -> Vec<String> {
    let mut out: Vec<&str> = Vec::new();

    if findings.exchange.detected {
        out.push("Withdraw from exchanges to an intermediate wallet instead of your main wallet");
        out.push("Use a dedicated wallet for exchange deposits and withdrawals");
    }

    if findings.clustering.detected {
        out.push("Spread activity across more counterparties");
        out.push("Use fresh addresses for recurring payments to the same party");
    }

    if findings.wash_trading.detected {
        out.push("Avoid sending funds back and forth with the same address");
    }

    let assets = &findings.identity_assets;
    if !assets.domains.is_empty() {
        out.push("Move name-service domains to a separate public-facing wallet");
    }
    if !assets.poaps.is_empty() {
        out.push("Keep event badges (POAPs) in a wallet separate from your funds");
    }
    if !assets.nfts.is_empty() {
        out.push("Hold collectibles in a dedicated wallet");
    }

    match findings.compliance.status {
        ComplianceStatus::Sanctioned => {
            out.push("Stop using this wallet and consult a compliance professional")
        }
        ComplianceStatus::Flagged => {
            out.push("Expect enhanced due diligence from exchanges when moving these funds")
        }
        ComplianceStatus::Clean | ComplianceStatus::Unknown => {}
    }

    if !findings.counterparties.sanctioned.is_empty() {
        out.push("Stop interacting with sanctioned addresses");
    }
    if !findings.counterparties.flagged.is_empty() {
        out.push("Review transfers involving flagged addresses");
    }

    if out.is_empty() {
        out.push("No significant exposure found. Keep separating wallets by purpose");
    }

    let mut unique: Vec<String> = Vec::with_capacity(out.len());
    for rec in out {
        if !unique.iter().any(|r| r == rec) {
            unique.push(rec.to_string());
        }
    }
    unique
}
