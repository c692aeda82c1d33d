//! Privacy report - the serializable output of one analysis

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::scoring::{
    Assessment, Findings, RiskLevel, ScoreBreakdown, Severity, Warning, WarningCategory,
};

/// Where the analyzed transactions came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Fetched from the live indexer
    Live,
    /// Synthetic demo history
    Demo,
    /// Fetch failed; analyzed an empty history
    Offline,
    /// Supplied by the caller
    Provided,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScanMode::Live => "live",
            ScanMode::Demo => "demo",
            ScanMode::Offline => "offline",
            ScanMode::Provided => "provided",
        };
        f.write_str(label)
    }
}

/// Run metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub report_id: Uuid,
    /// RFC 3339
    pub analyzed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub mode: ScanMode,
    pub transaction_count: usize,
    /// Display only, never scored
    pub balance_sol: Option<f64>,
}

impl ReportMetadata {
    pub fn new(mode: ScanMode, transaction_count: usize) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            duration_ms: 0,
            mode,
            transaction_count,
            balance_sol: None,
        }
    }
}

/// Full privacy report for one wallet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub address: String,
    pub score: u32,
    pub risk_level: RiskLevel,
    pub description: String,
    pub warnings: Vec<Warning>,
    pub recommendations: Vec<String>,
    pub breakdown: ScoreBreakdown,
    pub results: Findings,
    pub metadata: ReportMetadata,
}

impl Report {
    pub fn new(
        address: &str,
        assessment: Assessment,
        results: Findings,
        metadata: ReportMetadata,
    ) -> Self {
        Self {
            address: address.to_string(),
            score: assessment.score,
            risk_level: assessment.risk_level,
            description: assessment.description,
            warnings: assessment.warnings,
            recommendations: assessment.recommendations,
            breakdown: assessment.breakdown,
            results,
            metadata,
        }
    }

    /// Degraded report for an address that failed validation
    pub fn invalid_address(address: &str, error: &crate::error::Error, mode: ScanMode) -> Self {
        let risk_level = RiskLevel::Critical;
        Self {
            address: address.to_string(),
            score: 0,
            risk_level,
            description: risk_level.description().to_string(),
            warnings: vec![Warning::new(
                Severity::Critical,
                WarningCategory::Input,
                "Invalid address",
                error.to_string(),
            )],
            recommendations: vec![
                "Check the address and try again with a valid Solana address".to_string(),
            ],
            breakdown: ScoreBreakdown {
                deductions: Vec::new(),
                score: 0,
            },
            results: Findings::default(),
            metadata: ReportMetadata::new(mode, 0),
        }
    }

    /// Warnings at or above `severity`
    pub fn warnings_at_least(&self, severity: Severity) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.severity >= severity)
    }

    /// Serialize to JSON
    pub fn to_json(&self, pretty: bool) -> crate::error::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_invalid_address_report() {
        let err = Error::InvalidAddress("abc".to_string());
        let report = Report::invalid_address("abc", &err, ScanMode::Provided);

        assert_eq!(report.score, 0);
        assert_eq!(report.risk_level, RiskLevel::Critical);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].severity, Severity::Critical);
        assert!(report.warnings[0].message.contains("Invalid address format"));
        assert_eq!(report.warnings_at_least(Severity::High).count(), 1);
    }

    #[test]
    fn test_json_shape() {
        let err = Error::InvalidAddress("abc".to_string());
        let report = Report::invalid_address("abc", &err, ScanMode::Offline);
        let value: serde_json::Value =
            serde_json::from_str(&report.to_json(false).unwrap()).unwrap();

        assert_eq!(value["risk_level"], "CRITICAL");
        assert_eq!(value["metadata"]["mode"], "offline");
        assert_eq!(value["warnings"][0]["severity"], "critical");

        // RFC 3339 timestamp
        let analyzed_at = value["metadata"]["analyzed_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(analyzed_at).is_ok());
    }
}
