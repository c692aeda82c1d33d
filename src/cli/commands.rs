//! CLI command implementations

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::analyzer::PrivacyAnalyzer;
use crate::chain::{validate_address, Transaction};
use crate::config::Config;
use crate::detect::{ComplianceScreener, ComplianceStatus};
use crate::report::Report;
use crate::scoring::RiskLevel;
use crate::source::{HeliusClient, TransactionSource};

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    PrettyJson,
}

/// Scan a wallet and print its privacy report
pub async fn scan(
    config: &Config,
    address: &str,
    demo: bool,
    transactions: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let report = match transactions {
        Some(path) => {
            let history = load_transactions(path).await?;
            info!(path = %path.display(), count = history.len(), "Loaded transaction history");
            // Caller-supplied history; the analyzer's source is not consulted
            PrivacyAnalyzer::demo(config).analyze(address, &history).await
        }
        None => build_analyzer(config, demo)?.scan(address).await,
    };

    print_report(&report, format)
}

/// Screen a single address for sanctions and flags
pub async fn screen(config: &Config, address: &str) -> Result<()> {
    validate_address(address)?;

    let result = PrivacyAnalyzer::demo(config).screen(address).await;

    println!("\n=== COMPLIANCE SCREENING ===\n");
    println!("Address:    {}", result.address);
    println!("Status:     {}", result.status);
    println!("Risk score: {}/100", result.risk_score);
    for flag in &result.flags {
        println!("  - {}", flag);
    }
    if result.status == ComplianceStatus::Sanctioned {
        println!("\nWARNING: interacting with this address may violate sanctions regulations.");
    }
    println!("\nFixture-based screening; not a legal determination.");

    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

fn build_analyzer(config: &Config, demo: bool) -> Result<PrivacyAnalyzer> {
    if demo {
        info!("Using synthetic demo data");
        return Ok(PrivacyAnalyzer::demo(config));
    }

    if !config.has_live_source() {
        warn!("No Helius API key configured (PRIVSCAN_SOURCE__HELIUS_API_KEY), using demo data");
        return Ok(PrivacyAnalyzer::demo(config));
    }

    let source: Arc<dyn TransactionSource> = Arc::new(HeliusClient::new(&config.source)?);
    Ok(PrivacyAnalyzer::new(source, Arc::new(ComplianceScreener), config))
}

/// Read a JSON array of enhanced transactions
async fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Cannot read transactions file {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Invalid transactions JSON in {}", path.display()))
}

fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", report.to_json(false)?),
        OutputFormat::PrettyJson => println!("{}", report.to_json(true)?),
        OutputFormat::Text => print_summary(report),
    }
    Ok(())
}

fn print_summary(report: &Report) {
    let marker = match report.risk_level {
        RiskLevel::Critical => "!!!",
        RiskLevel::High => "!!",
        RiskLevel::Medium => "!",
        RiskLevel::Low => "",
    };

    println!("\n=== PRIVACY REPORT ===\n");
    println!("Address:   {}", report.address);
    println!("Score:     {}/100", report.score);
    println!("Risk:      {} {}", report.risk_level, marker);
    println!("           {}", report.description);
    println!(
        "Data:      {} transactions ({} mode)",
        report.metadata.transaction_count, report.metadata.mode
    );
    if let Some(balance) = report.metadata.balance_sol {
        println!("Balance:   {:.4} SOL", balance);
    }

    if !report.breakdown.deductions.is_empty() {
        println!("\n=== SCORE BREAKDOWN ===\n");
        for deduction in &report.breakdown.deductions {
            println!("  -{:>3}  {}", deduction.points, deduction.reason);
        }
    }

    if !report.warnings.is_empty() {
        println!("\n=== WARNINGS ===\n");
        for warning in &report.warnings {
            println!("[{}] {}", warning.severity.to_string().to_uppercase(), warning.title);
            println!("    {}", warning.message);
        }
    }

    println!("\n=== RECOMMENDATIONS ===\n");
    for (i, rec) in report.recommendations.iter().enumerate() {
        println!("  {}. {}", i + 1, rec);
    }
    println!();
}
