//! Privacy analyzer - runs the detection pipeline for one wallet
//!
//! Pipeline:
//! 1. Validate the address (invalid input yields a degraded report)
//! 2. Run the content detectors over the same transaction slice
//! 3. Screen the wallet and its counterparties
//! 4. Aggregate into a score, tier, warnings and recommendations
//!
//! The analyzer owns no global state. The data source and screening backend
//! are injected, so tests and demos swap them freely.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::chain::{counterparty_interactions, short, validate_address, Transaction};
use crate::config::{AnalysisConfig, Config};
use crate::detect::{
    guarded, screen_batch, ClusteringDetector, ComplianceResult, ComplianceScreener,
    ExchangeDetector, IdentityAssetDetector, ScreeningService, WashTradingDetector,
};
use crate::report::{Report, ReportMetadata, ScanMode};
use crate::scoring::{Findings, RiskAggregator};
use crate::source::{DemoSource, TransactionSource};

/// Wallet privacy analyzer
pub struct PrivacyAnalyzer {
    source: Arc<dyn TransactionSource>,
    screener: Arc<dyn ScreeningService>,
    analysis: AnalysisConfig,
    transaction_limit: u32,
    aggregator: RiskAggregator,
}

impl PrivacyAnalyzer {
    pub fn new(
        source: Arc<dyn TransactionSource>,
        screener: Arc<dyn ScreeningService>,
        config: &Config,
    ) -> Self {
        Self {
            source,
            screener,
            analysis: config.analysis.clone(),
            transaction_limit: config.source.transaction_limit,
            aggregator: RiskAggregator,
        }
    }

    /// Analyzer over synthetic demo data with the fixture screener
    pub fn demo(config: &Config) -> Self {
        Self::new(Arc::new(DemoSource), Arc::new(ComplianceScreener), config)
    }

    /// Fetch history from the data source and analyze it
    ///
    /// A failed fetch is logged and replaced by an empty history; the report
    /// is then marked `Offline`.
    pub async fn scan(&self, address: &str) -> Report {
        let started = Instant::now();

        if let Err(e) = validate_address(address) {
            warn!(error = %e, "Rejected scan request");
            return Report::invalid_address(address, &e, self.source.mode());
        }

        let (transactions, mode) = match self
            .source
            .fetch_transactions(address, self.transaction_limit)
            .await
        {
            Ok(txs) => (txs, self.source.mode()),
            Err(e) => {
                warn!(
                    address = %short(address),
                    error = %e,
                    "Transaction history unavailable, analyzing empty history"
                );
                (Vec::new(), ScanMode::Offline)
            }
        };

        let balance = match self.source.fetch_balance(address).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                debug!(address = %short(address), error = %e, "Balance unavailable");
                None
            }
        };

        let mut report = self.analyze_as(address, &transactions, mode).await;
        report.metadata.balance_sol = balance;
        report.metadata.duration_ms = started.elapsed().as_millis() as u64;
        report
    }

    /// Analyze a caller-supplied history
    pub async fn analyze(&self, address: &str, transactions: &[Transaction]) -> Report {
        self.analyze_as(address, transactions, ScanMode::Provided).await
    }

    /// Screen a single address with the configured backend
    pub async fn screen(&self, address: &str) -> ComplianceResult {
        match self.screener.screen(address).await {
            Ok(result) => result,
            Err(e) => {
                warn!(address = %short(address), error = %e, "Screening failed");
                ComplianceResult::unknown(address, format!("Screening unavailable: {}", e))
            }
        }
    }

    async fn analyze_as(
        &self,
        address: &str,
        transactions: &[Transaction],
        mode: ScanMode,
    ) -> Report {
        let started = Instant::now();

        if let Err(e) = validate_address(address) {
            warn!(error = %e, "Rejected analysis request");
            return Report::invalid_address(address, &e, mode);
        }

        info!(
            address = %short(address),
            transactions = transactions.len(),
            mode = %mode,
            "Analyzing wallet"
        );

        let clustering = ClusteringDetector::new(self.analysis.clustering.clone());
        let exchange = guarded(&ExchangeDetector::default(), transactions, address);
        let clustering = guarded(&clustering, transactions, address);
        let wash_trading = guarded(&WashTradingDetector, transactions, address);
        let identity_assets = guarded(&IdentityAssetDetector, transactions, address);

        let compliance = self.screen(address).await;
        let counterparties = screen_batch(
            self.screener.as_ref(),
            self.counterparties_to_screen(transactions, address),
            self.analysis.screening_concurrency,
        )
        .await;

        let findings = Findings {
            exchange,
            clustering,
            wash_trading,
            identity_assets,
            compliance,
            counterparties,
        };
        let assessment = self.aggregator.assess(&findings);

        info!(
            address = %short(address),
            score = assessment.score,
            risk_level = %assessment.risk_level,
            warnings = assessment.warnings.len(),
            "Analysis complete"
        );
        for deduction in &assessment.breakdown.deductions {
            debug!(points = deduction.points, reason = %deduction.reason, "Score deduction");
        }

        let mut metadata = ReportMetadata::new(mode, transactions.len());
        metadata.duration_ms = started.elapsed().as_millis() as u64;

        Report::new(address, assessment, findings, metadata)
    }

    /// Distinct counterparties, most frequent first, capped by configuration
    fn counterparties_to_screen(&self, transactions: &[Transaction], address: &str) -> Vec<String> {
        let mut ranked: Vec<(String, u32)> =
            counterparty_interactions(transactions, address).into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let limit = self.analysis.max_counterparties_screened.unwrap_or(ranked.len());
        ranked.into_iter().take(limit).map(|(a, _)| a).collect()
    }
}
