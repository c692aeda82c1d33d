//! Privacy-exposure detectors
//!
//! Each detector is a pure function over an already-fetched transaction
//! history. Detectors share no state and never read each other's output, so
//! the orchestrator may run them in any order.
//!
//! A detector reports failure through `Result`; callers go through
//! [`guarded`], which logs the failure and substitutes the detector's
//! zero-risk default so one broken detector never sinks a whole report.

use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::chain::Transaction;
use crate::error::Result;

pub mod assets;
pub mod clustering;
pub mod compliance;
pub mod exchange;
pub mod registry;
pub mod wash_trading;

// Re-exports
pub use assets::{AssetKind, AssetsResult, ExposureLevel, IdentityAsset, IdentityAssetDetector};
pub use clustering::{
    AddressFrequency, ClusteringConfig, ClusteringDetector, ClusteringPattern, ClusteringResult,
};
pub use compliance::{
    screen_batch, BatchScreening, ComplianceResult, ComplianceScreener, ComplianceStatus,
    ScreeningService,
};
pub use exchange::{CexResult, ExchangeDetector, ExchangeInteraction, TransferDirection};
pub use registry::ExchangeRegistry;
pub use wash_trading::{WashTradingDetector, WashTradingPair, WashTradingResult};

/// A content detector over a transaction history
pub trait Detector {
    /// Result type; `Default` must be the documented zero-risk result
    type Output: Default;

    /// Detector name for logging
    fn name(&self) -> &'static str;

    /// Analyze `transactions` from the point of view of `target`
    fn detect(&self, transactions: &[Transaction], target: &str) -> Result<Self::Output>;
}

/// Run a detector, replacing any failure with its zero-risk default
pub fn guarded<D: Detector>(detector: &D, transactions: &[Transaction], target: &str) -> D::Output {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| detector.detect(transactions, target)));

    match outcome {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!(detector = detector.name(), error = %e, "Detector failed, using default result");
            D::Output::default()
        }
        Err(_) => {
            warn!(detector = detector.name(), "Detector panicked, using default result");
            D::Output::default()
        }
    }
}
