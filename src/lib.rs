//! Wallet Privacy Scanner Library
//!
//! Scores the on-chain privacy exposure of a Solana wallet from its
//! transaction history.

pub mod analyzer;
pub mod chain;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod report;
pub mod scoring;
pub mod source;

// Re-export commonly used types
pub use analyzer::PrivacyAnalyzer;
pub use config::Config;
pub use error::{Error, Result};
pub use report::{Report, ScanMode};
pub use scoring::{RiskLevel, Severity, Warning};
