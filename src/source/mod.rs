//! Transaction data sources
//!
//! The analyzer never talks to an indexer directly; it receives a
//! [`TransactionSource`] so live, demo and test data are interchangeable.

use async_trait::async_trait;

use crate::chain::Transaction;
use crate::error::Result;
use crate::report::ScanMode;

pub mod demo;
pub mod helius;

pub use demo::DemoSource;
pub use helius::HeliusClient;

/// Provider of wallet transaction history and balance
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Most recent transactions touching `address`, newest first
    async fn fetch_transactions(&self, address: &str, limit: u32) -> Result<Vec<Transaction>>;

    /// Native balance in SOL
    async fn fetch_balance(&self, address: &str) -> Result<f64>;

    /// Mode recorded in reports built from this source
    fn mode(&self) -> ScanMode;
}
