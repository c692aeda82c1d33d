//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub use crate::detect::ClusteringConfig;
use crate::detect::clustering::MIN_INTERACTIONS_FLOOR;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Transaction data source (Helius)
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Helius API key; empty means no live source
    #[serde(default)]
    pub helius_api_key: String,
    #[serde(default = "default_rest_base_url")]
    pub rest_base_url: String,
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Transactions fetched per scan
    #[serde(default = "default_transaction_limit")]
    pub transaction_limit: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            helius_api_key: String::new(),
            rest_base_url: default_rest_base_url(),
            rpc_url: default_rpc_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            transaction_limit: default_transaction_limit(),
        }
    }
}

impl SourceConfig {
    /// RPC endpoint with the API key attached
    pub fn rpc_endpoint(&self) -> String {
        if self.helius_api_key.is_empty() || self.rpc_url.contains("api-key=") {
            self.rpc_url.clone()
        } else {
            let sep = if self.rpc_url.contains('?') { '&' } else { '?' };
            format!("{}{}api-key={}", self.rpc_url, sep, self.helius_api_key)
        }
    }
}

/// Analysis pipeline settings
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Concurrent counterparty screenings
    #[serde(default = "default_screening_concurrency")]
    pub screening_concurrency: usize,
    /// Cap on counterparties screened per scan (most frequent first);
    /// unset screens every counterparty
    #[serde(default)]
    pub max_counterparties_screened: Option<usize>,
    #[serde(default)]
    pub clustering: ClusteringConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            screening_concurrency: default_screening_concurrency(),
            max_counterparties_screened: None,
            clustering: ClusteringConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human format
    #[serde(default)]
    pub json: bool,
}

fn default_rest_base_url() -> String {
    "https://api.helius.xyz".to_string()
}

fn default_rpc_url() -> String {
    "https://mainnet.helius-rpc.com/".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_transaction_limit() -> u32 {
    100
}

fn default_screening_concurrency() -> usize {
    8
}

impl Config {
    /// Load configuration from file and environment
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("source.rest_base_url", default_rest_base_url())?
            .set_default("source.rpc_url", default_rpc_url())?
            .set_default("source.timeout_ms", default_timeout_ms() as i64)?
            .set_default("source.max_retries", default_max_retries() as i64)?
            .set_default("source.transaction_limit", default_transaction_limit() as i64)?
            .set_default(
                "analysis.screening_concurrency",
                default_screening_concurrency() as i64,
            )?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix PRIVSCAN_)
            .add_source(
                config::Environment::with_prefix("PRIVSCAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.rest_base_url)
            .with_context(|| format!("Invalid rest_base_url: {}", self.source.rest_base_url))?;
        url::Url::parse(&self.source.rpc_url)
            .with_context(|| format!("Invalid rpc_url: {}", mask_url(&self.source.rpc_url)))?;

        if self.source.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be positive");
        }

        if self.source.max_retries > 10 {
            anyhow::bail!("max_retries cannot exceed 10, got {}", self.source.max_retries);
        }

        // Helius caps the enhanced transactions endpoint at 100 per page
        if self.source.transaction_limit == 0 || self.source.transaction_limit > 100 {
            anyhow::bail!(
                "transaction_limit must be between 1 and 100, got {}",
                self.source.transaction_limit
            );
        }

        if self.analysis.screening_concurrency == 0 {
            anyhow::bail!("screening_concurrency must be positive");
        }

        if self.analysis.clustering.min_interactions < MIN_INTERACTIONS_FLOOR {
            anyhow::bail!(
                "clustering.min_interactions must be at least {}, got {}",
                MIN_INTERACTIONS_FLOOR,
                self.analysis.clustering.min_interactions
            );
        }

        if self.analysis.clustering.top_n == 0 {
            anyhow::bail!("clustering.top_n must be positive");
        }

        Ok(())
    }

    /// Whether a live data source is configured
    pub fn has_live_source(&self) -> bool {
        !self.source.helius_api_key.is_empty() || self.source.rpc_url.contains("api-key=")
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Source:
    helius_api_key: {}
    rest_base_url: {}
    rpc_url: {}
    timeout: {}ms
    max_retries: {}
    transaction_limit: {}
  Analysis:
    screening_concurrency: {}
    max_counterparties_screened: {}
    clustering.min_interactions: {}
    clustering.top_n: {}
  Logging:
    json: {}
"#,
            if self.source.helius_api_key.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            self.source.rest_base_url,
            mask_url(&self.source.rpc_url),
            self.source.timeout_ms,
            self.source.max_retries,
            self.source.transaction_limit,
            self.analysis.screening_concurrency,
            self.analysis
                .max_counterparties_screened
                .map(|n| n.to_string())
                .unwrap_or_else(|| "(all)".to_string()),
            self.analysis.clustering.min_interactions,
            self.analysis.clustering.top_n,
            self.logging.json,
        )
    }
}

/// Mask URL for display (hide API keys in query params)
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            analysis: AnalysisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.screening_concurrency, 8);
        assert_eq!(config.source.transaction_limit, 100);
        assert!(!config.has_live_source());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[source]
helius_api_key = "file-key"
transaction_limit = 25

[analysis]
screening_concurrency = 2
max_counterparties_screened = 20

[analysis.clustering]
min_interactions = 8
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.helius_api_key, "file-key");
        assert_eq!(config.source.transaction_limit, 25);
        assert_eq!(config.analysis.screening_concurrency, 2);
        // untouched keys keep their defaults
        assert_eq!(config.source.timeout_ms, 10_000);
        assert_eq!(config.analysis.max_counterparties_screened, Some(20));
        assert_eq!(config.analysis.clustering.min_interactions, 8);
        assert_eq!(config.analysis.clustering.top_n, 5);
        assert!(config.has_live_source());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.source.rest_base_url, "https://api.helius.xyz");
        assert_eq!(config.analysis.max_counterparties_screened, None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.source.transaction_limit = 500;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.source.rpc_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.screening_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_enforces_clustering_minimum() {
        let mut config = Config::default();
        config.analysis.clustering.min_interactions = 0;
        assert!(config.validate().is_err());

        config.analysis.clustering.min_interactions = 4;
        assert!(config.validate().is_err());

        config.analysis.clustering.min_interactions = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rpc_endpoint_appends_key() {
        let mut source = SourceConfig::default();
        assert_eq!(source.rpc_endpoint(), "https://mainnet.helius-rpc.com/");

        source.helius_api_key = "abc".to_string();
        assert_eq!(source.rpc_endpoint(), "https://mainnet.helius-rpc.com/?api-key=abc");
    }

    #[test]
    fn test_masked_display_hides_key() {
        let mut config = Config::default();
        config.source.helius_api_key = "secret-key".to_string();
        config.source.rpc_url = "https://mainnet.helius-rpc.com/?api-key=secret-key".to_string();

        let shown = config.masked_display();
        assert!(!shown.contains("secret-key"));
        assert!(shown.contains("***"));
    }

    #[test]
    fn test_mask_url() {
        assert_eq!(
            mask_url("https://api.example.com?key=secret"),
            "https://api.example.com?***"
        );
        assert_eq!(mask_url("https://api.example.com"), "https://api.example.com");
    }
}
