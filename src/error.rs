//! Error types for the privacy scanner

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the privacy scanner
#[derive(Error, Debug)]
pub enum Error {
    // Input validation errors
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Data source errors
    #[error("Transaction data unavailable: {0}")]
    DataUnavailable(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("RPC timeout after {0}ms")]
    RpcTimeout(u64),

    #[error("RPC rate limited: {0}")]
    RateLimited(String),

    // Detection errors (never escape a detector boundary)
    #[error("Detector {detector} failed: {reason}")]
    Detector {
        detector: &'static str,
        reason: String,
    },

    // Screening errors
    #[error("Screening failed for {address}: {reason}")]
    Screening { address: String, reason: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Rpc(_) | Error::RpcTimeout(_) | Error::RateLimited(_)
        )
    }

    /// Shorthand for a detector failure
    pub fn detector(detector: &'static str, reason: impl Into<String>) -> Self {
        Error::Detector {
            detector,
            reason: reason.into(),
        }
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Rpc("503".to_string()).is_retryable());
        assert!(Error::RpcTimeout(10_000).is_retryable());
        assert!(Error::RateLimited("429".to_string()).is_retryable());
        assert!(!Error::InvalidAddress("abc".to_string()).is_retryable());
        assert!(!Error::detector("clustering", "boom").is_retryable());
    }

    #[test]
    fn test_detector_error_display() {
        let err = Error::detector("exchange", "bad transfer");
        assert_eq!(err.to_string(), "Detector exchange failed: bad transfer");
    }
}
