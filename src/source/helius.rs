//! Helius API client for wallet transaction history
//!
//! Provides access to:
//! - Enhanced (parsed) transaction history via the REST API
//! - Native balance via JSON-RPC `getBalance`
//!
//! Transient failures (5xx, 429, timeouts) are retried with exponential
//! backoff up to `max_retries` times.

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::chain::{short, Transaction, LAMPORTS_PER_SOL};
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::report::ScanMode;
use crate::source::TransactionSource;

const RETRY_BASE_DELAY_MS: u64 = 250;

/// Helius API client
pub struct HeliusClient {
    /// HTTP client
    client: Client,
    /// API key
    api_key: String,
    /// Base URL for REST API
    rest_base_url: String,
    /// RPC endpoint including the API key
    rpc_url: String,
    /// Per-request timeout
    timeout: Duration,
    /// Retries after the first attempt
    max_retries: u32,
}

impl HeliusClient {
    /// Create a client from source configuration
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let api_key = if config.helius_api_key.is_empty() {
            api_key_from_url(&config.rpc_url).ok_or_else(|| {
                Error::Config(
                    "helius_api_key is not set and rpc_url carries no api-key".to_string(),
                )
            })?
        } else {
            config.helius_api_key.clone()
        };

        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        let rpc_url = SourceConfig {
            helius_api_key: api_key.clone(),
            ..config.clone()
        }
        .rpc_endpoint();

        Ok(Self {
            client,
            api_key,
            rest_base_url: config.rest_base_url.trim_end_matches('/').to_string(),
            rpc_url,
            timeout,
            max_retries: config.max_retries,
        })
    }

    /// Run a request, retrying transient failures
    async fn with_retry<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(RETRY_BASE_DELAY_MS),
            max_interval: Duration::from_millis(RETRY_BASE_DELAY_MS * 8),
            max_elapsed_time: Some(self.timeout * (self.max_retries + 1)),
            ..Default::default()
        };

        let max_retries = self.max_retries;
        let mut attempt = 0u32;

        retry(backoff, || {
            attempt += 1;
            let current = attempt;
            let request = call();
            async move {
                match request.await {
                    Ok(value) => Ok(value),
                    Err(e) if e.is_retryable() && current <= max_retries => {
                        warn!(operation, attempt = current, error = %e, "Retryable Helius error");
                        Err(backoff::Error::transient(e))
                    }
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            }
        })
        .await
    }

    /// Request URLs carry the API key, so it is stripped before formatting
    fn request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::RpcTimeout(self.timeout.as_millis() as u64)
        } else {
            Error::Rpc(format!("Helius request failed: {}", e.without_url()))
        }
    }

    async fn get_transactions_once(&self, address: &str, limit: u32) -> Result<Vec<Transaction>> {
        let url = format!(
            "{}/v0/addresses/{}/transactions?api-key={}&limit={}",
            self.rest_base_url, address, self.api_key, limit
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        response
            .json()
            .await
            .map_err(|e| {
                Error::Deserialization(format!(
                    "Failed to parse Helius response: {}",
                    e.without_url()
                ))
            })
    }

    async fn get_balance_once(&self, address: &str) -> Result<u64> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": "privscan-balance",
            "method": "getBalance",
            "params": [address]
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let rpc_response: HeliusRpcResponse<BalanceResult> = response
            .json()
            .await
            .map_err(|e| {
                Error::Deserialization(format!(
                    "Failed to parse RPC response: {}",
                    e.without_url()
                ))
            })?;

        if let Some(error) = rpc_response.error {
            return Err(Error::DataUnavailable(format!(
                "Helius RPC error {}: {}",
                error.code, error.message
            )));
        }

        rpc_response
            .result
            .map(|r| r.value)
            .ok_or_else(|| Error::DataUnavailable("No result in getBalance response".to_string()))
    }
}

#[async_trait]
impl TransactionSource for HeliusClient {
    async fn fetch_transactions(&self, address: &str, limit: u32) -> Result<Vec<Transaction>> {
        debug!(address = %short(address), limit, "Fetching transaction history");
        let transactions = self
            .with_retry("transactions", || self.get_transactions_once(address, limit))
            .await?;
        debug!(address = %short(address), count = transactions.len(), "Fetched transactions");
        Ok(transactions)
    }

    async fn fetch_balance(&self, address: &str) -> Result<f64> {
        let lamports = self
            .with_retry("balance", || self.get_balance_once(address))
            .await?;
        Ok(lamports as f64 / LAMPORTS_PER_SOL)
    }

    fn mode(&self) -> ScanMode {
        ScanMode::Live
    }
}

/// Map a non-success HTTP status to an error, transient or not
fn status_error(status: StatusCode, body: String) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS {
        Error::RateLimited(body)
    } else if status.is_server_error() {
        Error::Rpc(format!("Helius API error {}: {}", status, body))
    } else {
        Error::DataUnavailable(format!("Helius API error {}: {}", status, body))
    }
}

/// Extract the API key from a URL like "https://mainnet.helius-rpc.com/?api-key=xxx"
fn api_key_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "api-key")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct HeliusRpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: serde_json::Value,
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct BalanceResult {
    value: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const WALLET: &str = "7Np41oeYqPefeNQEHSv1UDhYrehxin3NStELsSKCT4K2";

    /// Serve `responses` in order, one per connection, then stop
    async fn serve(responses: Vec<(u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    fn client(base: &str, max_retries: u32) -> HeliusClient {
        client_with_key(base, max_retries, "test-key")
    }

    fn client_with_key(base: &str, max_retries: u32, key: &str) -> HeliusClient {
        HeliusClient::new(&SourceConfig {
            helius_api_key: key.to_string(),
            rest_base_url: base.to_string(),
            rpc_url: format!("{}/", base),
            timeout_ms: 2_000,
            max_retries,
            transaction_limit: 10,
        })
        .unwrap()
    }

    #[test]
    fn test_api_key_from_url() {
        assert_eq!(
            api_key_from_url("https://mainnet.helius-rpc.com/?api-key=abc&x=1"),
            Some("abc".to_string())
        );
        assert_eq!(api_key_from_url("https://mainnet.helius-rpc.com/"), None);
        assert_eq!(api_key_from_url("https://mainnet.helius-rpc.com/?api-key="), None);
    }

    #[test]
    fn test_new_requires_key() {
        assert!(matches!(
            HeliusClient::new(&SourceConfig::default()),
            Err(Error::Config(_))
        ));

        let config = SourceConfig {
            rpc_url: "https://mainnet.helius-rpc.com/?api-key=from-url".to_string(),
            ..SourceConfig::default()
        };
        let client = HeliusClient::new(&config).unwrap();
        assert_eq!(client.api_key, "from-url");
    }

    #[test]
    fn test_status_classification() {
        assert!(status_error(StatusCode::TOO_MANY_REQUESTS, String::new()).is_retryable());
        assert!(status_error(StatusCode::BAD_GATEWAY, String::new()).is_retryable());
        assert!(!status_error(StatusCode::UNAUTHORIZED, String::new()).is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_transactions_parses_enhanced_json() {
        let body = r#"[{
            "signature": "sig1",
            "timestamp": 1700000000,
            "description": "transferred 1 SOL",
            "feePayer": "7Np41oeYqPefeNQEHSv1UDhYrehxin3NStELsSKCT4K2",
            "nativeTransfers": [{
                "fromUserAccount": "7Np41oeYqPefeNQEHSv1UDhYrehxin3NStELsSKCT4K2",
                "toUserAccount": "3xEfNpRVjtfNbTYvNR1jXQtVZn8EPeH1dP67GmPLPRnN",
                "amount": 1000000000
            }],
            "tokenTransfers": [],
            "accountData": [],
            "events": {}
        }]"#;
        let base = serve(vec![(200, body)]).await;

        let txs = client(&base, 0).fetch_transactions(WALLET, 10).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].signature, "sig1");
        assert_eq!(txs[0].native_transfers[0].amount, 1_000_000_000);
    }

    #[tokio::test]
    async fn test_transient_error_is_retried() {
        let base = serve(vec![(503, "busy"), (200, "[]")]).await;

        let txs = client(&base, 2).fetch_transactions(WALLET, 10).await.unwrap();
        assert!(txs.is_empty());
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let base = serve(vec![(401, "bad key")]).await;

        let err = client(&base, 3).fetch_transactions(WALLET, 10).await.unwrap_err();
        assert!(matches!(err, Error::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_errors_do_not_leak_api_key() {
        // nothing listens on port 1
        let client = client_with_key("http://127.0.0.1:1", 0, "SUPERSECRETKEY");

        let err = client.fetch_transactions(WALLET, 10).await.unwrap_err();
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{}", err);

        let err = client.fetch_balance(WALLET).await.unwrap_err();
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{}", err);
    }

    #[tokio::test]
    async fn test_decode_error_does_not_leak_api_key() {
        let base = serve(vec![(200, "not json"), (200, "not json")]).await;
        let client = client_with_key(&base, 0, "SUPERSECRETKEY");

        let err = client.fetch_transactions(WALLET, 10).await.unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{}", err);

        let err = client.fetch_balance(WALLET).await.unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{}", err);
    }

    #[tokio::test]
    async fn test_fetch_balance() {
        let body = r#"{"jsonrpc":"2.0","id":"privscan-balance","result":{"context":{"slot":1},"value":2500000000}}"#;
        let base = serve(vec![(200, body)]).await;

        let balance = client(&base, 0).fetch_balance(WALLET).await.unwrap();
        assert!((balance - 2.5).abs() < 1e-9);
    }
}
