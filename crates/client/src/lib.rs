//! Chain client capability for read-only JSON-RPC queries.
//!
//! Everything the watchdog learns about the chain goes through
//! [`ChainClient::call_latest`]: a method name plus a single target argument,
//! evaluated against the `latest` block.

use alloy_provider::{Provider, ProviderBuilder};
use serde_json::Value;
use std::{future::Future, time::Duration};
use thiserror::Error;
use tracing::trace;

/// Block tag every query is evaluated at.
pub const BLOCK_TAG: &str = "latest";

/// Default bound on a single RPC round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// The endpoint returned an error or could not be reached
    #[error("RPC {method} failed: {reason}")]
    Transport { method: &'static str, reason: String },

    /// The endpoint did not answer in time
    #[error("RPC {method} timed out after {timeout:?}")]
    Timeout {
        method: &'static str,
        timeout: Duration,
    },
}

/// Read-only access to an EVM chain.
pub trait ChainClient: Send + Sync {
    /// Invoke `method` with `[target, "latest"]` and return the raw JSON result.
    ///
    /// `target` is an address string for `eth_getBalance` or a call object for
    /// `eth_call`.
    fn call_latest(
        &self,
        method: &'static str,
        target: Value,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send;
}

/// [`ChainClient`] backed by an alloy provider, with a per-call timeout.
#[derive(Debug, Clone)]
pub struct RpcChainClient<P> {
    provider: P,
    timeout: Duration,
}

impl<P> RpcChainClient<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<P> ChainClient for RpcChainClient<P>
where
    P: Provider + Clone,
{
    async fn call_latest(&self, method: &'static str, target: Value) -> Result<Value, ClientError> {
        trace!(method, %target, "Sending RPC request");

        let request = self
            .provider
            .raw_request::<_, Value>(method.into(), (target, BLOCK_TAG));

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ClientError::Transport {
                method,
                reason: e.to_string(),
            }),
            Err(_) => Err(ClientError::Timeout {
                method,
                timeout: self.timeout,
            }),
        }
    }
}

/// Convenience function to create an ethereum rpc provider from url.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Create an [`RpcChainClient`] for `rpc_url` with the given per-call timeout.
pub fn create_chain_client(
    rpc_url: &str,
    timeout: Duration,
) -> Result<RpcChainClient<impl Provider + Clone>, ClientError> {
    let provider = create_provider(rpc_url)?;
    Ok(RpcChainClient::new(provider, timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url() {
        let result = create_provider("not a url");
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let client = create_chain_client("http://127.0.0.1:1", Duration::from_secs(5))
            .expect("valid url");

        let err = client
            .call_latest("eth_getBalance", Value::from("0x0000000000000000000000000000000000000000"))
            .await
            .expect_err("nothing listens on port 1");

        assert!(matches!(
            err,
            ClientError::Transport { method: "eth_getBalance", .. } | ClientError::Timeout { .. }
        ));
    }
}
