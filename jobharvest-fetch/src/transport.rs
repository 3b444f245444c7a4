//! The I/O seam of the engine.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;
use crate::request::{HttpRequest, RawResponse};

/// Carries a request to a source and returns whatever came back.
///
/// Implementations return non-2xx responses as `Ok`; status checks happen
/// in [`execute_checked`] so every transport is treated alike.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes one request.
    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, FetchError>;
}

/// Executes a request with a timeout and rejects non-2xx responses.
///
/// An elapsed timeout is reported as [`FetchError::Timeout`], the same way
/// any other failed fetch is.
pub async fn execute_checked(
    transport: &dyn Transport,
    request: &HttpRequest,
    timeout: Duration,
) -> Result<RawResponse, FetchError> {
    let response = tokio::time::timeout(timeout, transport.execute(request))
        .await
        .map_err(|_| FetchError::Timeout(timeout))??;

    if !response.is_success() {
        debug!(url = %request.url, status = response.status, "Non-success response");
        return Err(FetchError::Status {
            code: response.status,
        });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTransport;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_fetch_error() {
        let transport = MockTransport::new().with_latency(Duration::from_secs(10));
        transport.respond("mock://slow", RawResponse::new(200, "{}"));

        let result = execute_checked(
            &transport,
            &HttpRequest::get("mock://slow"),
            Duration::from_secs(1),
        )
        .await;

        assert!(matches!(result, Err(FetchError::Timeout(d)) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_status_rejected() {
        let transport = MockTransport::new();
        transport.respond("mock://busy", RawResponse::new(429, "slow down"));

        let result = execute_checked(
            &transport,
            &HttpRequest::get("mock://busy"),
            Duration::from_secs(1),
        )
        .await;

        assert!(matches!(result, Err(FetchError::Status { code: 429 })));
    }
}
