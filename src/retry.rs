use std::time::Duration;

use log::{debug, warn};
use reqwest::{RequestBuilder, Response, StatusCode};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::error::PantryError;

/// Retry behavior for one upstream call.
///
/// Only the 502 gateway status is considered transient; rate-limit and
/// gateway-timeout statuses are deliberately left fatal to match the observed
/// upstream behavior (see DESIGN.md).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Backoff grows linearly: `base_delay * attempt_number`.
    pub base_delay: Duration,
    /// Per-attempt timeout, independent of the backoff schedule.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Send a request, retrying transient failures with linear backoff.
///
/// A success response is returned immediately. A 502 status or a transport
/// error is retried while attempts remain; any other non-success status is
/// fatal on first sight. The terminal error always carries the last observed
/// status and body. Cancelling the token stops the remaining retry budget
/// from being consumed, including mid-flight and mid-backoff.
pub async fn retry_fetch(
    request: RequestBuilder,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<Response, PantryError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        if cancel.is_cancelled() {
            return Err(PantryError::Cancelled);
        }

        let builder = request
            .try_clone()
            .ok_or_else(|| PantryError::ProviderConfig("request body must be cloneable".into()))?;

        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(PantryError::Cancelled),
            sent = timeout(policy.request_timeout, builder.send()) => sent,
        };

        let error = match outcome {
            Ok(Ok(response)) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }
                let body = response.text().await.unwrap_or_default();
                warn!(
                    "upstream returned {} (attempt {}/{}): {}",
                    status, attempt, policy.max_attempts, body
                );
                if status != StatusCode::BAD_GATEWAY {
                    // Fatal on first sight, no retry.
                    return Err(PantryError::Upstream {
                        status: status.as_u16(),
                        body,
                    });
                }
                PantryError::Upstream {
                    status: status.as_u16(),
                    body,
                }
            }
            Ok(Err(transport)) => {
                warn!(
                    "request failed (attempt {}/{}): {}",
                    attempt, policy.max_attempts, transport
                );
                PantryError::Http(transport)
            }
            Err(_elapsed) => {
                warn!(
                    "request timed out after {:?} (attempt {}/{})",
                    policy.request_timeout, attempt, policy.max_attempts
                );
                PantryError::Timeout(policy.request_timeout.as_secs())
            }
        };

        if attempt >= policy.max_attempts {
            return Err(error);
        }

        let delay = policy.base_delay * attempt;
        debug!("waiting {:?} before retry", delay);
        tokio::select! {
            _ = cancel.cancelled() => return Err(PantryError::Cancelled),
            _ = sleep(delay) => {}
        }
    }
}
