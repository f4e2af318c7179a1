use super::{ProviderError, ProviderKind};
use std::time::Duration;
use tracing::warn;

/// Fixed-delay retry schedule for flaky endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Single attempt, used by providers that fail fast.
    pub const NONE: RetryPolicy = RetryPolicy {
        attempts: 1,
        delay: Duration::ZERO,
    };

    pub const fn fixed(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(2))
    }
}

/// Sends the request built by `build` until it returns a 2xx or the attempts run out.
/// Error statuses and transport failures both count as failed attempts; the last
/// failure is returned.
pub(crate) async fn send_with_retry<F>(
    policy: RetryPolicy,
    provider: ProviderKind,
    timeout: Duration,
    mut build: F,
) -> Result<reqwest::Response, ProviderError>
where
    F: FnMut() -> reqwest::RequestBuilder,
{
    let attempts = policy.attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                warn!(%provider, attempt, status, "provider responded with an error status");
                last_error = Some(ProviderError::http(provider, status, &body));
            }
            Err(err) => {
                warn!(%provider, attempt, error = %err, "provider request failed");
                last_error = Some(ProviderError::transport(provider, timeout, err));
            }
        }

        if attempt < attempts && !policy.delay.is_zero() {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(last_error.unwrap_or(ProviderError::Unavailable { provider }))
}
