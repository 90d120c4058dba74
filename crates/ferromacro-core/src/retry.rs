//! Retry logic with exponential backoff and jitter.

use std::time::Duration;

use crate::http_client::{HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse};

/// Backoff strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed { delay: Duration },
    /// `base * factor^attempt`, capped at `max`, optionally jittered by +/- 50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            factor: 2.0,
            max: Duration::from_secs(4),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let seconds = base.as_secs_f64() * factor.powi(exponent);
                let capped = Duration::from_secs_f64(seconds.min(max.as_secs_f64()));

                if !jitter {
                    return capped;
                }

                let millis = u64::try_from(capped.as_millis()).unwrap_or(u64::MAX);
                let spread = millis / 2;
                let offset = fastrand::u64(0..=spread.saturating_mul(2));
                Duration::from_millis((millis + offset).saturating_sub(spread))
            }
        }
    }
}

/// When and how often a provider call is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retry_on_status: Vec<u16>,
    pub retry_on_timeout: bool,
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

impl RetryConfig {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    pub fn should_retry_error(&self, error: &HttpError) -> bool {
        match error.kind() {
            HttpErrorKind::Timeout => self.retry_on_timeout,
            HttpErrorKind::Connect => self.retry_on_connect,
            HttpErrorKind::Body | HttpErrorKind::Other => false,
        }
    }
}

/// Execute `request`, retrying transient failures per `config`.
///
/// The last response (even a retryable error status) or the last transport
/// error is returned once attempts run out.
pub async fn execute_with_retry(
    client: &dyn HttpClient,
    request: HttpRequest,
    config: &RetryConfig,
) -> Result<HttpResponse, HttpError> {
    let mut attempt = 0;
    loop {
        let outcome = client.execute(request.clone()).await;
        let retry = match &outcome {
            Ok(response) => config.should_retry_status(response.status),
            Err(error) => config.should_retry_error(error),
        };

        if !retry || attempt >= config.max_retries {
            return outcome;
        }

        let delay = config.backoff.delay(attempt);
        match &outcome {
            Ok(response) => tracing::warn!(
                url = %request.redacted_url(),
                status = response.status,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "retrying after retryable status"
            ),
            Err(error) => tracing::warn!(
                url = %request.redacted_url(),
                error = %error,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "retrying after transport error"
            ),
        }
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::FixtureHttpClient;

    #[test]
    fn exponential_backoff_without_jitter_doubles_and_caps() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_millis(350),
            jitter: false,
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(2), Duration::from_millis(350));
    }

    #[test]
    fn jittered_backoff_stays_within_half_spread() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: true,
        };

        for _ in 0..50 {
            let delay = backoff.delay(0);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(300));
        }
    }

    #[tokio::test]
    async fn retries_retryable_status_until_success() {
        let client = FixtureHttpClient::new().with_sequence(
            "/data",
            vec![
                Ok(HttpResponse::new(503, "busy")),
                Ok(HttpResponse::new(429, "slow down")),
                Ok(HttpResponse::ok_json("{}")),
            ],
        );
        let config = RetryConfig::fixed(Duration::ZERO, 3);

        let response = execute_with_retry(&client, HttpRequest::get("https://x.test/data"), &config)
            .await
            .expect("eventually succeeds");

        assert_eq!(response.status, 200);
        assert_eq!(client.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let client = FixtureHttpClient::new()
            .with_sequence("/data", vec![Err(HttpError::timeout("slow"))]);
        let config = RetryConfig::fixed(Duration::ZERO, 2);

        let error = execute_with_retry(&client, HttpRequest::get("https://x.test/data"), &config)
            .await
            .expect_err("all attempts time out");

        assert_eq!(error.kind(), HttpErrorKind::Timeout);
        assert_eq!(client.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let client =
            FixtureHttpClient::new().with_route("/data", HttpResponse::new(400, "bad request"));
        let config = RetryConfig::fixed(Duration::ZERO, 5);

        let response = execute_with_retry(&client, HttpRequest::get("https://x.test/data"), &config)
            .await
            .expect("transport succeeds");

        assert_eq!(response.status, 400);
        assert_eq!(client.recorded_requests().len(), 1);
    }
}
