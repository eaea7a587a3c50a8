use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Initial delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 doubles the delay each time)
    pub backoff_multiplier: f64,
    /// Extra multiplier applied to the pending delay when the failure was a rate limit
    pub rate_limit_multiplier: f64,
}

/// How a failed attempt should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Transient failure, retry after the normal backoff
    Retry,
    /// The remote side is rate-limiting us, retry after an escalated backoff
    RateLimited,
    /// Permanent failure, give up immediately
    Abort,
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            rate_limit_multiplier: 2.0,
        }
    }

    /// Set the number of attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay before the first retry
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Set the maximum delay between retries
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Preset: whole-document requests to the translate function (3 attempts)
    /// Delays: 1s, 2s = 3s total wait time (doubled again under rate limiting)
    pub fn translate_request() -> Self {
        Self::new(3, Duration::from_secs(1))
    }

    /// Preset: per-string provider calls (3 attempts)
    /// Delays: 2s, 4s = 6s total wait time
    pub fn provider_call() -> Self {
        Self::new(3, Duration::from_secs(2)).with_max_delay(Duration::from_secs(16))
    }

    /// Calculate the delay for a given attempt number (0-indexed) when no
    /// rate limiting was signalled
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }

    fn scale(&self, delay: Duration, factor: f64) -> Duration {
        let scaled = Duration::from_millis((delay.as_millis() as f64 * factor) as u64);
        scaled.min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::translate_request()
    }
}

/// Running backoff state for one retried operation.
///
/// A rate-limited failure escalates the pending delay, and the escalated
/// value is what keeps doubling afterwards.
#[derive(Debug)]
struct Backoff<'a> {
    config: &'a RetryConfig,
    next: Duration,
}

impl<'a> Backoff<'a> {
    fn new(config: &'a RetryConfig) -> Self {
        Self {
            config,
            next: config.delay_for_attempt(1),
        }
    }

    fn next_delay(&mut self, rate_limited: bool) -> Duration {
        let delay = if rate_limited {
            self.config.scale(self.next, self.config.rate_limit_multiplier)
        } else {
            self.next
        };
        self.next = self.config.scale(delay, self.config.backoff_multiplier);
        delay
    }
}

/// Execute an async operation with retries, using a classifier to decide
/// whether (and how urgently) a failure may be retried
///
/// # Arguments
/// * `config` - Retry configuration (max_attempts must be >= 1)
/// * `operation_name` - Name of the operation for logging
/// * `operation` - Async closure that returns Result<T, E>
/// * `classify` - Maps an error to a [`RetryDecision`]
///
/// # Returns
/// The result of the operation, or the last error if all retries failed
///
/// # Panics
/// Panics if `config.max_attempts` is 0
pub async fn with_retry_classified<T, E, F, Fut, C>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    classify: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    C: Fn(&E) -> RetryDecision,
{
    assert!(
        config.max_attempts >= 1,
        "RetryConfig.max_attempts must be >= 1, got {}",
        config.max_attempts
    );

    let mut backoff = Backoff::new(config);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "{}: Succeeded on attempt {}/{}",
                        operation_name,
                        attempt + 1,
                        config.max_attempts
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                let decision = classify(&e);
                if decision == RetryDecision::Abort {
                    debug!(
                        "{}: Error is not retryable, failing immediately: {}",
                        operation_name, e
                    );
                    return Err(e);
                }

                let remaining = config.max_attempts - attempt - 1;
                if remaining == 0 {
                    warn!(
                        "{}: All {} attempts failed. Last error: {}",
                        operation_name, config.max_attempts, e
                    );
                    return Err(e);
                }

                warn!(
                    "{}: Attempt {}/{} failed ({}), {} retries remaining",
                    operation_name,
                    attempt + 1,
                    config.max_attempts,
                    e,
                    remaining
                );

                let delay = backoff.next_delay(decision == RetryDecision::RateLimited);
                debug!(
                    "{}: Retry attempt {}/{} after {:?}",
                    operation_name,
                    attempt + 2,
                    config.max_attempts,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
