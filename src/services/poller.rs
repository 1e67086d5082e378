use std::sync::Arc;
use std::time::Duration;

use super::data_source::AssetDataSource;
use crate::error::ApiError;
use crate::models::SummaryPoll;

/// Pacing and bounds for the security summary poll loop
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff_factor: f64,
    pub max_interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            backoff_factor: 1.5,
            max_interval: Duration::from_millis(10_000),
            max_attempts: 30,
        }
    }
}

impl PollPolicy {
    /// Sleep before the poll that follows `attempt` (zero-based).
    /// Factors below 1 (or NaN) count as 1.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let factor = self.backoff_factor.max(1.0);
        let secs = self.interval.as_secs_f64() * factor.powi(exponent);
        if !secs.is_finite() || secs >= self.max_interval.as_secs_f64() {
            return self.max_interval;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(self.max_interval)
    }
}

/// Repeats `poll_security_summary` until the summary settles.
///
/// Stops at the first terminal state (`complete` or `failed`) and returns it.
/// Accessor errors end the loop immediately. Running out of attempts yields
/// [`ApiError::Timeout`]. Dropping the returned future cancels the loop.
pub struct SummaryPoller {
    source: Arc<dyn AssetDataSource>,
    policy: PollPolicy,
}

impl SummaryPoller {
    pub fn new(source: Arc<dyn AssetDataSource>, policy: PollPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub async fn run(&self, key: &str) -> Result<SummaryPoll, ApiError> {
        self.watch(key, |_| {}).await
    }

    /// Poll until terminal, handing every observed state to `observer`
    pub async fn watch<F>(&self, key: &str, mut observer: F) -> Result<SummaryPoll, ApiError>
    where
        F: FnMut(&SummaryPoll) + Send,
    {
        let max_attempts = self.policy.max_attempts;

        for attempt in 0..max_attempts {
            let poll = self.source.poll_security_summary(key).await?;
            observer(&poll);

            if poll.is_terminal() {
                tracing::info!(key, attempt, status = %poll.status, "security summary settled");
                return Ok(poll);
            }

            if attempt + 1 < max_attempts {
                let delay = self.policy.delay_for_attempt(attempt);
                tracing::debug!(
                    key,
                    attempt,
                    status = %poll.status,
                    delay_ms = delay.as_millis() as u64,
                    "security summary not ready, waiting"
                );
                tokio::time::sleep(delay).await;
            }
        }

        tracing::warn!(key, max_attempts, "security summary polling gave up");
        Err(ApiError::timeout(format!(
            "security summary for {} not ready after {} attempts",
            key, max_attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = PollPolicy {
            interval: Duration::from_millis(100),
            backoff_factor: 2.0,
            max_interval: Duration::from_millis(500),
            max_attempts: 10,
        };

        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_millis(500));
    }

    #[test]
    fn test_flat_backoff_keeps_interval() {
        let policy = PollPolicy {
            interval: Duration::from_millis(250),
            backoff_factor: 1.0,
            max_interval: Duration::from_millis(1000),
            max_attempts: 3,
        };
        assert_eq!(policy.delay_for_attempt(7), Duration::from_millis(250));
    }

    #[test]
    fn test_shrinking_or_negative_factor_never_panics() {
        let mut policy = PollPolicy {
            interval: Duration::from_millis(100),
            backoff_factor: -2.0,
            max_interval: Duration::from_millis(500),
            max_attempts: 5,
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(100));

        policy.backoff_factor = 0.5;
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(100));

        policy.backoff_factor = f64::NAN;
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
    }

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.max_interval, Duration::from_secs(10));
        assert_eq!(policy.max_attempts, 30);
    }
}
