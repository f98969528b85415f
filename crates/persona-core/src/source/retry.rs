//! Retry wrapper for content sources.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use super::provider::ContentSource;
use crate::error::FetchError;
use crate::profile::ProfileInfo;

/// Wraps a content source with exponential-backoff retries.
///
/// Only errors for which [`FetchError::is_retryable`] holds are retried.
pub struct RetryingSource {
    inner: Arc<dyn ContentSource>,
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl RetryingSource {
    /// Creates a retry wrapper with default settings.
    ///
    /// Default settings:
    /// - Max attempts: 3
    /// - Initial delay: 200 milliseconds
    /// - Max delay: 5 seconds
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            inner: source,
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }

    /// Sets the maximum number of attempts, the first one included.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the initial delay between attempts.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between attempts.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }
}

#[async_trait]
impl ContentSource for RetryingSource {
    async fn get_info(&self) -> Result<ProfileInfo, FetchError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize);

        let inner = Arc::clone(&self.inner);

        (|| async { inner.get_info().await })
            .retry(backoff)
            .when(FetchError::is_retryable)
            .notify(|err: &FetchError, after: Duration| {
                warn!(error = %err, retry_in = ?after, "profile fetch failed, retrying");
            })
            .await
    }

    fn describe(&self) -> String {
        format!("{} (up to {} attempts)", self.inner.describe(), self.max_attempts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::source::MockContentSource;

    fn fast(mock: &MockContentSource) -> RetryingSource {
        RetryingSource::new(Arc::new(mock.clone()))
            .with_initial_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let mock = MockContentSource::new(vec![
            Err(FetchError::unreachable("connection reset")),
            Ok(ProfileInfo::default()),
        ]);

        let profile = fast(&mock).get_info().await.unwrap();
        assert_eq!(profile, ProfileInfo::default());
        assert_eq!(mock.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_retry_skips_permanent_failure() {
        let mock = MockContentSource::failing(FetchError::malformed("bad json"));

        let err = fast(&mock).get_info().await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
        assert_eq!(mock.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let mock = MockContentSource::failing(FetchError::Status {
            status: 500,
            body: String::new(),
        });

        let err = fast(&mock).with_max_attempts(4).get_info().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(mock.call_count().await, 4);
    }

    #[test]
    fn test_retry_builder() {
        let mock = Arc::new(MockContentSource::new(vec![]));
        let retry = RetryingSource::new(mock)
            .with_max_attempts(0)
            .with_initial_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(30));

        assert_eq!(retry.max_attempts, 1);
        assert_eq!(retry.initial_delay, Duration::from_millis(500));
        assert_eq!(retry.max_delay, Duration::from_secs(30));
        assert_eq!(retry.describe(), "mock (up to 1 attempts)");
    }
}
