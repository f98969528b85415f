//! Mock content source for testing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::provider::ContentSource;
use crate::error::FetchError;
use crate::profile::ProfileInfo;

/// Content source that replays canned outcomes.
///
/// Outcomes are returned in order, cycling back to the first once all have
/// been used. Clones share the same outcome cursor and call counter.
#[derive(Clone)]
pub struct MockContentSource {
    state: Arc<Mutex<MockState>>,
    delay: Option<Duration>,
}

struct MockState {
    outcomes: Vec<Result<ProfileInfo, FetchError>>,
    index: usize,
    calls: usize,
}

impl MockContentSource {
    /// Creates a mock that replays `outcomes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use persona_core::source::MockContentSource;
    /// use persona_core::{FetchError, ProfileInfo};
    ///
    /// let source = MockContentSource::new(vec![
    ///     Err(FetchError::unreachable("first read fails")),
    ///     Ok(ProfileInfo::default()),
    /// ]);
    /// ```
    pub fn new(outcomes: Vec<Result<ProfileInfo, FetchError>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                outcomes,
                index: 0,
                calls: 0,
            })),
            delay: None,
        }
    }

    /// A mock that always returns `profile`.
    pub fn with_profile(profile: ProfileInfo) -> Self {
        Self::new(vec![Ok(profile)])
    }

    /// A mock that always fails with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Makes every read take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of reads served so far.
    pub async fn call_count(&self) -> usize {
        self.state.lock().await.calls
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn get_info(&self) -> Result<ProfileInfo, FetchError> {
        let outcome = {
            let mut state = self.state.lock().await;
            state.calls += 1;
            if state.outcomes.is_empty() {
                Err(FetchError::unreachable("mock source has no outcomes"))
            } else {
                let outcome = state.outcomes[state.index].clone();
                state.index = (state.index + 1) % state.outcomes.len();
                outcome
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        outcome
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::profile::StyledTextFragment;

    fn named(name: &str) -> ProfileInfo {
        ProfileInfo {
            name: Some(vec![StyledTextFragment::plain(name)]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mock_cycles_outcomes() {
        let source = MockContentSource::new(vec![
            Ok(named("first")),
            Err(FetchError::malformed("second")),
        ]);

        assert_eq!(source.get_info().await.unwrap().display_name(), Some("first"));
        assert!(source.get_info().await.is_err());
        // Cycles back
        assert_eq!(source.get_info().await.unwrap().display_name(), Some("first"));
        assert_eq!(source.call_count().await, 3);
    }

    #[tokio::test]
    async fn test_mock_clones_share_state() {
        let source = MockContentSource::with_profile(named("shared"));
        let other = source.clone();

        source.get_info().await.unwrap();
        other.get_info().await.unwrap();
        assert_eq!(source.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_mock_empty_outcomes_fail() {
        let source = MockContentSource::new(vec![]);
        let err = source.get_info().await.unwrap_err();
        assert!(matches!(err, FetchError::Unreachable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_delay() {
        let source = MockContentSource::with_profile(named("slow"))
            .with_delay(Duration::from_secs(30));
        let started = tokio::time::Instant::now();
        source.get_info().await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(30));
    }
}
