//! Page-level loading state.
//!
//! ```text
//! Loading ──(data)──▶ Ready ──(revalidated)──▶ Ready
//!    │
//!    └──(error, no data)──▶ Error ──(data)──▶ Ready
//! ```
//!
//! `Ready -> Error` does not exist: once data has been shown, later failures
//! leave it on screen.

use std::sync::Arc;

use persona_core::FetchError;

use crate::cache::LoadResult;

/// What the page should display.
#[derive(Debug)]
pub enum PageState<T> {
    /// No data and no error yet.
    Loading,
    /// Nothing to show and the last read failed.
    Error(FetchError),
    /// Data to show, possibly stale.
    Ready(Arc<T>),
}

impl<T> Clone for PageState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Loading => Self::Loading,
            Self::Error(err) => Self::Error(err.clone()),
            Self::Ready(data) => Self::Ready(Arc::clone(data)),
        }
    }
}

impl<T> PageState<T> {
    /// Derives the state from a cache snapshot. Data wins over error.
    pub fn from_result(result: &LoadResult<T>) -> Self {
        match (&result.data, &result.error) {
            (Some(data), _) => Self::Ready(Arc::clone(data)),
            (None, Some(err)) => Self::Error(err.clone()),
            (None, None) => Self::Loading,
        }
    }

    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: &PageState<T>) -> bool {
        match (self, next) {
            (Self::Ready(_), Self::Ready(_)) => true,
            (Self::Ready(_), _) => false,
            _ => true,
        }
    }

    /// True in the `Ready` state.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The displayed data, if any.
    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// Short state name for logs and health output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Error(_) => "error",
            Self::Ready(_) => "ready",
        }
    }
}

/// The page's view of one cache key: owns the snapshot currently displayed.
#[derive(Debug)]
pub struct PageView<T> {
    state: PageState<T>,
}

impl<T> Default for PageView<T> {
    fn default() -> Self {
        Self {
            state: PageState::Loading,
        }
    }
}

impl<T> PageView<T> {
    /// A view in the `Loading` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &PageState<T> {
        &self.state
    }

    /// Applies a cache snapshot, refusing disallowed transitions.
    ///
    /// Returns `true` when the state changed.
    pub fn apply(&mut self, result: &LoadResult<T>) -> bool {
        let next = PageState::from_result(result);
        if !self.state.can_transition_to(&next) {
            return false;
        }
        self.state = next;
        true
    }
}
