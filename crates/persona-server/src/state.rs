//! Shared server state.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use persona_core::{ContentSource, FetchError, PageProps, ProfileInfo, static_props};
use persona_render::SiteMeta;
use persona_swr::{LoadOptions, LoadResult, PageState, PageView, SwrCache};
use tracing::info;

/// Cache key for profile content, matching the read endpoint's path.
pub const INFO_KEY: &str = "/api/info";

type ProfileFuture = Pin<Box<dyn Future<Output = Result<ProfileInfo, FetchError>> + Send>>;

/// Shared application state.
///
/// Cloning is cheap: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn ContentSource>,
    cache: Arc<SwrCache<ProfileInfo>>,
    view: Arc<Mutex<PageView<ProfileInfo>>>,
    fallback: Option<Arc<ProfileInfo>>,
    site: Arc<SiteMeta>,
}

impl AppState {
    /// State with no fallback data.
    pub fn new(source: Arc<dyn ContentSource>, site: SiteMeta) -> Self {
        Self {
            source,
            cache: Arc::new(SwrCache::new()),
            view: Arc::new(Mutex::new(PageView::new())),
            fallback: None,
            site: Arc::new(site),
        }
    }

    /// Fetches static props from `source` and builds state around them.
    ///
    /// Never fails: an unreachable source just means no fallback data.
    pub async fn prepare(source: Arc<dyn ContentSource>, site: SiteMeta) -> Self {
        let props = static_props(source.as_ref()).await;
        Self::new(source, site).with_props(props)
    }

    /// Uses `props` as fallback data for the page.
    pub fn with_props(mut self, props: PageProps) -> Self {
        self.fallback = props.data.map(Arc::new);
        self
    }

    /// The revalidation cache.
    pub fn cache(&self) -> &SwrCache<ProfileInfo> {
        &self.cache
    }

    /// Site metadata used for every page.
    pub fn site(&self) -> &SiteMeta {
        &self.site
    }

    /// Returns what the page should show and revalidates in the background.
    pub fn load_page(&self) -> PageState<ProfileInfo> {
        let fallback = self.fallback.as_deref().cloned();
        let result = self
            .cache
            .load(INFO_KEY, self.fetcher(), LoadOptions::fallback(fallback));
        self.display(&result)
    }

    /// Reads the source now, sharing any read already in flight.
    pub async fn read_now(&self) -> Result<Arc<ProfileInfo>, FetchError> {
        let result = self.cache.revalidate(INFO_KEY, self.fetcher()).await;
        self.display(&result);
        match (result.data, result.error) {
            (_, Some(err)) => Err(err),
            (Some(data), None) => Ok(data),
            (None, None) => Err(FetchError::unreachable("no data after read")),
        }
    }

    /// Name of the state currently displayed.
    pub fn page_state_name(&self) -> &'static str {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
            .name()
    }

    fn display(&self, result: &LoadResult<ProfileInfo>) -> PageState<ProfileInfo> {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        let before = view.state().name();
        if view.apply(result) && view.state().name() != before {
            info!(from = before, to = view.state().name(), "page state changed");
        }
        view.state().clone()
    }

    fn fetcher(&self) -> impl FnOnce() -> ProfileFuture + Send + 'static {
        let source = Arc::clone(&self.source);
        move || -> ProfileFuture { Box::pin(async move { source.get_info().await }) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use persona_core::StyledTextFragment;
    use persona_core::source::MockContentSource;

    fn named(name: &str) -> ProfileInfo {
        ProfileInfo {
            name: Some(vec![StyledTextFragment::plain(name)]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_prepare_uses_static_props() {
        let source = Arc::new(MockContentSource::new(vec![
            Ok(named("initial")),
            Err(FetchError::unreachable("later reads fail")),
        ]));
        let state = AppState::prepare(source, SiteMeta::default()).await;

        let page = state.load_page();
        assert_eq!(page.data().unwrap().display_name(), Some("initial"));
    }

    #[tokio::test]
    async fn test_prepare_survives_failing_source() {
        let source = Arc::new(MockContentSource::failing(FetchError::unreachable("down")));
        let state = AppState::prepare(source, SiteMeta::default()).await;
        assert!(matches!(state.load_page(), PageState::Loading));
    }

    #[tokio::test]
    async fn test_read_now_reports_error_even_with_stale_data() {
        let source = Arc::new(MockContentSource::failing(FetchError::malformed("bad")));
        let state = AppState::new(source, SiteMeta::default()).with_props(PageProps {
            data: Some(named("stale")),
        });
        state.load_page();
        state.cache().settled(INFO_KEY).await;

        assert!(state.read_now().await.is_err());
        assert_eq!(state.page_state_name(), "ready");
    }
}
