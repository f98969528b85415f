//! Server-side page props.
//!
//! The page is produced from whatever the content source returns before the
//! first render. A failing source must never fail the page build: the error
//! is logged and the page starts without data, leaving the revalidation
//! cache to fill it in later.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::FetchError;
use crate::profile::ProfileInfo;
use crate::source::ContentSource;

/// Data handed to the page before any revalidation read completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageProps {
    /// The pre-render snapshot, or `None` when the fetch failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ProfileInfo>,
}

/// Fetches one profile snapshot, propagating failure.
pub async fn fetch_profile(source: &dyn ContentSource) -> Result<ProfileInfo, FetchError> {
    source.get_info().await
}

/// Fetches the pre-render props, swallowing failure.
///
/// On error the returned props are empty and a warning is logged.
pub async fn static_props(source: &dyn ContentSource) -> PageProps {
    match fetch_profile(source).await {
        Ok(data) => {
            info!(source = %source.describe(), "fetched initial profile");
            PageProps { data: Some(data) }
        }
        Err(err) => {
            warn!(
                source = %source.describe(),
                error = %err,
                "initial profile fetch failed; rendering without data"
            );
            PageProps::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::profile::StyledTextFragment;
    use crate::source::MockContentSource;

    #[tokio::test]
    async fn test_static_props_with_data() {
        let profile = ProfileInfo {
            headline: Some(vec![StyledTextFragment::plain("Engineer")]),
            ..Default::default()
        };
        let source = MockContentSource::with_profile(profile.clone());

        let props = static_props(&source).await;
        assert_eq!(props.data, Some(profile));
    }

    #[tokio::test]
    async fn test_static_props_swallows_failure() {
        let source = MockContentSource::failing(FetchError::unreachable("dns"));

        let props = static_props(&source).await;
        assert!(props.data.is_none());
        assert_eq!(source.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_profile_propagates_failure() {
        let source = MockContentSource::failing(FetchError::malformed("truncated"));
        let err = fetch_profile(&source).await.unwrap_err();
        assert_eq!(err, FetchError::malformed("truncated"));
    }

    #[test]
    fn test_empty_props_serialize_to_empty_object() {
        let json = serde_json::to_string(&PageProps::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
