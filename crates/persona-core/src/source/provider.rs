//! Content source abstraction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::profile::ProfileInfo;

/// Abstraction over wherever profile content lives.
///
/// The page, the read endpoint and the revalidation cache all go through
/// this trait, so the upstream API can be swapped (or mocked) without
/// touching them.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Reads one fresh snapshot of the profile.
    async fn get_info(&self) -> Result<ProfileInfo, FetchError>;

    /// Short human-readable description, used in log lines.
    fn describe(&self) -> String {
        "content source".to_string()
    }
}

#[async_trait]
impl<S: ContentSource + ?Sized> ContentSource for Arc<S> {
    async fn get_info(&self) -> Result<ProfileInfo, FetchError> {
        (**self).get_info().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
