//! HTTP content source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

use super::provider::ContentSource;
use crate::error::FetchError;
use crate::profile::ProfileInfo;
use crate::{Error, Result};

/// Reads profile content from a JSON endpoint.
///
/// The endpoint must answer `GET` with a [`ProfileInfo`] document. That is
/// the shape of the upstream content API as well as of Persona's own
/// `/api/info`, so one instance can revalidate from another.
pub struct HttpContentSource {
    url: String,
    client: reqwest::Client,
}

impl HttpContentSource {
    /// Creates a source for `url` with the given request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("http client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// The endpoint this source reads from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn get_info(&self) -> std::result::Result<ProfileInfo, FetchError> {
        debug!(url = %self.url, "fetching profile");

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::unreachable(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| FetchError::malformed(e.to_string()))
    }

    fn describe(&self) -> String {
        format!("http {}", self.url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer) -> HttpContentSource {
        HttpContentSource::new(format!("{}/info", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_info_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": [{"plain_text": "Ada"}],
                "profile_picture": "https://img.example/ada.png",
                "links": {"Email": [{"plain_text": "ada@example.com"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = source(&server).get_info().await.unwrap();
        assert_eq!(profile.display_name(), Some("Ada"));
        assert_eq!(
            profile.profile_picture.as_deref(),
            Some("https://img.example/ada.png")
        );
        assert_eq!(profile.links.len(), 1);
    }

    #[tokio::test]
    async fn test_get_info_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = source(&server).get_info().await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                status: 503,
                body: "maintenance".into()
            }
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_get_info_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = source(&server).get_info().await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_get_info_unreachable() {
        // Port 1 is reserved and nothing listens there.
        let source =
            HttpContentSource::new("http://127.0.0.1:1/info", Duration::from_secs(2)).unwrap();
        let err = source.get_info().await.unwrap_err();
        assert!(matches!(err, FetchError::Unreachable(_)));
    }

    #[test]
    fn test_describe_includes_url() {
        let source =
            HttpContentSource::new("https://cms.example/info", Duration::from_secs(1)).unwrap();
        assert_eq!(source.url(), "https://cms.example/info");
        assert_eq!(source.describe(), "http https://cms.example/info");
    }
}
