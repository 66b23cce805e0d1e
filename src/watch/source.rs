//! Results-page sources
//!
//! The extraction core only consumes a rendered HTML string; where that
//! string comes from is a collaborator concern. [`HttpSource`] covers pages
//! that render server-side. Pages that need a real browser are out of scope
//! here; point the watcher at pre-fetched documents instead.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::FetchError;

/// Placeholder substituted with the tracked label in the results URL
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Supplies one point-in-time results document for a label
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the rendered results HTML for a label
    async fn fetch(&self, label: &str) -> Result<String, FetchError>;
}

/// Plain HTTP GET source using a URL template
///
/// The template must contain `{query}`; the label is substituted with
/// spaces form-encoded as `+`.
pub struct HttpSource {
    client: Client,
    url_template: String,
}

impl HttpSource {
    /// Create a source from a URL template
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let url_template = url_template.into();
        if !url_template.contains(QUERY_PLACEHOLDER) {
            return Err(FetchError::InvalidUrl(format!(
                "results URL must contain the {QUERY_PLACEHOLDER} placeholder: {url_template}"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .user_agent(concat!("seatwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url_template,
        })
    }

    fn url_for(&self, label: &str) -> String {
        let query = label.trim().replace(' ', "+");
        self.url_template.replace(QUERY_PLACEHOLDER, &query)
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self, label: &str) -> Result<String, FetchError> {
        let url = self.url_for(label);
        tracing::debug!(%url, %label, "Fetching results page");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_requires_placeholder() {
        let result = HttpSource::new("https://example.com/search", Duration::from_secs(5));
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_substitution_encodes_spaces() {
        let source = HttpSource::new(
            "https://example.com/search/{query}",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            source.url_for("CS 4349.003"),
            "https://example.com/search/CS+4349.003"
        );
    }

    #[tokio::test]
    async fn test_fetch_surfaces_server_errors() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = HttpSource::new(
            format!("{}/search/{{query}}", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();

        let result = source.fetch("CS 4349.003").await;
        assert!(matches!(result, Err(FetchError::ServerError(503))));
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rows</html>"))
            .mount(&server)
            .await;

        let source = HttpSource::new(
            format!("{}/search/{{query}}", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();

        let body = source.fetch("CS 4349.003").await.unwrap();
        assert_eq!(body, "<html>rows</html>");
    }
}
