//! Snapshot sources.

use crate::error::FeedError;
use crate::message::BoardResponse;
use async_trait::async_trait;
use lobsync_engine::BookSnapshot;
use std::time::Duration;

/// Provides full book snapshots on demand.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetches the current book.
    async fn fetch(&self) -> Result<BookSnapshot, FeedError>;
}

/// Fetches snapshots from the `getboard` REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    endpoint: String,
    product_code: String,
}

impl HttpSnapshotSource {
    /// Creates a source with reqwest's default client settings.
    #[must_use]
    pub fn new(api_base_url: &str, product_code: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_base_url, product_code)
    }

    /// Creates a source whose requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns `FeedError::Request` if the HTTP client cannot be built.
    pub fn with_timeout(
        api_base_url: &str,
        product_code: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_base_url, product_code))
    }

    /// Creates a source using an existing client.
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        api_base_url: &str,
        product_code: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}/getboard", api_base_url.trim_end_matches('/')),
            product_code: product_code.into(),
        }
    }

    /// Returns the full endpoint URL without query string.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<BookSnapshot, FeedError> {
        tracing::debug!("GET {} product_code={}", self.endpoint, self.product_code);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("product_code", self.product_code.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let board: BoardResponse = serde_json::from_slice(&bytes)?;
        Ok(board.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let source = HttpSnapshotSource::new("https://api.bitflyer.com/v1/", "BTC_JPY");
        assert_eq!(source.endpoint(), "https://api.bitflyer.com/v1/getboard");

        let source = HttpSnapshotSource::new("http://localhost:8080", "ETH_JPY");
        assert_eq!(source.endpoint(), "http://localhost:8080/getboard");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let source = HttpSnapshotSource::with_timeout(
            "http://127.0.0.1:1",
            "BTC_JPY",
            Duration::from_millis(500),
        )
        .unwrap();

        assert!(matches!(source.fetch().await, Err(FeedError::Request(_))));
    }
}
