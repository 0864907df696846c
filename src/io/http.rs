use async_trait::async_trait;
use reqwest::header::{CONTENT_RANGE, RANGE};
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::{ByteRange, ContentRange, Fetched, RangeFetch};
use crate::error::TransportError;

/// Transport settings for [`HttpRangeFetcher`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("remotezip/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP Range fetcher for remote ZIP files
///
/// Issues exactly one `GET` with a `Range` header per call. The underlying
/// [`Client`] keeps a connection pool, so concurrent fetches share connections.
pub struct HttpRangeFetcher {
    client: Client,
    url: String,
    transferred_bytes: AtomicU64,
}

impl HttpRangeFetcher {
    /// Create a fetcher with default [`HttpOptions`].
    pub fn new(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_options(url, &HttpOptions::default())
    }

    pub fn with_options(url: impl Into<String>, options: &HttpOptions) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .build()?;
        Ok(Self::with_client(client, url))
    }

    /// Reuse an existing client (and its connection pool).
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            transferred_bytes: AtomicU64::new(0),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RangeFetch for HttpRangeFetcher {
    async fn fetch(&self, range: ByteRange) -> Result<Fetched, TransportError> {
        debug!("GET {} (Range: {})", self.url, range.header_value());

        let resp = self
            .client
            .get(&self.url)
            .header(RANGE, range.header_value())
            .send()
            .await?;

        if resp.status() != StatusCode::PARTIAL_CONTENT {
            return Err(TransportError::Status {
                range: range.to_string(),
                status: resp.status(),
            });
        }

        let content_range = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<ContentRange>().ok());

        let data = resp.bytes().await?.to_vec();
        self.transferred_bytes
            .fetch_add(data.len() as u64, Ordering::Relaxed);

        Ok(Fetched {
            data,
            content_range,
        })
    }
}
