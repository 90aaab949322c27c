//! Page retrieval over HTTP.
//!
//! The [`PageFetcher`] trait is the seam between the pipeline and the
//! network: the orchestrator only ever sees "raw markup or an error", so
//! tests can substitute canned documents without touching HTTP at all.

use anyhow::{Context, Result};
use tracing::{debug, instrument};

/// Browser-like client identity. Several of the watched sites serve an
/// interstitial or a 403 to obvious bot user agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Trait for fetching raw page markup.
///
/// Implementors return the document body as text, or an error covering both
/// transport failures and non-success HTTP statuses.
pub trait PageFetcher {
    /// Fetch the document at `url` and return its body text.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the browser-like user agent applied to every
    /// request.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?;

        let status = response.status();
        let body = response
            .error_for_status()
            .with_context(|| format!("{url} answered {status}"))?
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;

        debug!(%url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
