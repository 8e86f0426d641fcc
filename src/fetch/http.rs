//! Plain HTTP fetch backend
//!
//! A shared `reqwest` client with a small bounded connection pool and
//! automatic retry on transient failure. The pool bound is kept small
//! relative to the number of concurrent resolvers so pool exhaustion does
//! not manifest as spurious connection errors.

use std::time::Duration;

use tracing::{instrument, trace, warn};

use crate::error::{FetchError, FetchResult};

/// Idle connections kept per host
const POOL_MAX_IDLE_PER_HOST: usize = 5;

/// Retries after the initial attempt
const DEFAULT_RETRIES: u32 = 2;

/// First backoff delay; doubles per retry
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    retries: u32,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_retries(DEFAULT_RETRIES)
    }

    pub fn with_retries(retries: u32) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, retries }
    }

    /// Fetch `url` with a hard per-attempt timeout.
    ///
    /// Transient failures (timeout, connection error, 5xx) are retried
    /// with exponential backoff up to the configured retry count; the
    /// last error is returned on exhaustion.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<String> {
        let mut backoff = INITIAL_BACKOFF;

        for attempt in 0..self.retries {
            match self.try_fetch(url, timeout).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_transient() => {
                    warn!("attempt {} failed ({err}), retrying in {backoff:?}", attempt + 1);
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(err) => return Err(err),
            }
        }

        self.try_fetch(url, timeout).await
    }

    async fn try_fetch(&self, url: &str, timeout: Duration) -> FetchResult<String> {
        trace!("requesting {url}");

        let response = self.client.get(url).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        trace!("received {} bytes from {url}", body.len());

        Ok(body)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}
