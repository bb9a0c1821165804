//! Polite HTTP fetching shared by all page-scraping collectors.

use std::time::Duration;

use rand::Rng;

use crate::error::CollectError;

/// HTTP client wrapper with a per-request timeout, a bounded retry loop and
/// a politeness delay between page fetches.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_retries: u32,
    request_delay: Duration,
}

impl Fetcher {
    /// Builds a fetcher from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new(
        timeout_secs: u64,
        max_retries: u32,
        user_agent: &str,
        request_delay_ms: u64,
    ) -> Result<Self, CollectError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            request_delay: Duration::from_millis(request_delay_ms),
        })
    }

    /// Builds a fetcher from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn from_app_config(config: &trendscope_core::AppConfig) -> Result<Self, CollectError> {
        Self::new(
            config.fetch_timeout_secs,
            config.fetch_max_retries,
            &config.fetch_user_agent,
            config.fetch_request_delay_ms,
        )
    }

    /// Fetches a page body as text, retrying transient failures.
    ///
    /// Each attempt that fails sleeps a uniform 1–3 s before the next one,
    /// so hammered sites see jittered rather than synchronized retries.
    /// Non-2xx responses count as failures.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] once all attempts are exhausted.
    pub async fn get_text(&self, url: &str) -> Result<String, CollectError> {
        let attempts = self.max_retries.max(1);

        for attempt in 1..attempts {
            match self.try_get_text(url).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    tracing::debug!(url, attempt, attempts, error = %err, "page fetch failed");
                    let jitter_ms = {
                        let mut rng = rand::rng();
                        rng.random_range(1_000..=3_000)
                    };
                    tokio::time::sleep(Duration::from_millis(jitter_ms)).await;
                }
            }
        }

        self.try_get_text(url).await.map_err(CollectError::Http)
    }

    /// Sleeps the configured politeness delay between consecutive page
    /// fetches against the same site.
    pub async fn pace(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    async fn try_get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}
