//! RIPE Atlas REST API client with retries.

use std::time::Duration;

use url::Url;

use super::{AttemptError, FetchError, HttpClient, HttpRequest, IsRetryable, RetryPolicy};
use crate::measurement::{ProbeId, ResultSet, parse_results};
use crate::probes::{ProbeDirectory, ProbeMeta, parse_archive, parse_probe};
use crate::time::{Sleeper, TokioSleeper, UnixTime, duration_secs};

/// Default RIPE Atlas API base URL.
pub const DEFAULT_API_URL: &str = "https://atlas.ripe.net/api/v2/";

/// Read-only access to the RIPE Atlas API.
///
/// Every request is retried with exponential backoff on transient
/// failures (connection errors, timeouts, 5xx, 429, 408).
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used between attempts (defaults to [`TokioSleeper`])
#[derive(Debug)]
pub struct AtlasApi<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    base_url: Url,
    retry_policy: RetryPolicy,
}

impl<H> AtlasApi<H, TokioSleeper> {
    /// Creates an API client for `base_url` with the default retry policy.
    ///
    /// A missing trailing slash is added so relative paths resolve below
    /// the base instead of replacing its last segment.
    #[must_use]
    pub fn new(client: H, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client,
            sleeper: TokioSleeper,
            base_url,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl<H, S> AtlasApi<H, S> {
    /// Sets a custom sleeper for retry delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> AtlasApi<H, S2> {
        AtlasApi {
            client: self.client,
            sleeper,
            base_url: self.base_url,
            retry_policy: self.retry_policy,
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub const fn client(&self) -> &H {
        &self.client
    }

    #[cfg(test)]
    pub(crate) const fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// URL of a measurement's results between `start` (inclusive) and
    /// `stop` (exclusive).
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be joined.
    pub fn results_url(
        &self,
        measurement: u64,
        start: UnixTime,
        stop: UnixTime,
    ) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(&format!("measurements/{measurement}/results/"))?;
        url.query_pairs_mut()
            .append_pair("start", &start.to_string())
            .append_pair("stop", &stop.to_string())
            .append_pair("format", "json");
        Ok(url)
    }

    /// URL of a measurement's most recent result per probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be joined.
    pub fn latest_url(&self, measurement: u64) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(&format!("measurements/{measurement}/latest/"))?;
        url.query_pairs_mut().append_pair("format", "json");
        Ok(url)
    }

    /// URL of one probe's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be joined.
    pub fn probe_url(&self, probe: ProbeId) -> Result<Url, FetchError> {
        Ok(self.base_url.join(&format!("probes/{probe}/"))?)
    }
}

impl<H: HttpClient, S: Sleeper> AtlasApi<H, S> {
    /// Fetches a measurement's results around `target`.
    ///
    /// With a target the window `[target - interval, target + interval)` is
    /// requested and grouped into rounds of `interval`. Without one the
    /// `latest` endpoint is used and its results form a single round.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON array.
    pub async fn fetch_result_set(
        &self,
        measurement: u64,
        target: Option<UnixTime>,
        interval: Duration,
    ) -> Result<ResultSet, FetchError> {
        let url = match target {
            Some(t) => {
                let width = duration_secs(interval).max(1);
                self.results_url(measurement, t - width, t + width)?
            }
            None => self.latest_url(measurement)?,
        };

        let body = self.get(HttpRequest::get_json(url.clone())).await?;
        let text = String::from_utf8_lossy(&body);
        let parsed = parse_results(&text).map_err(|e| FetchError::Results {
            url: url.to_string(),
            source: e,
        })?;

        tracing::info!(
            "Fetched {} result(s) for measurement {measurement} ({} malformed)",
            parsed.results.len(),
            parsed.malformed
        );

        let label = measurement.to_string();
        let set = match target {
            Some(_) => ResultSet::bucketed(label, parsed.results, interval),
            None => ResultSet::single_round(label, parsed.results),
        };
        Ok(set.with_malformed(parsed.malformed))
    }

    /// Fetches one probe's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a probe record.
    pub async fn fetch_probe(&self, probe: ProbeId) -> Result<ProbeMeta, FetchError> {
        let url = self.probe_url(probe)?;
        let body = self.get(HttpRequest::get_json(url.clone())).await?;
        let (_, meta) = parse_probe(&body).map_err(|e| FetchError::Probes {
            url: url.to_string(),
            source: e,
        })?;
        Ok(meta)
    }

    /// Downloads and parses the probe archive feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails or the archive cannot be decoded.
    pub async fn fetch_probe_archive(&self, url: &Url) -> Result<ProbeDirectory, FetchError> {
        let body = self.get(HttpRequest::get(url.clone())).await?;
        parse_archive(&body).map_err(|e| FetchError::Probes {
            url: url.to_string(),
            source: e,
        })
    }

    /// Executes a single request attempt.
    async fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, AttemptError> {
        let response = self.client.request(request.clone()).await?;
        if response.is_success() {
            return Ok(response.body);
        }
        Err(AttemptError::Status {
            status: response.status,
            body: response.body_text().map(ToString::to_string),
        })
    }

    /// Sends a GET request, retrying transient failures.
    async fn get(&self, request: HttpRequest) -> Result<Vec<u8>, FetchError> {
        let url = request.url.to_string();
        let mut attempt = 1;

        loop {
            match self.execute(&request).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_retryable() => {
                    return Err(FetchError::Request { url, source: e });
                }
                Err(e) => {
                    if !self.retry_policy.allows_retry_after(attempt) {
                        return Err(FetchError::MaxRetriesExceeded {
                            url,
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                    let delay = self.retry_policy.backoff(attempt - 1);
                    tracing::warn!(
                        "Attempt {attempt} for {url} failed: {e}; retrying in {:.1}s",
                        delay.as_secs_f64()
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
