//! Network utilities for content API requests.
//!
//! - **HTTP Client**: A global, configured HTTP client with connection pooling
//! - **Rate Limiting**: Per-source minimum delay between requests
//! - **Retry Logic**: Automatic retries with exponential backoff on 429
//! - **JSON helpers**: Path extraction for loosely shaped payloads
//!
//! # Examples
//!
//! ```rust
//! use animedex::net::HttpClient;
//!
//! # async fn example() -> animedex::Result<()> {
//! let client = HttpClient::new("consumet")
//!     .with_rate_limit(500)  // 500ms between requests
//!     .with_max_retries(3);
//!
//! let json: serde_json::Value = client.get_json("https://api.example.com/top-airing").await?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use reqwest::{Client, header::HeaderMap};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub mod json;

/// Global HTTP client: 30 second timeout, pooled connections, gzip and brotli.
static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("animedex/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .gzip(true)
        .brotli(true)
        .build()
        .expect("Failed to build HTTP client")
});

/// Per-source rate limiter enforcing a minimum delay between requests.
///
/// Safe to share across tasks; the bookkeeping map sits behind a `Mutex`
/// that is never held across an await point.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<HashMap<String, Instant>>,
    default_delay: Duration,
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            last_request: Mutex::new(HashMap::new()),
            default_delay: self.default_delay,
        }
    }
}

impl RateLimiter {
    /// Creates a rate limiter with the given delay in milliseconds.
    ///
    /// ```rust
    /// use animedex::net::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(500);
    /// assert_eq!(limiter.delay().as_millis(), 500);
    /// ```
    pub fn new(delay_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(HashMap::new()),
            default_delay: Duration::from_millis(delay_ms),
        }
    }

    pub fn delay(&self) -> Duration {
        self.default_delay
    }

    /// Sleeps until `source_id` may issue its next request, then records it.
    pub async fn wait(&self, source_id: &str) {
        let now = Instant::now();
        let wait_duration = {
            let last_map = self.last_request.lock();
            last_map
                .get(source_id)
                .map(|&last| now.duration_since(last))
                .filter(|&elapsed| elapsed < self.default_delay)
                .map(|elapsed| self.default_delay - elapsed)
        };

        if let Some(duration) = wait_duration {
            tokio::time::sleep(duration).await;
        }

        self.last_request
            .lock()
            .insert(source_id.to_string(), Instant::now());
    }
}

/// HTTP client wrapper with built-in rate limiting and retry logic.
///
/// Each client is associated with one source and rate-limits per source.
#[derive(Clone, Debug)]
pub struct HttpClient {
    source_id: String,
    rate_limiter: RateLimiter,
    max_retries: u32,
    headers: HeaderMap,
}

impl HttpClient {
    /// Creates a client with a 200ms rate limit and 3 retries.
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            rate_limiter: RateLimiter::new(200),
            max_retries: 3,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the minimum delay between requests in milliseconds.
    pub fn with_rate_limit(mut self, delay_ms: u64) -> Self {
        self.rate_limiter = RateLimiter::new(delay_ms);
        self
    }

    /// Sets the maximum number of retries for failed requests.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Adds a header sent with every request. Invalid names or values are ignored.
    ///
    /// ```rust
    /// use animedex::net::HttpClient;
    ///
    /// let client = HttpClient::new("consumet").with_header("Accept", "application/json");
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Performs a GET request with rate limiting and retries.
    ///
    /// 429 responses are retried with exponential backoff (2, 4, 8... seconds);
    /// transport errors are retried after one second.
    ///
    /// # Errors
    ///
    /// * [`Error::RateLimit`](crate::Error::RateLimit) - Still rate limited after retries
    /// * [`Error::Source`](crate::Error::Source) - Any other non-2xx status
    /// * [`Error::Network`](crate::Error::Network) - Transport errors after retries
    pub async fn get(&self, url: &str) -> crate::Result<Bytes> {
        let mut attempts = 0;

        loop {
            self.rate_limiter.wait(&self.source_id).await;
            debug!(source = %self.source_id, url, attempt = attempts + 1, "GET");

            match CLIENT.get(url).headers(self.headers.clone()).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response.bytes().await?);
                    }

                    if response.status() == 429 {
                        if attempts < self.max_retries {
                            attempts += 1;
                            let delay = Duration::from_secs(2_u64.pow(attempts));
                            warn!(source = %self.source_id, ?delay, "rate limited, backing off");
                            tokio::time::sleep(delay).await;
                            continue;
                        }

                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok());

                        return Err(crate::Error::rate_limit(retry_after));
                    }

                    return Err(crate::Error::source(
                        &self.source_id,
                        format!("HTTP {}", response.status()),
                    ));
                }
                Err(e) => {
                    if attempts < self.max_retries {
                        attempts += 1;
                        warn!(source = %self.source_id, error = %e, "request failed, retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Performs a GET request and deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// * All errors from [`get()`](HttpClient::get)
    /// * [`Error::Json`](crate::Error::Json) - If the body does not match `T`
    pub async fn get_json<T>(&self, url: &str) -> crate::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let bytes = self.get(url).await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(50);
        let start = Instant::now();
        limiter.wait("consumet").await;
        limiter.wait("consumet").await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_rate_limiter_is_per_source() {
        let limiter = RateLimiter::new(500);
        limiter.wait("a").await;
        let start = Instant::now();
        limiter.wait("b").await;
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_client_builder_settings() {
        let client = HttpClient::new("consumet")
            .with_max_retries(5)
            .with_header("Accept", "application/json")
            .with_header("bad header\n", "x");
        assert_eq!(client.max_retries(), 5);
        assert_eq!(client.headers.len(), 1);
    }
}
