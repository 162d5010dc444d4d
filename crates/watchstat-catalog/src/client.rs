//! TMDB search client with rate limiting and retries

use std::{num::NonZeroU32, sync::Arc, time::Duration};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Response};
use serde::Deserialize;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, error, instrument, warn};
use url::Url;
use watchstat_common::{CatalogEntry, Result, WatchstatError};
use watchstat_config::CatalogConfig;

use crate::MetadataCatalog;

/// Configuration for the TMDB client
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API base URL, e.g. `https://api.themoviedb.org/3`
    pub base_url: String,
    /// API key sent as the `api_key` query parameter
    pub api_key: String,
    /// Search language
    pub language: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Rate limit: requests per second (default: 20)
    pub rate_limit_per_sec: u32,
    /// Maximum number of retry attempts (default: 3)
    pub max_retries: usize,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: String::new(),
            language: "en-US".to_string(),
            timeout_secs: 30,
            max_idle_per_host: 10,
            rate_limit_per_sec: 20,
            max_retries: 3,
        }
    }
}

impl TmdbConfig {
    /// Create a configuration with the minimum required parameters
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Build from the `catalog` config section; fails without an API key
    pub fn from_catalog_config(config: &CatalogConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| WatchstatError::config("Catalog API key is not set"))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: api_key.to_string(),
            language: config.language.clone(),
            timeout_secs: config.timeout_seconds,
            rate_limit_per_sec: config.requests_per_second,
            max_retries: config.max_retries as usize,
            ..Default::default()
        })
    }

    /// Set the search language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Set the maximum retry attempts
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<CatalogEntry>,
}

/// TMDB movie search client
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
    search_url: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl TmdbClient {
    /// Create a new client with the given configuration
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            WatchstatError::config_with_source(format!("Invalid catalog URL: {}", config.base_url), e)
        })?;
        let search_url = format!("{}/search/movie", base.as_str().trim_end_matches('/'));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| WatchstatError::network_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| WatchstatError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            search_url,
            rate_limiter,
        })
    }

    /// Create a client from the `catalog` config section
    pub fn from_catalog_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(TmdbConfig::from_catalog_config(config)?)
    }

    /// Full search endpoint URL
    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    #[instrument(skip(self))]
    async fn search_request(&self, title: &str) -> Result<Response> {
        let query_params = [
            ("api_key", self.config.api_key.as_str()),
            ("query", title),
            ("language", self.config.language.as_str()),
        ];

        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .take(self.config.max_retries);

        let response = RetryIf::spawn(
            retry_strategy,
            || async {
                // Every attempt, retries included, spends quota
                self.rate_limiter.until_ready().await;
                let request = self.client.get(&self.search_url).query(&query_params);

                match request.send().await {
                    Ok(response) => {
                        let status = response.status();
                        if status.is_success() {
                            debug!("Search successful: {}", status);
                            Ok(response)
                        } else if status.is_client_error() {
                            error!("Client error: {}", status);
                            Err(WatchstatError::catalog_with_status(
                                format!("Catalog returned client error: {}", status),
                                status.as_u16(),
                            ))
                        } else {
                            warn!("Server error, will retry: {}", status);
                            Err(WatchstatError::catalog_with_status(
                                format!("Catalog returned server error: {}", status),
                                status.as_u16(),
                            ))
                        }
                    }
                    // The request URL carries the API key
                    Err(e) => Err(transport_error(e.without_url())),
                }
            },
            // 4xx is final
            |err: &WatchstatError| err.is_retryable(),
        )
        .await?;

        Ok(response)
    }
}

/// Log and wrap a transport failure; `err` must already be stripped of its URL
fn transport_error(err: reqwest::Error) -> WatchstatError {
    if err.is_timeout() {
        warn!("Request timeout, will retry: {}", err);
        WatchstatError::network_with_source("Request timeout", err)
    } else if err.is_connect() {
        warn!("Connection error, will retry: {}", err);
        WatchstatError::network_with_source("Connection error", err)
    } else {
        error!("Request failed: {}", err);
        WatchstatError::network_with_source("Request failed", err)
    }
}

#[async_trait]
impl MetadataCatalog for TmdbClient {
    async fn search_movies(&self, title: &str) -> Result<Vec<CatalogEntry>> {
        let response = self.search_request(title).await?;
        let text = response
            .text()
            .await
            .map_err(|e| {
                WatchstatError::network_with_source("Failed to read response body", e.without_url())
            })?;

        let parsed: SearchResponse = serde_json::from_str(&text)?;
        debug!(title, candidates = parsed.results.len(), "Catalog search complete");
        Ok(parsed.results)
    }
}
