//! HTTP client implementation with connection pooling and retry logic

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use sprout_config::SourceSettings;
use sprout_core::error::SproutError;
use sprout_core::types::Package;
use tracing::debug;
use url::Url;

use crate::source::PackageSource;
use crate::RegistryResult;

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// One request attempt either succeeds, fails for good, or may be retried
enum Attempt<T> {
    Done(T),
    Fatal(SproutError),
    Retry(SproutError),
}

/// HTTP client for a source hosting platform
#[derive(Debug, Clone)]
pub struct SourceClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Host serving archives and clone URLs
    archive_base: Url,
    /// Host serving raw files
    raw_base: Url,
}

impl SourceClient {
    /// Create a client for the configured hosts
    pub fn new(source: &SourceSettings) -> RegistryResult<Self> {
        Self::with_config(source, RetryConfig::default())
    }

    /// Create a client with custom retry behaviour
    pub fn with_config(source: &SourceSettings, retry_config: RetryConfig) -> RegistryResult<Self> {
        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            // Request timeout
            .timeout(Duration::from_secs(60))
            .gzip(true)
            .user_agent(concat!("sprout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SproutError::network("Failed to create HTTP client".to_string(), e))?;

        Ok(Self {
            client,
            retry_config,
            archive_base: parse_base("archive-base-url", &source.archive_base_url)?,
            raw_base: parse_base("raw-base-url", &source.raw_base_url)?,
        })
    }

    /// URL of a file at the root of a package's branch
    pub fn manifest_url(&self, package: &Package, manifest_file: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            trimmed(&self.raw_base),
            package.path,
            package.branch,
            manifest_file
        )
    }

    /// URL of the zip archive of a package's branch
    pub fn archive_url(&self, package: &Package) -> String {
        format!(
            "{}/{}/archive/{}.zip",
            trimmed(&self.archive_base),
            package.path,
            package.branch
        )
    }

    /// Execute HTTP request with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Attempt<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Attempt::Done(result) => return Ok(result),
                Attempt::Fatal(error) => return Err(error),
                Attempt::Retry(error) => {
                    if attempt >= self.retry_config.max_retries {
                        return Err(error);
                    }
                    attempt += 1;
                    debug!("Retrying after {:?} (attempt {}): {}", delay, attempt, error);

                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                },
            }
        }
    }

    /// GET a URL and return its body; 4xx responses are not retried
    async fn get_bytes(&self, url: &str) -> RegistryResult<Vec<u8>> {
        self.with_retry(|| async {
            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    return Attempt::Retry(SproutError::network(format!("GET {} failed", url), e))
                },
            };

            let status = response.status();
            if status == StatusCode::OK {
                match response.bytes().await {
                    Ok(bytes) => Attempt::Done(bytes.to_vec()),
                    Err(e) => Attempt::Retry(SproutError::network(
                        format!("Failed to read body of {}", url),
                        e,
                    )),
                }
            } else {
                let error = SproutError::NetworkFetchFailure {
                    message: format!("GET {} returned {}", url, status),
                    source: None,
                };
                if status.is_client_error() {
                    Attempt::Fatal(error)
                } else {
                    Attempt::Retry(error)
                }
            }
        })
        .await
    }
}

#[async_trait]
impl PackageSource for SourceClient {
    async fn fetch_manifest(&self, package: &Package, manifest_file: &str) -> RegistryResult<String> {
        let url = self.manifest_url(package, manifest_file);
        debug!("Fetching manifest {}", url);
        let bytes = self.get_bytes(&url).await?;
        String::from_utf8(bytes).map_err(|e| {
            SproutError::malformed(package.spec(), format!("{} is not UTF-8: {}", manifest_file, e))
        })
    }

    async fn download_archive(&self, package: &Package) -> RegistryResult<Vec<u8>> {
        let url = self.archive_url(package);
        debug!("Downloading archive {}", url);
        self.get_bytes(&url).await
    }

    fn clone_url(&self, package: &Package) -> String {
        format!("{}/{}.git", trimmed(&self.archive_base), package.path)
    }
}

fn parse_base(field: &str, value: &str) -> RegistryResult<Url> {
    Url::parse(value).map_err(|e| SproutError::ConfigValidation {
        field: field.to_string(),
        reason: format!("invalid URL '{}': {}", value, e),
    })
}

fn trimmed(url: &Url) -> &str {
    url.as_str().trim_end_matches('/')
}
