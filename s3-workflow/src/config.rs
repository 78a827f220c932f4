/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

use aws_credential_types::Credentials;

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default upper bound on how long an existence waiter may poll.
///
/// Matches the budget of the classic S3 waiters (20 attempts, 5 seconds apart).
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(100);

/// Configuration for a [`Client`](crate::client::Client)
#[derive(Debug, Clone)]
pub struct Config {
    region: String,
    endpoint_url: Option<String>,
    force_path_style: bool,
    credentials: Option<Credentials>,
    wait_timeout: Duration,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The region requests are sent to and buckets are created in
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Custom endpoint for S3 compatible services, if any
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// Whether requests address buckets with path style URLs
    pub fn force_path_style(&self) -> bool {
        self.force_path_style
    }

    /// Explicit static credentials, if any.
    ///
    /// When unset the default credential provider chain is used.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Maximum time to wait for a bucket or object to reach its expected state
    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }
}

impl Default for Config {
    fn default() -> Self {
        Builder::default().build()
    }
}

/// Fluent style builder for [Config]
#[derive(Debug, Clone, Default)]
pub struct Builder {
    region: Option<String>,
    endpoint_url: Option<String>,
    force_path_style: bool,
    credentials: Option<Credentials>,
    wait_timeout: Option<Duration>,
}

impl Builder {
    /// Region to send requests to.
    ///
    /// Default is [`DEFAULT_REGION`].
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Send requests to a custom endpoint instead of the AWS regional endpoint.
    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Address buckets with path style (`https://host/bucket/key`) URLs.
    ///
    /// Mostly useful together with [`endpoint_url`](Self::endpoint_url).
    pub fn force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    /// Use explicit static credentials rather than the default provider chain.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Maximum time to wait for a bucket or object to reach its expected state.
    ///
    /// Default is [`DEFAULT_WAIT_TIMEOUT`].
    pub fn wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = Some(wait_timeout);
        self
    }

    /// Consumes the builder and constructs a [`Config`]
    pub fn build(self) -> Config {
        Config {
            region: self
                .region
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_owned()),
            endpoint_url: self.endpoint_url,
            force_path_style: self.force_path_style,
            credentials: self.credentials,
            wait_timeout: self.wait_timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Config, DEFAULT_REGION, DEFAULT_WAIT_TIMEOUT};

    #[test]
    fn test_defaults() {
        let config = Config::builder().build();
        assert_eq!(DEFAULT_REGION, config.region());
        assert_eq!(DEFAULT_WAIT_TIMEOUT, config.wait_timeout());
        assert!(config.endpoint_url().is_none());
        assert!(config.credentials().is_none());
        assert!(!config.force_path_style());
    }

    #[test]
    fn test_empty_region_falls_back_to_default() {
        let config = Config::builder().region("").build();
        assert_eq!(DEFAULT_REGION, config.region());
    }

    #[test]
    fn test_overrides() {
        let config = Config::builder()
            .region("eu-west-1")
            .endpoint_url("http://localhost:9000")
            .force_path_style(true)
            .wait_timeout(Duration::from_secs(5))
            .build();
        assert_eq!("eu-west-1", config.region());
        assert_eq!(Some("http://localhost:9000"), config.endpoint_url());
        assert!(config.force_path_style());
        assert_eq!(Duration::from_secs(5), config.wait_timeout());
    }
}
