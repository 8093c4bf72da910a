//! HTTP download of the dataset.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::DatasetFetcher;
use crate::auditor::error::{AuditError, AuditResult};

/// Whole-file download over HTTPS, single attempt.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> AuditResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("compas_audit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuditError::Download {
                url: String::new(),
                path: Default::default(),
                reason: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DatasetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> AuditResult<Vec<u8>> {
        let failure = |reason: String| AuditError::Download {
            url: url.to_string(),
            path: Default::default(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        debug!("GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(failure(format!("HTTP status {}", status)));
        }

        let body = response.bytes().await.map_err(|e| failure(e.to_string()))?;
        Ok(body.to_vec())
    }
}
