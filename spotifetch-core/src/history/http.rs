//! HTTP client for the history service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::PlayEvent;

use super::{EventSource, HistoryRecord};

/// Event source backed by `GET /user/{user_id}/history/?skip=&limit=`.
///
/// Requests are not retried; timeouts come from the client configuration.
pub struct HttpEventSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpEventSource {
    /// Create a client from configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.server_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {}", api_key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// URL of a user's history collection.
    pub fn history_url(&self, user_id: &str) -> String {
        format!(
            "{}/user/{}/history/",
            self.base_url,
            urlencoding::encode(user_id)
        )
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch_page(
        &self,
        user_id: &str,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<PlayEvent>> {
        let url = self.history_url(user_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await
            .map_err(|e| Error::EventSource(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::EventSource(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let records: Vec<HistoryRecord> = response
            .json()
            .await
            .map_err(|e| Error::EventSource(format!("failed to parse response: {}", e)))?;

        records.into_iter().map(HistoryRecord::into_event).collect()
    }
}
