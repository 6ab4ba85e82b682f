use axum::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::UpstreamCfg;
use crate::feed::{DeviceFeed, UpstreamError};
use crate::metrics::{UPSTREAM_FAILURES, UPSTREAM_REQUESTS};

const RESOURCE: &str = "device-data";

/// [`DeviceFeed`] backed by the managed device-data API over HTTP.
pub struct HttpDeviceFeed {
    client: Client,
    base: Url,
}

impl HttpDeviceFeed {
    pub fn new(cfg: &UpstreamCfg) -> Result<Self, UpstreamError> {
        let base = Url::parse(&cfg.base_url)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{}: {e}", cfg.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(cfg.base_url.clone()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;
        Ok(Self { client, base })
    }

    /// `<base>/device-data/<segments...>`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(RESOURCE)
            .extend(segments);
        Ok(url)
    }

    async fn relay(&self, op: &'static str, request: RequestBuilder) -> Result<Value, UpstreamError> {
        UPSTREAM_REQUESTS.with_label_values(&[op]).inc();

        let failed = |e: reqwest::Error| {
            UPSTREAM_FAILURES.with_label_values(&[op]).inc();
            warn!(op, error = %e, "upstream request failed");
            e
        };
        let response = request.send().await.map_err(failed)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(failed)?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        if !status.is_success() {
            UPSTREAM_FAILURES.with_label_values(&[op]).inc();
            warn!(op, status = status.as_u16(), "upstream returned an error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(op, status = status.as_u16(), bytes = bytes.len(), "upstream ok");
        Ok(body)
    }
}

#[async_trait]
impl DeviceFeed for HttpDeviceFeed {
    async fn list(&self) -> Result<Value, UpstreamError> {
        let url = self.url(&[])?;
        self.relay("list", self.client.get(url)).await
    }

    async fn get(&self, device_id: &str) -> Result<Value, UpstreamError> {
        let url = self.url(&[device_id])?;
        self.relay("get", self.client.get(url)).await
    }

    async fn get_at(&self, device_id: &str, timestamp: &str) -> Result<Value, UpstreamError> {
        let url = self.url(&[device_id, timestamp])?;
        self.relay("get_at", self.client.get(url)).await
    }

    async fn submit(&self, body: Value) -> Result<Value, UpstreamError> {
        let url = self.url(&[])?;
        self.relay("submit", self.client.post(url).json(&body)).await
    }
}
