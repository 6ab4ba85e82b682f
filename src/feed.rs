use axum::async_trait;
use serde_json::Value;

use crate::domain::Snapshot;

#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    #[error("upstream answered {status}")]
    Status { status: u16, body: Value },
    #[error("upstream unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
}

impl UpstreamError {
    /// Status to hand back to our own caller.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The upstream body when it sent one, otherwise the error text.
    pub fn details(&self) -> Value {
        match self {
            UpstreamError::Status { body, .. } if !body.is_null() => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

/// Access to the externally hosted device-data API.
///
/// Handlers and services receive an `Arc<dyn DeviceFeed>`; tests swap in an
/// in-memory feed.
#[async_trait]
pub trait DeviceFeed: Send + Sync {
    async fn list(&self) -> Result<Value, UpstreamError>;

    async fn get(&self, device_id: &str) -> Result<Value, UpstreamError>;

    async fn get_at(&self, device_id: &str, timestamp: &str) -> Result<Value, UpstreamError>;

    async fn submit(&self, body: Value) -> Result<Value, UpstreamError>;

    /// A fresh, normalised read of the whole feed.
    async fn snapshot(&self) -> Result<Snapshot, UpstreamError> {
        Ok(Snapshot::from_value(self.list().await?))
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeFeed;
    use super::*;
    use serde_json::json;

    #[test]
    fn details_prefer_the_upstream_body() {
        let with_body = UpstreamError::Status {
            status: 404,
            body: json!({ "message": "Device not found" }),
        };
        assert_eq!(with_body.status(), Some(404));
        assert_eq!(with_body.details(), json!({ "message": "Device not found" }));

        let empty = UpstreamError::Status {
            status: 502,
            body: Value::Null,
        };
        assert_eq!(empty.details(), json!("upstream answered 502"));

        let bad = UpstreamError::InvalidUrl("mailto:x".into());
        assert_eq!(bad.status(), None);
    }

    #[tokio::test]
    async fn snapshot_normalises_the_list_body() {
        let feed = FakeFeed::serving(json!({ "items": [{ "device_id": "TL_01" }, { "device_id": "TL_02" }] }));
        let snapshot = feed.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(feed.calls(), 1);
    }
}
