use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::feed::UpstreamError;

#[derive(thiserror::Error, Debug)]
pub enum FleetError {
    #[error("device {0} not found")]
    DeviceNotFound(String),
    #[error("unknown equipment category: {0}")]
    UnknownCategory(String),
    #[error("unknown MEWP variant: {0}")]
    UnknownVariant(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// JSON error body `{error, details}` with a matching status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Value,
}

impl ApiError {
    /// Passes the upstream status through, 500 when there was none.
    pub fn upstream(context: &str, err: &UpstreamError) -> Self {
        let status = err
            .status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            error: context.to_string(),
            details: err.details(),
        }
    }

    pub fn fleet(context: &str, err: FleetError) -> Self {
        let status = match &err {
            FleetError::DeviceNotFound(_) => StatusCode::NOT_FOUND,
            FleetError::UnknownCategory(_) | FleetError::UnknownVariant(_) => {
                StatusCode::BAD_REQUEST
            }
            FleetError::Upstream(inner) => return Self::upstream(context, inner),
        };
        Self {
            status,
            error: context.to_string(),
            details: Value::String(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.error, "details": self.details })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_passed_through() {
        let err = UpstreamError::Status {
            status: 404,
            body: json!({ "message": "Device not found" }),
        };
        let api = ApiError::upstream("Failed to fetch device by ID", &err);
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.details, json!({ "message": "Device not found" }));
    }

    #[test]
    fn missing_upstream_status_becomes_500() {
        let err = UpstreamError::InvalidUrl("nowhere".into());
        let api = ApiError::upstream("Failed to fetch device data", &err);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Failed to fetch device data");
    }

    #[test]
    fn fleet_errors_map_to_client_statuses() {
        let api = ApiError::fleet("lookup", FleetError::DeviceNotFound("TL_09".into()));
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.details, json!("device TL_09 not found"));

        let api = ApiError::fleet("filter", FleetError::UnknownCategory("crane".into()));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
    }
}
