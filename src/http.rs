use std::future::Future;
use std::time::Duration;
use tracing::Span;

use axum::extract::State;
use axum::http::{self, Response, StatusCode};
use axum::{response::IntoResponse, routing::get, Router};
use axum_prometheus::PrometheusMetricLayer;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app::AppState;
use crate::{fleet, metrics, proxy};

/// Every route except `/metrics`, which [`serve`] adds with its recorder.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/api/health", get(proxy::handler::health))
        .route(
            "/api/devices",
            get(proxy::handler::list_devices).post(proxy::handler::submit),
        )
        .route("/api/devices/:device_id", get(proxy::handler::get_device))
        .route(
            "/api/devices/:device_id/:timestamp",
            get(proxy::handler::get_device_at),
        )
        .route("/api/fleet/devices", get(fleet::handler::list_devices))
        .route("/api/fleet/devices/:device_id", get(fleet::handler::device))
        .route(
            "/api/fleet/devices/:device_id/history",
            get(fleet::handler::history),
        )
        .route("/api/fleet/map", get(fleet::handler::map))
        .route("/api/fleet/summary", get(fleet::handler::summary))
        .route("/api/dashboard", get(fleet::handler::dashboard))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &http::Request<_>| {
                    tracing::info_span!(
                      "http_request",
                      method = %req.method(),
                      path = %req.uri().path(),
                    )
                })
                .on_response(|res: &Response<_>, latency: Duration, _span: &Span| {
                    tracing::info!(
                      status = %res.status(),
                      latency_ms = %latency.as_millis(),
                      "response"
                    )
                })
                .on_failure(|_error: _, latency: Duration, _span: &Span| {
                    tracing::warn!(latency_ms = %latency.as_millis(), "request_failed");
                }),
        )
}

pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (prom_layer, prom_handle) = PrometheusMetricLayer::pair();

    let app = router(state)
        .route(
            "/metrics",
            get(move || async move {
                let mut body = prom_handle.render();
                match metrics::render() {
                    Ok(text) => body.push_str(&text),
                    Err(e) => tracing::warn!(error = %e, "failed to encode fleet metrics"),
                }
                body
            }),
        )
        .layer(prom_layer);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn banner() -> impl IntoResponse {
    "Fleet monitoring backend is running"
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn readyz(State(st): State<AppState>) -> impl IntoResponse {
    if st.ready.is_ready(&st.cfg.health) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}
