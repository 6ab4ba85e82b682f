use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static UPSTREAM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    let requests = IntCounterVec::new(
        Opts::new(
            "fleetwatch_upstream_requests_total",
            "Requests sent to the device-data API",
        ),
        &["op"],
    )
    .expect("valid metric definition");

    REGISTRY
        .register(Box::new(requests.clone()))
        .expect("metric registered once");
    requests
});

pub static UPSTREAM_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    let failures = IntCounterVec::new(
        Opts::new(
            "fleetwatch_upstream_failures_total",
            "Device-data API requests that failed or returned an error status",
        ),
        &["op"],
    )
    .expect("valid metric definition");

    REGISTRY
        .register(Box::new(failures.clone()))
        .expect("metric registered once");
    failures
});

pub static DASHBOARD_GENERATION: Lazy<IntGauge> = Lazy::new(|| {
    let generation = IntGauge::new(
        "fleetwatch_dashboard_generation",
        "Number of completed dashboard refresh cycles",
    )
    .expect("valid metric definition");

    REGISTRY
        .register(Box::new(generation.clone()))
        .expect("metric registered once");
    generation
});

/// Text exposition of everything registered in [`REGISTRY`].
pub fn render() -> Result<String, prometheus::Error> {
    Lazy::force(&UPSTREAM_REQUESTS);
    Lazy::force(&UPSTREAM_FAILURES);
    Lazy::force(&DASHBOARD_GENERATION);
    TextEncoder::new().encode_to_string(&REGISTRY.gather())
}
