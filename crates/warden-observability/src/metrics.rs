use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

pub use metrics_exporter_prometheus::PrometheusHandle as MetricsHandle;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and spawns its upkeep task.
///
/// Returns `None` when observability is switched off or a recorder is already
/// installed in this process.
pub fn init_metrics() -> Option<MetricsHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        )
        .and_then(|builder| builder.install_recorder());

    let handle = match handle {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            return None;
        }
    };

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

/// Metrics middleware to track HTTP requests
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);
    gauge!("http_requests_active").decrement(1.0);

    response
}

/// One authorization outcome: `allow`, `redirect`, `ban` or `bypass`.
pub fn track_gate_decision(decision: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("warden_gate_decisions_total", "decision" => decision).increment(1);
}

/// A pipeline failure that was absorbed instead of surfaced.
pub fn track_gate_failure(kind: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("warden_gate_failures_total", "kind" => kind).increment(1);
}

pub fn track_ban_enforced(sessions_deleted: u64) {
    if !is_observability_enabled() {
        return;
    }
    counter!("warden_bans_enforced_total").increment(1);
    counter!("warden_ban_sessions_deleted_total").increment(sessions_deleted);
}

pub fn track_response_stamped() {
    if !is_observability_enabled() {
        return;
    }
    counter!("warden_responses_stamped_total").increment(1);
}
