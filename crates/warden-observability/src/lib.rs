//! Warden Observability
//!
//! Provides:
//! - Console and rolling-file logging via `tracing`
//! - Prometheus metrics for gate decisions, ban enforcement and stamping
//! - HTTP request/response logging middleware
//!
//! Everything beyond console logging is compiled only with the `observability`
//! feature (on by default). At runtime the `OBSERVABILITY_ENABLED` environment
//! variable can switch metrics off.
//!
//! # Examples
//!
//! ```no_run
//! use warden_observability::{init_metrics, init_tracing};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     let handle = init_metrics();
//!     // ... application code ...
//! }
//! ```

pub mod basic_logging;

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

#[cfg(feature = "observability")]
pub use self::logging::{init_tracing, logging_middleware};
#[cfg(feature = "observability")]
pub use self::metrics::{
    MetricsHandle, init_metrics, is_observability_enabled, metrics_middleware,
    track_ban_enforced, track_gate_decision, track_gate_failure, track_response_stamped,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{extract::Request, middleware::Next, response::Response};

    /// Stand-in for the Prometheus handle; renders nothing.
    #[derive(Clone, Debug, Default)]
    pub struct MetricsHandle;

    impl MetricsHandle {
        pub fn render(&self) -> String {
            String::new()
        }
    }

    pub fn is_observability_enabled() -> bool {
        false
    }

    /// Console logging only.
    pub fn init_tracing() {
        super::basic_logging::init_basic_console_logging();
    }

    pub fn init_metrics() -> Option<MetricsHandle> {
        None
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn track_gate_decision(_decision: &'static str) {}
    pub fn track_gate_failure(_kind: &'static str) {}
    pub fn track_ban_enforced(_sessions_deleted: u64) {}
    pub fn track_response_stamped() {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
