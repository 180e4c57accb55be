use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Console-only logging for builds without the `observability` feature.
///
/// - **Log Level**: `LOG_LEVEL` environment variable (default: "info")
/// - **Filtering**: `RUST_LOG` wins when set; noisy dependencies are held at warn
/// - **Format**: compact, with module paths and source locations
pub fn init_basic_console_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warden={},warden_auth={},warden_cache={},tower_http=warn,hyper=warn,sqlx=warn",
            log_level, log_level, log_level
        ))
    });

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    // try_init: a second call (tests, embedding apps) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
