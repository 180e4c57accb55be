use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;

use warden::router::init_router;
use warden::state::init_app_state;
use warden_config::AppConfig;
use warden_observability::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let metrics = init_metrics();
    let config = AppConfig::from_env();
    let address = config.server.address();

    let state = init_app_state(config).await?.with_metrics(metrics);
    let app = init_router(state);

    let listener = TcpListener::bind(&address).await?;
    info!(address = %address, "Warden listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
