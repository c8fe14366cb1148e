use anyhow::{Context as _, Result};
use eda_api::{Context, ServiceConfig, serve};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = ServiceConfig::from_env().context("Reading service configuration")?;
    info!(
        "Readiness threshold {:.2}, upload limit {} bytes",
        config.readiness_threshold, config.max_upload_bytes
    );

    serve(Context::new(config), shutdown_signal())
        .await
        .context("Serving HTTP")?;

    info!("Server stopped");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
