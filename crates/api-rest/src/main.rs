//! PMS REST server entry point.

use api_rest::{app, AppConfig, AppState};
use pms_store::PatientStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Starts the PMS REST server.
///
/// # Environment Variables
/// - `PMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PMS_DATA_FILE`: patient snapshot file (default: "patients.json")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("pms=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    tracing::info!("++ Starting PMS REST on {}", config.listen_addr);
    tracing::info!("++ Patient snapshot file: {}", config.data_file.display());

    let state = AppState::new(PatientStore::new(config.data_file));
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
