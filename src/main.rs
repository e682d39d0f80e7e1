//! docstore: connects with the configured driver and reports its health.

use tracing::{error, info};

use docstore::telemetry::init_logging;
use docstore::{AppConfig, AppError, Client};

#[tokio::main]
async fn main() {
    let env = std::env::var("DOCSTORE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = run(config).await {
        error!("docstore error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    info!("Starting docstore v{}", env!("CARGO_PKG_VERSION"));

    let client = Client::connect(&config.database).await?;
    let healthy = client.health_check().await?;
    let collection = client.default_collection();

    info!(
        driver = %client.driver().name(),
        collection = %collection.namespace(),
        healthy,
        "Document store ready"
    );
    Ok(())
}
