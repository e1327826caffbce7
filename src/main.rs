use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, create_router};
use catalog_core::{
    CoreConfig, ProductRepository,
    constants::{DEFAULT_DATA_FILE, DEFAULT_UPLOADS_DIR},
    path_from_env_value,
};

/// Main entry point for the catalog service
///
/// Resolves configuration once, opens the product repository (creating the data file and uploads
/// directory on first run) and serves the REST API.
///
/// # Environment Variables
/// - `CATALOG_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CATALOG_DATA_FILE`: Product collection document (default: "data/products.json")
/// - `CATALOG_UPLOADS_DIR`: Directory for uploaded images (default: "uploads")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configured paths are unusable,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CATALOG_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let data_file =
        path_from_env_value(std::env::var("CATALOG_DATA_FILE").ok(), DEFAULT_DATA_FILE);
    let uploads_dir = path_from_env_value(
        std::env::var("CATALOG_UPLOADS_DIR").ok(),
        DEFAULT_UPLOADS_DIR,
    );

    let cfg = Arc::new(CoreConfig::new(data_file, uploads_dir)?);
    tracing::info!("++ Product data file: {}", cfg.data_file().display());
    tracing::info!("++ Uploads directory: {}", cfg.uploads_dir().display());

    let repository = ProductRepository::open(cfg)?;
    let app = create_router(AppState { repository });

    tracing::info!("++ Starting catalog REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Crates whose logs are shown at `info` unless `RUST_LOG` says otherwise.
const LOGGED_CRATES: [&str; 4] = ["catalog_run", "catalog_core", "catalog_images", "api_rest"];

fn env_filter() -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for krate in LOGGED_CRATES {
        filter = filter.add_directive(format!("{}=info", krate).parse()?);
    }
    Ok(filter)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("-- Shutting down catalog REST");
}
