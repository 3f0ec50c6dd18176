//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful during development when you want the API without the workspace's `hc-run` wrapper.
//! Both binaries read the same environment variables.

use hc_core::config::core_config_from_env_values;
use hc_core::Services;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the healthcare REST API server
///
/// # Environment Variables
/// - `HC_REST_ADDR`: Server address (default: "0.0.0.0:8000")
/// - `DATABASE_URL`: sqlx connection string (default: "sqlite://healthcare.db?mode=rwc")
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the database cannot be opened or migrated,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("hc_core=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("HC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    tracing::info!("-- Starting healthcare REST API on {}", addr);

    let cfg = core_config_from_env_values(
        std::env::var("DATABASE_URL").ok(),
        std::env::var("DATABASE_MAX_CONNECTIONS").ok(),
    )?;
    let pool = hc_core::db::connect(&cfg).await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    api_rest::serve(listener, Services::new(pool)).await?;

    Ok(())
}
