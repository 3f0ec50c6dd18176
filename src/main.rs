use hc_core::config::core_config_from_env_values;
use hc_core::Services;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the healthcare records application
///
/// Opens (and migrates) the database, then serves the REST API under `/api/v2`
/// together with Swagger UI at `/swagger-ui`. Stops gracefully on Ctrl-C.
///
/// # Environment Variables
/// - `HC_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `DATABASE_URL`: sqlx connection string (default: "sqlite://healthcare.db?mode=rwc")
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, database startup, or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hc_run=info".parse()?)
                .add_directive("hc_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    let cfg = core_config_from_env_values(
        std::env::var("DATABASE_URL").ok(),
        std::env::var("DATABASE_MAX_CONNECTIONS").ok(),
    )?;
    let pool = hc_core::db::connect(&cfg).await?;

    tracing::info!("++ Starting healthcare REST API on {}", rest_addr);

    let app = api_rest::router(Services::new(pool.clone()));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("-- Healthcare REST API stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
