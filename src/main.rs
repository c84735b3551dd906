use tracing_subscriber::EnvFilter;

use fhir_lite::api::{router, AppState};
use fhir_lite::config::Config;
use fhir_lite::infrastructure::db;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fhir_lite=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = db::connect_pool(&config.database).await?;
    tracing::info!("Database connected successfully");

    if config.database.run_migrations {
        db::migrate(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let state = AppState::postgres(pool, config.database.retry, config.page_limits);
    let app = router(state);

    // Start server
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
