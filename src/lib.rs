pub mod api;
pub mod config;
pub mod core_state; // Transport-agnostic state
pub mod db;
pub mod forms; // Patient, case, prescription and profile forms
pub mod models;
pub mod notice;
pub mod patients; // Patient list & detail
pub mod repertory; // Rubric search & remedy grades
pub mod session; // Practitioner sessions
pub mod shell; // Page routes & sign-in gate
pub mod validation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Start the practice server and run until Ctrl-C.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let server_config = config::ServerConfig::from_env()?;

    // Create the database and apply migrations before taking traffic
    db::open_database(&server_config.db_path)?;
    tracing::info!(path = %server_config.db_path.display(), "Database ready");

    let core = Arc::new(core_state::CoreState::from_config(&server_config));
    let mut server = api::start_api_server(core, server_config.bind).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    server.shutdown();
    server.stopped().await;
    Ok(())
}
