//! Coursekit platform server binary.
//!
//! This is the main entry point that wires the data layer to the HTTP
//! API. It loads configuration, connects to `PostgreSQL`, runs pending
//! migrations, and serves requests until the process is terminated.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `coursekit-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` and run migrations
//! 4. Build the shared application state
//! 5. Serve the Axum router
//!
//! Configuration is read first because the log filter comes from it;
//! a config failure still initializes logging with defaults so the
//! error is reported before the process exits.

mod error;

use std::path::Path;
use std::sync::Arc;

use coursekit_api::{start_server, AppState, ServerConfig};
use coursekit_core::PlatformConfig;
use coursekit_db::{PostgresConfig, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::StartupError;

/// Default configuration file path, relative to the working directory.
const CONFIG_PATH: &str = "coursekit-config.yaml";

/// Application entry point for the Coursekit server.
///
/// # Errors
///
/// Returns an error if configuration loading, database setup, or the
/// HTTP server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration (falling back to defaults when no file exists).
    let config_path = Path::new(CONFIG_PATH);
    let config_result = if config_path.exists() {
        PlatformConfig::from_file(config_path)
    } else {
        PlatformConfig::parse("{}")
    };

    // 2. Initialize structured logging, with the default filter when the
    // configuration did not load.
    let default_filter = config_result
        .as_ref()
        .map_or_else(|_| String::from("info"), |c| c.logging.filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(true)
        .init();

    info!("coursekit-server starting");

    let config = match config_result {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, path = CONFIG_PATH, "Configuration failed to load");
            return Err(Box::new(StartupError::from(e)) as Box<dyn std::error::Error>);
        }
    };
    info!(
        host = config.server.host,
        port = config.server.port,
        drip_policy = ?config.drip.policy,
        "Configuration loaded"
    );

    // 3. Connect to PostgreSQL and run migrations.
    let pg_config = PostgresConfig::from_settings(&config.database);
    let pool = PostgresPool::connect(&pg_config)
        .await
        .map_err(StartupError::from)?;
    pool.run_migrations().await.map_err(StartupError::from)?;

    // 4. Build shared state.
    let state = Arc::new(AppState::with_policy(pool, config.drip.policy));

    // 5. Serve.
    let server_config = ServerConfig {
        host: config.server.host,
        port: config.server.port,
    };
    start_server(&server_config, state)
        .await
        .map_err(StartupError::from)?;

    info!("coursekit-server stopped");
    Ok(())
}
