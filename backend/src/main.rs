// Strata Server entrypoint
//
// Loads configuration, initialises logging, bootstraps the live query
// subsystem over an in-memory store and waits for Ctrl-C.

use anyhow::Result;
use log::{error, info};
use std::env;
use std::sync::Arc;
use strata_configs::ServerConfig;
use strata_server::{logging, StrataServer};
use strata_store::InMemoryBackend;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| "server.toml".to_string());
    let config = match ServerConfig::from_file(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("FATAL: Failed to load {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    // Logging before any other side effects
    logging::init_logging(&config.logging)?;
    info!("Loaded config from {}", config_path);

    let server = StrataServer::bootstrap(config, Arc::new(InMemoryBackend::new()))?;

    tokio::signal::ctrl_c().await?;
    let failed = server.shutdown();
    if failed > 0 {
        error!("{} connections failed to tear down cleanly", failed);
    }
    info!("Server stopped");

    Ok(())
}
