//! Tic-tac-toe server.
//!
//! Reads a JSON config from the path in `GRIDDUEL_CONFIG` (defaults are
//! used when unset), opens the file-backed account store, and serves until
//! Ctrl-C. Log verbosity follows `RUST_LOG`, defaulting to `info`.

use gridduel::prelude::*;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "GRIDDUEL_CONFIG";

#[tokio::main]
async fn main() -> Result<(), GridDuelError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => ServerConfig::from_json_file(path)?,
        None => ServerConfig::default(),
    };
    tracing::info!(
        bind = %config.bind_addr,
        data_dir = %config.data_dir.display(),
        grid_width = config.dispatch.room.grid_width,
        grid_height = config.dispatch.room.grid_height,
        "starting tic-tac-toe server"
    );

    if let Some(parent) = config.accounts_file.parent() {
        std::fs::create_dir_all(parent).map_err(AccountError::from)?;
    }
    let accounts = FileAccountStore::open(&config.accounts_file)?;

    let server = GridDuelServerBuilder::from_config(config)
        .build(accounts)
        .await?;
    tracing::info!(addr = ?server.local_addr().ok(), "listening");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl-C");
            }
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
