use anyhow::Result;
use change_order_generator::{config, init_tracing, server};
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Loads configuration, initializes logging from it, and runs the server
/// until SIGTERM/SIGINT.
pub async fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    init_tracing(&cfg.server.log_level, &cfg.server.log_format);

    println!("{}", "Starting change order server...".green());
    info!(config = %config_path.display(), "Starting change order server");

    // Blocks until shutdown
    server::start_server(cfg, config_path.to_path_buf()).await?;

    Ok(())
}
