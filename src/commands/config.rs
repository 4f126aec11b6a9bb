use anyhow::Result;
use change_order_generator::{
    config::{self, Config},
    logging::SensitiveApiKey,
};
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the current configuration with secrets masked
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    // Show what would be loaded even if it does not validate yet
    let cfg = config::load_unvalidated(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    if let Err(e) = config::validate_config(&cfg) {
        println!("{} {}", "⚠ Configuration is not valid:".red(), e);
    }

    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Model: {}", cfg.llm.model);
    println!("  Storage Backend: {}", cfg.storage.backend);

    info!("Configuration validation successful");
    Ok(())
}

/// Mask credentials in configuration for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    sanitized.llm.api_key = mask_api_key(&sanitized.llm.api_key);
    sanitized.storage.access_token = mask_api_key(&sanitized.storage.access_token);
    sanitized
}

/// Mask a secret for display; unset secrets stay empty
fn mask_api_key(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        SensitiveApiKey::new(key).to_string()
    }
}
