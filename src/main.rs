use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use change_order_generator::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    match args.get_command() {
        cli::Commands::Start => {
            // Tracing is set up from the loaded config
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Generate(generate_args) => {
            init_tracing("warn", "text");
            commands::generate::execute(&args.config, generate_args).await?;
        }
        cli::Commands::Test => {
            init_tracing("warn", "text");
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => {
            init_tracing("warn", "text");
            match action {
                cli::ConfigCommands::Show => commands::config::show(&args.config)?,
                cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
            }
        }
        cli::Commands::Version => {
            println!("Change Order Generator v{}", env!("CARGO_PKG_VERSION"));
            println!("Rust {}", env!("CARGO_PKG_RUST_VERSION"));
        }
    }

    Ok(())
}
