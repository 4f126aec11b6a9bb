use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "change-order", version, about = "Construction change order generator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server (default)
    Start,

    /// Generate a change order workbook from a job description
    Generate(GenerateArgs),

    /// Test configuration file validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Job description text (reads stdin until a line `END` when neither --text nor --pdf is given)
    #[arg(short, long, conflicts_with = "pdf")]
    pub text: Option<String>,

    /// PDF file containing the job description
    #[arg(short, long)]
    pub pdf: Option<PathBuf>,

    /// Where to write the workbook
    #[arg(short, long, default_value = "change_order.xlsx")]
    pub output: PathBuf,

    /// Also upload the workbook to the configured storage backend
    #[arg(short, long)]
    pub upload: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration (with secrets masked)
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}
