//! loraconf CLI - LoRA configuration checks
//!
//! Loads model configs, normalizes their LoRA fields, and reports or writes
//! the result.

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

/// loraconf - LoRA adapter configuration tool
#[derive(Parser)]
#[command(name = "loraconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config and list its adapters
    Check {
        /// Config file (YAML or JSON)
        input: String,
    },

    /// Print or write the normalized config
    Normalize {
        /// Config file (YAML or JSON)
        input: String,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,

        /// Output format [default: yaml, or the output file's extension]
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// YAML document
    Yaml,
    /// Pretty-printed JSON
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(!cli.no_color)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Check { input } => {
            commands::check::run(&input)?;
        }

        Commands::Normalize {
            input,
            output,
            format,
        } => {
            commands::normalize::run(&input, output.as_deref(), format)?;
        }
    }

    Ok(())
}
