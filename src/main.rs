//! Command-line interface for arbitrary-factory
//!
//! # Usage Examples
//!
//! ```bash
//! # Sample five user profiles
//! arbitrary-factory sample --recipe demos/profiles.yaml --count 5
//!
//! # Reproducible poker hands written to a file
//! ARBITRARY_FACTORY_SEED=42 arbitrary-factory sample \
//!   --recipe demos/cards.yaml \
//!   --count 1000 \
//!   --output hands.jsonl
//!
//! # Check a recipe
//! arbitrary-factory check --recipe demos/profiles.yaml
//! ```

use arbitrary_factory::{run_check, run_sample, CheckArgs, SampleArgs};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arbitrary-factory")]
#[command(about = "Sample lazy, seedable generator recipes as JSON lines")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate documents from a recipe
    Sample(SampleArgs),

    /// Validate a recipe and list its named generators
    Check(CheckArgs),
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sample(args) => {
            run_sample(&args)?;
        }
        Commands::Check(args) => {
            run_check(&args, std::io::stdout().lock())?;
        }
    }

    Ok(())
}
