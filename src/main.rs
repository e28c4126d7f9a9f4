//! Delphes Hists CLI
//!
//! Selects objects in Delphes-style events and fills weighted histogram
//! collections split by jet multiplicity.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use delphes_hists::commands::{
    display_schema, display_version, execute_process, validate_args, validate_collections_file,
    ProcessArgs,
};
use delphes_hists::utils::config::DEFAULT_LUMINOSITY;

/// Delphes Hists - weighted histogram collections for collision events
#[derive(Parser, Debug)]
#[command(name = "delphes-hists")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Select, classify and aggregate events into collections
    Process {
        /// Event file (.json/.jsonl/.ndjson) or list file of event paths
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for JSON collections
        #[arg(short, long, default_value = "hists.json")]
        output: PathBuf,

        /// Target integrated luminosity in pb^-1
        #[arg(long, default_value_t = DEFAULT_LUMINOSITY)]
        lumi: f64,

        /// Target cross-section in pb (0 keeps generator normalisation)
        #[arg(long, default_value_t = 0.0)]
        xs: f64,

        /// TOML analysis config (cuts, categories, pairing)
        #[arg(short, long, env = "DELPHES_HISTS_CONFIG")]
        config: Option<PathBuf>,

        /// Number of parallel shards
        #[arg(short, long, default_value = "1")]
        jobs: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a collections JSON file
    Validate {
        /// Path to collections JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Process {
            input,
            output,
            lumi,
            xs,
            config,
            jobs,
            summary,
        } => {
            let args = ProcessArgs {
                input,
                output,
                luminosity: lumi,
                cross_section: xs,
                config,
                jobs,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_process(args)?;
        }

        Commands::Validate { file } => {
            validate_collections_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
