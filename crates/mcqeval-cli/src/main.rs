//! mcqeval CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod loader;

#[derive(Parser)]
#[command(name = "mcqeval", version, about = "Item analysis for multiple-choice tests")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a response table
    Analyze {
        /// CSV file: first row is the answer key, one row per student
        #[arg(long)]
        input: PathBuf,

        /// Use the first row as item labels
        #[arg(long)]
        header: bool,

        /// Use the first column as row labels
        #[arg(long)]
        index_col: bool,

        /// Difficulty thresholds "low,high" in percent (default: "20,70")
        #[arg(long)]
        difficulty: Option<String>,

        /// Discrimination thresholds "fair,good" (default: "0.2,0.4")
        #[arg(long)]
        discrimination: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text, json, markdown, html, all (comma-separated)
        #[arg(long, default_value = "text")]
        format: String,

        /// Output directory for file formats
        #[arg(long, default_value = "./mcqeval-results")]
        output: PathBuf,

        /// Exit code 1 if there are warnings or failed items
        #[arg(long)]
        strict: bool,
    },

    /// Check a response table for integrity errors and warnings
    ///
    /// Runs with the default thresholds; none of the checks depend on them.
    Validate {
        /// CSV file to check
        #[arg(long)]
        input: PathBuf,

        /// Use the first row as item labels
        #[arg(long)]
        header: bool,

        /// Use the first column as row labels
        #[arg(long)]
        index_col: bool,
    },

    /// Create starter config and sample response table
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mcqeval=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            header,
            index_col,
            difficulty,
            discrimination,
            config,
            format,
            output,
            strict,
        } => commands::analyze::execute(
            input,
            header,
            index_col,
            difficulty,
            discrimination,
            config,
            format,
            output,
            strict,
        ),
        Commands::Validate {
            input,
            header,
            index_col,
        } => commands::validate::execute(input, header, index_col),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
