//! Apexlog Studio CLI
//!
//! Reconstructs the call-nesting structure of Salesforce Apex debug
//! logs and writes a JSON report of the execution tree.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use apexlog_studio::commands::{execute_analyze, validate_args, AnalyzeArgs};
use apexlog_studio::output::read_report;
use apexlog_studio::utils::config::SCHEMA_VERSION;

/// Apexlog Studio - call-tree analysis for Apex debug logs
#[derive(Parser, Debug)]
#[command(name = "apexlog")]
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
    /// Analyze a debug log file
    Analyze {
        /// Path to the .log file
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Extra ignore substring for method entry/exit records (repeatable)
        #[arg(long = "ignore")]
        ignore: Vec<String>,

        /// Skip the built-in ignore list
        #[arg(long)]
        no_default_ignore: bool,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
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

    // Execute command
    match cli.command {
        Commands::Analyze {
            input,
            output,
            ignore,
            no_default_ignore,
            summary,
        } => {
            let args = AnalyzeArgs {
                input,
                output_json: output,
                ignore,
                no_default_ignore,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            // Execute analysis
            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
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

/// Validate a report JSON file
///
/// **Private** - internal command implementation
fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Source: {}", report.source_file);
    println!("  Well-formed: {}", report.well_formed);
    println!("  Transactions: {}", report.transactions.len());
    println!("  Frames: {}", report.summary.frames);

    Ok(())
}

/// Display schema information
///
/// **Private** - internal command implementation
fn display_schema(show_details: bool) {
    println!("Apexlog Studio Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  source_file: string      - Analyzed log file");
        println!("  well_formed: bool        - At least one transaction balanced");
        println!("  summary: object          - Event counts");
        println!("    frames: number         - Closed execution units");
        println!("    max_depth: number      - Deepest nesting observed");
        println!("    exceptions: number     - EXCEPTION_THROWN records");
        println!("    fatal_errors: number   - FATAL_ERROR records");
        println!("    debug_statements: number - USER_DEBUG records");
        println!("    soql_queries: number   - SOQL_EXECUTE_BEGIN records");
        println!("    dml_operations: number - DML_BEGIN records");
        println!("  elapsed_time: string?    - First-to-last timestamp delta");
        println!("  debug_levels: object     - Header settings (category -> level)");
        println!("  transactions: array      - Call trees, one per balanced region");
        println!("  generated_at: string     - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Apexlog Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call-tree reconstruction and analysis for Apex debug logs.");
}
