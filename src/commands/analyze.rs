//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Loads the log file and splits it into lines
//! 2. Parses the lines into call trees
//! 3. Computes summary counts and elapsed time
//! 4. Extracts the debug-level header
//! 5. Writes the JSON report

use crate::analyzer::{extract_elapsed_time, parse_debug_levels, summarize};
use crate::output::write_report;
use crate::parser::schema::AnalysisReport;
use crate::parser::{parse_log, ParseResult};
use crate::utils::config::{DEFAULT_IGNORE_LIST, SCHEMA_VERSION};
use crate::utils::error::LogReadError;
use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to the debug log file
    pub input: PathBuf,

    /// Output path for the JSON report
    pub output_json: PathBuf,

    /// Extra noise-suppression substrings (added to the default list)
    pub ignore: Vec<String>,

    /// Skip the built-in ignore list
    pub no_default_ignore: bool,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_json: PathBuf::from("report.json"),
            ignore: Vec::new(),
            no_default_ignore: false,
            print_summary: false,
        }
    }
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Log file missing, empty, or not a `.log` file
/// * Report write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    info!("Analyzing log file: {}", args.input.display());

    // Step 1: Load the log
    info!("Step 1/4: Loading log file...");
    let content = load_log(&args)?;
    let lines: Vec<&str> = content.lines().collect();
    debug!("Loaded {} lines", lines.len());

    // Step 2: Parse into call trees
    info!("Step 2/4: Reconstructing call trees...");
    let ignore_list = build_ignore_list(&args);
    let result = parse_log(&lines, &ignore_list);

    if !result.well_formed {
        info!("No transaction balanced; report will hold a flat event list");
    } else {
        debug!("Reconstructed {} transaction(s)", result.transactions.len());
    }

    // Step 3: Analysis passes
    info!("Step 3/4: Computing summary...");
    let summary = summarize(&result);
    let elapsed = extract_elapsed_time(&lines);
    let debug_levels = lines
        .first()
        .map(|header| parse_debug_levels(header))
        .unwrap_or_default();

    // Step 4: Write report
    info!("Step 4/4: Writing report...");
    let report = build_report(&args, result, summary, elapsed.map(|e| e.to_string()), debug_levels);
    write_report(&report, &args.output_json).context("Failed to write report JSON")?;

    info!("✓ Report written to: {}", args.output_json.display());

    if args.print_summary {
        print_summary(&report);
    }

    Ok(())
}

/// Load and sanity-check the log file
///
/// **Private** - internal helper for execute_analyze
fn load_log(args: &AnalyzeArgs) -> Result<String> {
    if args.input.extension().and_then(|ext| ext.to_str()) != Some("log") {
        return Err(LogReadError::NotALogFile(args.input.display().to_string()).into());
    }

    let content = std::fs::read_to_string(&args.input)
        .map_err(LogReadError::ReadFailed)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    if content.trim().is_empty() {
        return Err(LogReadError::EmptyFile.into());
    }

    Ok(content)
}

/// Combine the default ignore list with caller-supplied entries
///
/// **Private** - internal helper for execute_analyze
fn build_ignore_list(args: &AnalyzeArgs) -> Vec<String> {
    let mut ignore_list: Vec<String> = if args.no_default_ignore {
        Vec::new()
    } else {
        DEFAULT_IGNORE_LIST.iter().map(|s| s.to_string()).collect()
    };
    ignore_list.extend(args.ignore.iter().cloned());
    ignore_list
}

/// Assemble the final report
///
/// **Private** - internal helper for execute_analyze
fn build_report(
    args: &AnalyzeArgs,
    result: ParseResult,
    summary: crate::parser::LogSummary,
    elapsed_time: Option<String>,
    debug_levels: std::collections::BTreeMap<String, String>,
) -> AnalysisReport {
    AnalysisReport {
        version: SCHEMA_VERSION.to_string(),
        source_file: args.input.display().to_string(),
        well_formed: result.well_formed,
        summary,
        elapsed_time,
        debug_levels,
        transactions: result.transactions,
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// Print a text summary to stdout
///
/// **Private** - internal helper for execute_analyze
fn print_summary(report: &AnalysisReport) {
    println!("\n{}", "=".repeat(80));
    println!("LOG ANALYSIS SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Source:           {}", report.source_file);
    println!("Well-formed:      {}", report.well_formed);
    println!("Transactions:     {}", report.transactions.len());
    println!("Frames:           {}", report.summary.frames);
    println!("Max depth:        {}", report.summary.max_depth);
    println!("Exceptions:       {}", report.summary.exceptions);
    println!("Fatal errors:     {}", report.summary.fatal_errors);
    println!("Debug statements: {}", report.summary.debug_statements);
    println!("SOQL queries:     {}", report.summary.soql_queries);
    println!("DML operations:   {}", report.summary.dml_operations);
    if let Some(elapsed) = &report.elapsed_time {
        println!("Elapsed time:     {}", elapsed);
    }
    println!("{}", "=".repeat(80));
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if args.input.extension().and_then(|ext| ext.to_str()) != Some("log") {
        anyhow::bail!("Input must be a .log file");
    }

    if args.output_json.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    Ok(())
}
