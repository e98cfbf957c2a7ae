//! Output JSON schema definitions for analysis reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use super::tree::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Log file that was analyzed
    pub source_file: String,

    /// Whether at least one transaction balanced (false = flat fallback)
    pub well_formed: bool,

    /// Event counts over the whole result
    pub summary: LogSummary,

    /// Elapsed wall-clock time between first and last timestamped lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<String>,

    /// Debug-level settings from the log header line
    pub debug_levels: BTreeMap<String, String>,

    /// Reconstructed call trees, one per stack-balanced region
    pub transactions: Vec<Transaction>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// Summary counts computed by walking the parse result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSummary {
    /// Closed execution units (frames) across all transactions
    pub frames: u64,

    /// Deepest frame nesting observed
    pub max_depth: u64,

    /// Thrown exceptions
    pub exceptions: u64,

    /// Fatal errors
    pub fatal_errors: u64,

    /// USER_DEBUG statements
    pub debug_statements: u64,

    /// SOQL query executions (begin markers)
    pub soql_queries: u64,

    /// DML operations (begin markers)
    pub dml_operations: u64,

    /// Validation rule evaluations
    pub validations: u64,
}
