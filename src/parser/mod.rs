//! Log parsing and tree reconstruction.
//!
//! This module handles:
//! - Classifying raw log lines into event records
//! - Suppressing noise (ignored methods, internal variables)
//! - Rebuilding call nesting with an explicit stack
//! - Defining the output report schema

pub mod classifier;
pub mod engine;
pub mod filter;
pub mod schema;
pub mod tree;

// Re-export main types
pub use classifier::{classify, EventKind, EventRecord};
pub use engine::parse_log;
pub use filter::should_ignore;
pub use schema::{AnalysisReport, LogSummary};
pub use tree::{restructure, Frame, ParseResult, Transaction, TreeNode};
