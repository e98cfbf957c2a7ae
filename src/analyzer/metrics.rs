//! Summary counts over a parse result.
//!
//! Walks the reconstructed trees and tallies the records a reader cares
//! about at a glance: exceptions, fatal errors, debug statements, query
//! and DML activity, plus frame count and nesting depth.

use crate::parser::schema::LogSummary;
use crate::parser::{EventKind, EventRecord, ParseResult, TreeNode};
use log::debug;

/// Compute summary counts for a parse result.
///
/// **Public** - main entry point for metrics calculation
pub fn summarize(result: &ParseResult) -> LogSummary {
    let mut summary = LogSummary::default();

    for transaction in &result.transactions {
        walk_nodes(&transaction.nodes, 1, &mut summary);
    }

    debug!(
        "Summary: {} frames, {} exceptions, {} debug statements",
        summary.frames, summary.exceptions, summary.debug_statements
    );
    summary
}

/// Recursive tree walk accumulating counts.
///
/// **Private** - internal helper for summarize
fn walk_nodes(nodes: &[TreeNode], depth: u64, summary: &mut LogSummary) {
    for node in nodes {
        match node {
            TreeNode::Frame(frame) => {
                summary.frames += 1;
                summary.max_depth = summary.max_depth.max(depth);
                walk_nodes(&frame.children, depth + 1, summary);
            }
            TreeNode::Event(event) => count_event(event, summary),
        }
    }
}

fn count_event(event: &EventRecord, summary: &mut LogSummary) {
    match event.kind {
        EventKind::ExceptionThrown => summary.exceptions += 1,
        EventKind::FatalError => summary.fatal_errors += 1,
        EventKind::UserDebug => summary.debug_statements += 1,
        EventKind::SoqlBegin => summary.soql_queries += 1,
        EventKind::DmlBegin => summary.dml_operations += 1,
        EventKind::ValidationRule => summary.validations += 1,
        _ => {}
    }
}
