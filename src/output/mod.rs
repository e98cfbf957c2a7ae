//! Output writers for analysis reports.

pub mod json;

// Re-export main functions
pub use json::{read_report, write_report};
