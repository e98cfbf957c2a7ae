//! Analysis passes over a parse result and the raw lines.
//!
//! These are the presentation-side collaborators of the parser: summary
//! counts, elapsed wall-clock time, and the debug-level header.

pub mod debug_levels;
pub mod metrics;
pub mod timing;

// Re-export main functions
pub use debug_levels::parse_debug_levels;
pub use metrics::summarize;
pub use timing::{extract_elapsed_time, ElapsedTime};
