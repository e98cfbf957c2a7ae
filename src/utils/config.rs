//! Configuration and constants for the analyzer.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Field delimiter used by Apex debug log records
pub const FIELD_DELIMITER: char = '|';

/// Marker carried by trigger invocations in the last field of a
/// CODE_UNIT line. When present, the unit name is the second-to-last
/// field instead (the platform appends a trailing trigger qualifier).
pub const TRIGGER_MARKER: &str = "trigger/";

/// Default noise-suppression substrings for method entry/exit records.
///
/// Matched case-insensitively with "contains" semantics. Callers can
/// extend this list from the CLI.
pub const DEFAULT_IGNORE_LIST: &[&str] = &["system.", "logger."];

/// Variable names emitted by the platform for compiler-internal
/// artifacts rather than user variables. Assignments to these (and to
/// any dotted name starting with "this.") are suppressed.
pub const VARIABLE_DENYLIST: &[&str] = &["this", "t", "handler", "field", "tName"];

/// Debug-level categories recognized in the log header line.
///
/// The header is a semicolon-delimited list of "CATEGORY,LEVEL" pairs;
/// categories are matched with "contains" semantics against these names.
pub const DEBUG_LEVEL_CATEGORIES: &[&str] = &[
    "APEX_CODE",
    "APEX_PROFILING",
    "CALLOUT",
    "DATA_ACCESS",
    "DB",
    "NBA",
    "SYSTEM",
    "VALIDATION",
    "VISUALFORCE",
    "WAVE",
    "WORKFLOW",
];
