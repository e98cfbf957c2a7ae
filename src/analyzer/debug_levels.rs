//! Debug-level header parsing.
//!
//! The first line of a debug log lists the active log categories and
//! their levels as a semicolon-delimited settings line, e.g.
//! `64.0 APEX_CODE,FINEST;APEX_PROFILING,INFO;DB,INFO`. The leading API
//! version is glued to the first category name, so APEX_CODE is
//! normalized; other categories keep their name as logged.

use crate::utils::config::DEBUG_LEVEL_CATEGORIES;
use log::debug;
use std::collections::BTreeMap;

/// Parse the debug-level settings from the log's header line.
///
/// **Public** - called by the analyze command with the first log line
///
/// Unrecognized categories and malformed entries are skipped; a
/// non-header line yields an empty map.
pub fn parse_debug_levels(header_line: &str) -> BTreeMap<String, String> {
    let mut levels = BTreeMap::new();

    for entry in header_line.split(';') {
        let mut parts = entry.split(',');
        let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };

        let Some(category) = DEBUG_LEVEL_CATEGORIES
            .iter()
            .find(|category| name.contains(**category))
        else {
            continue;
        };

        let key = if *category == "APEX_CODE" {
            // Strip the API-version prefix glued to the first entry.
            "APEX_CODE".to_string()
        } else {
            name.to_string()
        };
        levels.insert(key, value.to_string());
    }

    debug!("Parsed {} debug-level entries", levels.len());
    levels
}
