//! Noise suppression for classified records.
//!
//! Two denylists live here: the caller-supplied ignore list for method
//! entry/exit records (case-insensitive "contains" matching), and the
//! fixed set of compiler-internal variable names whose assignments are
//! never user-relevant.

use crate::utils::config::VARIABLE_DENYLIST;

/// Decide whether a rendered method name should be suppressed.
///
/// **Public** - applied by the engine to method entry/exit records only.
/// Unit start/finish records always survive to preserve nesting integrity.
pub fn should_ignore(rendered_name: &str, ignore_list: &[String]) -> bool {
    let lowered = rendered_name.to_lowercase();
    ignore_list
        .iter()
        .any(|entry| lowered.contains(&entry.to_lowercase()))
}

/// True for variable names the platform emits for its own bookkeeping
/// (`this`, loop temporaries, handler plumbing) rather than user code.
///
/// **Public (crate)** - used by the classifier to drop assignments early.
pub(crate) fn is_internal_variable(name: &str) -> bool {
    VARIABLE_DENYLIST.contains(&name) || name.starts_with("this.")
}
