//! Elapsed wall-clock time extraction.
//!
//! Debug log lines open with a `HH:MM:SS.fff` timestamp. The elapsed
//! time of the whole log is the difference between the first and last
//! timestamp-bearing lines; lines without a timestamp prefix (header,
//! formula continuations) are skipped.

use chrono::NaiveTime;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}:\d{2}:\d{2}\.\d+").expect("timestamp pattern is valid")
});

/// Elapsed time between the first and last timestamped lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedTime {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub millis: i64,
}

impl ElapsedTime {
    fn from_millis(mut total: i64) -> Self {
        let hours = total / 3_600_000;
        total %= 3_600_000;
        let minutes = total / 60_000;
        total %= 60_000;
        let seconds = total / 1_000;
        let millis = total % 1_000;
        Self {
            hours,
            minutes,
            seconds,
            millis,
        }
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}h {}m {}s {}ms",
            self.hours, self.minutes, self.seconds, self.millis
        )
    }
}

/// Extract elapsed time from a log's lines.
///
/// **Public** - called by the analyze command
///
/// Returns `None` when no line carries a timestamp prefix.
pub fn extract_elapsed_time<S: AsRef<str>>(lines: &[S]) -> Option<ElapsedTime> {
    let first = lines.iter().find_map(|line| timestamp_of(line.as_ref()))?;
    let last = lines
        .iter()
        .rev()
        .find_map(|line| timestamp_of(line.as_ref()))?;

    let delta = last.signed_duration_since(first);
    Some(ElapsedTime::from_millis(delta.num_milliseconds()))
}

/// Parse the leading timestamp of one line, if present.
///
/// **Private** - internal helper for extract_elapsed_time
fn timestamp_of(line: &str) -> Option<NaiveTime> {
    let matched = TIMESTAMP_RE.find(line)?;
    NaiveTime::parse_from_str(matched.as_str(), "%H:%M:%S%.f").ok()
}
