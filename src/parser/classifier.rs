//! Line classifier for Apex debug log records.
//!
//! One raw log line is one pipe-delimited record. Classification is
//! first-match over an ordered keyword table: the first keyword found in
//! the line decides the event kind, then payload extraction is dispatched
//! on that kind. Lines matching no keyword, or carrying fewer fields than
//! their kind requires, yield `None` and are skipped by the caller.

use crate::parser::filter::is_internal_variable;
use crate::utils::config::{FIELD_DELIMITER, TRIGGER_MARKER};
use serde::{Deserialize, Serialize};

/// Closed set of event kinds recognized in a debug log.
///
/// **Public** - part of the parse result shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "CODE_UNIT_STARTED")]
    UnitStarted,
    #[serde(rename = "CODE_UNIT_FINISHED")]
    UnitFinished,
    #[serde(rename = "METHOD_ENTRY")]
    MethodEntry,
    #[serde(rename = "METHOD_EXIT")]
    MethodExit,
    #[serde(rename = "FLOW_START_INTERVIEW_BEGIN")]
    FlowStart,
    #[serde(rename = "FLOW_START_INTERVIEWS_ERROR")]
    FlowError,
    #[serde(rename = "NAMED_CREDENTIAL_REQUEST")]
    NamedCredentialRequest,
    #[serde(rename = "NAMED_CREDENTIAL_RESPONSE")]
    NamedCredentialResponse,
    #[serde(rename = "CALLOUT_REQUEST")]
    CalloutRequest,
    #[serde(rename = "CALLOUT_RESPONSE")]
    CalloutResponse,
    #[serde(rename = "EXCEPTION_THROWN")]
    ExceptionThrown,
    #[serde(rename = "FATAL_ERROR")]
    FatalError,
    #[serde(rename = "VALIDATION_RULE")]
    ValidationRule,
    #[serde(rename = "VALIDATION_FORMULA")]
    ValidationFormula,
    #[serde(rename = "VALIDATION_PASS")]
    ValidationPass,
    #[serde(rename = "VALIDATION_FAIL")]
    ValidationFail,
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    #[serde(rename = "USER_DEBUG")]
    UserDebug,
    #[serde(rename = "VARIABLE_ASSIGNMENT")]
    VariableAssignment,
    #[serde(rename = "SOQL_EXECUTE_BEGIN")]
    SoqlBegin,
    #[serde(rename = "SOQL_EXECUTE_END")]
    SoqlEnd,
    #[serde(rename = "DML_BEGIN")]
    DmlBegin,
    #[serde(rename = "DML_END")]
    DmlEnd,
}

/// One classified log record.
///
/// Immutable once created. `sequence` is set only on unit start/finish
/// markers, by the nesting engine rather than the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event kind (first matching keyword wins)
    pub kind: EventKind,

    /// Human-readable tag for display (kind, location, sequence)
    pub label: String,

    /// Kind-specific detail: unit/method name, formula body, value, etc.
    pub payload: String,

    /// Source-location token from the log (e.g. "[12]"), when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,

    /// 1-based line number in the input, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,

    /// Per-transaction sequence id for unit start/finish markers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
}

impl EventRecord {
    fn new(kind: EventKind, label: String, payload: String) -> Self {
        Self {
            kind,
            label,
            payload,
            source_location: None,
            line_number: None,
            sequence: None,
        }
    }

    fn with_location(mut self, location: &str) -> Self {
        self.source_location = Some(location.to_string());
        self
    }
}

/// Ordered keyword table: first match decides the kind.
///
/// The order replicates the platform emitter's dispatch priority and is
/// part of the contract - do not sort.
const KEYWORD_TABLE: &[(&str, EventKind)] = &[
    ("CODE_UNIT_STARTED", EventKind::UnitStarted),
    ("|METHOD_ENTRY|", EventKind::MethodEntry),
    ("|METHOD_EXIT|", EventKind::MethodExit),
    ("|FLOW_START_INTERVIEW_BEGIN|", EventKind::FlowStart),
    ("NAMED_CREDENTIAL_REQUEST", EventKind::NamedCredentialRequest),
    ("|NAMED_CREDENTIAL_RESPONSE|", EventKind::NamedCredentialResponse),
    ("|FLOW_START_INTERVIEWS_ERROR|", EventKind::FlowError),
    ("|CALLOUT_REQUEST|", EventKind::CalloutRequest),
    ("|CALLOUT_RESPONSE|", EventKind::CalloutResponse),
    ("|EXCEPTION_THROWN|", EventKind::ExceptionThrown),
    ("|FATAL_ERROR|", EventKind::FatalError),
    ("|VALIDATION_FAIL", EventKind::ValidationFail),
    ("|VALIDATION_PASS", EventKind::ValidationPass),
    ("|VALIDATION_FORMULA|", EventKind::ValidationFormula),
    ("|VALIDATION_RULE|", EventKind::ValidationRule),
    ("|VALIDATION_ERROR|", EventKind::ValidationError),
    ("|USER_DEBUG|", EventKind::UserDebug),
    ("|VARIABLE_ASSIGNMENT|", EventKind::VariableAssignment),
    ("|SOQL_EXECUTE_BEGIN|", EventKind::SoqlBegin),
    ("|SOQL_EXECUTE_END|", EventKind::SoqlEnd),
    ("|DML_BEGIN|", EventKind::DmlBegin),
    ("|DML_END|", EventKind::DmlEnd),
    ("|CODE_UNIT_FINISHED|", EventKind::UnitFinished),
];

/// Classify one raw line into an event record.
///
/// **Public** - called once per line by the nesting engine
///
/// Returns `None` when the line matches no keyword, has too few fields
/// for its kind, or is a suppressed compiler-internal variable
/// assignment. `None` always means "skip this line", never an error.
pub fn classify(line: &str) -> Option<EventRecord> {
    let kind = KEYWORD_TABLE
        .iter()
        .find(|(keyword, _)| line.contains(keyword))
        .map(|(_, kind)| *kind)?;

    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    extract_payload(kind, &fields)
}

/// Kind-specific payload extraction.
///
/// **Private** - dispatch target of classify
fn extract_payload(kind: EventKind, fields: &[&str]) -> Option<EventRecord> {
    match kind {
        EventKind::UnitStarted | EventKind::UnitFinished => {
            if fields.len() < 2 {
                return None;
            }
            // Label and sequence are assigned by the nesting engine.
            Some(EventRecord::new(kind, String::new(), unit_name(fields)))
        }

        EventKind::MethodEntry | EventKind::MethodExit => {
            if fields.len() < 3 {
                return None;
            }
            let name = last_field(fields);
            let location = fields[2];
            let tag = match kind {
                EventKind::MethodEntry => "METHOD_ENTRY",
                _ => "METHOD_EXIT",
            };
            Some(
                EventRecord::new(kind, format!("{} {} - ", tag, location), name)
                    .with_location(location),
            )
        }

        EventKind::FlowStart
        | EventKind::FlowError
        | EventKind::NamedCredentialRequest
        | EventKind::NamedCredentialResponse
        | EventKind::CalloutRequest
        | EventKind::CalloutResponse
        | EventKind::FatalError
        | EventKind::ValidationRule
        | EventKind::ValidationError => {
            if fields.len() < 2 {
                return None;
            }
            let label = format!("{} - ", kind_tag(kind));
            Some(EventRecord::new(kind, label, last_field(fields)))
        }

        EventKind::ExceptionThrown | EventKind::UserDebug => {
            if fields.len() < 3 {
                return None;
            }
            let location = fields[2];
            let label = format!("{} {} - ", kind_tag(kind), location);
            Some(EventRecord::new(kind, label, last_field(fields)).with_location(location))
        }

        EventKind::ValidationPass | EventKind::ValidationFail => {
            Some(EventRecord::new(kind, kind_tag(kind).to_string(), String::new()))
        }

        EventKind::ValidationFormula => {
            if fields.len() < 3 {
                return None;
            }
            // Initial payload; continuation lines are appended by the
            // multi-line aggregator in the engine.
            let formula = fields[2..].join("|");
            Some(EventRecord::new(kind, "VALIDATION_FORMULA - ".to_string(), formula))
        }

        EventKind::VariableAssignment => extract_variable_assignment(fields),

        EventKind::SoqlBegin | EventKind::SoqlEnd => {
            if fields.len() < 3 {
                return None;
            }
            let location = fields[2];
            let label = format!("{} {} - ", kind_tag(kind), location);
            Some(EventRecord::new(kind, label, last_field(fields)).with_location(location))
        }

        EventKind::DmlBegin => {
            if fields.len() < 4 {
                return None;
            }
            let location = fields[2];
            let label = format!("DML_BEGIN {} - ", location);
            Some(EventRecord::new(kind, label, fields[3..].join("|")).with_location(location))
        }

        EventKind::DmlEnd => {
            if fields.len() < 3 {
                return None;
            }
            let location = fields[2];
            let label = format!("DML_END {}", location);
            Some(EventRecord::new(kind, label, String::new()).with_location(location))
        }
    }
}

/// Variable assignments carry an optional type annotation, so the record
/// is 5 or 6 fields wide; name and value positions shift accordingly.
///
/// **Private** - internal helper for extract_payload
fn extract_variable_assignment(fields: &[&str]) -> Option<EventRecord> {
    let (name, value) = match fields.len() {
        6 => (fields[fields.len() - 3], fields[fields.len() - 2]),
        5 => (fields[fields.len() - 2], fields[fields.len() - 1]),
        _ => return None,
    };

    if is_internal_variable(name) {
        return None;
    }

    let location = fields[2];
    let label = format!("VARIABLE_ASSIGNMENT {} - ({}) ", location, name);
    Some(
        EventRecord::new(EventKind::VariableAssignment, label, value.to_string())
            .with_location(location),
    )
}

/// Extract the unit name from a CODE_UNIT line's fields.
///
/// Trigger invocations log an extra trailing qualifier, so the name is
/// the second-to-last field when the last one carries the trigger marker.
fn unit_name(fields: &[&str]) -> String {
    let last = fields[fields.len() - 1];
    if last.contains(TRIGGER_MARKER) && fields.len() >= 2 {
        fields[fields.len() - 2].to_string()
    } else {
        last.to_string()
    }
}

/// Extract the unit name from a whole raw line.
///
/// **Public (crate)** - the engine's collapse rule compares the previous
/// raw line's unit name against a finish line's, whatever kind the
/// previous line was.
pub(crate) fn unit_name_of_line(line: &str) -> String {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    unit_name(&fields)
}

fn last_field(fields: &[&str]) -> String {
    fields[fields.len() - 1].to_string()
}

/// Display tag for a kind, matching the log keyword.
fn kind_tag(kind: EventKind) -> &'static str {
    match kind {
        EventKind::UnitStarted => "CODE_UNIT_STARTED",
        EventKind::UnitFinished => "CODE_UNIT_FINISHED",
        EventKind::MethodEntry => "METHOD_ENTRY",
        EventKind::MethodExit => "METHOD_EXIT",
        EventKind::FlowStart => "FLOW_START_INTERVIEW_BEGIN",
        EventKind::FlowError => "FLOW_START_INTERVIEWS_ERROR",
        EventKind::NamedCredentialRequest => "NAMED_CREDENTIAL_REQUEST",
        EventKind::NamedCredentialResponse => "NAMED_CREDENTIAL_RESPONSE",
        EventKind::CalloutRequest => "CALLOUT_REQUEST",
        EventKind::CalloutResponse => "CALLOUT_RESPONSE",
        EventKind::ExceptionThrown => "EXCEPTION_THROWN",
        EventKind::FatalError => "FATAL_ERROR",
        EventKind::ValidationRule => "VALIDATION_RULE",
        EventKind::ValidationFormula => "VALIDATION_FORMULA",
        EventKind::ValidationPass => "VALIDATION_PASS",
        EventKind::ValidationFail => "VALIDATION_FAIL",
        EventKind::ValidationError => "VALIDATION_ERROR",
        EventKind::UserDebug => "USER_DEBUG",
        EventKind::VariableAssignment => "VARIABLE_ASSIGNMENT",
        EventKind::SoqlBegin => "SOQL_EXECUTE_BEGIN",
        EventKind::SoqlEnd => "SOQL_EXECUTE_END",
        EventKind::DmlBegin => "DML_BEGIN",
        EventKind::DmlEnd => "DML_END",
    }
}
