//! Nesting stack engine: the core parse loop.
//!
//! Consumes classified records one at a time and rebuilds the call
//! nesting with an explicit LIFO stack of open units. Unit starts push;
//! unit finishes pop, subject to the collapse rule for instantaneous
//! open/close pairs; everything else accumulates in a flat
//! per-transaction list that is nested by the restructurer each time the
//! stack returns to depth zero.
//!
//! The engine never fails: malformed lines, stack underflow, and
//! mismatched finishes are all skipped, not surfaced. A usable, slightly
//! imperfect tree beats no tree.

use super::classifier::{classify, unit_name_of_line, EventKind, EventRecord};
use super::filter::should_ignore;
use super::tree::{restructure, ParseResult, Transaction, TreeNode};
use log::{debug, trace, warn};

/// One open execution unit on the call stack
struct OpenUnit {
    method_name: String,
    sequence: u32,
}

/// Per-invocation engine state. Constructed fresh on every `parse_log`
/// call, so repeated parses are independent and reentrant.
struct Engine {
    call_stack: Vec<OpenUnit>,
    flat: Vec<EventRecord>,
    open_counter: u32,
    transactions: Vec<Transaction>,
}

/// Parse an ordered sequence of raw log lines into a call tree.
///
/// **Public** - the single entry point of the core
///
/// # Arguments
/// * `lines` - the whole log, split into lines, in file order
/// * `ignore_list` - noise-suppression substrings for method entry/exit
///   records (case-insensitive "contains" matching)
///
/// # Returns
/// One `Transaction` per stack-balanced region of the log. If no region
/// ever balanced, the result is a single flat pseudo-transaction with
/// `well_formed == false`.
pub fn parse_log<S: AsRef<str>>(lines: &[S], ignore_list: &[String]) -> ParseResult {
    debug!("Parsing {} log lines", lines.len());

    let mut engine = Engine {
        call_stack: Vec::new(),
        flat: Vec::new(),
        open_counter: 0,
        transactions: Vec::new(),
    };

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].as_ref();

        let Some(mut record) = classify(line) else {
            i += 1;
            continue;
        };
        record.line_number = Some(i + 1);

        match record.kind {
            EventKind::UnitStarted => engine.open_unit(record),

            EventKind::UnitFinished => {
                // The collapse rule compares against the raw previous
                // line, whatever it classified as.
                let prev_unit_name = if i > 0 {
                    Some(unit_name_of_line(lines[i - 1].as_ref()))
                } else {
                    None
                };
                engine.close_unit(record, prev_unit_name.as_deref());
            }

            EventKind::MethodEntry | EventKind::MethodExit => {
                if should_ignore(&record.payload, ignore_list) {
                    trace!("Ignoring method record: {}", record.payload);
                } else {
                    engine.flat.push(record);
                }
            }

            EventKind::ValidationFormula => {
                i = aggregate_formula(lines, i, &mut record);
                engine.flat.push(record);
            }

            _ => engine.flat.push(record),
        }

        i += 1;
    }

    engine.finish()
}

impl Engine {
    /// Unit start: assign the next sequence id, append a labeled start
    /// marker, push the unit onto the call stack.
    fn open_unit(&mut self, mut record: EventRecord) {
        self.open_counter += 1;
        record.sequence = Some(self.open_counter);
        record.label = format!("CODE_UNIT_STARTED_{} - {}", self.open_counter, record.payload);

        self.call_stack.push(OpenUnit {
            method_name: record.payload.clone(),
            sequence: self.open_counter,
        });
        self.flat.push(record);
    }

    /// Unit finish: pop and either collapse, close, or drop.
    fn close_unit(&mut self, mut record: EventRecord, prev_unit_name: Option<&str>) {
        let Some(open) = self.call_stack.pop() else {
            // Underflow: a finish with no open frame is dropped.
            warn!("Dropping unmatched CODE_UNIT_FINISHED for {}", record.payload);
            return;
        };

        if prev_unit_name == Some(record.payload.as_str()) {
            // Instantaneous open/close pair: the platform logged a unit
            // with zero work between the markers. Remove the start marker
            // and reclaim its sequence id; the pair contributes nothing.
            trace!("Collapsing zero-duration unit {}", record.payload);
            self.flat.retain(|event| {
                !(event.kind == EventKind::UnitStarted && event.sequence == Some(open.sequence))
            });
            self.open_counter = self.open_counter.saturating_sub(1);
        } else if open.method_name == record.payload {
            record.sequence = Some(open.sequence);
            record.label = format!("CODE_UNIT_FINISHED_{} - ", open.sequence);
            self.flat.push(record);
        } else {
            // Name matches neither the previous line nor the popped
            // frame. Drop it and keep going; a partial tree is still
            // useful.
            warn!(
                "CODE_UNIT_FINISHED name mismatch: expected {}, got {}",
                open.method_name, record.payload
            );
        }

        if self.call_stack.is_empty() {
            self.flush_transaction();
        }
    }

    /// Stack returned to depth zero: the flat list accumulated so far is
    /// one complete transaction. Nest it and reset for the next one.
    fn flush_transaction(&mut self) {
        let flat = std::mem::take(&mut self.flat);
        debug!("Transaction complete: {} records", flat.len());
        self.transactions.push(Transaction {
            nodes: restructure(flat),
        });
        self.open_counter = 0;
    }

    /// End-of-input policy: a trailing unbalanced region is discarded
    /// when at least one transaction completed; otherwise the flat list
    /// is surfaced as-is with `well_formed == false`.
    fn finish(self) -> ParseResult {
        if self.transactions.is_empty() && !self.flat.is_empty() {
            debug!(
                "No transaction ever balanced; returning flat list of {} records",
                self.flat.len()
            );
            let nodes = self.flat.into_iter().map(TreeNode::Event).collect();
            return ParseResult {
                transactions: vec![Transaction { nodes }],
                well_formed: false,
            };
        }

        if !self.flat.is_empty() {
            debug!(
                "Discarding trailing unbalanced region of {} records",
                self.flat.len()
            );
        }

        ParseResult {
            transactions: self.transactions,
            well_formed: true,
        }
    }
}

/// Multi-line aggregator for validation formulas.
///
/// The formula body spans consecutive lines until a VALIDATION_PASS or
/// VALIDATION_FAIL line; continuation lines are newline-joined into the
/// record's payload. The terminating line is not consumed here - the
/// main loop reprocesses it as its own record.
fn aggregate_formula<S: AsRef<str>>(lines: &[S], mut i: usize, record: &mut EventRecord) -> usize {
    while i + 1 < lines.len() {
        let next = lines[i + 1].as_ref();
        if next.contains("|VALIDATION_PASS") || next.contains("|VALIDATION_FAIL") {
            break;
        }
        record.payload.push('\n');
        record.payload.push_str(next);
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tree::TreeNode;

    fn parse(lines: &[&str]) -> ParseResult {
        parse_log(lines, &[])
    }

    fn only_frame(result: &ParseResult) -> &crate::parser::tree::Frame {
        assert_eq!(result.transactions.len(), 1);
        let nodes = &result.transactions[0].nodes;
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            TreeNode::Frame(frame) => frame,
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[test]
    fn test_single_balanced_pair() {
        let result = parse(&[
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|MyClass.run()",
            "ts|HEAP_ALLOCATE|[1]|Bytes:4",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|MyClass.run()",
        ]);
        assert!(result.well_formed);
        let frame = only_frame(&result);
        assert_eq!(frame.method_name, "MyClass.run()");
        assert_eq!(frame.sequence, 1);
        // Only child is the finish marker
        assert_eq!(frame.children.len(), 1);
    }

    #[test]
    fn test_collapse_back_to_back_pair() {
        // Finish directly follows start: previous raw line's unit name
        // equals the finish's, so the pair is removed entirely.
        let result = parse(&[
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|MyClass.run()",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|MyClass.run()",
        ]);
        assert!(result.well_formed);
        assert_eq!(result.transactions.len(), 1);
        assert!(result.transactions[0].is_empty());
    }

    #[test]
    fn test_sequence_reclaimed_after_collapse() {
        let result = parse(&[
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|Outer.run()",
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|Inner.run()",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|Inner.run()",
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|Second.run()",
            "ts|HEAP_ALLOCATE|[1]|Bytes:4",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|Second.run()",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|Outer.run()",
        ]);
        let outer = only_frame(&result);
        assert_eq!(outer.method_name, "Outer.run()");
        // Inner collapsed; Second reuses sequence 2.
        let TreeNode::Frame(second) = &outer.children[0] else {
            panic!("expected Second frame");
        };
        assert_eq!(second.method_name, "Second.run()");
        assert_eq!(second.sequence, 2);
    }

    #[test]
    fn test_nested_units() {
        let result = parse(&[
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|A.run()",
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|B.run()",
            "ts|HEAP_ALLOCATE|[1]|Bytes:4",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|B.run()",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|A.run()",
        ]);
        let a = only_frame(&result);
        assert_eq!(a.method_name, "A.run()");
        let TreeNode::Frame(b) = &a.children[0] else {
            panic!("expected frame B");
        };
        assert_eq!(b.method_name, "B.run()");
        assert_eq!(b.children.len(), 1);
    }

    #[test]
    fn test_noise_filter_applies_to_method_records_only() {
        let ignore = vec!["logger.".to_string()];
        let result = parse_log(
            &[
                "ts|CODE_UNIT_STARTED|[EXTERNAL]|Svc.run()",
                "ts|METHOD_ENTRY|[3]|01p|Logger.debug()",
                "ts|METHOD_ENTRY|[4]|01p|OrderService.process()",
                "ts|METHOD_EXIT|[4]|01p|OrderService.process()",
                "ts|METHOD_EXIT|[3]|01p|Logger.debug()",
                "ts|CODE_UNIT_FINISHED|[EXTERNAL]|Svc.run()",
            ],
            &ignore,
        );
        let frame = only_frame(&result);
        let payloads: Vec<&str> = frame
            .children
            .iter()
            .filter_map(|node| match node {
                TreeNode::Event(e) => Some(e.payload.as_str()),
                _ => None,
            })
            .collect();
        assert!(payloads.contains(&"OrderService.process()"));
        assert!(!payloads.contains(&"Logger.debug()"));
    }

    #[test]
    fn test_mismatched_finish_dropped() {
        let result = parse(&[
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|A.run()",
            "ts|HEAP_ALLOCATE|[1]|Bytes:4",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|Unrelated.run()",
        ]);
        // The pop emptied the stack, so the region still flushes; A's
        // frame stays open-ended (no finish marker child).
        let frame = only_frame(&result);
        assert_eq!(frame.method_name, "A.run()");
        assert!(frame.children.is_empty());
    }

    #[test]
    fn test_underflow_finish_dropped() {
        let result = parse(&[
            "ts|USER_DEBUG|[1]|DEBUG|hello",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|Ghost.run()",
        ]);
        // No transaction ever balanced: flat fallback.
        assert!(!result.well_formed);
        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.transactions[0].nodes.len(), 1);
    }

    #[test]
    fn test_unterminated_transaction_flat_fallback() {
        let result = parse(&[
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|A.run()",
            "ts|USER_DEBUG|[1]|DEBUG|hello",
        ]);
        assert!(!result.well_formed);
        assert_eq!(result.transactions.len(), 1);
        let nodes = &result.transactions[0].nodes;
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| matches!(n, TreeNode::Event(_))));
    }

    #[test]
    fn test_trailing_incomplete_discarded() {
        let result = parse(&[
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|A.run()",
            "ts|HEAP_ALLOCATE|[1]|Bytes:4",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|A.run()",
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|B.run()",
            "ts|USER_DEBUG|[1]|DEBUG|dangling",
        ]);
        assert!(result.well_formed);
        assert_eq!(result.transactions.len(), 1);
        let frame = only_frame(&result);
        assert_eq!(frame.method_name, "A.run()");
    }

    #[test]
    fn test_validation_formula_aggregation() {
        let result = parse(&[
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|Svc.run()",
            "ts|VALIDATION_FORMULA|Amount > 0",
            "&& Status != null",
            "&& OwnerId != null",
            "ts|VALIDATION_PASS",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|Svc.run()",
        ]);
        let frame = only_frame(&result);
        let formula = frame
            .children
            .iter()
            .find_map(|node| match node {
                TreeNode::Event(e) if e.kind == EventKind::ValidationFormula => Some(e),
                _ => None,
            })
            .expect("formula record present");
        assert_eq!(formula.payload, "Amount > 0\n&& Status != null\n&& OwnerId != null");
        // Terminator is its own record, after the formula.
        assert!(frame.children.iter().any(|node| matches!(
            node,
            TreeNode::Event(e) if e.kind == EventKind::ValidationPass
        )));
    }

    #[test]
    fn test_two_independent_transactions() {
        let result = parse(&[
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|A.run()",
            "ts|HEAP_ALLOCATE|[1]|Bytes:4",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|A.run()",
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|B.run()",
            "ts|HEAP_ALLOCATE|[1]|Bytes:4",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|B.run()",
        ]);
        assert!(result.well_formed);
        assert_eq!(result.transactions.len(), 2);
        // Sequence counter resets per transaction
        for transaction in &result.transactions {
            let TreeNode::Frame(frame) = &transaction.nodes[0] else {
                panic!("expected frame");
            };
            assert_eq!(frame.sequence, 1);
        }
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let lines = [
            "ts|CODE_UNIT_STARTED|[EXTERNAL]|A.run()",
            "ts|METHOD_ENTRY|[3]|01p|A.helper()",
            "ts|METHOD_EXIT|[3]|01p|A.helper()",
            "ts|CODE_UNIT_FINISHED|[EXTERNAL]|A.run()",
        ];
        let first = parse(&lines);
        let second = parse(&lines);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let result = parse(&[]);
        assert!(result.well_formed);
        assert!(result.transactions.is_empty());
    }
}
