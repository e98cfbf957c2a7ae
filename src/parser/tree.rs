//! Tree node types and the restructurer.
//!
//! The nesting engine produces a flat, ordered list of records per
//! transaction; the restructurer folds matched start/finish markers into
//! nested frames in a single forward pass over that list, using an
//! explicit stack of child lists instead of parent back-pointers.

use super::classifier::{EventKind, EventRecord};
use serde::{Deserialize, Serialize};

/// One node of the reconstructed execution tree.
///
/// **Public** - part of the parse result shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// A closed execution unit with its nested children
    Frame(Frame),
    /// A leaf record (method entry/exit, query, debug, ...)
    Event(EventRecord),
}

/// A closed execution unit: name, per-transaction sequence id, children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Unit name from the start marker
    pub method_name: String,

    /// Sequence id assigned at open time, unique within the transaction
    pub sequence: u32,

    /// Display label of the start marker
    pub label: String,

    /// Records and frames nested between this unit's start and finish.
    /// The matching finish marker, when seen, is the last child.
    pub children: Vec<TreeNode>,
}

/// One complete stack-balanced region of the trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Root-level nodes of this region, in log order
    pub nodes: Vec<TreeNode>,
}

impl Transaction {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Overall parse result.
///
/// `well_formed` is false only when the input never reached a balanced
/// (stack-empty) state; in that case `transactions` holds a single
/// pseudo-transaction whose nodes are the flat, unnested records
/// collected so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub transactions: Vec<Transaction>,
    pub well_formed: bool,
}

/// Nest one transaction's flat record list into a tree.
///
/// **Public** - called by the engine each time the call stack empties
///
/// Single forward pass: a start marker opens a new child list and
/// descends; a finish marker is appended to the current list, which is
/// then closed into a `Frame` and attached to its parent; any other
/// record is appended unchanged. A start marker whose finish was lost
/// (mismatch dropped by the engine) still becomes a frame at end of
/// pass, keeping whatever children it accumulated.
pub fn restructure(flat: Vec<EventRecord>) -> Vec<TreeNode> {
    // Stack of child lists; index 0 is the root list. Open frame
    // metadata is kept in lockstep on `open_markers`.
    let mut lists: Vec<Vec<TreeNode>> = vec![Vec::new()];
    let mut open_markers: Vec<EventRecord> = Vec::new();

    for record in flat {
        match record.kind {
            EventKind::UnitStarted => {
                open_markers.push(record);
                lists.push(Vec::new());
            }
            EventKind::UnitFinished => {
                if let Some(marker) = open_markers.pop() {
                    let mut children = lists.pop().unwrap_or_default();
                    children.push(TreeNode::Event(record));
                    attach_frame(&mut lists, marker, children);
                } else {
                    // Finish with no open frame at this level; the engine
                    // normally drops these, keep the record visible if not.
                    current_list(&mut lists).push(TreeNode::Event(record));
                }
            }
            _ => current_list(&mut lists).push(TreeNode::Event(record)),
        }
    }

    // Close any frames whose finish marker never arrived.
    while let Some(marker) = open_markers.pop() {
        let children = lists.pop().unwrap_or_default();
        attach_frame(&mut lists, marker, children);
    }

    lists.pop().unwrap_or_default()
}

fn current_list<'a>(lists: &'a mut [Vec<TreeNode>]) -> &'a mut Vec<TreeNode> {
    lists.last_mut().expect("restructure stack holds the root list")
}

fn attach_frame(lists: &mut Vec<Vec<TreeNode>>, marker: EventRecord, children: Vec<TreeNode>) {
    let frame = Frame {
        method_name: marker.payload,
        sequence: marker.sequence.unwrap_or(0),
        label: marker.label,
        children,
    };
    if lists.is_empty() {
        lists.push(Vec::new());
    }
    current_list(lists).push(TreeNode::Frame(frame));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, seq: u32) -> EventRecord {
        EventRecord {
            kind: EventKind::UnitStarted,
            label: format!("CODE_UNIT_STARTED_{} - {}", seq, name),
            payload: name.to_string(),
            source_location: None,
            line_number: None,
            sequence: Some(seq),
        }
    }

    fn finish(name: &str, seq: u32) -> EventRecord {
        EventRecord {
            kind: EventKind::UnitFinished,
            label: format!("CODE_UNIT_FINISHED_{} - ", seq),
            payload: name.to_string(),
            source_location: None,
            line_number: None,
            sequence: Some(seq),
        }
    }

    fn debug(msg: &str) -> EventRecord {
        EventRecord {
            kind: EventKind::UserDebug,
            label: "USER_DEBUG [1] - ".to_string(),
            payload: msg.to_string(),
            source_location: Some("[1]".to_string()),
            line_number: None,
            sequence: None,
        }
    }

    #[test]
    fn test_restructure_single_pair() {
        let nodes = restructure(vec![start("A", 1), finish("A", 1)]);
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            TreeNode::Frame(frame) => {
                assert_eq!(frame.method_name, "A");
                assert_eq!(frame.sequence, 1);
                // Only child is the finish marker itself
                assert_eq!(frame.children.len(), 1);
            }
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[test]
    fn test_restructure_nested_pairs() {
        let nodes = restructure(vec![
            start("A", 1),
            start("B", 2),
            finish("B", 2),
            finish("A", 1),
        ]);
        assert_eq!(nodes.len(), 1);
        let TreeNode::Frame(a) = &nodes[0] else {
            panic!("expected frame A");
        };
        assert_eq!(a.method_name, "A");
        // B's frame plus A's own finish marker
        assert_eq!(a.children.len(), 2);
        let TreeNode::Frame(b) = &a.children[0] else {
            panic!("expected frame B");
        };
        assert_eq!(b.method_name, "B");
        assert_eq!(b.children.len(), 1); // finish marker only
    }

    #[test]
    fn test_restructure_leaf_records_stay_in_place() {
        let nodes = restructure(vec![
            debug("before"),
            start("A", 1),
            debug("inside"),
            finish("A", 1),
            debug("after"),
        ]);
        assert_eq!(nodes.len(), 3);
        assert!(matches!(&nodes[0], TreeNode::Event(e) if e.payload == "before"));
        let TreeNode::Frame(a) = &nodes[1] else {
            panic!("expected frame");
        };
        assert!(matches!(&a.children[0], TreeNode::Event(e) if e.payload == "inside"));
        assert!(matches!(&nodes[2], TreeNode::Event(e) if e.payload == "after"));
    }

    #[test]
    fn test_restructure_unclosed_frame_keeps_children() {
        let nodes = restructure(vec![start("A", 1), debug("orphaned")]);
        assert_eq!(nodes.len(), 1);
        let TreeNode::Frame(a) = &nodes[0] else {
            panic!("expected frame");
        };
        assert_eq!(a.children.len(), 1);
        assert!(matches!(&a.children[0], TreeNode::Event(e) if e.payload == "orphaned"));
    }

    #[test]
    fn test_restructure_empty_input() {
        assert!(restructure(Vec::new()).is_empty());
    }
}
