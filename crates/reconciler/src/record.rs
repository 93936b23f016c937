//! Synchronization records handed to backend drivers.
//!
//! Invariants for the records of one pass:
//! - Records are non-overlapping: no record's node is a descendant of a `FullSync` record's
//!   node. An `AttrSync` covers only its own node, so records below it may follow it.
//! - `node` refers to the live node after mutation; read its current state from the tree.
//! - `attributes` is only populated for `AttrSync`. Removed attributes appear with the
//!   `markup::REMOVED` tombstone value.

use core_types::NodeId;
use markup::AttributeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncScope {
    /// The node's whole subtree was rebuilt; re-render it wholesale.
    FullSync,
    /// Only the listed attributes changed; identity and children are untouched.
    AttrSync,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncRecord {
    pub scope: SyncScope,
    /// Reserved positional hint. The reconciler identifies nodes by id and leaves this unset.
    pub index: Option<usize>,
    pub node: NodeId,
    pub attributes: AttributeMap,
}

impl SyncRecord {
    pub fn full(node: NodeId) -> Self {
        Self {
            scope: SyncScope::FullSync,
            index: None,
            node,
            attributes: AttributeMap::new(),
        }
    }

    pub fn attributes(node: NodeId, diff: AttributeMap) -> Self {
        Self {
            scope: SyncScope::AttrSync,
            index: None,
            node,
            attributes: diff,
        }
    }
}
