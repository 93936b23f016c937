//! Node-by-node reconciliation of a live tree against a freshly rendered one.
//!
//! Contract:
//! - Live and new nodes are paired by position; children are never matched across indices.
//! - Kind changes (text/element/component) and component identity changes replace the live
//!   node in place and escalate: the caller's node is fully synced instead. A component node
//!   whose instantiation failed on an earlier pass is retried the same way.
//! - Text changes update the text in place and escalate the same way.
//! - Tag or child-count changes on an element rebuild its children wholesale and emit one
//!   `FullSync` for it.
//! - Prop changes on a component node re-synchronize that component; no record is emitted
//!   for the component node itself.
//! - Otherwise attribute changes emit one `AttrSync`, ahead of any records of descendants.
//! - A `FullSync` supersedes everything below it: records are never emitted for descendants
//!   of a fully synced node.
//!
//! The live tree ends up structurally equal to the new tree even where records were
//! collapsed.

use crate::backend::Backend;
use crate::engine::Engine;
use crate::error::SyncError;
use crate::record::SyncRecord;
use crate::tree::{LiveKind, LiveNode};
use core_types::NodeId;
use markup::{AttributeMap, Node};

/// Result of reconciling one live node.
#[derive(Debug, Default)]
pub(crate) struct NodeSync {
    pub(crate) records: Vec<SyncRecord>,
    /// The node's parent must be fully synced; `records` is empty.
    pub(crate) full_sync_parent: bool,
}

impl NodeSync {
    fn unchanged() -> Self {
        Self::default()
    }

    fn escalate() -> Self {
        Self {
            records: Vec::new(),
            full_sync_parent: true,
        }
    }

    fn full(node: NodeId) -> Self {
        Self {
            records: vec![SyncRecord::full(node)],
            full_sync_parent: false,
        }
    }
}

impl<B: Backend> Engine<B> {
    pub(crate) fn sync_nodes(
        &mut self,
        live: NodeId,
        new: Node,
        depth: usize,
    ) -> Result<NodeSync, SyncError> {
        let live_kind = self
            .tree
            .get(live)
            .map(LiveNode::node_kind)
            .ok_or(SyncError::MissingNode(live))?;

        if live_kind != new.kind() {
            log::trace!(
                target: "sync.reconcile",
                "{live}: {live_kind} replaced by {}",
                new.kind()
            );
            self.replace_node(live, new, depth)?;
            return Ok(NodeSync::escalate());
        }

        match new {
            Node::Text { text } => self.sync_text(live, text),
            Node::Component { tag, attributes } => {
                self.sync_component(live, tag, attributes, depth)
            }
            Node::Element {
                tag,
                attributes,
                children,
            } => self.sync_element(live, tag, attributes, children, depth),
        }
    }

    fn sync_text(&mut self, live: NodeId, text: String) -> Result<NodeSync, SyncError> {
        let Some(LiveKind::Text { text: current }) = self.tree.kind_mut(live) else {
            return Err(SyncError::MissingNode(live));
        };
        if *current == text {
            return Ok(NodeSync::unchanged());
        }
        log::trace!(target: "sync.reconcile", "{live}: text changed");
        *current = text;
        Ok(NodeSync::escalate())
    }

    fn sync_component(
        &mut self,
        live: NodeId,
        tag: String,
        attributes: AttributeMap,
        depth: usize,
    ) -> Result<NodeSync, SyncError> {
        let Some(LiveKind::Component {
            tag: live_tag,
            attributes: live_attributes,
            component,
        }) = self.tree.get(live).map(LiveNode::kind)
        else {
            return Err(SyncError::MissingNode(live));
        };
        let component = *component;

        if *live_tag != tag {
            log::trace!(target: "sync.reconcile", "{live}: <{live_tag}> replaced by <{tag}>");
            self.replace_node(live, Node::Component { tag, attributes }, depth)?;
            return Ok(NodeSync::escalate());
        }
        let Some(component) = component else {
            // an earlier instantiation failed; try again with the current props
            log::trace!(target: "sync.reconcile", "{live}: retrying <{tag}>");
            self.replace_node(live, Node::Component { tag, attributes }, depth)?;
            return Ok(NodeSync::escalate());
        };
        if *live_attributes == attributes {
            return Ok(NodeSync::unchanged());
        }

        let entry = self
            .components
            .get_mut(&component)
            .ok_or(SyncError::UnknownComponentId(component))?;
        entry
            .instance
            .decode_attributes(&attributes)
            .map_err(|source| SyncError::Decode { tag, source })?;
        if let Some(LiveKind::Component {
            attributes: live_attributes,
            ..
        }) = self.tree.kind_mut(live)
        {
            *live_attributes = attributes;
        }

        log::trace!(target: "sync.reconcile", "{live}: props changed, resync {component}");
        let records = self.synchronize_at(component, depth + 1)?;
        Ok(NodeSync {
            records,
            full_sync_parent: false,
        })
    }

    fn sync_element(
        &mut self,
        live: NodeId,
        tag: String,
        attributes: AttributeMap,
        children: Vec<Node>,
        depth: usize,
    ) -> Result<NodeSync, SyncError> {
        let Some(LiveKind::Element {
            tag: live_tag,
            attributes: live_attributes,
            children: live_children,
        }) = self.tree.get(live).map(LiveNode::kind)
        else {
            return Err(SyncError::MissingNode(live));
        };

        if *live_tag != tag || live_children.len() != children.len() {
            log::trace!(
                target: "sync.reconcile",
                "{live}: shape changed <{live_tag}>x{} -> <{tag}>x{}",
                live_children.len(),
                children.len()
            );
            self.merge_node(live, tag, attributes, children, depth)?;
            return Ok(NodeSync::full(live));
        }

        let diff = live_attributes.diff(&attributes);
        let live_children = live_children.clone();

        let mut records = Vec::new();
        let mut full_sync = false;
        // Every pair is reconciled even after a full sync is decided, so the live tree still
        // matches; only the records are dropped.
        for (child, next) in live_children.into_iter().zip(children) {
            let outcome = self.sync_nodes(child, next, depth)?;
            full_sync |= outcome.full_sync_parent;
            if !full_sync {
                records.extend(outcome.records);
            }
        }

        if !diff.is_empty()
            && let Some(LiveKind::Element {
                attributes: live_attributes,
                ..
            }) = self.tree.kind_mut(live)
        {
            *live_attributes = attributes;
        }

        if full_sync {
            log::trace!(target: "sync.reconcile", "{live}: full sync from child change");
            return Ok(NodeSync::full(live));
        }
        if !diff.is_empty() {
            records.insert(0, SyncRecord::attributes(live, diff));
        }
        Ok(NodeSync {
            records,
            full_sync_parent: false,
        })
    }

    /// Overwrite `live` with `new`, which has a different kind or component identity.
    fn replace_node(&mut self, live: NodeId, new: Node, depth: usize) -> Result<(), SyncError> {
        let node = self.tree.get(live).ok_or(SyncError::MissingNode(live))?;
        let mount = node.mount().ok_or(SyncError::Unmounted(live))?;
        let component = node.component();
        let old_children = node.children().to_vec();

        if let Some(component) = component {
            self.dismount_component(component);
        }
        for child in old_children {
            self.teardown(child);
        }

        let (kind, children) = LiveKind::from_node(new);
        let adopted = self.tree.adopt_all(children, live)?;
        let target = self.tree.kind_mut(live).ok_or(SyncError::MissingNode(live))?;
        *target = kind;
        if let LiveKind::Element { children, .. } = target {
            *children = adopted;
        }

        self.mount_subtree(live, mount, depth)?;
        self.backend.mount(&self.tree, live, mount);
        Ok(())
    }

    /// Retag `live` and replace its children wholesale.
    fn merge_node(
        &mut self,
        live: NodeId,
        tag: String,
        attributes: AttributeMap,
        children: Vec<Node>,
        depth: usize,
    ) -> Result<(), SyncError> {
        let mount = self
            .tree
            .get(live)
            .and_then(LiveNode::mount)
            .ok_or(SyncError::Unmounted(live))?;
        let Some(LiveKind::Element {
            tag: live_tag,
            attributes: live_attributes,
            children: live_children,
        }) = self.tree.kind_mut(live)
        else {
            return Err(SyncError::MissingNode(live));
        };
        *live_tag = tag;
        *live_attributes = attributes;
        let old_children = std::mem::take(live_children);

        for child in old_children {
            self.teardown(child);
        }

        let adopted = self.tree.adopt_all(children, live)?;
        if let Some(LiveKind::Element { children, .. }) = self.tree.kind_mut(live) {
            children.clone_from(&adopted);
        }

        self.mount_subtrees(&adopted, mount, depth)?;
        for child in adopted {
            self.backend.mount(&self.tree, child, mount);
        }
        Ok(())
    }
}
