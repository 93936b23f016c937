//! Live node tree.
//!
//! Nodes live in an arena addressed by [`NodeId`]. Ownership is top-down: an element's
//! `children` list owns its children, and a component's rendered root is owned by the
//! component table in the engine. `parent` is a plain id used only to walk upwards; nothing
//! is ever torn down by following it.
//!
//! Freed slots are reused. Each reuse bumps the slot's generation, so a stale `NodeId` resolves
//! to `None` instead of to the node now living in its slot. A slot whose generation is
//! exhausted is retired rather than recycled.

use crate::error::SyncError;
use core_types::{ComponentId, ContextId, NodeId};
use markup::{AttributeMap, Node, NodeKind};

/// Backend context a node is attached with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MountContext {
    /// Component whose render output contains the node.
    pub owner: ComponentId,
    pub context: ContextId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiveKind {
    Text {
        text: String,
    },
    Element {
        tag: String,
        attributes: AttributeMap,
        children: Vec<NodeId>,
    },
    Component {
        tag: String,
        attributes: AttributeMap,
        /// Set once the referenced component has been instantiated and mounted.
        component: Option<ComponentId>,
    },
}

impl LiveKind {
    /// Split a parsed node into its live shape (with an empty child list) and the children
    /// still to be adopted.
    pub(crate) fn from_node(node: Node) -> (LiveKind, Vec<Node>) {
        match node {
            Node::Text { text } => (LiveKind::Text { text }, Vec::new()),
            Node::Element {
                tag,
                attributes,
                children,
            } => (
                LiveKind::Element {
                    tag,
                    attributes,
                    children: Vec::with_capacity(children.len()),
                },
                children,
            ),
            Node::Component { tag, attributes } => (
                LiveKind::Component {
                    tag,
                    attributes,
                    component: None,
                },
                Vec::new(),
            ),
        }
    }

    pub fn node_kind(&self) -> NodeKind {
        match self {
            LiveKind::Text { .. } => NodeKind::Text,
            LiveKind::Element { .. } => NodeKind::Element,
            LiveKind::Component { .. } => NodeKind::Component,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LiveNode {
    pub(crate) kind: LiveKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) mount: Option<MountContext>,
}

impl LiveNode {
    pub fn kind(&self) -> &LiveKind {
        &self.kind
    }

    pub fn node_kind(&self) -> NodeKind {
        self.kind.node_kind()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn mount(&self) -> Option<MountContext> {
        self.mount
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            LiveKind::Element { tag, .. } | LiveKind::Component { tag, .. } => Some(tag),
            LiveKind::Text { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            LiveKind::Text { text } => Some(text),
            LiveKind::Element { .. } | LiveKind::Component { .. } => None,
        }
    }

    pub fn attributes(&self) -> Option<&AttributeMap> {
        match &self.kind {
            LiveKind::Element { attributes, .. } | LiveKind::Component { attributes, .. } => {
                Some(attributes)
            }
            LiveKind::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            LiveKind::Element { children, .. } => children,
            LiveKind::Text { .. } | LiveKind::Component { .. } => &[],
        }
    }

    pub fn component(&self) -> Option<ComponentId> {
        match &self.kind {
            LiveKind::Component { component, .. } => *component,
            LiveKind::Text { .. } | LiveKind::Element { .. } => None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<LiveNode>,
}

#[derive(Debug, Default)]
pub struct LiveTree {
    slots: Vec<Slot>,
    /// Vacant slot indices, most recently freed last.
    free: Vec<u32>,
    live: usize,
}

impl LiveTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&LiveNode> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut LiveNode> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    pub(crate) fn kind_mut(&mut self, id: NodeId) -> Option<&mut LiveKind> {
        self.get_mut(id).map(|node| &mut node.kind)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of nodes currently in the tree.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots the arena has allocated, occupied or not.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(LiveNode::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(LiveNode::children).unwrap_or_default()
    }

    /// Ancestors of `id`, nearest first. Crosses component boundaries: the parent of a
    /// component's rendered root is the component node that embeds it.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Nodes of the subtree rooted at `id` in pre-order, following child lists only.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(node) = self.get(next) else {
                continue;
            };
            out.push(next);
            pending.extend(node.children().iter().rev().copied());
        }
        out
    }

    /// Owned copy of the subtree at `id`. Component nodes are copied as references; their
    /// rendered trees are not included.
    pub fn snapshot(&self, id: NodeId) -> Option<Node> {
        let node = self.get(id)?;
        Some(match &node.kind {
            LiveKind::Text { text } => Node::Text { text: text.clone() },
            LiveKind::Element {
                tag,
                attributes,
                children,
            } => Node::Element {
                tag: tag.clone(),
                attributes: attributes.clone(),
                children: children
                    .iter()
                    .filter_map(|child| self.snapshot(*child))
                    .collect(),
            },
            LiveKind::Component {
                tag, attributes, ..
            } => Node::Component {
                tag: tag.clone(),
                attributes: attributes.clone(),
            },
        })
    }

    /// Move a parsed subtree into the arena below `parent`.
    ///
    /// Descendants are linked into their parents' child lists; the returned root is not
    /// linked into `parent`'s list (the caller decides where it goes). If the arena runs out
    /// of slots midway, the partial subtree is freed again.
    pub(crate) fn adopt(
        &mut self,
        node: Node,
        parent: Option<NodeId>,
    ) -> Result<NodeId, SyncError> {
        let (kind, children) = LiveKind::from_node(node);
        let root = self.alloc(kind, parent)?;

        let mut pending: Vec<(Node, NodeId)> =
            children.into_iter().rev().map(|child| (child, root)).collect();
        while let Some((node, parent)) = pending.pop() {
            let (kind, children) = LiveKind::from_node(node);
            let id = match self.alloc(kind, Some(parent)) {
                Ok(id) => id,
                Err(err) => {
                    for id in self.subtree(root) {
                        self.free(id);
                    }
                    return Err(err);
                }
            };
            if let Some(LiveKind::Element { children: list, .. }) = self.kind_mut(parent) {
                list.push(id);
            }
            pending.extend(children.into_iter().rev().map(|child| (child, id)));
        }
        Ok(root)
    }

    /// Adopt each of `nodes` below `parent`; on failure, the ones already adopted are freed.
    pub(crate) fn adopt_all(
        &mut self,
        nodes: Vec<Node>,
        parent: NodeId,
    ) -> Result<Vec<NodeId>, SyncError> {
        let mut adopted = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.adopt(node, Some(parent)) {
                Ok(id) => adopted.push(id),
                Err(err) => {
                    let partial: Vec<NodeId> =
                        adopted.iter().flat_map(|root| self.subtree(*root)).collect();
                    for id in partial {
                        self.free(id);
                    }
                    return Err(err);
                }
            }
        }
        Ok(adopted)
    }

    pub(crate) fn free(&mut self, id: NodeId) -> Option<LiveNode> {
        let slot = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())?;
        let freed = slot.node.take()?;
        self.live -= 1;
        if let Some(generation) = slot.generation.checked_add(1) {
            slot.generation = generation;
            self.free.push(id.index() as u32);
        }
        Some(freed)
    }

    fn alloc(&mut self, kind: LiveKind, parent: Option<NodeId>) -> Result<NodeId, SyncError> {
        let node = LiveNode {
            kind,
            parent,
            mount: None,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId::new(index, slot.generation)
            }
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| SyncError::TreeFull)?;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId::new(index, 0)
            }
        };
        self.live += 1;
        Ok(id)
    }
}

pub struct Ancestors<'a> {
    tree: &'a LiveTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
