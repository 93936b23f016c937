//! Hooks into the native side.
//!
//! The engine calls `mount` whenever a subtree is attached or structurally rebuilt and
//! `dismount` whenever a component instance is removed for good. What those mean on screen
//! is up to the backend; the records returned by `Engine::synchronize` describe everything
//! else.

use crate::tree::{LiveTree, MountContext};
use core_types::{ComponentId, NodeId};

pub trait Backend {
    /// `node` and its whole subtree (including rendered trees of embedded components) were
    /// attached or rebuilt.
    fn mount(&mut self, tree: &LiveTree, node: NodeId, context: MountContext);

    /// `component` was removed. Called before the node that embedded it is overwritten or
    /// freed, and after its own rendered tree was torn down.
    fn dismount(&mut self, component: ComponentId);
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn mount(&mut self, tree: &LiveTree, node: NodeId, context: MountContext) {
        (**self).mount(tree, node, context);
    }

    fn dismount(&mut self, component: ComponentId) {
        (**self).dismount(component);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopBackend;

impl Backend for NoopBackend {
    fn mount(&mut self, _tree: &LiveTree, _node: NodeId, _context: MountContext) {}

    fn dismount(&mut self, _component: ComponentId) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendEvent {
    Mount {
        node: NodeId,
        tag: Option<String>,
        context: MountContext,
    },
    Dismount {
        component: ComponentId,
    },
}

/// Keeps every hook call in order. Useful for drivers that batch native calls and in tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
    events: Vec<BackendEvent>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[BackendEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<BackendEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn mounted(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.events.iter().filter_map(|event| match event {
            BackendEvent::Mount { node, .. } => Some(*node),
            BackendEvent::Dismount { .. } => None,
        })
    }

    pub fn dismounted(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.events.iter().filter_map(|event| match event {
            BackendEvent::Dismount { component } => Some(*component),
            BackendEvent::Mount { .. } => None,
        })
    }
}

impl Backend for RecordingBackend {
    fn mount(&mut self, tree: &LiveTree, node: NodeId, context: MountContext) {
        let tag = tree
            .get(node)
            .and_then(|live| live.tag())
            .map(str::to_string);
        self.events.push(BackendEvent::Mount { node, tag, context });
    }

    fn dismount(&mut self, component: ComponentId) {
        self.events.push(BackendEvent::Dismount { component });
    }
}
