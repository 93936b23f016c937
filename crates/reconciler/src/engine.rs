use crate::backend::{Backend, NoopBackend};
use crate::component::{Component, Registry};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::record::SyncRecord;
use crate::tree::{LiveTree, MountContext};
use core_types::{ComponentId, ContextId, NodeId};
use markup::{Node, NodeKind};
use std::collections::HashMap;

#[derive(Debug)]
pub(crate) struct ComponentEntry {
    pub(crate) instance: Box<dyn Component>,
    pub(crate) root: NodeId,
    /// Component node embedding this instance; `None` for components mounted directly.
    pub(crate) host: Option<NodeId>,
    pub(crate) context: ContextId,
}

/// Owns the live tree of every mounted component and keeps it in step with their render
/// output.
///
/// All mutation goes through `&mut self`; an engine is meant to be driven from the one
/// thread that owns the UI.
#[derive(Debug)]
pub struct Engine<B: Backend = NoopBackend> {
    pub(crate) tree: LiveTree,
    pub(crate) components: HashMap<ComponentId, ComponentEntry>,
    pub(crate) registry: Registry,
    pub(crate) backend: B,
    pub(crate) config: SyncConfig,
    next_component: ComponentId,
}

impl Engine<NoopBackend> {
    pub fn new(registry: Registry) -> Self {
        Self::with_backend(registry, NoopBackend)
    }
}

impl<B: Backend> Engine<B> {
    pub fn with_backend(registry: Registry, backend: B) -> Self {
        Self::with_config(registry, backend, SyncConfig::default())
    }

    pub fn with_config(registry: Registry, backend: B, config: SyncConfig) -> Self {
        Self {
            tree: LiveTree::new(),
            components: HashMap::new(),
            registry,
            backend,
            config,
            next_component: ComponentId(1),
        }
    }

    pub fn tree(&self) -> &LiveTree {
        &self.tree
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Root node of a mounted component's rendered tree.
    pub fn root(&self, component: ComponentId) -> Option<NodeId> {
        self.components.get(&component).map(|entry| entry.root)
    }

    /// Component node embedding `component`, if it was mounted from another component's
    /// markup.
    pub fn host(&self, component: ComponentId) -> Option<NodeId> {
        self.components.get(&component).and_then(|entry| entry.host)
    }

    /// Backend context a component was mounted into.
    pub fn context(&self, component: ComponentId) -> Option<ContextId> {
        self.components.get(&component).map(|entry| entry.context)
    }

    pub fn is_mounted(&self, component: ComponentId) -> bool {
        self.components.contains_key(&component)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, component: ComponentId) -> Option<&(dyn Component + 'static)> {
        self.components
            .get(&component)
            .map(|entry| entry.instance.as_ref())
    }

    /// Mutable access to a component's state. Call [`Engine::synchronize`] afterwards to
    /// bring the live tree up to date.
    pub fn component_mut(
        &mut self,
        component: ComponentId,
    ) -> Option<&mut (dyn Component + 'static)> {
        self.components
            .get_mut(&component)
            .map(|entry| entry.instance.as_mut())
    }

    /// Render `component`, build its live tree, and attach it to the backend under
    /// `context`.
    pub fn mount(
        &mut self,
        component: Box<dyn Component>,
        context: ContextId,
    ) -> Result<ComponentId, SyncError> {
        let id = self.mount_component(component, context, None, 0)?;
        let root = self.root(id).ok_or(SyncError::UnknownComponentId(id))?;
        self.backend.mount(
            &self.tree,
            root,
            MountContext {
                owner: id,
                context,
            },
        );
        Ok(id)
    }

    /// Remove a component mounted with [`Engine::mount`] along with everything it rendered.
    pub fn dismount(&mut self, component: ComponentId) -> Result<(), SyncError> {
        let entry = self
            .components
            .get(&component)
            .ok_or(SyncError::UnknownComponentId(component))?;
        if entry.host.is_some() {
            return Err(SyncError::NestedComponent(component));
        }
        self.dismount_component(component);
        Ok(())
    }

    /// Re-render `component` and reconcile its live tree with the result.
    ///
    /// Returns the records a backend needs to apply, in tree order. Changes to embedded
    /// components' props re-synchronize those components as part of the same pass.
    pub fn synchronize(&mut self, component: ComponentId) -> Result<Vec<SyncRecord>, SyncError> {
        self.synchronize_at(component, 0)
    }

    pub(crate) fn synchronize_at(
        &mut self,
        component: ComponentId,
        depth: usize,
    ) -> Result<Vec<SyncRecord>, SyncError> {
        self.check_depth(depth)?;
        let entry = self
            .components
            .get(&component)
            .ok_or(SyncError::UnknownComponentId(component))?;
        let live = entry.root;
        let new = self.render_tree(entry.instance.as_ref(), component)?;

        log::trace!(target: "sync.reconcile", "synchronize {component} at depth {depth}");
        let outcome = self.sync_nodes(live, new, depth)?;
        if outcome.full_sync_parent {
            // Roots are always elements on both sides, which never escalate; keep the
            // records well-formed regardless.
            return Ok(vec![SyncRecord::full(live)]);
        }
        log::debug!(
            target: "sync.reconcile",
            "{component}: {} sync record(s)",
            outcome.records.len()
        );
        Ok(outcome.records)
    }

    /// Render and parse a component, requiring an element root.
    pub(crate) fn render_tree(
        &self,
        instance: &dyn Component,
        component: ComponentId,
    ) -> Result<Node, SyncError> {
        let rendered = instance
            .render()
            .map_err(|source| SyncError::Render { component, source })?;
        let root = markup::parse(&rendered, &self.registry, &self.config.tree_builder)
            .map_err(|source| SyncError::Parse { component, source })?;
        match root.kind() {
            NodeKind::Element => Ok(root),
            found @ (NodeKind::Text | NodeKind::Component) => {
                Err(SyncError::InvalidRoot { component, found })
            }
        }
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<(), SyncError> {
        if depth > self.config.max_component_depth {
            return Err(SyncError::NestingTooDeep {
                limit: self.config.max_component_depth,
            });
        }
        Ok(())
    }

    pub(crate) fn allocate_component_id(&mut self) -> ComponentId {
        let id = self.next_component;
        self.next_component = id.next();
        id
    }
}
