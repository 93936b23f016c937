//! Mounting and dismounting components and subtrees.
//!
//! Teardown is child-first and depth-first: a component's rendered tree (and every component
//! nested in it) is dismounted before the component itself, and a node is dismounted before
//! its slot is freed.

use crate::backend::Backend;
use crate::component::Component;
use crate::engine::{ComponentEntry, Engine};
use crate::error::SyncError;
use crate::tree::{LiveKind, LiveNode, MountContext};
use core_types::{ComponentId, ContextId, NodeId};
use markup::AttributeMap;

impl<B: Backend> Engine<B> {
    /// Render `instance` and attach its tree below `host`, the component node embedding it.
    ///
    /// Does not call the backend `mount` hook; the caller announces the attach point once
    /// the whole subtree is in place.
    pub(crate) fn mount_component(
        &mut self,
        instance: Box<dyn Component>,
        context: ContextId,
        host: Option<NodeId>,
        depth: usize,
    ) -> Result<ComponentId, SyncError> {
        self.check_depth(depth)?;
        let id = self.allocate_component_id();
        let new = self.render_tree(instance.as_ref(), id)?;
        let root = self.tree.adopt(new, host)?;
        self.components.insert(
            id,
            ComponentEntry {
                instance,
                root,
                host,
                context,
            },
        );

        if let Err(err) = self.mount_subtree(root, MountContext { owner: id, context }, depth) {
            self.discard_component(id);
            return Err(err);
        }
        if let Some(entry) = self.components.get_mut(&id) {
            entry.instance.on_mount();
        }
        log::debug!(target: "sync.lifecycle", "mounted {id} with root {root} at depth {depth}");
        Ok(id)
    }

    /// Assign `mount` to every node of the subtree at `node` and instantiate the components
    /// it references.
    ///
    /// Every node gets its mount context before the first component is created, so a failed
    /// instantiation leaves the rest of the subtree attached. Component nodes that could not
    /// be instantiated keep `component: None` and are retried on the next pass.
    pub(crate) fn mount_subtree(
        &mut self,
        node: NodeId,
        mount: MountContext,
        depth: usize,
    ) -> Result<(), SyncError> {
        self.mount_subtrees(&[node], mount, depth)
    }

    /// [`Engine::mount_subtree`] for several sibling subtrees at once.
    pub(crate) fn mount_subtrees(
        &mut self,
        nodes: &[NodeId],
        mount: MountContext,
        depth: usize,
    ) -> Result<(), SyncError> {
        let mut references = Vec::new();
        for node in nodes {
            references.extend(self.assign_mount(*node, mount)?);
        }
        for (id, tag, attributes) in references {
            self.instantiate(id, tag, &attributes, mount.context, depth + 1)?;
        }
        Ok(())
    }

    /// Set `mount` on the subtree at `node`, returning the component references still to be
    /// instantiated, in document order.
    fn assign_mount(
        &mut self,
        node: NodeId,
        mount: MountContext,
    ) -> Result<Vec<(NodeId, String, AttributeMap)>, SyncError> {
        let mut references = Vec::new();
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            let live = self.tree.get_mut(id).ok_or(SyncError::MissingNode(id))?;
            live.mount = Some(mount);
            match &live.kind {
                LiveKind::Element { children, .. } => {
                    pending.extend(children.iter().rev().copied());
                }
                LiveKind::Component {
                    tag,
                    attributes,
                    component: None,
                } => references.push((id, tag.clone(), attributes.clone())),
                LiveKind::Component {
                    component: Some(_), ..
                }
                | LiveKind::Text { .. } => {}
            }
        }
        Ok(references)
    }

    /// Create the component referenced by the component node `node`, hand it its props,
    /// and mount it.
    fn instantiate(
        &mut self,
        node: NodeId,
        tag: String,
        attributes: &AttributeMap,
        context: ContextId,
        depth: usize,
    ) -> Result<ComponentId, SyncError> {
        let mut instance = self
            .registry
            .create(&tag)
            .ok_or_else(|| SyncError::UnknownComponent(tag.clone()))?;
        instance
            .decode_attributes(attributes)
            .map_err(|source| SyncError::Decode { tag, source })?;
        let child = self.mount_component(instance, context, Some(node), depth)?;
        if let Some(LiveKind::Component { component, .. }) = self.tree.kind_mut(node) {
            *component = Some(child);
        }
        Ok(child)
    }

    /// Dismount every component in the subtree at `node` and free its slots.
    pub(crate) fn teardown(&mut self, node: NodeId) {
        let mut stack = vec![(node, false)];
        while let Some((id, visited)) = stack.pop() {
            if !visited {
                stack.push((id, true));
                stack.extend(
                    self.tree
                        .children(id)
                        .iter()
                        .rev()
                        .map(|child| (*child, false)),
                );
                continue;
            }
            if let Some(component) = self.tree.get(id).and_then(LiveNode::component) {
                self.dismount_component(component);
            }
            self.tree.free(id);
        }
    }

    /// Undo a mount that failed partway: components nested in the rendered tree that did mount
    /// are dismounted, but `id` itself never saw `on_mount` and is dropped silently.
    fn discard_component(&mut self, id: ComponentId) {
        let Some(entry) = self.components.remove(&id) else {
            return;
        };
        self.teardown(entry.root);
        log::debug!(target: "sync.lifecycle", "discarded {id} after a failed mount");
    }

    /// Tear down a component's rendered tree, then the component itself.
    pub(crate) fn dismount_component(&mut self, component: ComponentId) {
        let Some(entry) = self.components.remove(&component) else {
            return;
        };
        self.teardown(entry.root);
        let mut instance = entry.instance;
        instance.on_dismount();
        self.backend.dismount(component);
        log::debug!(target: "sync.lifecycle", "dismounted {component}");
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::{BackendEvent, RecordingBackend};
    use crate::component::{Component, Registry, RenderError};
    use crate::engine::Engine;
    use crate::error::SyncError;
    use core_types::ContextId;
    use markup::{AttributeMap, DecodeError};

    struct Page;

    impl Component for Page {
        fn render(&self) -> Result<String, RenderError> {
            Ok(r#"<main><badge label="new"/><p>body</p></main>"#.to_string())
        }
    }

    #[derive(Default)]
    struct Badge {
        label: String,
    }

    impl Component for Badge {
        fn render(&self) -> Result<String, RenderError> {
            Ok(format!("<em>{}</em>", self.label))
        }

        fn decode_attributes(&mut self, attributes: &AttributeMap) -> Result<(), DecodeError> {
            self.label = attributes.get("label").unwrap_or_default().to_string();
            Ok(())
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_default::<Badge>("badge");
        registry
    }

    #[test]
    fn mount_instantiates_nested_components() {
        let mut engine = Engine::with_backend(registry(), RecordingBackend::new());
        let page = engine
            .mount(Box::new(Page), ContextId(9))
            .expect("mount failed");

        assert_eq!(engine.component_count(), 2);
        let root = engine.root(page).expect("root");
        let badge_node = engine.tree().children(root)[0];
        let badge = engine
            .tree()
            .get(badge_node)
            .and_then(|node| node.component())
            .expect("badge instantiated");
        assert_eq!(engine.host(badge), Some(badge_node));
        assert_eq!(engine.context(badge), Some(ContextId(9)));

        let badge_root = engine.root(badge).expect("badge root");
        assert_eq!(engine.tree().parent(badge_root), Some(badge_node));
        let label = engine
            .component(badge)
            .and_then(|c| c.downcast_ref::<Badge>())
            .map(|b| b.label.clone());
        assert_eq!(label.as_deref(), Some("new"));

        // nodes rendered by the badge belong to the badge
        let owner = engine
            .tree()
            .get(badge_root)
            .and_then(|node| node.mount())
            .map(|m| m.owner);
        assert_eq!(owner, Some(badge));

        // one mount hook for the attach point
        assert_eq!(engine.backend().mounted().collect::<Vec<_>>(), vec![root]);
    }

    #[test]
    fn dismount_tears_down_children_first() {
        let mut engine = Engine::with_backend(registry(), RecordingBackend::new());
        let page = engine
            .mount(Box::new(Page), ContextId::default())
            .expect("mount failed");
        let root = engine.root(page).expect("root");
        let badge = engine
            .tree()
            .get(engine.tree().children(root)[0])
            .and_then(|node| node.component())
            .expect("badge");

        assert!(matches!(
            engine.dismount(badge),
            Err(SyncError::NestedComponent(id)) if id == badge
        ));

        engine.backend_mut().take_events();
        engine.dismount(page).expect("dismount failed");
        assert_eq!(
            engine.backend().events(),
            &[
                BackendEvent::Dismount { component: badge },
                BackendEvent::Dismount { component: page },
            ]
        );
        assert!(engine.tree().is_empty());
        assert_eq!(engine.component_count(), 0);
        assert!(matches!(
            engine.dismount(page),
            Err(SyncError::UnknownComponentId(_))
        ));
    }

    #[test]
    fn nesting_is_bounded() {
        struct Recursive;

        impl Component for Recursive {
            fn render(&self) -> Result<String, RenderError> {
                Ok("<div><recursive/></div>".to_string())
            }
        }

        let mut registry = Registry::new();
        registry.register("recursive", || Box::new(Recursive));
        let mut engine = Engine::new(registry);
        let err = engine.mount(Box::new(Recursive), ContextId::default());
        assert!(matches!(
            err,
            Err(SyncError::NestingTooDeep { limit }) if limit == engine.config().max_component_depth
        ));
    }
}
