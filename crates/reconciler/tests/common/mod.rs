#![allow(dead_code)]

use reconciler::{
    AttributeMap, Backend, Component, ComponentId, ContextId, DecodeError, Engine, LiveNode,
    NodeId, Registry, RenderError, SyncRecord, SyncScope,
};
use serde::Deserialize;

/// Renders whatever markup the test puts in it.
#[derive(Default)]
pub struct Fixture {
    pub markup: String,
}

impl Component for Fixture {
    fn render(&self) -> Result<String, RenderError> {
        Ok(self.markup.clone())
    }
}

#[derive(Default)]
pub struct Badge {
    pub label: String,
    pub mounts: usize,
}

impl Component for Badge {
    fn render(&self) -> Result<String, RenderError> {
        Ok(format!("<em>{}</em>", self.label))
    }

    fn decode_attributes(&mut self, attributes: &AttributeMap) -> Result<(), DecodeError> {
        self.label = attributes.get("label").unwrap_or_default().to_string();
        Ok(())
    }

    fn on_mount(&mut self) {
        self.mounts += 1;
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CounterProps {
    count: u32,
    #[serde(default)]
    show_label: bool,
}

#[derive(Default)]
pub struct Counter {
    pub count: u32,
    pub show_label: bool,
}

impl Component for Counter {
    fn render(&self) -> Result<String, RenderError> {
        if self.show_label {
            Ok(format!(
                r#"<span data-count="{}"><badge label="{}"/></span>"#,
                self.count, self.count
            ))
        } else {
            Ok(format!(r#"<span data-count="{}"/>"#, self.count))
        }
    }

    fn decode_attributes(&mut self, attributes: &AttributeMap) -> Result<(), DecodeError> {
        let props: CounterProps = attributes.decode()?;
        self.count = props.count;
        self.show_label = props.show_label;
        Ok(())
    }
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_default::<Badge>("badge");
    registry.register_default::<Counter>("counter");
    registry
}

pub fn mount<B: Backend>(engine: &mut Engine<B>, markup: &str) -> ComponentId {
    engine
        .mount(
            Box::new(Fixture {
                markup: markup.to_string(),
            }),
            ContextId(1),
        )
        .expect("mount failed")
}

pub fn set_markup<B: Backend>(engine: &mut Engine<B>, id: ComponentId, markup: &str) {
    engine
        .component_mut(id)
        .and_then(|c| c.downcast_mut::<Fixture>())
        .expect("fixture component")
        .markup = markup.to_string();
}

/// Resolve a path such as `0/2/@/0` from a component's root. Numbers index child lists; `@`
/// enters the rendered tree of the component embedded at the current node.
pub fn resolve<B: Backend>(engine: &Engine<B>, id: ComponentId, path: &str) -> NodeId {
    let mut node = engine.root(id).expect("component root");
    for step in path.split('/').filter(|step| !step.is_empty()) {
        node = if step == "@" {
            let embedded = engine
                .tree()
                .get(node)
                .and_then(LiveNode::component)
                .unwrap_or_else(|| panic!("{node} embeds no component (path {path:?})"));
            engine.root(embedded).expect("embedded root")
        } else {
            let index: usize = step
                .parse()
                .unwrap_or_else(|_| panic!("bad path step {step:?} in {path:?}"));
            *engine
                .tree()
                .children(node)
                .get(index)
                .unwrap_or_else(|| panic!("{node} has no child {index} (path {path:?})"))
        };
    }
    node
}

/// No record may sit inside the subtree of a `FullSync` record.
pub fn assert_non_overlapping<B: Backend>(engine: &Engine<B>, records: &[SyncRecord]) {
    for full in records.iter().filter(|r| r.scope == SyncScope::FullSync) {
        for other in records {
            assert!(
                !engine.tree().is_descendant_of(other.node, full.node),
                "{} is covered by the full sync of {}",
                other.node,
                full.node
            );
        }
    }
}

/// Serialize a component's live tree, following embedded components into their rendered trees.
/// Component nodes print only their content: their props are not visible on screen.
pub fn render_live<B: Backend>(engine: &Engine<B>, node: NodeId) -> String {
    let mut out = String::new();
    write_live(engine, node, &mut out);
    out
}

fn write_live<B: Backend>(engine: &Engine<B>, node: NodeId, out: &mut String) {
    let Some(live) = engine.tree().get(node) else {
        out.push_str("<?>");
        return;
    };
    if let Some(text) = live.text() {
        out.push_str(text);
        return;
    }
    if let Some(component) = live.component() {
        out.push('[');
        if let Some(root) = engine.root(component) {
            write_live(engine, root, out);
        }
        out.push(']');
        return;
    }
    let tag = live.tag().unwrap_or_default();
    out.push('<');
    out.push_str(tag);
    write_attributes(live.attributes(), out);
    out.push('>');
    for child in live.children() {
        write_live(engine, *child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

pub fn write_attributes(attributes: Option<&AttributeMap>, out: &mut String) {
    let Some(attributes) = attributes else {
        return;
    };
    let mut sorted: Vec<_> = attributes.iter().collect();
    sorted.sort();
    for (name, value) in sorted {
        out.push_str(&format!(" {name}=\"{value}\""));
    }
}
