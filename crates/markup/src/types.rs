use crate::attributes::AttributeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
}

/// Discriminant shared by freshly parsed nodes and live nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Element,
    Component,
}

/// A freshly built ("new") tree.
///
/// Owned top-down and consumed by reconciliation; subtrees are moved into the live tree
/// rather than copied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Text {
        text: String,
    },
    Element {
        tag: String,
        attributes: AttributeMap,
        children: Vec<Node>,
    },
    /// Reference to a registered component. The component's own render output is not part of
    /// the parsed tree; it is produced when the reference is mounted.
    Component {
        tag: String,
        attributes: AttributeMap,
    },
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Text { .. } => NodeKind::Text,
            Node::Element { .. } => NodeKind::Element,
            Node::Component { .. } => NodeKind::Component,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element { tag, .. } | Node::Component { tag, .. } => Some(tag),
            Node::Text { .. } => None,
        }
    }

    pub fn attributes(&self) -> Option<&AttributeMap> {
        match self {
            Node::Element { attributes, .. } | Node::Component { attributes, .. } => {
                Some(attributes)
            }
            Node::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            Node::Text { .. } | Node::Component { .. } => &[],
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn element(tag: impl Into<String>, attributes: AttributeMap, children: Vec<Node>) -> Self {
        Node::Element {
            tag: tag.into(),
            attributes,
            children,
        }
    }

    pub fn component(tag: impl Into<String>, attributes: AttributeMap) -> Self {
        Node::Component {
            tag: tag.into(),
            attributes,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            NodeKind::Text => "text",
            NodeKind::Element => "element",
            NodeKind::Component => "component",
        })
    }
}
