use crate::attributes::AttributeMap;
use crate::tokenizer::tokenize;
use crate::types::{Node, Token};

/// Decides which tags are references to registered components.
pub trait ComponentTags {
    fn is_component(&self, tag: &str) -> bool;
}

/// Treats every tag as a plain element.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoComponents;

impl ComponentTags for NoComponents {
    fn is_component(&self, _tag: &str) -> bool {
        false
    }
}

impl<F: Fn(&str) -> bool> ComponentTags for F {
    fn is_component(&self, tag: &str) -> bool {
        self(tag)
    }
}

#[derive(Clone, Debug)]
pub struct TreeBuilderConfig {
    /// Trim text nodes and drop the ones that are whitespace only. Markup templates are
    /// indented for readability; that indentation is not content.
    pub trim_text: bool,
}

impl Default for TreeBuilderConfig {
    fn default() -> Self {
        Self { trim_text: true }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("markup has no root node")]
    Empty,
    #[error("markup has {0} root nodes, expected exactly one")]
    MultipleRoots(usize),
    #[error("tag <{0}> is never closed")]
    UnclosedTag(String),
    #[error("end tag </{found}> does not match open tag <{expected}>")]
    MismatchedEndTag { expected: String, found: String },
    #[error("end tag </{0}> has no matching start tag")]
    StrayEndTag(String),
    #[error("component <{0}> cannot have children")]
    ComponentWithChildren(String),
}

/// Tokenize and build `input` into a single-rooted tree.
pub fn parse(
    input: &str,
    components: &impl ComponentTags,
    config: &TreeBuilderConfig,
) -> Result<Node, ParseError> {
    build_tree(tokenize(input), components, config)
}

struct OpenElement {
    tag: String,
    attributes: AttributeMap,
    children: Vec<Node>,
    is_component: bool,
}

/// Build a tree from a token stream.
///
/// The builder keeps an explicit stack of open elements, so nesting depth is bounded by
/// memory rather than by the call stack.
pub fn build_tree(
    tokens: Vec<Token>,
    components: &impl ComponentTags,
    config: &TreeBuilderConfig,
) -> Result<Node, ParseError> {
    let mut open: Vec<OpenElement> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    for token in tokens {
        match token {
            Token::Text(text) => {
                let siblings = open.last_mut().map_or(&mut roots, |e| &mut e.children);
                push_text(siblings, text);
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let is_component = components.is_component(&name);
                let mut map = AttributeMap::new();
                for (key, value) in attributes {
                    // first occurrence wins, as in HTML
                    if !map.contains(&key) {
                        map.insert(key, value);
                    }
                }
                let element = OpenElement {
                    tag: name,
                    attributes: map,
                    children: Vec::new(),
                    is_component,
                };
                if self_closing {
                    let node = close(element, config)?;
                    open.last_mut()
                        .map_or(&mut roots, |e| &mut e.children)
                        .push(node);
                } else {
                    open.push(element);
                }
            }
            Token::EndTag(name) => {
                let Some(element) = open.pop() else {
                    return Err(ParseError::StrayEndTag(name));
                };
                if element.tag != name {
                    return Err(ParseError::MismatchedEndTag {
                        expected: element.tag,
                        found: name,
                    });
                }
                let node = close(element, config)?;
                open.last_mut()
                    .map_or(&mut roots, |e| &mut e.children)
                    .push(node);
            }
        }
    }

    if let Some(element) = open.pop() {
        return Err(ParseError::UnclosedTag(element.tag));
    }

    normalize_text(&mut roots, config);
    match roots.len() {
        0 => Err(ParseError::Empty),
        1 => Ok(roots.remove(0)),
        n => Err(ParseError::MultipleRoots(n)),
    }
}

fn close(element: OpenElement, config: &TreeBuilderConfig) -> Result<Node, ParseError> {
    let OpenElement {
        tag,
        attributes,
        mut children,
        is_component,
    } = element;
    normalize_text(&mut children, config);
    if is_component {
        if !children.is_empty() {
            return Err(ParseError::ComponentWithChildren(tag));
        }
        return Ok(Node::Component { tag, attributes });
    }
    Ok(Node::Element {
        tag,
        attributes,
        children,
    })
}

/// Adjacent text tokens form one text node.
fn push_text(siblings: &mut Vec<Node>, text: String) {
    if let Some(Node::Text { text: last }) = siblings.last_mut() {
        last.push_str(&text);
    } else {
        siblings.push(Node::Text { text });
    }
}

fn normalize_text(children: &mut Vec<Node>, config: &TreeBuilderConfig) {
    if !config.trim_text {
        return;
    }
    children.retain_mut(|child| match child {
        Node::Text { text } => {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
            !text.is_empty()
        }
        Node::Element { .. } | Node::Component { .. } => true,
    });
}
