//! Component markup: tokenizer, tree builder and attribute maps.
//!
//! Turns the markup string a component renders into an owned [`Node`] tree that the
//! reconciler compares against the live tree.

pub mod attributes;
pub mod decode;

mod entities;
mod tokenizer;
mod tree_builder;
mod types;

pub use crate::attributes::{AttributeMap, REMOVED};
pub use crate::decode::DecodeError;
pub use crate::tokenizer::tokenize;
pub use crate::tree_builder::{
    ComponentTags, NoComponents, ParseError, TreeBuilderConfig, build_tree, parse,
};
pub use crate::types::{Node, NodeKind, Token};
