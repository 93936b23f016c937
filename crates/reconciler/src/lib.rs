//! Keeps a live UI tree in step with what its components render.
//!
//! Components render markup; [`Engine::synchronize`] parses the new output, reconciles it
//! against the live tree in place, and returns the [`SyncRecord`]s a backend driver needs to
//! bring the screen up to date.

pub mod backend;
pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod tree;

mod lifecycle;
mod reconcile;

pub use crate::backend::{Backend, BackendEvent, NoopBackend, RecordingBackend};
pub use crate::component::{AsAny, Component, Registry, RenderError};
pub use crate::config::SyncConfig;
pub use crate::engine::Engine;
pub use crate::error::SyncError;
pub use crate::record::{SyncRecord, SyncScope};
pub use crate::tree::{Ancestors, LiveKind, LiveNode, LiveTree, MountContext};
pub use core_types::{ComponentId, ContextId, NodeId};
pub use markup::{AttributeMap, DecodeError, Node, NodeKind, REMOVED};
