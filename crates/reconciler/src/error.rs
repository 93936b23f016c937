use crate::component::RenderError;
use core_types::{ComponentId, NodeId};
use markup::{DecodeError, NodeKind, ParseError};

/// Errors surfaced by mounting and synchronizing components.
///
/// Render, parse and root-shape failures mean the component's markup is broken in its current
/// state; retrying without a state change fails the same way. The live tree is not rolled
/// back when a pass fails midway.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("{component} failed to render")]
    Render {
        component: ComponentId,
        #[source]
        source: RenderError,
    },
    #[error("{component} rendered malformed markup")]
    Parse {
        component: ComponentId,
        #[source]
        source: ParseError,
    },
    #[error("{component} rendered a {found} root; the root must be an element")]
    InvalidRoot {
        component: ComponentId,
        found: NodeKind,
    },
    #[error("cannot decode attributes of <{tag}>")]
    Decode {
        tag: String,
        #[source]
        source: DecodeError,
    },
    #[error("no component registered for <{0}>")]
    UnknownComponent(String),
    #[error("{0} is not mounted")]
    UnknownComponentId(ComponentId),
    #[error("{0} is embedded in another component and is dismounted with it")]
    NestedComponent(ComponentId),
    #[error("{0} is not in the live tree")]
    MissingNode(NodeId),
    #[error("{0} has no mount context")]
    Unmounted(NodeId),
    #[error("live tree has no free node slots")]
    TreeFull,
    #[error("component nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },
}
