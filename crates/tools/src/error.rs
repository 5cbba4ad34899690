use geometry::{FragmentId, KernelError};
use thiserror::Error;

use crate::scene::ObjectId;

/// Errors raised while handling a pointer event
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error(transparent)]
    Kernel(#[from] KernelError),
    #[error("Unknown scene object {0:?}")]
    UnknownObject(ObjectId),
    #[error("Host has no render proxy for fragment {0:?}")]
    UnknownFragment(FragmentId),
    #[error("Parent walk from {id:?} exceeded {depth} levels")]
    AncestorDepthExceeded { id: ObjectId, depth: usize },
    #[error("Host error: {0}")]
    Host(String),
}
