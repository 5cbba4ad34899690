//! Face editing tools on top of the geometry kernel
//!
//! - [`host`] - Contract the viewing runtime implements
//! - [`scene`] - Kernel-owned custom objects with parent back-links
//! - [`mode`] - The single tool mode (highlight, push, pull, add, remove, drag)
//! - [`objects`] - Object manipulation: add, remove, drag
//! - [`faces`] - Face highlight and push/pull gestures
//! - [`tool`] - Pointer event handlers tying it together
//! - [`registry`] - Priority-ordered tool lookup table
//!
//! Everything runs on the host's interaction thread, one callback at a time.

pub mod error;
pub mod faces;
pub mod host;
pub mod mode;
pub mod objects;
pub mod registry;
pub mod scene;
pub mod tool;

pub use error::ToolError;
pub use faces::FaceController;
pub use host::{Host, InvalidateFlags, OverlayId, PointerEvent, PointerEventKind, edit_fragment};
pub use mode::ToolMode;
pub use objects::{DragSession, ObjectController, ObjectHit};
pub use registry::ToolRegistry;
pub use scene::{ObjectId, ObjectTemplate, SceneGraph, SceneNode};
pub use tool::{FaceEditTool, InteractionTool};

#[cfg(test)]
pub(crate) mod test_host;
