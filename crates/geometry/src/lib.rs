//! Geometric interaction kernel for face editing
//!
//! This crate turns pointer input into edits on raw triangle buffers:
//! - [`camera`] - Ray caster from screen position and camera description
//! - [`buffers`] - Borrowed vertex/index buffer views and owned meshes
//! - [`raycast`] - Ray-triangle intersection for kernel-owned meshes
//! - [`topology`] - Face topology analyzer (coplanar triangle grouping)
//! - [`edit`] - Mesh edit engine (push/pull displacement)
//! - [`highlight`] - Overlay builder for the picked face group
//!
//! Everything here is host-agnostic: the host hands in picks, cameras and
//! buffer views, and receives rays, groups and overlays back.

pub mod buffers;
pub mod camera;
pub mod edit;
pub mod error;
pub mod highlight;
pub mod raycast;
pub mod topology;
pub mod types;

pub use buffers::*;
pub use camera::*;
pub use edit::*;
pub use error::*;
pub use highlight::*;
pub use raycast::*;
pub use topology::*;
pub use types::*;
