//! Mesh edit engine: push/pull displacement of a face group.
//!
//! Each call moves every vertex of the group by one step along the face
//! normal, in place. Gestures call it once per pointer sample, so the face
//! follows the pointer as samples arrive.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::buffers::MeshBuffers;
use crate::error::KernelError;
use crate::topology::FaceGroup;

/// Direction of a face edit along the face normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditDirection {
    /// Extrude: move along the normal
    Push,
    /// Intrude: move against the normal
    Pull,
}

impl EditDirection {
    /// +1 for push, -1 for pull
    pub fn sign(self) -> f64 {
        match self {
            EditDirection::Push => 1.0,
            EditDirection::Pull => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            EditDirection::Push => EditDirection::Pull,
            EditDirection::Pull => EditDirection::Push,
        }
    }
}

/// Displace every vertex of `group` by `sign(direction) * magnitude * normal`.
///
/// `normal` must be expressed in the buffer's own (stored) space. Returns the
/// number of vertices moved. An empty group is a no-op. Vertices outside the
/// buffer are skipped; the rest are still moved and the first bad index is
/// reported as `GeometryError`. The buffer is marked dirty whenever at least
/// one vertex moved.
pub fn displace(
    buffers: &mut MeshBuffers<'_>,
    group: &FaceGroup,
    normal: DVec3,
    direction: EditDirection,
    magnitude: f64,
) -> Result<usize, KernelError> {
    if group.is_empty() {
        return Ok(0);
    }

    let delta = normal * (direction.sign() * magnitude);
    let mut moved = 0usize;
    let mut first_error = None;

    for &index in group.vertices() {
        match buffers.offset_vertex(index, delta) {
            Ok(()) => moved += 1,
            Err(e) => {
                warn!("displace: skipping vertex {}: {}", index, e);
                first_error.get_or_insert(e);
            }
        }
    }

    if moved > 0 {
        buffers.mark_dirty();
    }

    debug!(
        "displace: moved {} vertices by {:?} ({:?})",
        moved, delta, direction
    );

    match first_error {
        Some(e) => Err(e),
        None => Ok(moved),
    }
}
