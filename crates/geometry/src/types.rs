use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::KernelError;

/// A half-line in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: DVec3,
    /// Unit direction
    pub direction: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Host-side identifier of a renderable sub-mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentId(pub u32);

/// Face information attached to a pick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceHit {
    /// World-space unit normal of the hit triangle
    pub normal: DVec3,
    /// Vertex indices of the hit triangle
    pub vertices: [u32; 3],
}

/// Result of a host hit test for one pointer sample.
///
/// Produced per sample and consumed by the interaction step that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickResult {
    /// World-space hit point
    pub point: DVec3,
    /// Distance along the pick ray
    pub distance: f64,
    /// Fragment that owns the hit triangle
    pub fragment: Option<FragmentId>,
    /// Hit triangle, when the host could resolve it
    pub face: Option<FaceHit>,
}

impl PickResult {
    /// A pick that only carries a point (no face data)
    pub fn point_only(point: DVec3, distance: f64) -> Self {
        Self {
            point,
            distance,
            fragment: None,
            face: None,
        }
    }

    /// Fragment and face of this pick, or `NoFaceData` if either is missing
    pub fn face_data(&self) -> Result<(FragmentId, FaceHit), KernelError> {
        match (self.fragment, self.face) {
            (Some(fragment), Some(face)) => Ok((fragment, face)),
            _ => Err(KernelError::NoFaceData),
        }
    }
}
