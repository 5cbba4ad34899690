//! Face topology analyzer.
//!
//! Given a pick and the picked fragment's buffers, finds every triangle that
//! belongs to the same flat face as the picked one. Two membership rules are
//! provided:
//!
//! - normal equality: a triangle joins when its world-space normal matches
//!   the pick normal after rounding the per-axis difference to a fixed number
//!   of decimals (8 by default)
//! - exact coplanarity: a vertex joins when the scalar triple product with the
//!   picked triangle is exactly zero
//!
//! The two rules use different tolerances (rounded vs exact). Both are kept
//! as they are; the exact test is fragile under any transform that is not
//! exactly representable.

use std::collections::HashSet;

use facet_config::{DEFAULT_NORMAL_DECIMALS, MAX_NORMAL_DECIMALS};
use glam::DVec3;
use tracing::{debug, warn};

use crate::buffers::MeshBuffers;
use crate::error::KernelError;
use crate::types::PickResult;

/// A triangle of a face group with its world-space corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupTriangle {
    pub vertices: [u32; 3],
    pub world: [DVec3; 3],
}

/// Triangles sharing the picked face, plus their distinct vertices.
///
/// Built fresh for each gesture; triangles and vertices keep index-buffer
/// traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGroup {
    normal: DVec3,
    triangles: Vec<GroupTriangle>,
    vertices: Vec<u32>,
}

impl FaceGroup {
    /// Empty group for a reference normal
    pub fn empty(normal: DVec3) -> Self {
        Self {
            normal,
            triangles: Vec::new(),
            vertices: Vec::new(),
        }
    }

    /// Reference normal the group was built against (world space)
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    pub fn triangles(&self) -> &[GroupTriangle] {
        &self.triangles
    }

    /// Distinct vertex indices, in first-seen order
    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains_vertex(&self, index: u32) -> bool {
        self.vertices.contains(&index)
    }

    fn push_triangle(&mut self, triangle: GroupTriangle, seen: &mut HashSet<u32>) {
        for index in triangle.vertices {
            if seen.insert(index) {
                self.vertices.push(index);
            }
        }
        self.triangles.push(triangle);
    }
}

/// Unit normal of a triangle from its edge cross product.
///
/// Returns `None` for degenerate (zero-area) triangles.
pub fn triangle_normal(a: DVec3, b: DVec3, c: DVec3) -> Option<DVec3> {
    (b - a).cross(c - a).try_normalize()
}

/// Scalar triple product `a . (b x c)`
pub fn triple_product(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    a.dot(b.cross(c))
}

/// Whether `d` lies on the plane through `a`, `b`, `c`.
///
/// Exact test: the triple product of the three edge vectors must be zero.
pub fn is_coplanar(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> bool {
    triple_product(b - a, c - a, d - a) == 0.0
}

/// Groups triangles into flat faces
#[derive(Debug, Clone, Copy)]
pub struct FaceAnalyzer {
    scale: f64,
}

impl Default for FaceAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_NORMAL_DECIMALS)
    }
}

impl FaceAnalyzer {
    /// Analyzer comparing normals to `decimals` decimal digits.
    ///
    /// Precision beyond what an f64 carries is clamped.
    pub fn new(decimals: u32) -> Self {
        let decimals = decimals.min(MAX_NORMAL_DECIMALS);
        Self {
            scale: 10f64.powi(decimals as i32),
        }
    }

    /// Normal equality: every axis of the difference rounds to zero
    pub fn normals_match(&self, reference: DVec3, candidate: DVec3) -> bool {
        ((candidate - reference) * self.scale).round() == DVec3::ZERO
    }

    /// Collect every triangle whose world normal matches the pick normal.
    ///
    /// Fails with `NoFaceData` when the pick carries no face, and with
    /// `GeometryError` when the picked triangle references a vertex outside
    /// the buffer. Other triangles with bad indices or zero area are skipped.
    pub fn analyze(&self, pick: &PickResult, buffers: &MeshBuffers<'_>) -> Result<FaceGroup, KernelError> {
        let (fragment, face) = pick.face_data()?;
        // Resolves (and validates) the picked triangle
        buffers.world_triangle(face.vertices)?;

        let mut group = FaceGroup::empty(face.normal);
        let mut seen = HashSet::new();
        let mut skipped = 0usize;

        for vertices in buffers.triangles() {
            let world = match buffers.world_triangle(vertices) {
                Ok(world) => world,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };

            let Some(normal) = triangle_normal(world[0], world[1], world[2]) else {
                continue;
            };

            if self.normals_match(face.normal, normal) {
                group.push_triangle(GroupTriangle { vertices, world }, &mut seen);
            }
        }

        if skipped > 0 {
            warn!(
                "analyze: skipped {} triangles with out-of-range indices in fragment {:?}",
                skipped, fragment
            );
        }
        debug!(
            "analyze: fragment {:?} grouped {} of {} triangles ({} vertices)",
            fragment,
            group.triangles.len(),
            buffers.triangle_count(),
            group.vertices.len()
        );

        Ok(group)
    }

    /// Collect the vertices lying exactly on the picked triangle's plane.
    ///
    /// Triangles whose three corners all qualify are reported as the group's
    /// triangles.
    pub fn analyze_coplanar(
        &self,
        pick: &PickResult,
        buffers: &MeshBuffers<'_>,
    ) -> Result<FaceGroup, KernelError> {
        let (fragment, face) = pick.face_data()?;
        let vertices = coplanar_vertices(buffers, face.vertices)?;
        let members: HashSet<u32> = vertices.iter().copied().collect();

        let mut group = FaceGroup {
            normal: face.normal,
            triangles: Vec::new(),
            vertices,
        };

        for tri in buffers.triangles() {
            if tri.iter().all(|i| members.contains(i)) {
                let world = buffers.world_triangle(tri)?;
                group.triangles.push(GroupTriangle { vertices: tri, world });
            }
        }

        debug!(
            "analyze_coplanar: fragment {:?} has {} coplanar vertices",
            fragment,
            group.vertices.len()
        );

        Ok(group)
    }
}

/// Distinct vertices of the index buffer (first-seen order) that lie on the
/// plane of the `reference` triangle.
///
/// Coplanarity is affine invariant, so the test runs on stored positions.
pub fn coplanar_vertices(buffers: &MeshBuffers<'_>, reference: [u32; 3]) -> Result<Vec<u32>, KernelError> {
    let a = buffers.local_position(reference[0])?;
    let b = buffers.local_position(reference[1])?;
    let c = buffers.local_position(reference[2])?;

    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for &index in buffers.indices() {
        if !seen.insert(index) {
            continue;
        }
        let Ok(d) = buffers.local_position(index) else {
            continue;
        };
        if is_coplanar(a, b, c, d) {
            result.push(index);
        }
    }

    Ok(result)
}
