//! Ray-mesh intersection for picking kernel-owned objects.
//!
//! Uses the Moller-Trumbore ray-triangle test. Meshes are tested in world
//! space so hit distances compare directly against the host's own pick
//! distances.

use glam::{DMat4, DVec3};

use crate::buffers::OwnedMesh;
use crate::types::Ray;

/// Epsilon for floating point comparisons in ray intersection
const EPSILON: f64 = 1e-9;

/// Result of a ray-triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Distance along the ray to the intersection point
    pub t: f64,
    /// Barycentric coordinate u (weight for vertex 1)
    pub u: f64,
    /// Barycentric coordinate v (weight for vertex 2)
    pub v: f64,
}

/// Closest intersection of a ray with a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// Distance along the ray
    pub distance: f64,
    /// World-space hit point
    pub point: DVec3,
    /// Triangle index (offset / 3 in the index buffer)
    pub triangle: usize,
}

/// Moller-Trumbore ray-triangle intersection algorithm.
///
/// Both faces of the triangle are hit. Returns `None` when the ray is
/// parallel to the triangle, misses it, or the hit lies behind the origin.
pub fn ray_triangle_intersection(
    ray_origin: DVec3,
    ray_dir: DVec3,
    v0: DVec3,
    v1: DVec3,
    v2: DVec3,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let pvec = ray_dir.cross(edge2);
    let det = edge1.dot(pvec);

    // Ray lies in the plane of the triangle or misses
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = ray_origin - v0;

    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray_dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// Cast a ray against a mesh placed by `world` and return the closest hit.
pub fn raycast_mesh(ray: &Ray, mesh: &OwnedMesh, world: DMat4) -> Option<MeshHit> {
    let corner = |index: u32| {
        let base = index as usize * 3;
        let p = mesh.positions.get(base..base + 3)?;
        Some(world.transform_point3(DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64)))
    };

    let mut closest: Option<MeshHit> = None;

    // Brute force over all triangles; custom objects are small
    for (tri_index, tri) in mesh.indices.chunks_exact(3).enumerate() {
        let (Some(v0), Some(v1), Some(v2)) = (corner(tri[0]), corner(tri[1]), corner(tri[2])) else {
            continue;
        };

        if let Some(hit) = ray_triangle_intersection(ray.origin, ray.direction, v0, v1, v2) {
            let dominated = closest.is_some_and(|prev| hit.t >= prev.distance);
            if !dominated {
                closest = Some(MeshHit {
                    distance: hit.t,
                    point: ray.at(hit.t),
                    triangle: tri_index,
                });
            }
        }
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> (DVec3, DVec3, DVec3) {
        (
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_ray_triangle_hit() {
        let (v0, v1, v2) = unit_triangle();
        let origin = DVec3::new(0.25, 0.25, 1.0);
        let dir = DVec3::new(0.0, 0.0, -1.0);

        let hit = ray_triangle_intersection(origin, dir, v0, v1, v2).unwrap();
        assert!((hit.t - 1.0).abs() < EPSILON);
        assert!((hit.u - 0.25).abs() < EPSILON);
        assert!((hit.v - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_ray_triangle_miss() {
        let (v0, v1, v2) = unit_triangle();
        let origin = DVec3::new(2.0, 2.0, 1.0);
        let dir = DVec3::new(0.0, 0.0, -1.0);
        assert!(ray_triangle_intersection(origin, dir, v0, v1, v2).is_none());
    }

    #[test]
    fn test_ray_triangle_behind() {
        let (v0, v1, v2) = unit_triangle();
        let origin = DVec3::new(0.25, 0.25, 1.0);
        let dir = DVec3::new(0.0, 0.0, 1.0);
        assert!(ray_triangle_intersection(origin, dir, v0, v1, v2).is_none());
    }

    #[test]
    fn test_raycast_mesh_returns_nearest_face() {
        let mesh = OwnedMesh::cuboid(DVec3::splat(2.0));
        let world = DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0));
        let ray = Ray::new(DVec3::new(5.2, 0.3, 10.0), DVec3::NEG_Z);

        let hit = raycast_mesh(&ray, &mesh, world).unwrap();
        // Top face of the box sits at z = 1
        assert!((hit.distance - 9.0).abs() < EPSILON);
        assert!((hit.point - DVec3::new(5.2, 0.3, 1.0)).length() < EPSILON);
        assert!(hit.triangle == 2 || hit.triangle == 3);
    }

    #[test]
    fn test_raycast_mesh_miss() {
        let mesh = OwnedMesh::cuboid(DVec3::splat(2.0));
        let ray = Ray::new(DVec3::new(3.0, 3.0, 10.0), DVec3::NEG_Z);
        assert!(raycast_mesh(&ray, &mesh, DMat4::IDENTITY).is_none());
    }
}
