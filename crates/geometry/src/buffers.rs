//! Vertex/index buffer views.
//!
//! [`MeshBuffers`] is the borrowed view the kernel works on for the duration
//! of one edit call. The host keeps ownership of the storage; the view only
//! records whether it wrote to the positions so the host knows to re-upload.
//!
//! [`OwnedMesh`] is an indexed triangle mesh owned by the kernel itself, used
//! for primitives the tools add to the scene.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::KernelError;

/// Minimum number of scalars per vertex record (x, y, z)
pub const MIN_STRIDE: usize = 3;

/// Mutable view over a fragment's raw geometry
#[derive(Debug)]
pub struct MeshBuffers<'a> {
    indices: &'a [u32],
    positions: &'a mut [f32],
    stride: usize,
    world: DMat4,
    needs_update: bool,
}

impl<'a> MeshBuffers<'a> {
    /// Wrap host buffers. The index count must be a multiple of 3 and the
    /// stride at least 3.
    pub fn new(
        indices: &'a [u32],
        positions: &'a mut [f32],
        stride: usize,
        world: DMat4,
    ) -> Result<Self, KernelError> {
        if stride < MIN_STRIDE {
            return Err(KernelError::InvalidBuffer(format!(
                "stride {} is smaller than {}",
                stride, MIN_STRIDE
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(KernelError::InvalidBuffer(format!(
                "index count {} not divisible by 3",
                indices.len()
            )));
        }
        Ok(Self {
            indices,
            positions,
            stride,
            world,
            needs_update: false,
        })
    }

    /// Wrap a raw byte vertex buffer as f32 positions
    pub fn from_bytes(
        indices: &'a [u32],
        bytes: &'a mut [u8],
        stride: usize,
        world: DMat4,
    ) -> Result<Self, KernelError> {
        let positions: &mut [f32] = bytemuck::try_cast_slice_mut(bytes)
            .map_err(|e| KernelError::BufferCast(e.to_string()))?;
        Self::new(indices, positions, stride, world)
    }

    pub fn indices(&self) -> &[u32] {
        self.indices
    }

    pub fn positions(&self) -> &[f32] {
        self.positions
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Fragment-to-world transform
    pub fn world(&self) -> DMat4 {
        self.world
    }

    /// Number of whole vertex records in the position array
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / self.stride
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex indices of triangle `tri_index`
    pub fn triangle(&self, tri_index: usize) -> Option<[u32; 3]> {
        let base = tri_index * 3;
        let tri = self.indices.get(base..base + 3)?;
        Some([tri[0], tri[1], tri[2]])
    }

    /// Iterate triangles in index-buffer order
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    fn check_index(&self, index: u32) -> Result<usize, KernelError> {
        let vertex_count = self.vertex_count();
        if (index as usize) < vertex_count {
            Ok(index as usize * self.stride)
        } else {
            Err(KernelError::GeometryError {
                index,
                vertex_count,
            })
        }
    }

    /// Stored (fragment-space) position of a vertex
    pub fn local_position(&self, index: u32) -> Result<DVec3, KernelError> {
        let base = self.check_index(index)?;
        Ok(DVec3::new(
            self.positions[base] as f64,
            self.positions[base + 1] as f64,
            self.positions[base + 2] as f64,
        ))
    }

    /// World-space position of a vertex
    pub fn world_position(&self, index: u32) -> Result<DVec3, KernelError> {
        Ok(self.world.transform_point3(self.local_position(index)?))
    }

    /// World-space corners of a triangle
    pub fn world_triangle(&self, vertices: [u32; 3]) -> Result<[DVec3; 3], KernelError> {
        Ok([
            self.world_position(vertices[0])?,
            self.world_position(vertices[1])?,
            self.world_position(vertices[2])?,
        ])
    }

    /// Add `delta` to a stored vertex position
    pub fn offset_vertex(&mut self, index: u32, delta: DVec3) -> Result<(), KernelError> {
        let base = self.check_index(index)?;
        let slot = &mut self.positions[base..base + 3];
        slot[0] = (slot[0] as f64 + delta.x) as f32;
        slot[1] = (slot[1] as f64 + delta.y) as f32;
        slot[2] = (slot[2] as f64 + delta.z) as f32;
        Ok(())
    }

    /// Flag the vertex buffer for re-upload
    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
    }

    /// Whether positions were written through this view
    pub fn is_dirty(&self) -> bool {
        self.needs_update
    }
}

/// Indexed triangle mesh owned by the kernel (stride 3)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnedMesh {
    pub positions: Vec<f32>,
    pub indices: Vec<u32>,
}

impl OwnedMesh {
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Result<Self, KernelError> {
        if positions.len() % MIN_STRIDE != 0 {
            return Err(KernelError::InvalidBuffer(format!(
                "position count {} not divisible by 3",
                positions.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(KernelError::InvalidBuffer(format!(
                "index count {} not divisible by 3",
                indices.len()
            )));
        }
        let vertex_count = positions.len() / MIN_STRIDE;
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(KernelError::GeometryError {
                index,
                vertex_count,
            });
        }
        Ok(Self { positions, indices })
    }

    /// Axis-aligned box centered on the origin, 12 outward-facing triangles
    pub fn cuboid(size: DVec3) -> Self {
        let h = size * 0.5;
        let corners = [
            DVec3::new(-h.x, -h.y, -h.z),
            DVec3::new(h.x, -h.y, -h.z),
            DVec3::new(h.x, h.y, -h.z),
            DVec3::new(-h.x, h.y, -h.z),
            DVec3::new(-h.x, -h.y, h.z),
            DVec3::new(h.x, -h.y, h.z),
            DVec3::new(h.x, h.y, h.z),
            DVec3::new(-h.x, h.y, h.z),
        ];
        let positions = corners
            .iter()
            .flat_map(|c| [c.x as f32, c.y as f32, c.z as f32])
            .collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 3, 2,  0, 2, 1, // -Z
            4, 5, 6,  4, 6, 7, // +Z
            0, 1, 5,  0, 5, 4, // -Y
            3, 7, 6,  3, 6, 2, // +Y
            0, 4, 7,  0, 7, 3, // -X
            1, 2, 6,  1, 6, 5, // +X
        ];

        Self { positions, indices }
    }

    /// Copy of this mesh with every vertex moved by `offset`
    pub fn translated(&self, offset: DVec3) -> Self {
        let positions = self
            .positions
            .chunks_exact(3)
            .flat_map(|p| {
                [
                    (p[0] as f64 + offset.x) as f32,
                    (p[1] as f64 + offset.y) as f32,
                    (p[2] as f64 + offset.z) as f32,
                ]
            })
            .collect();
        Self {
            positions,
            indices: self.indices.clone(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / MIN_STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Borrow this mesh as a buffer view placed by `world`
    pub fn as_buffers(&mut self, world: DMat4) -> Result<MeshBuffers<'_>, KernelError> {
        MeshBuffers::new(&self.indices, &mut self.positions, MIN_STRIDE, world)
    }

    /// Build from a Bevy mesh with float3 positions and U16/U32 indices
    #[cfg(feature = "bevy")]
    pub fn from_bevy_mesh(mesh: &bevy::prelude::Mesh) -> Result<Self, KernelError> {
        use bevy::mesh::Indices;
        use bevy::prelude::Mesh;

        let positions: Vec<f32> = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|attr| attr.as_float3())
            .ok_or_else(|| KernelError::InvalidBuffer("mesh has no position attribute".to_string()))?
            .iter()
            .flatten()
            .copied()
            .collect();

        let indices: Vec<u32> = match mesh.indices() {
            Some(Indices::U16(idx)) => idx.iter().map(|&i| i as u32).collect(),
            Some(Indices::U32(idx)) => idx.to_vec(),
            None => return Err(KernelError::InvalidBuffer("mesh has no indices".to_string())),
        };

        Self::new(positions, indices)
    }
}
