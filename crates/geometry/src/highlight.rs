//! Highlight overlay for a face group.
//!
//! The overlay is a visual-only copy of the group's triangles, lifted off the
//! surface along the face normal so it does not z-fight with the mesh below.

use facet_config::{DEFAULT_HIGHLIGHT_COLOR, DEFAULT_HIGHLIGHT_OPACITY};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::topology::FaceGroup;

/// Color and opacity of the overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    /// 0xRRGGBB
    pub color: u32,
    pub opacity: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_HIGHLIGHT_COLOR,
            opacity: DEFAULT_HIGHLIGHT_OPACITY,
        }
    }
}

impl OverlayStyle {
    /// Color as linear [r, g, b, a] floats
    pub fn rgba(&self) -> [f32; 4] {
        [
            ((self.color >> 16) & 0xff) as f32 / 255.0,
            ((self.color >> 8) & 0xff) as f32 / 255.0,
            (self.color & 0xff) as f32 / 255.0,
            self.opacity,
        ]
    }
}

/// Transient triangle set rendered over the highlighted face
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// World-space triangles, already offset
    pub triangles: Vec<[DVec3; 3]>,
    pub normal: DVec3,
    pub style: OverlayStyle,
}

impl Overlay {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Flat f32 positions (x, y, z per corner), ready for upload
    pub fn vertex_data(&self) -> Vec<f32> {
        self.triangles
            .iter()
            .flatten()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Vertex data as raw bytes
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.vertex_data()).to_vec()
    }
}

/// Build the overlay for `group`, or `None` when the group is empty.
pub fn build_overlay(group: &FaceGroup, normal: DVec3, offset: f64, style: OverlayStyle) -> Option<Overlay> {
    if group.triangles().is_empty() {
        return None;
    }

    let lift = normal * offset;
    let triangles = group
        .triangles()
        .iter()
        .map(|t| [t.world[0] + lift, t.world[1] + lift, t.world[2] + lift])
        .collect();

    Some(Overlay {
        triangles,
        normal,
        style,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::MeshBuffers;
    use crate::topology::FaceAnalyzer;
    use crate::types::{FaceHit, FragmentId, PickResult};
    use glam::DMat4;

    #[test]
    fn test_overlay_offsets_group_triangles() {
        let indices = vec![0, 1, 2, 1, 3, 2, 0, 4, 1];
        #[rustfmt::skip]
        let mut positions = vec![
            0.0, 0.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            1.0, 1.0, 0.0,
            0.5, 0.0, -1.0,
        ];
        let world = DMat4::from_translation(DVec3::new(0.0, 0.0, 3.0));
        let buffers = MeshBuffers::new(&indices, &mut positions, 3, world).unwrap();
        let pick = PickResult {
            point: DVec3::new(0.2, 0.2, 3.0),
            distance: 4.0,
            fragment: Some(FragmentId(1)),
            face: Some(FaceHit {
                normal: DVec3::Z,
                vertices: [0, 1, 2],
            }),
        };
        let group = FaceAnalyzer::default().analyze(&pick, &buffers).unwrap();

        let overlay = build_overlay(&group, DVec3::Z, 5.0, OverlayStyle::default()).unwrap();
        assert_eq!(overlay.triangle_count(), 2);
        for tri in &overlay.triangles {
            for corner in tri {
                assert_eq!(corner.z, 8.0);
            }
        }
        assert_eq!(overlay.vertex_data().len(), 18);
        assert_eq!(overlay.vertex_bytes().len(), 72);
    }

    #[test]
    fn test_empty_group_has_no_overlay() {
        let group = FaceGroup::empty(DVec3::Z);
        assert!(build_overlay(&group, DVec3::Z, 5.0, OverlayStyle::default()).is_none());
    }

    #[test]
    fn test_style_rgba() {
        let style = OverlayStyle {
            color: 0xff8000,
            opacity: 0.5,
        };
        let [r, g, b, a] = style.rgba();
        assert_eq!(r, 1.0);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 0.0);
        assert_eq!(a, 0.5);
    }
}
