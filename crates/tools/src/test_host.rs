//! Recording host used by the tool tests.
//!
//! Orthographic camera looking down -Z at a ground plane (z = 0), with an
//! 800x800 viewport covering world x, y in [-4, 4].

use std::collections::HashMap;

use geometry::{
    Camera, FaceHit, FragmentId, MeshBuffers, Overlay, PickResult, Ray, Viewport, cast_ray,
};
use glam::{DMat4, DVec2, DVec3};

use crate::error::ToolError;
use crate::host::{Host, InvalidateFlags, OverlayId};
use crate::scene::{ObjectId, ObjectTemplate, SceneGraph};

const VIEWPORT_SIZE: f64 = 800.0;
const HALF_EXTENT: f64 = 4.0;

/// Screen position that looks straight down at world (x, y)
pub(crate) fn screen_at(x: f64, y: f64) -> DVec2 {
    DVec2::new(
        (x / HALF_EXTENT + 1.0) * 0.5 * VIEWPORT_SIZE,
        (1.0 - y / HALF_EXTENT) * 0.5 * VIEWPORT_SIZE,
    )
}

pub(crate) fn face_pick(fragment: FragmentId, normal: DVec3, vertices: [u32; 3]) -> PickResult {
    PickResult {
        point: DVec3::ZERO,
        distance: 1.0,
        fragment: Some(fragment),
        face: Some(FaceHit { normal, vertices }),
    }
}

/// Host-side buffers of one fragment
pub(crate) struct TestFragment {
    pub indices: Vec<u32>,
    pub positions: Vec<f32>,
    pub stride: usize,
    pub world: DMat4,
    /// Re-uploads after a dirty edit
    pub uploads: usize,
}

impl TestFragment {
    fn new(indices: Vec<u32>, positions: Vec<f32>, world: DMat4) -> Self {
        Self {
            indices,
            positions,
            stride: 3,
            world,
            uploads: 0,
        }
    }

    /// One triangle in the z = 0 plane facing +Z
    pub fn single_triangle(world: DMat4) -> Self {
        Self::new(vec![0, 1, 2], vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], world)
    }

    /// Unit square in the z = 0 plane, two triangles sharing an edge
    pub fn quad(world: DMat4) -> Self {
        #[rustfmt::skip]
        let positions = vec![
            0.0, 0.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            1.0, 1.0, 0.0,
        ];
        Self::new(vec![0, 1, 2, 1, 3, 2], positions, world)
    }
}

pub(crate) struct MockHost {
    pub camera: Camera,
    pub viewport: Viewport,
    /// Fixed pick result. When unset, picks hit the ground plane.
    pub pick: Option<PickResult>,
    pub ground: bool,
    pub model_distance: Option<f64>,
    pub fragments: HashMap<FragmentId, TestFragment>,
    pub assets: HashMap<String, ObjectTemplate>,
    pub added: Vec<ObjectId>,
    pub removed: Vec<ObjectId>,
    pub moved: Vec<(ObjectId, DVec3)>,
    /// Currently attached overlays
    pub overlays: HashMap<OverlayId, Overlay>,
    /// Total attach calls
    pub attached: usize,
    pub invalidations: Vec<InvalidateFlags>,
    next_overlay: u64,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            camera: Camera::orthographic(
                DVec3::new(0.0, 0.0, 100.0),
                DVec3::ZERO,
                DVec3::Y,
                HALF_EXTENT,
                HALF_EXTENT,
                1.0,
                1000.0,
            ),
            viewport: Viewport::from_size(VIEWPORT_SIZE, VIEWPORT_SIZE),
            pick: None,
            ground: true,
            model_distance: None,
            fragments: HashMap::new(),
            assets: HashMap::new(),
            added: Vec::new(),
            removed: Vec::new(),
            moved: Vec::new(),
            overlays: HashMap::new(),
            attached: 0,
            invalidations: Vec::new(),
            next_overlay: 0,
        }
    }
}

impl Host for MockHost {
    fn camera(&self) -> Camera {
        self.camera
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn hit_test(&mut self, screen: DVec2) -> Option<PickResult> {
        if let Some(pick) = self.pick {
            return Some(pick);
        }
        if !self.ground {
            return None;
        }

        let ray = cast_ray(screen, &self.viewport, &self.camera).ok()?;
        if ray.direction.z.abs() < 1e-12 {
            return None;
        }
        let t = -ray.origin.z / ray.direction.z;
        (t >= 0.0).then(|| PickResult::point_only(ray.at(t), t))
    }

    fn model_ray_distance(&mut self, _ray: &Ray) -> Option<f64> {
        self.model_distance
    }

    fn with_render_proxy(
        &mut self,
        fragment: FragmentId,
        edit: &mut dyn FnMut(&mut MeshBuffers<'_>),
    ) -> Result<(), ToolError> {
        let target = self
            .fragments
            .get_mut(&fragment)
            .ok_or(ToolError::UnknownFragment(fragment))?;

        let mut buffers = MeshBuffers::new(&target.indices, &mut target.positions, target.stride, target.world)?;
        edit(&mut buffers);
        if buffers.is_dirty() {
            target.uploads += 1;
        }
        Ok(())
    }

    fn scene_add(&mut self, scene: &SceneGraph, root: ObjectId) {
        assert!(scene.contains(root));
        self.added.push(root);
    }

    fn scene_remove(&mut self, root: ObjectId) {
        self.removed.push(root);
    }

    fn object_moved(&mut self, id: ObjectId, position: DVec3) {
        self.moved.push((id, position));
    }

    fn overlay_attach(&mut self, overlay: &Overlay) -> OverlayId {
        self.next_overlay += 1;
        self.attached += 1;
        let id = OverlayId(self.next_overlay);
        self.overlays.insert(id, overlay.clone());
        id
    }

    fn overlay_detach(&mut self, overlay: OverlayId) {
        self.overlays.remove(&overlay);
    }

    fn load_object(&mut self, asset: &str) -> Option<ObjectTemplate> {
        self.assets.get(asset).cloned()
    }

    fn scene_invalidate(&mut self, flags: InvalidateFlags) {
        self.invalidations.push(flags);
    }
}
