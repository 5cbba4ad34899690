//! Contract between the tools and the host viewing runtime.
//!
//! The host owns rendering, the authoritative scene and the fragment
//! buffers. The tools only ever see a fragment's buffers through a scoped
//! [`MeshBuffers`] view handed to a closure, so no reference to host geometry
//! outlives a single edit call.

use geometry::{Camera, FragmentId, KernelError, MeshBuffers, Overlay, PickResult, Ray, Viewport};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::scene::{ObjectId, ObjectTemplate, SceneGraph};

/// Handle to an overlay attached by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

/// What the host should refresh after a mutating callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvalidateFlags {
    /// Scene graph changed (objects added, removed or moved)
    pub scene: bool,
    /// Vertex buffers changed and need re-upload
    pub geometry: bool,
    /// Overlay layer changed
    pub overlay: bool,
}

impl InvalidateFlags {
    pub const SCENE: Self = Self {
        scene: true,
        geometry: false,
        overlay: false,
    };
    pub const GEOMETRY: Self = Self {
        scene: false,
        geometry: true,
        overlay: false,
    };
    pub const OVERLAY: Self = Self {
        scene: false,
        geometry: false,
        overlay: true,
    };
}

/// Kind of pointer callback delivered by the host dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerEventKind {
    Move,
    Down,
    Up,
    Click,
}

/// Pointer sample in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: DVec2,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
        }
    }
}

/// Services the host runtime provides to the tools
pub trait Host {
    /// Current viewing camera
    fn camera(&self) -> Camera;

    /// Screen rectangle of the canvas
    fn viewport(&self) -> Viewport;

    /// Authoritative pick against the full scene. `None` is an empty result.
    fn hit_test(&mut self, screen: DVec2) -> Option<PickResult>;

    /// Distance to the host's own opaque geometry along `ray`, if any
    fn model_ray_distance(&mut self, ray: &Ray) -> Option<f64>;

    /// Run `edit` against a scoped view of a fragment's buffers.
    ///
    /// The host re-uploads the vertex buffer if the view reports itself dirty
    /// once `edit` returns.
    fn with_render_proxy(
        &mut self,
        fragment: FragmentId,
        edit: &mut dyn FnMut(&mut MeshBuffers<'_>),
    ) -> Result<(), ToolError>;

    /// A new top-level custom object was added to `scene`
    fn scene_add(&mut self, scene: &SceneGraph, root: ObjectId);

    /// A top-level custom object and its subtree were removed
    fn scene_remove(&mut self, root: ObjectId);

    /// A top-level custom object was moved
    fn object_moved(&mut self, id: ObjectId, position: DVec3);

    /// Attach a visual-only overlay
    fn overlay_attach(&mut self, overlay: &Overlay) -> OverlayId;

    /// Detach a previously attached overlay
    fn overlay_detach(&mut self, overlay: OverlayId);

    /// Load an external object asset. `None` when unavailable.
    fn load_object(&mut self, asset: &str) -> Option<ObjectTemplate>;

    /// Signal the end of a mutating callback
    fn scene_invalidate(&mut self, flags: InvalidateFlags);
}

/// Run `f` on a fragment's buffers and hand its result back.
pub fn edit_fragment<T>(
    host: &mut dyn Host,
    fragment: FragmentId,
    f: impl FnOnce(&mut MeshBuffers<'_>) -> Result<T, KernelError>,
) -> Result<T, ToolError> {
    let mut f = Some(f);
    let mut outcome = None;

    host.with_render_proxy(fragment, &mut |buffers: &mut MeshBuffers<'_>| {
        if let Some(f) = f.take() {
            outcome = Some(f(buffers));
        }
    })?;

    match outcome {
        Some(result) => Ok(result?),
        None => Err(ToolError::UnknownFragment(fragment)),
    }
}
