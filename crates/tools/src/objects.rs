//! Object manipulation: add, remove and drag custom objects.
//!
//! Every operation acts on top-level objects. A pick on any descendant is
//! resolved upward through parent links before anything is moved or removed.

use facet_config::{ConfigError, ToolConfig};
use geometry::{OwnedMesh, cast_ray};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ToolError;
use crate::host::{Host, InvalidateFlags};
use crate::scene::{ObjectId, ObjectTemplate, SceneGraph};

/// A custom object under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectHit {
    /// Node whose mesh was hit
    pub id: ObjectId,
    /// Its top-level ancestor
    pub root: ObjectId,
    pub distance: f64,
    pub point: DVec3,
}

/// An armed drag: pointer-down through pointer-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    /// Top-level object being dragged
    pub target: ObjectId,
    /// Pick point at pointer-down
    pub anchor: DVec3,
}

/// Owns the custom objects and the drag state machine
#[derive(Debug)]
pub struct ObjectController {
    scene: SceneGraph,
    last_hit: Option<DVec3>,
    drag: Option<DragSession>,
    box_size: DVec3,
    object_asset: String,
    max_depth: usize,
}

impl ObjectController {
    pub fn new(config: &ToolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scene: SceneGraph::new(),
            last_hit: None,
            drag: None,
            box_size: DVec3::from_array(config.box_size),
            object_asset: config.object_asset.clone(),
            max_depth: config.max_ancestor_depth,
        })
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn last_hit(&self) -> Option<DVec3> {
        self.last_hit
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Record the host hit point under the pointer. An empty pick clears it.
    pub fn track_hit(&mut self, host: &mut dyn Host, screen: DVec2) -> Option<DVec3> {
        self.last_hit = host.hit_test(screen).map(|pick| pick.point);
        self.last_hit
    }

    /// Nearest custom object under the pointer that the host geometry does
    /// not occlude. On equal distance the host geometry wins.
    pub fn pick_object(&self, host: &mut dyn Host, screen: DVec2) -> Result<Option<ObjectHit>, ToolError> {
        let ray = cast_ray(screen, &host.viewport(), &host.camera())?;

        let Some((id, hit)) = self.scene.raycast(&ray, self.max_depth) else {
            return Ok(None);
        };

        if let Some(occluder) = host.model_ray_distance(&ray) {
            if occluder <= hit.distance {
                debug!(
                    "pick_object: {:?} at {} hidden by host geometry at {}",
                    id, hit.distance, occluder
                );
                return Ok(None);
            }
        }

        let root = self.scene.top_level_ancestor(id, self.max_depth)?;
        Ok(Some(ObjectHit {
            id,
            root,
            distance: hit.distance,
            point: hit.point,
        }))
    }

    /// Arm a drag on the object under the pointer. Returns whether a drag
    /// was armed.
    pub fn begin_drag(&mut self, host: &mut dyn Host, screen: DVec2) -> Result<bool, ToolError> {
        self.drag = None;

        let Some(hit) = self.pick_object(host, screen)? else {
            return Ok(false);
        };

        info!("Drag armed on {:?} (picked {:?})", hit.root, hit.id);
        self.drag = Some(DragSession {
            target: hit.root,
            anchor: hit.point,
        });
        Ok(true)
    }

    /// Move the drag target to the fresh pick point under the pointer.
    ///
    /// Positioning is absolute. Returns the new position, or `None` when no
    /// drag is armed or the host pick is empty.
    pub fn drag_to(&mut self, host: &mut dyn Host, screen: DVec2) -> Result<Option<DVec3>, ToolError> {
        let Some(session) = self.drag else {
            return Ok(None);
        };

        let Some(pick) = host.hit_test(screen) else {
            debug!("drag_to: empty pick, {:?} stays put", session.target);
            return Ok(None);
        };

        self.scene.set_position(session.target, pick.point)?;
        self.last_hit = Some(pick.point);
        host.object_moved(session.target, pick.point);
        host.scene_invalidate(InvalidateFlags::SCENE);

        debug!("drag_to: {:?} -> {:?}", session.target, pick.point);
        Ok(Some(pick.point))
    }

    /// Release the drag session, if any
    pub fn end_drag(&mut self) -> Option<DragSession> {
        let session = self.drag.take();
        if let Some(session) = &session {
            debug!("Drag released on {:?}", session.target);
        }
        session
    }

    /// Add the box primitive at the last hit point, seated on the surface
    pub fn add_box(&mut self, host: &mut dyn Host) -> Option<ObjectId> {
        let Some(point) = self.last_hit else {
            debug!("add_box: no hit point recorded");
            return None;
        };

        let mesh = OwnedMesh::cuboid(self.box_size).translated(DVec3::new(0.0, 0.0, self.box_size.z / 2.0));
        Some(self.add(host, ObjectTemplate::with_mesh("box", mesh), point))
    }

    /// Load the configured asset and add it at the last hit point
    pub fn add_object(&mut self, host: &mut dyn Host) -> Option<ObjectId> {
        let Some(point) = self.last_hit else {
            debug!("add_object: no hit point recorded");
            return None;
        };

        let Some(template) = host.load_object(&self.object_asset) else {
            warn!("add_object: asset {:?} unavailable", self.object_asset);
            return None;
        };

        Some(self.add(host, template, point))
    }

    fn add(&mut self, host: &mut dyn Host, template: ObjectTemplate, point: DVec3) -> ObjectId {
        let name = template.name.clone();
        let id = self.scene.insert(template, point);
        host.scene_add(&self.scene, id);
        host.scene_invalidate(InvalidateFlags::SCENE);

        info!("Added {:?} ({}) at {:?}", id, name, point);
        id
    }

    /// Detach the top-level object under the pointer
    pub fn remove_at(&mut self, host: &mut dyn Host, screen: DVec2) -> Result<Option<ObjectId>, ToolError> {
        let Some(hit) = self.pick_object(host, screen)? else {
            return Ok(None);
        };

        let removed = self.scene.detach(hit.root)?;
        if self.drag.is_some_and(|d| removed.contains(&d.target)) {
            self.drag = None;
        }
        host.scene_remove(hit.root);
        host.scene_invalidate(InvalidateFlags::SCENE);

        info!(
            "Removed {:?} with {} nodes (picked {:?})",
            hit.root,
            removed.len(),
            hit.id
        );
        Ok(Some(hit.root))
    }
}
