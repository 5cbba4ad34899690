//! Custom objects added by the tools.
//!
//! The scene graph is an arena keyed by [`ObjectId`]. Parent links are plain
//! ids: a child never owns its parent, and detaching a top-level object drops
//! its whole subtree. Nodes without a parent are top-level, i.e. direct
//! children of the host scene.

use std::collections::HashMap;

use geometry::{MeshHit, OwnedMesh, Ray, raycast_mesh};
use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ToolError;

/// Handle to a custom scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// A node of the custom scene graph
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: ObjectId,
    pub name: String,
    /// Non-owning link to the parent (None for top-level objects)
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    /// Translation relative to the parent
    pub position: DVec3,
    /// Geometry in node-local space
    pub mesh: Option<OwnedMesh>,
}

/// Description of an object tree to add to the scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectTemplate {
    pub name: String,
    /// Translation relative to the parent
    pub position: DVec3,
    pub mesh: Option<OwnedMesh>,
    pub children: Vec<ObjectTemplate>,
}

impl ObjectTemplate {
    /// Single-mesh object
    pub fn with_mesh(name: impl Into<String>, mesh: OwnedMesh) -> Self {
        Self {
            name: name.into(),
            mesh: Some(mesh),
            ..Default::default()
        }
    }
}

/// Arena of custom objects
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: HashMap<ObjectId, SceneNode>,
    roots: Vec<ObjectId>,
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Top-level objects in insertion order
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    fn allocate_id(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId(self.next_id)
    }

    /// Add a template tree as a new top-level object at `position`.
    ///
    /// The template's own position is replaced; child positions are kept.
    pub fn insert(&mut self, template: ObjectTemplate, position: DVec3) -> ObjectId {
        let root = self.allocate_id();
        let mut pending = vec![(root, None, template)];

        while let Some((id, parent, template)) = pending.pop() {
            let mut children = Vec::with_capacity(template.children.len());
            for child in template.children {
                let child_id = self.allocate_id();
                children.push(child_id);
                pending.push((child_id, Some(id), child));
            }

            self.nodes.insert(
                id,
                SceneNode {
                    id,
                    name: template.name,
                    parent,
                    children,
                    position: if parent.is_none() { position } else { template.position },
                    mesh: template.mesh,
                },
            );
        }

        self.roots.push(root);
        debug!("scene: inserted object {:?} at {:?}", root, position);
        root
    }

    /// Resolve the top-level object that contains `id`.
    ///
    /// Follows parent links upward until a node has no further parent in
    /// this graph, giving up after `max_depth` links.
    pub fn top_level_ancestor(&self, id: ObjectId, max_depth: usize) -> Result<ObjectId, ToolError> {
        if !self.contains(id) {
            return Err(ToolError::UnknownObject(id));
        }

        let mut current = id;
        for _ in 0..max_depth {
            match self.parent(current) {
                Some(parent) if self.contains(parent) => current = parent,
                _ => return Ok(current),
            }
        }

        Err(ToolError::AncestorDepthExceeded {
            id,
            depth: max_depth,
        })
    }

    /// World transform of a node (accumulated parent translations)
    pub fn world_matrix(&self, id: ObjectId, max_depth: usize) -> Result<DMat4, ToolError> {
        let mut node = self.nodes.get(&id).ok_or(ToolError::UnknownObject(id))?;
        let mut translation = node.position;

        for _ in 0..max_depth {
            match node.parent.and_then(|p| self.nodes.get(&p)) {
                Some(parent) => {
                    translation += parent.position;
                    node = parent;
                }
                None => return Ok(DMat4::from_translation(translation)),
            }
        }

        Err(ToolError::AncestorDepthExceeded {
            id,
            depth: max_depth,
        })
    }

    /// Set a node's position relative to its parent
    pub fn set_position(&mut self, id: ObjectId, position: DVec3) -> Result<(), ToolError> {
        let node = self.nodes.get_mut(&id).ok_or(ToolError::UnknownObject(id))?;
        node.position = position;
        Ok(())
    }

    /// Remove a node and its whole subtree. Returns the removed ids.
    pub fn detach(&mut self, id: ObjectId) -> Result<Vec<ObjectId>, ToolError> {
        let node = self.nodes.get(&id).ok_or(ToolError::UnknownObject(id))?;

        match node.parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                pending.extend(node.children);
                removed.push(current);
            }
        }

        debug!("scene: detached {:?} ({} nodes)", id, removed.len());
        Ok(removed)
    }

    /// Nearest intersection of `ray` with any mesh in the graph
    pub fn raycast(&self, ray: &Ray, max_depth: usize) -> Option<(ObjectId, MeshHit)> {
        let mut ids: Vec<&ObjectId> = self.nodes.keys().collect();
        // Deterministic tie order
        ids.sort();

        let mut closest: Option<(ObjectId, MeshHit)> = None;
        for &id in ids {
            let Some(mesh) = self.nodes.get(&id).and_then(|n| n.mesh.as_ref()) else {
                continue;
            };
            let Ok(world) = self.world_matrix(id, max_depth) else {
                continue;
            };
            if let Some(hit) = raycast_mesh(ray, mesh, world) {
                if closest.is_none_or(|(_, prev)| hit.distance < prev.distance) {
                    closest = Some((id, hit));
                }
            }
        }

        closest
    }
}
