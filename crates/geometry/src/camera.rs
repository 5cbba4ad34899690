//! Ray caster: screen position + camera description -> world-space ray.
//!
//! Screen points are first normalized against the viewport rectangle into
//! normalized device coordinates ([-1, 1] on both axes, Y up), then
//! unprojected through the inverse projection and the camera world matrix.

use glam::{DMat4, DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::KernelError;
use crate::types::Ray;

/// NDC depth used to pick a point on a perspective pick ray
const PERSPECTIVE_UNPROJECT_DEPTH: f64 = 0.5;

/// NDC depth used for orthographic ray origins (the near plane)
const ORTHOGRAPHIC_UNPROJECT_DEPTH: f64 = -1.0;

/// Screen rectangle of the canvas the pointer lives in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Viewport anchored at the screen origin
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    fn check(&self) -> Result<(), KernelError> {
        if self.width == 0.0 || self.height == 0.0 || !self.width.is_finite() || !self.height.is_finite() {
            return Err(KernelError::DegenerateViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Map a screen point into the viewport's unit rectangle ([0, 1], Y down)
    pub fn normalize(&self, screen: DVec2) -> Result<DVec2, KernelError> {
        self.check()?;
        Ok(DVec2::new(
            (screen.x - self.left) / self.width,
            (screen.y - self.top) / self.height,
        ))
    }

    /// Map a screen point into normalized device coordinates ([-1, 1], Y up)
    pub fn to_ndc(&self, screen: DVec2) -> Result<DVec2, KernelError> {
        let unit = self.normalize(screen)?;
        Ok(DVec2::new(unit.x * 2.0 - 1.0, -unit.y * 2.0 + 1.0))
    }
}

/// Projection kind of the viewing camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionKind {
    Perspective,
    Orthographic,
}

/// Camera description supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub projection: ProjectionKind,
    /// World-space eye position
    pub position: DVec3,
    /// Camera-to-world transform
    pub world: DMat4,
    /// View-to-clip transform (OpenGL depth convention, NDC z in [-1, 1])
    pub projection_matrix: DMat4,
}

impl Camera {
    /// Perspective camera at `eye` looking at `target`
    pub fn perspective(
        eye: DVec3,
        target: DVec3,
        up: DVec3,
        fov_y_radians: f64,
        aspect: f64,
        near: f64,
        far: f64,
    ) -> Self {
        Self {
            projection: ProjectionKind::Perspective,
            position: eye,
            world: DMat4::look_at_rh(eye, target, up).inverse(),
            projection_matrix: DMat4::perspective_rh_gl(fov_y_radians, aspect, near, far),
        }
    }

    /// Orthographic camera at `eye` looking at `target`, with a view volume
    /// of `half_width` x `half_height` around the view axis
    pub fn orthographic(
        eye: DVec3,
        target: DVec3,
        up: DVec3,
        half_width: f64,
        half_height: f64,
        near: f64,
        far: f64,
    ) -> Self {
        Self {
            projection: ProjectionKind::Orthographic,
            position: eye,
            world: DMat4::look_at_rh(eye, target, up).inverse(),
            projection_matrix: DMat4::orthographic_rh_gl(
                -half_width,
                half_width,
                -half_height,
                half_height,
                near,
                far,
            ),
        }
    }

    /// Unproject an NDC point into world space
    pub fn unproject(&self, ndc: DVec3) -> DVec3 {
        let view = self.projection_matrix.inverse().project_point3(ndc);
        self.world.project_point3(view)
    }

    /// World-space viewing direction (camera -Z)
    pub fn forward(&self) -> DVec3 {
        self.world.transform_vector3(DVec3::NEG_Z).normalize()
    }
}

/// Cast a ray from a screen position through the camera.
///
/// Perspective cameras shoot from the eye through the unprojected point;
/// orthographic cameras shoot along the view axis from the unprojected point
/// on the near plane.
pub fn cast_ray(screen: DVec2, viewport: &Viewport, camera: &Camera) -> Result<Ray, KernelError> {
    let ndc = viewport.to_ndc(screen)?;

    let ray = match camera.projection {
        ProjectionKind::Perspective => {
            let point = camera.unproject(ndc.extend(PERSPECTIVE_UNPROJECT_DEPTH));
            Ray::new(camera.position, (point - camera.position).normalize())
        }
        ProjectionKind::Orthographic => {
            let point = camera.unproject(ndc.extend(ORTHOGRAPHIC_UNPROJECT_DEPTH));
            Ray::new(point, camera.forward())
        }
    };

    Ok(ray)
}
