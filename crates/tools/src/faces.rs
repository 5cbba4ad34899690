//! Face gestures: highlight on hover and push/pull on drag.

use facet_config::{ConfigError, Membership, ToolConfig};
use geometry::{
    EditDirection, FaceAnalyzer, FaceGroup, FaceHit, FragmentId, KernelError, OverlayStyle, PickResult,
    build_overlay, displace,
};
use glam::{DVec2, DVec3};
use tracing::{debug, info, warn};

use crate::error::ToolError;
use crate::host::{Host, InvalidateFlags, OverlayId, edit_fragment};

/// A push/pull gesture in progress
#[derive(Debug, Clone)]
struct FaceEdit {
    fragment: FragmentId,
    group: FaceGroup,
    /// Pick normal carried into fragment space
    local_normal: DVec3,
}

/// Highlight and push/pull state for one tool instance
#[derive(Debug)]
pub struct FaceController {
    analyzer: FaceAnalyzer,
    membership: Membership,
    step: f64,
    offset: f64,
    style: OverlayStyle,
    edit: Option<FaceEdit>,
    highlight: Option<OverlayId>,
    hovered: Option<FaceGroup>,
}

impl FaceController {
    pub fn new(config: &ToolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            analyzer: FaceAnalyzer::new(config.normal_decimals),
            membership: config.push_pull_membership,
            step: config.edit_step,
            offset: config.highlight_offset,
            style: OverlayStyle {
                color: config.highlight_color,
                opacity: config.highlight_opacity,
            },
            edit: None,
            highlight: None,
            hovered: None,
        })
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Group being pushed or pulled
    pub fn edit_group(&self) -> Option<&FaceGroup> {
        self.edit.as_ref().map(|e| &e.group)
    }

    /// Overlay currently attached to the host
    pub fn highlight(&self) -> Option<OverlayId> {
        self.highlight
    }

    /// Group under the pointer while highlighting
    pub fn hovered(&self) -> Option<&FaceGroup> {
        self.hovered.as_ref()
    }

    /// Pick the face under the pointer and capture its group for editing.
    ///
    /// Returns whether a gesture started. A pick without face data aborts
    /// with `NoFaceData` and leaves no gesture behind.
    pub fn begin_edit(&mut self, host: &mut dyn Host, screen: DVec2) -> Result<bool, ToolError> {
        self.edit = None;

        let Some(pick) = host.hit_test(screen) else {
            return Ok(false);
        };
        let (fragment, face) = pick.face_data()?;

        let analyzer = self.analyzer;
        let membership = self.membership;
        let (group, local_normal) = edit_fragment(host, fragment, |buffers| {
            let group = match membership {
                Membership::MatchingNormal => analyzer.analyze(&pick, buffers)?,
                Membership::Coplanar => analyzer.analyze_coplanar(&pick, buffers)?,
            };
            let local_normal = buffers.world().inverse().transform_vector3(face.normal);
            Ok((group, local_normal))
        })?;

        info!(
            "Face edit on {:?}: {} triangles, {} vertices",
            fragment,
            group.triangles().len(),
            group.vertices().len()
        );
        self.edit = Some(FaceEdit {
            fragment,
            group,
            local_normal,
        });
        Ok(true)
    }

    /// Displace the captured group by one step. Returns the vertices moved.
    ///
    /// A `GeometryError` ends the gesture: the surviving vertices are not
    /// moved again by later samples.
    pub fn step_edit(&mut self, host: &mut dyn Host, direction: EditDirection) -> Result<usize, ToolError> {
        let Some(edit) = &self.edit else {
            return Ok(0);
        };

        let step = self.step;
        let result = edit_fragment(host, edit.fragment, |buffers| {
            displace(buffers, &edit.group, edit.local_normal, direction, step)
        });

        host.scene_invalidate(InvalidateFlags {
            scene: true,
            geometry: true,
            overlay: false,
        });

        if let Err(ToolError::Kernel(KernelError::GeometryError { index, .. })) = &result {
            warn!("Face edit aborted at vertex {}", index);
            self.edit = None;
        }
        result
    }

    /// Release the gesture, if any
    pub fn end_edit(&mut self) -> bool {
        let released = self.edit.take().is_some();
        if released {
            debug!("Face edit released");
        }
        released
    }

    /// Rebuild the highlight overlay for the face under the pointer.
    ///
    /// The previous overlay is detached before a new one is attached. An empty
    /// pick clears the highlight, and so does a pick that cannot be analyzed.
    /// Returns whether an overlay is attached.
    pub fn update_highlight(&mut self, host: &mut dyn Host, screen: DVec2) -> Result<bool, ToolError> {
        let Some(pick) = host.hit_test(screen) else {
            self.clear_highlight(host);
            return Ok(false);
        };

        let (group, face) = match self.analyze_pick(host, &pick) {
            Ok(analyzed) => analyzed,
            Err(e) => {
                self.clear_highlight(host);
                return Err(e);
            }
        };

        if let Some(previous) = self.highlight.take() {
            host.overlay_detach(previous);
        }
        if let Some(overlay) = build_overlay(&group, face.normal, self.offset, self.style) {
            self.highlight = Some(host.overlay_attach(&overlay));
        }
        self.hovered = Some(group);
        host.scene_invalidate(InvalidateFlags::OVERLAY);

        Ok(self.highlight.is_some())
    }

    fn analyze_pick(&self, host: &mut dyn Host, pick: &PickResult) -> Result<(FaceGroup, FaceHit), ToolError> {
        let (fragment, face) = pick.face_data()?;
        let analyzer = self.analyzer;
        let group = edit_fragment(host, fragment, |buffers| analyzer.analyze(pick, buffers))?;
        Ok((group, face))
    }

    /// Detach the overlay and forget the hovered group
    pub fn clear_highlight(&mut self, host: &mut dyn Host) -> bool {
        self.hovered = None;
        let Some(previous) = self.highlight.take() else {
            return false;
        };

        host.overlay_detach(previous);
        host.scene_invalidate(InvalidateFlags::OVERLAY);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_host::{MockHost, TestFragment, face_pick, screen_at};
    use glam::DMat4;

    const EPSILON: f64 = 1e-6;

    fn controller() -> FaceController {
        FaceController::new(&ToolConfig::default()).unwrap()
    }

    #[test]
    fn test_push_then_pull_restores_triangle() {
        let mut host = MockHost::new();
        host.fragments
            .insert(FragmentId(1), TestFragment::single_triangle(DMat4::IDENTITY));
        host.pick = Some(face_pick(FragmentId(1), DVec3::Z, [0, 1, 2]));
        let original = host.fragments[&FragmentId(1)].positions.clone();

        let mut faces = controller();
        assert!(faces.begin_edit(&mut host, screen_at(0.0, 0.0)).unwrap());
        assert_eq!(faces.step_edit(&mut host, EditDirection::Push).unwrap(), 3);

        let moved = &host.fragments[&FragmentId(1)].positions;
        for i in 0..3 {
            assert!((moved[i * 3 + 2] - original[i * 3 + 2] - 0.5).abs() < EPSILON as f32);
            assert_eq!(moved[i * 3], original[i * 3]);
        }
        assert_eq!(host.fragments[&FragmentId(1)].uploads, 1);

        faces.step_edit(&mut host, EditDirection::Pull).unwrap();
        for (a, b) in host.fragments[&FragmentId(1)].positions.iter().zip(&original) {
            assert!((a - b).abs() < EPSILON as f32);
        }
        assert!(host.invalidations.iter().all(|f| f.geometry && f.scene));
    }

    #[test]
    fn test_edit_normal_follows_fragment_transform() {
        let mut host = MockHost::new();
        let world = DMat4::from_scale(DVec3::new(1.0, 1.0, 2.0));
        host.fragments.insert(FragmentId(1), TestFragment::single_triangle(world));
        host.pick = Some(face_pick(FragmentId(1), DVec3::Z, [0, 1, 2]));

        let mut faces = controller();
        faces.begin_edit(&mut host, screen_at(0.0, 0.0)).unwrap();
        faces.step_edit(&mut host, EditDirection::Push).unwrap();

        // Half a unit in world space is a quarter unit in stored space
        let positions = &host.fragments[&FragmentId(1)].positions;
        assert!((positions[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_missing_face_data_aborts_without_state() {
        let mut host = MockHost::new();
        host.pick = Some(PickResult::point_only(DVec3::ZERO, 1.0));

        let mut faces = controller();
        let result = faces.begin_edit(&mut host, screen_at(0.0, 0.0));
        assert_eq!(result, Err(ToolError::Kernel(KernelError::NoFaceData)));
        assert!(!faces.is_editing());
        assert_eq!(faces.step_edit(&mut host, EditDirection::Push).unwrap(), 0);
    }

    #[test]
    fn test_empty_pick_is_not_an_error() {
        let mut host = MockHost::new();
        host.ground = false;

        let mut faces = controller();
        assert!(!faces.begin_edit(&mut host, screen_at(0.0, 0.0)).unwrap());
        assert!(!faces.update_highlight(&mut host, screen_at(0.0, 0.0)).unwrap());
        assert!(host.overlays.is_empty());
    }

    #[test]
    fn test_unknown_fragment() {
        let mut host = MockHost::new();
        host.pick = Some(face_pick(FragmentId(9), DVec3::Z, [0, 1, 2]));

        let mut faces = controller();
        let result = faces.begin_edit(&mut host, screen_at(0.0, 0.0));
        assert_eq!(result, Err(ToolError::UnknownFragment(FragmentId(9))));
    }

    #[test]
    fn test_bad_picked_triangle_is_geometry_error() {
        let mut host = MockHost::new();
        host.fragments
            .insert(FragmentId(1), TestFragment::single_triangle(DMat4::IDENTITY));
        host.pick = Some(PickResult {
            point: DVec3::ZERO,
            distance: 1.0,
            fragment: Some(FragmentId(1)),
            face: Some(FaceHit {
                normal: DVec3::Z,
                vertices: [0, 1, 7],
            }),
        });

        let mut faces = controller();
        let result = faces.begin_edit(&mut host, screen_at(0.0, 0.0));
        assert!(matches!(
            result,
            Err(ToolError::Kernel(KernelError::GeometryError { index: 7, .. }))
        ));
        assert!(!faces.is_editing());
    }

    #[test]
    fn test_highlight_never_accumulates() {
        let mut host = MockHost::new();
        host.fragments
            .insert(FragmentId(1), TestFragment::quad(DMat4::IDENTITY));
        host.pick = Some(face_pick(FragmentId(1), DVec3::Z, [0, 1, 2]));

        let mut faces = controller();
        for _ in 0..5 {
            assert!(faces.update_highlight(&mut host, screen_at(0.0, 0.0)).unwrap());
            assert_eq!(host.overlays.len(), 1);
        }
        assert_eq!(host.attached, 5);
        assert_eq!(faces.hovered().unwrap().triangles().len(), 2);

        let overlay = host.overlays.values().next().unwrap();
        assert!(overlay.triangles.iter().flatten().all(|p| p.z == 5.0));

        // Pointer leaves the model
        host.pick = None;
        host.ground = false;
        assert!(!faces.update_highlight(&mut host, screen_at(0.0, 0.0)).unwrap());
        assert!(host.overlays.is_empty());
        assert!(faces.hovered().is_none());
        assert!(faces.highlight().is_none());
    }

    #[test]
    fn test_coplanar_membership() {
        let mut host = MockHost::new();
        host.fragments
            .insert(FragmentId(1), TestFragment::quad(DMat4::IDENTITY));
        host.pick = Some(face_pick(FragmentId(1), DVec3::Z, [0, 1, 2]));

        let config = ToolConfig {
            push_pull_membership: Membership::Coplanar,
            ..Default::default()
        };
        let mut faces = FaceController::new(&config).unwrap();
        faces.begin_edit(&mut host, screen_at(0.0, 0.0)).unwrap();
        assert_eq!(faces.edit_group().unwrap().vertices(), &[0, 1, 2, 3]);

        assert_eq!(faces.step_edit(&mut host, EditDirection::Push).unwrap(), 4);
        assert!(faces.end_edit());
        assert!(!faces.end_edit());
    }

    #[test]
    fn test_geometry_error_ends_edit() {
        let mut host = MockHost::new();
        host.fragments
            .insert(FragmentId(1), TestFragment::single_triangle(DMat4::IDENTITY));
        host.pick = Some(face_pick(FragmentId(1), DVec3::Z, [0, 1, 2]));

        let mut faces = controller();
        faces.begin_edit(&mut host, screen_at(0.0, 0.0)).unwrap();
        host.fragments.get_mut(&FragmentId(1)).unwrap().positions.truncate(6);

        let result = faces.step_edit(&mut host, EditDirection::Push);
        assert!(matches!(
            result,
            Err(ToolError::Kernel(KernelError::GeometryError { index: 2, .. }))
        ));
        assert!(!faces.is_editing());
        assert_eq!(faces.step_edit(&mut host, EditDirection::Push).unwrap(), 0);
        assert_eq!(host.fragments[&FragmentId(1)].positions[2], 0.5);
    }

    #[test]
    fn test_unanalyzable_pick_clears_highlight() {
        let mut host = MockHost::new();
        host.fragments
            .insert(FragmentId(1), TestFragment::quad(DMat4::IDENTITY));
        host.pick = Some(face_pick(FragmentId(1), DVec3::Z, [0, 1, 2]));

        let mut faces = controller();
        assert!(faces.update_highlight(&mut host, screen_at(0.0, 0.0)).unwrap());

        host.pick = Some(PickResult::point_only(DVec3::ZERO, 1.0));
        let result = faces.update_highlight(&mut host, screen_at(0.0, 0.0));
        assert_eq!(result, Err(ToolError::Kernel(KernelError::NoFaceData)));
        assert!(host.overlays.is_empty());
        assert!(faces.hovered().is_none());
        assert!(faces.highlight().is_none());

        // Fragment the host cannot resolve
        host.pick = Some(face_pick(FragmentId(1), DVec3::Z, [0, 1, 2]));
        faces.update_highlight(&mut host, screen_at(0.0, 0.0)).unwrap();
        host.pick = Some(face_pick(FragmentId(5), DVec3::Z, [0, 1, 2]));
        let result = faces.update_highlight(&mut host, screen_at(0.0, 0.0));
        assert_eq!(result, Err(ToolError::UnknownFragment(FragmentId(5))));
        assert!(host.overlays.is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ToolConfig {
            normal_decimals: 400,
            ..Default::default()
        };
        assert!(matches!(
            FaceController::new(&config),
            Err(ConfigError::Invalid { field: "normal_decimals", .. })
        ));
    }
}
