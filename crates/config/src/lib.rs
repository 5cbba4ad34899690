//! Shared configuration for the facet editing tools
//!
//! This crate is the single source of truth for the design constants used by
//! the interaction kernel and the tools built on it: edit step size, highlight
//! offset and color, normal comparison precision, primitive sizes and the
//! scene walk bound.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Displacement applied per pointer-move sample while pushing or pulling
pub const DEFAULT_EDIT_STEP: f64 = 0.5;

/// Distance the highlight overlay floats above the picked surface
pub const DEFAULT_HIGHLIGHT_OFFSET: f64 = 5.0;

/// Highlight overlay color (0xRRGGBB)
pub const DEFAULT_HIGHLIGHT_COLOR: u32 = 0xff0000;

/// Highlight overlay opacity
pub const DEFAULT_HIGHLIGHT_OPACITY: f32 = 0.3;

/// Decimal digits kept when comparing face normals
pub const DEFAULT_NORMAL_DECIMALS: u32 = 8;

/// Size of the box added by the add-box mode (x, y, z)
pub const DEFAULT_BOX_SIZE: [f64; 3] = [25.0, 25.0, 14.0];

/// Asset key requested from the host by the add-object mode
pub const DEFAULT_OBJECT_ASSET: &str = "models/tree.obj";

/// Upper bound on parent links followed when resolving a top-level object
pub const DEFAULT_MAX_ANCESTOR_DEPTH: usize = 1024;

/// Name the interaction tool registers under
pub const DEFAULT_TOOL_NAME: &str = "facet-edit";

/// Dispatch priority of the interaction tool
pub const DEFAULT_TOOL_PRIORITY: i32 = 100;

/// Largest decimal precision that still means something for an f64
pub const MAX_NORMAL_DECIMALS: u32 = 15;

/// How push/pull decides which vertices move with the picked face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    /// Vertices of every triangle whose normal matches the picked normal
    #[default]
    MatchingNormal,
    /// Vertices lying exactly on the plane of the picked triangle
    Coplanar,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse tool config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for the face editing tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct ToolConfig {
    /// Push/pull displacement per pointer-move sample
    pub edit_step: f64,
    /// Offset of the highlight overlay along the face normal
    pub highlight_offset: f64,
    /// Highlight overlay color (0xRRGGBB)
    pub highlight_color: u32,
    /// Highlight overlay opacity in [0, 1]
    pub highlight_opacity: f32,
    /// Decimal digits used for normal equality
    pub normal_decimals: u32,
    /// Box primitive size
    pub box_size: [f64; 3],
    /// Asset key for the add-object mode
    pub object_asset: String,
    /// Bound on the top-level ancestor walk
    pub max_ancestor_depth: usize,
    /// Vertex selection rule for push/pull
    pub push_pull_membership: Membership,
    /// Registered tool name
    pub tool_name: String,
    /// Registered tool priority (higher runs first)
    pub tool_priority: i32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            edit_step: DEFAULT_EDIT_STEP,
            highlight_offset: DEFAULT_HIGHLIGHT_OFFSET,
            highlight_color: DEFAULT_HIGHLIGHT_COLOR,
            highlight_opacity: DEFAULT_HIGHLIGHT_OPACITY,
            normal_decimals: DEFAULT_NORMAL_DECIMALS,
            box_size: DEFAULT_BOX_SIZE,
            object_asset: DEFAULT_OBJECT_ASSET.to_string(),
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
            push_pull_membership: Membership::default(),
            tool_name: DEFAULT_TOOL_NAME.to_string(),
            tool_priority: DEFAULT_TOOL_PRIORITY,
        }
    }
}

impl ToolConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is usable by the kernel
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.edit_step.is_finite() && self.edit_step > 0.0) {
            return Err(ConfigError::Invalid {
                field: "edit_step",
                reason: format!("must be a positive number, got {}", self.edit_step),
            });
        }
        if !(self.highlight_offset.is_finite() && self.highlight_offset >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "highlight_offset",
                reason: format!("must be non-negative, got {}", self.highlight_offset),
            });
        }
        if !(0.0..=1.0).contains(&self.highlight_opacity) {
            return Err(ConfigError::Invalid {
                field: "highlight_opacity",
                reason: format!("must be within [0, 1], got {}", self.highlight_opacity),
            });
        }
        if self.normal_decimals > MAX_NORMAL_DECIMALS {
            return Err(ConfigError::Invalid {
                field: "normal_decimals",
                reason: format!(
                    "at most {} digits are meaningful, got {}",
                    MAX_NORMAL_DECIMALS, self.normal_decimals
                ),
            });
        }
        if self.box_size.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(ConfigError::Invalid {
                field: "box_size",
                reason: format!("all sides must be positive, got {:?}", self.box_size),
            });
        }
        if self.max_ancestor_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_ancestor_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
