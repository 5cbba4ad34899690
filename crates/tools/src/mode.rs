//! Tool modes.
//!
//! One mode is engaged at a time. Which pointer events a mode reacts to is
//! decided here so the handlers only match on the mode.

use geometry::EditDirection;
use serde::{Deserialize, Serialize};

/// The single engaged tool mode
///
/// Modes are mutually exclusive. Toggling the engaged mode returns to `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    #[default]
    Idle,
    AddBox,
    AddObject,
    Remove,
    Drag,
    Highlight,
    Push,
    Pull,
}

impl ToolMode {
    pub const ALL: [ToolMode; 8] = [
        ToolMode::Idle,
        ToolMode::AddBox,
        ToolMode::AddObject,
        ToolMode::Remove,
        ToolMode::Drag,
        ToolMode::Highlight,
        ToolMode::Push,
        ToolMode::Pull,
    ];

    /// Mode after the user toggles `requested`
    pub fn toggle(self, requested: ToolMode) -> ToolMode {
        if self == requested { ToolMode::Idle } else { requested }
    }

    pub fn is_engaged(self) -> bool {
        self != ToolMode::Idle
    }

    /// Push/pull direction, if this is an edit mode
    pub fn edit_direction(self) -> Option<EditDirection> {
        match self {
            ToolMode::Push => Some(EditDirection::Push),
            ToolMode::Pull => Some(EditDirection::Pull),
            _ => None,
        }
    }

    /// Modes that record the host hit point on every pointer move
    pub fn tracks_hits(self) -> bool {
        matches!(self, ToolMode::AddBox | ToolMode::AddObject | ToolMode::Drag)
    }

    /// Modes whose gestures span pointer-down to pointer-up
    pub fn is_gesture(self) -> bool {
        matches!(self, ToolMode::Drag | ToolMode::Push | ToolMode::Pull)
    }

    /// Modes that act on a click
    pub fn acts_on_click(self) -> bool {
        matches!(self, ToolMode::AddBox | ToolMode::AddObject | ToolMode::Remove)
    }
}
