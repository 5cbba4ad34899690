//! Pointer event handlers.
//!
//! The host dispatcher calls one handler per event. Each returns whether the
//! event was consumed, in which case the host stops processing it.

use facet_config::{ConfigError, ToolConfig};
use tracing::{info, warn};

use crate::faces::FaceController;
use crate::host::{Host, PointerEvent, PointerEventKind};
use crate::mode::ToolMode;
use crate::objects::ObjectController;

/// A tool the host can register and feed pointer events
pub trait InteractionTool {
    fn name(&self) -> &str;

    /// Higher priorities see events first
    fn priority(&self) -> i32;

    fn on_pointer_move(&mut self, host: &mut dyn Host, event: &PointerEvent) -> bool;

    fn on_pointer_down(&mut self, host: &mut dyn Host, event: &PointerEvent) -> bool;

    fn on_pointer_up(&mut self, host: &mut dyn Host, event: &PointerEvent) -> bool;

    fn on_click(&mut self, host: &mut dyn Host, event: &PointerEvent) -> bool;

    /// Route an event to its handler
    fn handle(&mut self, host: &mut dyn Host, kind: PointerEventKind, event: &PointerEvent) -> bool {
        match kind {
            PointerEventKind::Move => self.on_pointer_move(host, event),
            PointerEventKind::Down => self.on_pointer_down(host, event),
            PointerEventKind::Up => self.on_pointer_up(host, event),
            PointerEventKind::Click => self.on_click(host, event),
        }
    }
}

/// Highlight, push/pull, add, remove and drag behind one mode
#[derive(Debug)]
pub struct FaceEditTool {
    name: String,
    priority: i32,
    mode: ToolMode,
    objects: ObjectController,
    faces: FaceController,
}

impl FaceEditTool {
    /// Build the tool from a config, rejecting values the kernel cannot use
    pub fn new(config: &ToolConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            name: config.tool_name.clone(),
            priority: config.tool_priority,
            mode: ToolMode::Idle,
            objects: ObjectController::new(config)?,
            faces: FaceController::new(config)?,
        })
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn objects(&self) -> &ObjectController {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectController {
        &mut self.objects
    }

    pub fn faces(&self) -> &FaceController {
        &self.faces
    }

    /// Toggle `requested` on or off. Any gesture in progress is released
    /// and the highlight is cleared.
    pub fn toggle_mode(&mut self, host: &mut dyn Host, requested: ToolMode) -> ToolMode {
        self.release();
        self.faces.clear_highlight(host);

        let previous = self.mode;
        self.mode = previous.toggle(requested);
        if self.mode.is_engaged() {
            info!("Entered {:?} mode", self.mode);
        } else {
            info!("Exited {:?} mode", previous);
        }
        self.mode
    }

    /// End every gesture. Returns whether one was active.
    fn release(&mut self) -> bool {
        let dragged = self.objects.end_drag().is_some();
        let edited = self.faces.end_edit();
        dragged || edited
    }
}

impl InteractionTool for FaceEditTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn on_pointer_move(&mut self, host: &mut dyn Host, event: &PointerEvent) -> bool {
        match self.mode {
            ToolMode::Highlight => {
                if let Err(e) = self.faces.update_highlight(host, event.position) {
                    warn!("{}: highlight failed: {}", self.name, e);
                }
                false
            }
            ToolMode::Push | ToolMode::Pull => {
                let Some(direction) = self.mode.edit_direction() else {
                    return false;
                };
                if !self.faces.is_editing() {
                    return false;
                }
                if let Err(e) = self.faces.step_edit(host, direction) {
                    warn!("{}: {:?} step failed: {}", self.name, direction, e);
                }
                true
            }
            ToolMode::Drag if self.objects.drag().is_some() => {
                if let Err(e) = self.objects.drag_to(host, event.position) {
                    warn!("{}: drag failed: {}", self.name, e);
                }
                true
            }
            mode if mode.tracks_hits() => {
                self.objects.track_hit(host, event.position);
                false
            }
            _ => false,
        }
    }

    fn on_pointer_down(&mut self, host: &mut dyn Host, event: &PointerEvent) -> bool {
        let started = match self.mode {
            ToolMode::Drag => self.objects.begin_drag(host, event.position),
            ToolMode::Push | ToolMode::Pull => self.faces.begin_edit(host, event.position),
            _ => return false,
        };

        match started {
            Ok(started) => started,
            Err(e) => {
                warn!("{}: {:?} gesture not started: {}", self.name, self.mode, e);
                false
            }
        }
    }

    fn on_pointer_up(&mut self, _host: &mut dyn Host, _event: &PointerEvent) -> bool {
        self.release()
    }

    fn on_click(&mut self, host: &mut dyn Host, event: &PointerEvent) -> bool {
        match self.mode {
            ToolMode::AddBox => {
                self.objects.add_box(host);
            }
            ToolMode::AddObject => {
                self.objects.add_object(host);
            }
            ToolMode::Remove => {
                if let Err(e) = self.objects.remove_at(host, event.position) {
                    warn!("{}: remove failed: {}", self.name, e);
                }
            }
            _ => return false,
        }
        true
    }
}
