//! Priority-ordered table of interaction tools.

use tracing::{debug, info};

use crate::host::{Host, PointerEvent, PointerEventKind};
use crate::tool::InteractionTool;

/// Registered tools, highest priority first
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn InteractionTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Register a tool, replacing any tool with the same name.
    ///
    /// Tools of equal priority keep registration order.
    pub fn register(&mut self, tool: Box<dyn InteractionTool>) {
        if let Some(replaced) = self.unregister(tool.name()) {
            debug!("Replacing tool {}", replaced.name());
        }
        info!("Registered tool {} (priority {})", tool.name(), tool.priority());
        self.tools.push(tool);
        self.tools.sort_by_key(|t| std::cmp::Reverse(t.priority()));
    }

    pub fn unregister(&mut self, name: &str) -> Option<Box<dyn InteractionTool>> {
        let index = self.tools.iter().position(|t| t.name() == name)?;
        Some(self.tools.remove(index))
    }

    /// Tool names in dispatch order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn InteractionTool + 'static)> {
        self.tools
            .iter_mut()
            .find(|t| t.name() == name)
            .map(|t| &mut **t)
    }

    /// Offer an event to each tool in turn until one consumes it
    pub fn dispatch(&mut self, host: &mut dyn Host, kind: PointerEventKind, event: &PointerEvent) -> bool {
        for tool in &mut self.tools {
            if tool.handle(host, kind, event) {
                debug!("{:?} consumed by {}", kind, tool.name());
                return true;
            }
        }
        false
    }
}
