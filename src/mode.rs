//! Interaction mode state machine.
//!
//! The mode answers a single question: what does the next pointer-down on empty
//! canvas mean? It never changes because the pointer moves, and switching tools
//! in the middle of a gesture does not affect the gesture already in progress.

use log::debug;

/// The tool currently selected in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Dragging the canvas pans the view
    #[default]
    Panning,
    /// Dragging the canvas draws a freehand stroke
    Drawing,
    /// Clicking the canvas places a node, then returns to panning
    AddingNode,
}

impl InteractionMode {
    /// All modes in palette order.
    pub const ALL: [InteractionMode; 3] = [
        InteractionMode::Panning,
        InteractionMode::Drawing,
        InteractionMode::AddingNode,
    ];

    /// Human readable label used by the tool palette.
    pub fn label(self) -> &'static str {
        match self {
            InteractionMode::Panning => "✋ Pan",
            InteractionMode::Drawing => "🖊 Draw",
            InteractionMode::AddingNode => "📌 Add Node",
        }
    }
}

/// Owns the current [`InteractionMode`].
#[derive(Debug, Default)]
pub struct ModeController {
    mode: InteractionMode,
}

impl ModeController {
    /// Starts in [`InteractionMode::Panning`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The mode that governs the next pointer-down.
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Explicit tool selection from the palette.
    ///
    /// # Returns
    ///
    /// `true` if the mode actually changed.
    pub fn select_tool(&mut self, mode: InteractionMode) -> bool {
        if self.mode == mode {
            return false;
        }
        debug!("tool changed: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        true
    }

    /// Called after a node has been placed. Adding a node is a one-shot tool.
    pub fn node_placed(&mut self) {
        if self.mode == InteractionMode::AddingNode {
            self.select_tool(InteractionMode::Panning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_panning() {
        assert_eq!(ModeController::new().mode(), InteractionMode::Panning);
    }

    #[test]
    fn select_tool_reports_change() {
        let mut modes = ModeController::new();
        assert!(modes.select_tool(InteractionMode::Drawing));
        assert!(!modes.select_tool(InteractionMode::Drawing));
        assert_eq!(modes.mode(), InteractionMode::Drawing);
    }

    #[test]
    fn node_placement_reverts_to_panning() {
        let mut modes = ModeController::new();
        modes.select_tool(InteractionMode::AddingNode);
        modes.node_placed();
        assert_eq!(modes.mode(), InteractionMode::Panning);
    }

    #[test]
    fn node_placement_leaves_other_modes_alone() {
        let mut modes = ModeController::new();
        modes.select_tool(InteractionMode::Drawing);
        modes.node_placed();
        assert_eq!(modes.mode(), InteractionMode::Drawing);
    }
}
