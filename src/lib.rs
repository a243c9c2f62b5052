//! # Whiteboard Canvas
//!
//! An infinite whiteboard: pan and zoom the canvas, draw freehand strokes, place
//! resizable text nodes and link them with directional connections.
//!
//! ## Architecture
//! - [`viewport::ViewportState`] maps between screen and world space
//! - [`graph::GraphStore`] owns nodes, connections and selection
//! - [`strokes::StrokeLayer`] records freehand strokes in world space
//! - [`mode::ModeController`] decides what a pointer-down on the canvas means
//! - [`gestures`] holds the per-gesture pan, draw, drag, resize and connect controllers
//! - [`editor::Editor`] dispatches pointer and keyboard input to all of the above
//! - [`render::RenderCoordinator`] redraws the stroke, connection and node layers

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod editor;
pub mod geometry;
pub mod gestures;
pub mod graph;
pub mod mode;
pub mod render;
pub mod strokes;
pub mod types;
pub mod viewport;
mod ui;

pub use editor::{Editor, Modifiers, PointerTarget};
pub use geometry::{Anchor, Point, Rect};
pub use graph::{GraphEvent, GraphStore};
pub use mode::InteractionMode;
pub use render::{snapshot_strokes_png, SnapshotError};
pub use types::{Connection, ConnectionId, Node, NodeId};
pub use ui::{UiPreferences, WhiteboardApp};
pub use viewport::ViewportState;

use constants::PREFERENCES_KEY;
use log::warn;

/// Runs the whiteboard application.
///
/// UI preferences saved by a previous session are restored. The board itself
/// always starts empty.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// use whiteboard_canvas::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Whiteboard",
        options,
        Box::new(|cc| {
            let preferences = cc
                .storage
                .and_then(|storage| storage.get_string(PREFERENCES_KEY))
                .and_then(|json| match UiPreferences::from_json(&json) {
                    Ok(preferences) => Some(preferences),
                    Err(err) => {
                        warn!("ignoring saved UI preferences: {err}");
                        None
                    }
                })
                .unwrap_or_default();
            Ok(Box::new(WhiteboardApp::with_preferences(preferences)))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whiteboard_starts_empty() {
        let app = WhiteboardApp::default();
        assert!(app.editor.store().nodes().is_empty());
        assert!(app.editor.store().connections().is_empty());
        assert!(app.editor.strokes().history().is_empty());
        assert_eq!(app.editor.mode(), InteractionMode::Panning);
    }

    #[test]
    fn default_preferences() {
        let preferences = UiPreferences::default();
        assert!(preferences.dark_mode);
        assert!(preferences.show_grid);
    }
}
