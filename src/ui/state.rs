//! Application state management structures.
//!
//! The editing session itself lives in [`Editor`]. This module holds what the
//! egui shell adds around it: persisted UI preferences, the graph event channel
//! and the status line.

use crate::editor::Editor;
use crate::graph::GraphEvent;
use crate::render::RenderCoordinator;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver};

/// UI settings persisted between sessions.
///
/// Only these settings are saved. Nodes, connections and strokes always start
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Whether the background grid is drawn
    pub show_grid: bool,
    /// Remembered width of the properties panel
    pub properties_panel_width: f32,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            show_grid: true,
            properties_panel_width: 260.0,
        }
    }
}

impl UiPreferences {
    /// Serializes the preferences to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes preferences from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The main application structure.
///
/// Implements `eframe::App` and routes egui input into the [`Editor`].
pub struct WhiteboardApp {
    /// The editing session
    pub editor: Editor,
    /// Persisted UI settings
    pub preferences: UiPreferences,
    /// Redraws the canvas layers each frame
    pub coordinator: RenderCoordinator,
    /// Change notifications from the graph store
    pub events: Receiver<GraphEvent>,
    /// Last notable change, shown in the toolbar
    pub status: Option<String>,
}

impl Default for WhiteboardApp {
    fn default() -> Self {
        Self::with_preferences(UiPreferences::default())
    }
}

impl WhiteboardApp {
    /// Creates an empty whiteboard using previously saved preferences.
    pub fn with_preferences(preferences: UiPreferences) -> Self {
        let (tx, rx) = channel();
        Self {
            editor: Editor::with_observer(tx),
            preferences,
            coordinator: RenderCoordinator::new(),
            events: rx,
            status: None,
        }
    }

    /// Consumes pending graph events and updates the status line.
    pub fn drain_graph_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            let status = match &event {
                GraphEvent::SelectionChanged(Some(id)) => format!("Selected {id}"),
                GraphEvent::SelectionChanged(None) => "Selection cleared".to_string(),
                GraphEvent::NodeAdded(id) => format!("Added {id}"),
                GraphEvent::NodeDeleted { node, connections } => {
                    format!("Deleted {node} and {} connection(s)", connections.len())
                }
                GraphEvent::ConnectionAdded(id) => format!("Connected {id}"),
                GraphEvent::ConnectionDeleted(id) => format!("Removed {id}"),
            };
            info!("{status}");
            self.status = Some(status);
        }
    }
}
