//! User interface for the whiteboard.
//!
//! # Module Organization
//!
//! - `state` - The main WhiteboardApp and persisted UI preferences
//! - `canvas` - Pointer routing from egui into the editor, cursor feedback
//! - `rendering` - Painter-backed layer surfaces and the background grid
//! - `export` - PNG export of the stroke layer

mod canvas;
mod export;
mod rendering;
mod state;

pub use state::{UiPreferences, WhiteboardApp};

use crate::constants::PREFERENCES_KEY;
use crate::mode::InteractionMode;
use crate::types::{ConnectionId, NodeId};
use eframe::egui;
use log::warn;

impl eframe::App for WhiteboardApp {
    /// Persist UI preferences between restarts. The board itself is not saved.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.preferences.to_json() {
            Ok(json) => storage.set_string(PREFERENCES_KEY, json),
            Err(err) => warn!("failed to serialize UI preferences: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }
}

impl WhiteboardApp {
    /// Lays out the toolbar, properties panel and canvas for one frame.
    pub fn ui(&mut self, ctx: &egui::Context) {
        let visuals = if self.preferences.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_delete_key(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        let viewport_width = ctx.input(|i| i.content_rect().width());
        let max_width = (viewport_width * 0.9).max(180.0);
        egui::SidePanel::right("properties_panel")
            .resizable(true)
            .default_width(self.preferences.properties_panel_width.clamp(180.0, max_width))
            .show(ctx, |ui| {
                self.preferences.properties_panel_width = ui.available_width().clamp(180.0, max_width);
                self.draw_properties_panel(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_canvas(ui);
            });

        self.drain_graph_events();
    }

    /// Deletes the selected node on Delete or Backspace.
    ///
    /// Ignored while a text field has keyboard focus, so editing node content
    /// never removes the node.
    pub fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let pressed = ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace));
        if pressed {
            self.editor.delete_selected();
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for mode in InteractionMode::ALL {
                let selected = self.editor.mode() == mode;
                if ui.add(egui::Button::new(mode.label()).selected(selected)).clicked() {
                    self.editor.select_tool(mode);
                }
            }

            ui.separator();

            ui.label(format!("Zoom: {:.0}%", self.editor.viewport().zoom_factor() * 100.0));
            if ui.button("Reset View").clicked() {
                self.editor.reset_view();
            }
            ui.add_enabled_ui(!self.editor.strokes().history().is_empty(), |ui| {
                if ui.button("Clear Strokes").clicked() {
                    self.editor.clear_strokes();
                }
                if ui.button("Export PNG").clicked() {
                    self.export_strokes_with_dialog();
                }
            });

            ui.separator();

            ui.checkbox(&mut self.preferences.show_grid, "Grid");
            let theme_label = if self.preferences.dark_mode { "☀ Light" } else { "🌙 Dark" };
            if ui.button(theme_label).clicked() {
                self.preferences.dark_mode = !self.preferences.dark_mode;
            }

            if let Some(status) = &self.status {
                ui.separator();
                ui.weak(status);
            }
        });
    }

    fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.heading("Properties");
                ui.separator();

                match self.editor.store().selected_node().cloned() {
                    Some(id) => self.draw_node_properties(ui, &id),
                    None => {
                        ui.label("No node selected.");
                        ui.weak("Click a node to select it. Shift+click two nodes to connect them.");
                    }
                }

                if let Some(source) = self.editor.store().pending_source() {
                    ui.separator();
                    ui.colored_label(
                        egui::Color32::from_rgb(255, 165, 0),
                        format!("Connecting from {source}: shift+click a target node"),
                    );
                }

                ui.separator();
                self.draw_connection_list(ui);
            });
    }

    fn draw_node_properties(&mut self, ui: &mut egui::Ui, id: &NodeId) {
        let Some(node) = self.editor.store().node(id) else {
            return;
        };
        let mut content = node.content.clone();
        ui.label(format!("ID: {id}"));
        ui.label(format!("Position: ({:.0}, {:.0})", node.x, node.y));
        ui.label(format!("Size: {:.0} × {:.0}", node.width, node.height));

        ui.add_space(4.0);
        ui.label("Content:");
        let response = ui.add(
            egui::TextEdit::multiline(&mut content)
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            self.editor.store_mut().edit_content(id, content);
        }

        ui.add_space(4.0);
        if ui.button("🗑 Delete Node").clicked() {
            self.editor.delete_selected();
        }
    }

    fn draw_connection_list(&mut self, ui: &mut egui::Ui) {
        ui.label(format!("Connections ({})", self.editor.store().connections().len()));

        let mut to_delete: Option<ConnectionId> = None;
        for connection in self.editor.store().connections() {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} ({}) → {} ({})",
                    connection.from,
                    connection.from_anchor.name(),
                    connection.to,
                    connection.to_anchor.name()
                ));
                if ui.small_button("🗑").on_hover_text("Delete connection").clicked() {
                    to_delete = Some(connection.id.clone());
                }
            });
        }
        if let Some(id) = to_delete {
            self.editor.store_mut().delete_connection(&id);
        }
    }
}
