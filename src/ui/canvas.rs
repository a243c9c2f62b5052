//! Canvas input routing and drawing.
//!
//! Raw egui pointer events are translated into surface-relative coordinates and
//! handed to the [`crate::editor::Editor`]. Everything the editor needs to know
//! about pointer capture, gesture ownership and modes stays on its side.

use super::rendering::{draw_grid, PainterLineSurface, PainterNodeSurface, PainterRasterSurface};
use super::state::WhiteboardApp;
use crate::editor::{Editor, Modifiers, PointerTarget};
use crate::geometry::Point;
use crate::gestures::{Gesture, ResizeCorner};
use crate::mode::InteractionMode;
use crate::render::Layers;
use eframe::egui;

/// Position of `pos` relative to the canvas origin.
pub fn to_surface(pos: egui::Pos2, canvas_rect: egui::Rect) -> Point {
    let local = pos - canvas_rect.min;
    Point::new(local.x, local.y)
}

fn resize_cursor(corner: ResizeCorner) -> egui::CursorIcon {
    match corner {
        ResizeCorner::NorthWest | ResizeCorner::SouthEast => egui::CursorIcon::ResizeNwSe,
        ResizeCorner::NorthEast | ResizeCorner::SouthWest => egui::CursorIcon::ResizeNeSw,
    }
}

/// Cursor to show for the gesture in progress, or for what lies under the pointer.
pub fn cursor_for(editor: &Editor) -> egui::CursorIcon {
    if let Some(gesture) = editor.active_gesture() {
        return match gesture {
            Gesture::Pan(_) | Gesture::NodeDrag(_) => egui::CursorIcon::Grabbing,
            Gesture::Draw(_) | Gesture::Connect(_) => egui::CursorIcon::Crosshair,
            Gesture::Resize(resize) => resize_cursor(resize.corner()),
        };
    }
    match editor.hover_target() {
        PointerTarget::AnchorHandle(..) => egui::CursorIcon::Crosshair,
        PointerTarget::ResizeHandle(_, corner) => resize_cursor(corner),
        PointerTarget::NodeBody(_) => egui::CursorIcon::Grab,
        PointerTarget::Canvas => match editor.mode() {
            InteractionMode::Panning => egui::CursorIcon::Grab,
            InteractionMode::Drawing | InteractionMode::AddingNode => egui::CursorIcon::Crosshair,
        },
    }
}

impl WhiteboardApp {
    /// Allocates the canvas, routes this frame's input and paints all layers.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI the canvas fills
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;

        self.handle_canvas_input(ui, canvas_rect);

        if response.hovered() || self.editor.is_gesture_active() {
            ui.ctx().set_cursor_icon(cursor_for(&self.editor));
        }

        if self.preferences.show_grid {
            draw_grid(&painter, canvas_rect, self.editor.viewport());
        }

        let origin = canvas_rect.min;
        let mut strokes = PainterRasterSurface::new(&painter, origin);
        let mut connections = PainterLineSurface::new(&painter, origin);
        let mut nodes = PainterNodeSurface::new(&painter, origin, self.preferences.dark_mode);

        let width = canvas_rect.width().max(0.0).round() as u32;
        let height = canvas_rect.height().max(0.0).round() as u32;
        self.coordinator.resize_surfaces(width, height, &mut strokes);
        self.coordinator.redraw(
            &self.editor,
            &mut Layers {
                strokes: &mut strokes,
                connections: &mut connections,
                nodes: &mut nodes,
            },
        );
    }

    /// Feeds this frame's pointer events and wheel scrolling into the editor.
    ///
    /// Presses only count inside `canvas_rect`. Releases always reach a running
    /// gesture. Moving out of the canvas is treated as the pointer leaving the
    /// surface.
    pub fn handle_canvas_input(&mut self, ui: &egui::Ui, canvas_rect: egui::Rect) {
        let events = ui.input(|i| i.events.clone());
        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    if canvas_rect.contains(pos) {
                        self.editor.pointer_move(to_surface(pos, canvas_rect));
                    } else if self.editor.hover_position().is_some() {
                        self.editor.pointer_leave();
                    }
                }
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    modifiers,
                } => {
                    if pressed {
                        if canvas_rect.contains(pos) {
                            let modifiers = Modifiers { shift: modifiers.shift };
                            self.editor.pointer_down(to_surface(pos, canvas_rect), modifiers);
                        }
                    } else if self.editor.is_gesture_active() {
                        self.editor.pointer_up(to_surface(pos, canvas_rect));
                    }
                }
                egui::Event::PointerGone => self.editor.pointer_leave(),
                _ => {}
            }
        }

        // One zoom step per frame with wheel input, anchored at the pointer
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            if let Some(pos) = ui.input(|i| i.pointer.hover_pos()) {
                if canvas_rect.contains(pos) {
                    self.editor.wheel(to_surface(pos, canvas_rect), scroll);
                }
            }
        }
    }
}
