//! Painter-backed rendering surfaces and the background grid.
//!
//! Each surface wraps the canvas painter and translates surface-relative screen
//! coordinates into egui screen positions by adding the canvas origin. egui
//! repaints every frame, so `clear` has nothing to erase.

use crate::constants::{
    ANCHOR_HANDLE_RADIUS, ARROW_HEAD_LENGTH, CONNECTION_STROKE_WIDTH, GRID_SIZE, NODE_CORNER_RADIUS,
    NODE_FONT_SIZE, NODE_PADDING, RESIZE_HANDLE_RADIUS,
};
use crate::geometry::{anchor_point, Anchor, Point};
use crate::gestures::ResizeCorner;
use crate::render::{LineCap, LineJoin, LineKind, NodeBox, NodeSurface, RasterSurface, VectorSurface};
use crate::viewport::ViewportState;
use eframe::egui;
use eframe::egui::StrokeKind;

fn to_pos(origin: egui::Pos2, point: Point) -> egui::Pos2 {
    origin + egui::vec2(point.x, point.y)
}

/// Stroke layer drawn straight into the canvas painter.
pub struct PainterRasterSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
    size: (u32, u32),
    zoom: f32,
    pan: Point,
    line_width: f32,
    color: egui::Color32,
}

impl<'a> PainterRasterSurface<'a> {
    /// Wraps `painter`, with surface coordinates measured from `origin`.
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2) -> Self {
        Self {
            painter,
            origin,
            size: (0, 0),
            zoom: 1.0,
            pan: Point::ZERO,
            line_width: 1.0,
            color: egui::Color32::RED,
        }
    }
}

impl RasterSurface for PainterRasterSurface<'_> {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self) {}

    fn set_transform(&mut self, zoom: f32, pan: Point) {
        self.zoom = zoom;
        self.pan = pan;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    // egui path strokes are always drawn with rounded joins and caps
    fn set_line_join(&mut self, _join: LineJoin) {}

    fn set_line_cap(&mut self, _cap: LineCap) {}

    fn stroke_path(&mut self, points: &[Point]) {
        let screen: Vec<egui::Pos2> = points
            .iter()
            .map(|point| to_pos(self.origin, (*point + self.pan) * self.zoom))
            .collect();
        self.painter.add(egui::Shape::line(
            screen,
            egui::Stroke::new(self.line_width * self.zoom, self.color),
        ));
    }
}

/// Node layer: boxes with wrapped text and, when visible, their handles.
pub struct PainterNodeSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
    dark_mode: bool,
}

impl<'a> PainterNodeSurface<'a> {
    /// Wraps `painter`, with surface coordinates measured from `origin`.
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2, dark_mode: bool) -> Self {
        Self {
            painter,
            origin,
            dark_mode,
        }
    }

    fn draw_handles(&self, node: &NodeBox) {
        let handle_color = egui::Color32::from_rgb(100, 150, 255);
        for anchor in Anchor::ALL {
            let center = to_pos(self.origin, anchor_point(&node.rect, anchor));
            self.painter.circle_filled(center, ANCHOR_HANDLE_RADIUS, handle_color);
        }
        for corner in ResizeCorner::ALL {
            let center = to_pos(self.origin, corner.point(&node.rect));
            let square = egui::Rect::from_center_size(center, egui::Vec2::splat(RESIZE_HANDLE_RADIUS * 1.2));
            self.painter.rect_filled(square, 1.0, egui::Color32::WHITE);
            self.painter.rect_stroke(
                square,
                1.0,
                egui::Stroke::new(1.0, handle_color),
                StrokeKind::Inside,
            );
        }
    }
}

impl NodeSurface for PainterNodeSurface<'_> {
    fn clear(&mut self) {}

    fn place_node(&mut self, node: NodeBox) {
        let rect = egui::Rect::from_min_max(to_pos(self.origin, node.rect.min), to_pos(self.origin, node.rect.max));
        let rounding = NODE_CORNER_RADIUS * node.zoom;

        let fill = if self.dark_mode {
            egui::Color32::from_gray(48)
        } else {
            egui::Color32::WHITE
        };
        let text_color = if self.dark_mode {
            egui::Color32::from_gray(230)
        } else {
            egui::Color32::BLACK
        };
        self.painter.rect_filled(rect, rounding, fill);

        let (stroke_color, stroke_width) = if node.pending_source {
            (egui::Color32::from_rgb(255, 165, 0), 3.0)
        } else if node.selected {
            (egui::Color32::YELLOW, 3.0)
        } else {
            (egui::Color32::GRAY, 1.0)
        };
        self.painter.rect_stroke(
            rect,
            rounding,
            egui::Stroke::new(stroke_width, stroke_color),
            StrokeKind::Outside,
        );

        // Text scales with zoom and wraps inside the padded box
        let padding = NODE_PADDING * node.zoom;
        let text_rect = rect.shrink(padding);
        if text_rect.width() > 0.0 && text_rect.height() > 0.0 {
            let font_id = egui::FontId::proportional((NODE_FONT_SIZE * node.zoom).clamp(4.0, 96.0));
            let galley = self
                .painter
                .layout(node.content.clone(), font_id, text_color, text_rect.width());
            self.painter
                .with_clip_rect(text_rect)
                .galley(text_rect.min, galley, text_color);
        }

        if node.show_handles {
            self.draw_handles(&node);
        }
    }
}

/// Connection layer: straight lines with a head at the target end.
pub struct PainterLineSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
}

impl<'a> PainterLineSurface<'a> {
    /// Wraps `painter`, with surface coordinates measured from `origin`.
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2) -> Self {
        Self { painter, origin }
    }

    /// Filled triangle whose tip sits on `end`.
    fn draw_arrow_head(&self, start: egui::Pos2, end: egui::Pos2, color: egui::Color32) {
        let direction = (end - start).normalized();
        if !direction.is_finite() || direction == egui::Vec2::ZERO {
            return;
        }
        let perpendicular = egui::vec2(-direction.y, direction.x);
        let base = end - direction * ARROW_HEAD_LENGTH;
        let half_width = ARROW_HEAD_LENGTH * 0.5;
        self.painter.add(egui::Shape::convex_polygon(
            vec![end, base + perpendicular * half_width, base - perpendicular * half_width],
            color,
            egui::Stroke::NONE,
        ));
    }
}

impl VectorSurface for PainterLineSurface<'_> {
    fn clear(&mut self) {}

    fn draw_line(&mut self, from: Point, to: Point, kind: LineKind) {
        let start = to_pos(self.origin, from);
        let end = to_pos(self.origin, to);
        match kind {
            LineKind::Connection { hovered, .. } => {
                let (color, width) = if hovered {
                    (egui::Color32::from_rgb(100, 150, 255), CONNECTION_STROKE_WIDTH + 1.0)
                } else {
                    (egui::Color32::DARK_GRAY, CONNECTION_STROKE_WIDTH)
                };
                self.painter.line_segment([start, end], egui::Stroke::new(width, color));
                self.draw_arrow_head(start, end, color);
            }
            LineKind::Draft => {
                let color = egui::Color32::from_rgb(100, 150, 255);
                self.painter.extend(egui::Shape::dashed_line(
                    &[start, end],
                    egui::Stroke::new(CONNECTION_STROKE_WIDTH, color),
                    6.0,
                    4.0,
                ));
                self.painter.circle_filled(end, 3.0, color);
            }
        }
    }
}

/// Draws the world-aligned background grid behind every layer.
///
/// Lines are skipped entirely once the spacing drops below two screen pixels.
/// The world axes are drawn more prominently when zoomed in.
pub fn draw_grid(painter: &egui::Painter, canvas_rect: egui::Rect, viewport: &ViewportState) {
    let screen_grid_size = GRID_SIZE * viewport.zoom_factor();
    if screen_grid_size < 2.0 {
        return;
    }
    let grid_color = egui::Color32::from_rgba_unmultiplied(128, 128, 128, 32);
    let stroke = egui::Stroke::new(1.0, grid_color);
    let origin = canvas_rect.min;

    let visible = viewport.visible_world_rect(canvas_rect.width(), canvas_rect.height());
    let start_x = (visible.min.x / GRID_SIZE).floor() * GRID_SIZE;
    let start_y = (visible.min.y / GRID_SIZE).floor() * GRID_SIZE;

    let mut x = start_x;
    while x <= visible.max.x {
        let screen_x = origin.x + viewport.to_screen(Point::new(x, 0.0)).x;
        painter.line_segment(
            [egui::pos2(screen_x, canvas_rect.min.y), egui::pos2(screen_x, canvas_rect.max.y)],
            stroke,
        );
        x += GRID_SIZE;
    }

    let mut y = start_y;
    while y <= visible.max.y {
        let screen_y = origin.y + viewport.to_screen(Point::new(0.0, y)).y;
        painter.line_segment(
            [egui::pos2(canvas_rect.min.x, screen_y), egui::pos2(canvas_rect.max.x, screen_y)],
            stroke,
        );
        y += GRID_SIZE;
    }

    if screen_grid_size > 10.0 {
        let axis_stroke = egui::Stroke::new(1.5, egui::Color32::from_rgba_unmultiplied(128, 128, 128, 80));
        let axes = to_pos(origin, viewport.to_screen(Point::ZERO));
        if canvas_rect.y_range().contains(axes.y) {
            painter.line_segment(
                [egui::pos2(canvas_rect.min.x, axes.y), egui::pos2(canvas_rect.max.x, axes.y)],
                axis_stroke,
            );
        }
        if canvas_rect.x_range().contains(axes.x) {
            painter.line_segment(
                [egui::pos2(axes.x, canvas_rect.min.y), egui::pos2(axes.x, canvas_rect.max.y)],
                axis_stroke,
            );
        }
    }
}
