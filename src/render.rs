//! Rendering surfaces and the coordinator that keeps them in agreement.
//!
//! The whiteboard draws three layers, back to front: freehand strokes on a
//! raster surface, connection lines on a vector surface, and node boxes on a
//! positioned-box surface. All three share one screen-space frame, derived from
//! the same [`ViewportState`] on every redraw.
//!
//! A redraw always clears each surface and renders everything again, so calling
//! it twice without a state change produces identical output.

use crate::constants::STROKE_SCREEN_WIDTH;
use crate::editor::Editor;
use crate::geometry::{Point, Rect};
use crate::graph::GraphStore;
use crate::strokes::StrokeLayer;
use crate::types::{ConnectionId, NodeId};
use crate::viewport::ViewportState;
use log::{debug, warn};
use thiserror::Error;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Transform};

/// Corner style where two stroke segments meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    /// Sharp corner
    Miter,
    /// Rounded corner
    Round,
    /// Cut-off corner
    Bevel,
}

/// End style of an open stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    /// Flat end at the last point
    Butt,
    /// Semicircular end
    Round,
    /// Flat end extended by half the width
    Square,
}

/// A bitmap surface that strokes polylines given in world coordinates.
pub trait RasterSurface {
    /// Resizes the backing store to the container's pixel size. Contents are lost.
    fn resize(&mut self, width: u32, height: u32);

    /// Current pixel size.
    fn size(&self) -> (u32, u32);

    /// Erases the whole surface.
    fn clear(&mut self);

    /// Sets the world-to-screen mapping `screen = (world + pan) * zoom`.
    fn set_transform(&mut self, zoom: f32, pan: Point);

    /// Line width in world units.
    fn set_line_width(&mut self, width: f32);

    /// Join style for subsequent paths.
    fn set_line_join(&mut self, join: LineJoin);

    /// Cap style for subsequent paths.
    fn set_line_cap(&mut self, cap: LineCap);

    /// Strokes the polyline through `points` (world space).
    fn stroke_path(&mut self, points: &[Point]);
}

/// A node box positioned in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    /// Node id
    pub id: NodeId,
    /// Screen-space bounds
    pub rect: Rect,
    /// Text content
    pub content: String,
    /// Whether the node is selected
    pub selected: bool,
    /// Whether the node is the pending click-to-connect source
    pub pending_source: bool,
    /// Whether anchor and resize handles are visible
    pub show_handles: bool,
    /// Zoom factor, for scaling text and handles
    pub zoom: f32,
}

/// Surface holding one positioned box per node.
pub trait NodeSurface {
    /// Removes every box.
    fn clear(&mut self);

    /// Adds a box. Later boxes are on top of earlier ones.
    fn place_node(&mut self, node: NodeBox);
}

/// What a vector line represents.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// A committed connection
    Connection {
        /// The connection id
        id: ConnectionId,
        /// Whether the pointer is over it
        hovered: bool,
    },
    /// The connection being dragged out of an anchor
    Draft,
}

/// Surface for straight lines in screen space.
pub trait VectorSurface {
    /// Removes every line.
    fn clear(&mut self);

    /// Draws a directed line from `from` to `to`.
    fn draw_line(&mut self, from: Point, to: Point, kind: LineKind);
}

/// The three surfaces rendered by one redraw.
pub struct Layers<'a> {
    /// Freehand strokes
    pub strokes: &'a mut dyn RasterSurface,
    /// Connection lines
    pub connections: &'a mut dyn VectorSurface,
    /// Node boxes
    pub nodes: &'a mut dyn NodeSurface,
}

/// Re-renders every layer from editor state.
#[derive(Debug, Default)]
pub struct RenderCoordinator {
    size: Option<(u32, u32)>,
}

impl RenderCoordinator {
    /// Creates a coordinator that has not seen a surface size yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last surface size seen, if any.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Resizes the raster surface when the container size changed.
    ///
    /// # Returns
    ///
    /// `true` if the surface was resized. The caller must redraw afterwards.
    pub fn resize_surfaces(&mut self, width: u32, height: u32, raster: &mut dyn RasterSurface) -> bool {
        if self.size == Some((width, height)) {
            return false;
        }
        debug!("surfaces resized to {width}x{height}");
        self.size = Some((width, height));
        raster.resize(width, height);
        true
    }

    /// Redraws all three layers.
    pub fn redraw(&self, editor: &Editor, layers: &mut Layers<'_>) {
        let viewport = editor.viewport();
        draw_strokes(editor.strokes(), viewport, layers.strokes);

        let draft = editor.connection_draft().and_then(|draft| {
            let node = editor.store().node(&draft.from)?;
            let start = GraphStore::anchor_world_position(node, draft.from_anchor);
            Some((viewport.to_screen(start), draft.pointer_screen_pos))
        });
        draw_connections(editor.store(), viewport, editor.hovered_connection(), draft, layers.connections);

        let hovered = editor.hovered_node();
        draw_nodes(editor.store(), viewport, hovered.as_ref(), layers.nodes);
    }
}

/// Clears `surface` and strokes every committed stroke and the open one.
///
/// Width is divided by zoom so strokes keep a constant screen thickness.
pub fn draw_strokes(strokes: &StrokeLayer, viewport: &ViewportState, surface: &mut dyn RasterSurface) {
    let zoom = viewport.zoom_factor();
    surface.clear();
    surface.set_transform(zoom, viewport.pan_offset());
    surface.set_line_width(STROKE_SCREEN_WIDTH / zoom);
    surface.set_line_join(LineJoin::Round);
    surface.set_line_cap(LineCap::Round);

    for stroke in strokes.history().iter().chain(strokes.current()) {
        if stroke.len() >= 2 {
            surface.stroke_path(stroke.points());
        }
    }
}

/// Clears `surface` and draws every connection, plus the draft line if any.
pub fn draw_connections(
    store: &GraphStore,
    viewport: &ViewportState,
    hovered: Option<&ConnectionId>,
    draft: Option<(Point, Point)>,
    surface: &mut dyn VectorSurface,
) {
    surface.clear();
    for connection in store.connections() {
        let Some((start, end)) = store.connection_endpoints(connection) else {
            warn!("connection {} has a missing endpoint", connection.id);
            continue;
        };
        surface.draw_line(
            viewport.to_screen(start),
            viewport.to_screen(end),
            LineKind::Connection {
                id: connection.id.clone(),
                hovered: hovered == Some(&connection.id),
            },
        );
    }
    if let Some((from, to)) = draft {
        surface.draw_line(from, to, LineKind::Draft);
    }
}

/// Clears `surface` and places one box per node in paint order.
pub fn draw_nodes(store: &GraphStore, viewport: &ViewportState, hovered: Option<&NodeId>, surface: &mut dyn NodeSurface) {
    surface.clear();
    for node in store.nodes() {
        surface.place_node(NodeBox {
            id: node.id.clone(),
            rect: viewport.rect_to_screen(&node.rect()),
            content: node.content.clone(),
            selected: node.selected,
            pending_source: store.pending_source() == Some(&node.id),
            show_handles: node.selected || hovered == Some(&node.id),
            zoom: viewport.zoom_factor(),
        });
    }
}

/// Failures of off-screen stroke rendering.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The pixmap could not be allocated
    #[error("cannot allocate a {width}x{height} pixmap")]
    InvalidSize {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
    /// PNG encoding failed
    #[error("failed to encode PNG: {0}")]
    Encode(String),
    /// The encoded image could not be written
    #[error("failed to write PNG: {0}")]
    Io(#[from] std::io::Error),
}

/// Off-screen raster surface backed by a tiny-skia pixmap.
///
/// Strokes are painted opaque red with anti-aliasing on a transparent background.
#[derive(Debug)]
pub struct PixmapRasterSurface {
    pixmap: Pixmap,
    transform: Transform,
    stroke: tiny_skia::Stroke,
}

impl PixmapRasterSurface {
    /// Allocates a transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self, SnapshotError> {
        let pixmap = Pixmap::new(width, height).ok_or(SnapshotError::InvalidSize { width, height })?;
        Ok(Self {
            pixmap,
            transform: Transform::identity(),
            stroke: tiny_skia::Stroke::default(),
        })
    }

    /// The backing pixmap.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Encodes the current contents as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, SnapshotError> {
        self.pixmap
            .encode_png()
            .map_err(|e| SnapshotError::Encode(e.to_string()))
    }
}

impl RasterSurface for PixmapRasterSurface {
    fn resize(&mut self, width: u32, height: u32) {
        match Pixmap::new(width.max(1), height.max(1)) {
            Some(pixmap) => self.pixmap = pixmap,
            None => warn!("cannot resize pixmap to {width}x{height}"),
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    fn set_transform(&mut self, zoom: f32, pan: Point) {
        self.transform = Transform::from_translate(pan.x, pan.y).post_scale(zoom, zoom);
    }

    fn set_line_width(&mut self, width: f32) {
        self.stroke.width = width;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.stroke.line_join = match join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        };
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.stroke.line_cap = match cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        };
    }

    fn stroke_path(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x, first.y);
        for point in rest {
            pb.line_to(point.x, point.y);
        }
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 0, 0, 255);
        paint.anti_alias = true;
        self.pixmap.stroke_path(&path, &paint, &self.stroke, self.transform, None);
    }
}

/// Renders the stroke layer as seen through `viewport` into a PNG.
pub fn snapshot_strokes_png(
    strokes: &StrokeLayer,
    viewport: &ViewportState,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, SnapshotError> {
    let mut surface = PixmapRasterSurface::new(width, height)?;
    draw_strokes(strokes, viewport, &mut surface);
    surface.encode_png()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Modifiers;
    use crate::geometry::Anchor;
    use crate::mode::InteractionMode;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    enum RasterOp {
        Transform(f32, Point),
        Width(f32),
        Join(LineJoin),
        Cap(LineCap),
        Path(Vec<Point>),
    }

    #[derive(Default)]
    struct RecordingRaster {
        size: (u32, u32),
        ops: Vec<RasterOp>,
    }

    impl RasterSurface for RecordingRaster {
        fn resize(&mut self, width: u32, height: u32) {
            self.size = (width, height);
            self.ops.clear();
        }
        fn size(&self) -> (u32, u32) {
            self.size
        }
        fn clear(&mut self) {
            self.ops.clear();
        }
        fn set_transform(&mut self, zoom: f32, pan: Point) {
            self.ops.push(RasterOp::Transform(zoom, pan));
        }
        fn set_line_width(&mut self, width: f32) {
            self.ops.push(RasterOp::Width(width));
        }
        fn set_line_join(&mut self, join: LineJoin) {
            self.ops.push(RasterOp::Join(join));
        }
        fn set_line_cap(&mut self, cap: LineCap) {
            self.ops.push(RasterOp::Cap(cap));
        }
        fn stroke_path(&mut self, points: &[Point]) {
            self.ops.push(RasterOp::Path(points.to_vec()));
        }
    }

    #[derive(Default)]
    struct RecordingNodes(Vec<NodeBox>);

    impl NodeSurface for RecordingNodes {
        fn clear(&mut self) {
            self.0.clear();
        }
        fn place_node(&mut self, node: NodeBox) {
            self.0.push(node);
        }
    }

    #[derive(Default)]
    struct RecordingLines(Vec<(Point, Point, LineKind)>);

    impl VectorSurface for RecordingLines {
        fn clear(&mut self) {
            self.0.clear();
        }
        fn draw_line(&mut self, from: Point, to: Point, kind: LineKind) {
            self.0.push((from, to, kind));
        }
    }

    fn sample_editor() -> Editor {
        let mut editor = Editor::new();
        let a = editor.store_mut().add_node(Point::new(0.0, 0.0));
        let b = editor.store_mut().add_node(Point::new(300.0, 0.0));
        editor.store_mut().add_connection(&a, Anchor::Right, &b, Anchor::Left);

        editor.select_tool(InteractionMode::Drawing);
        editor.pointer_down(Point::new(10.0, 200.0), Modifiers::default());
        editor.pointer_move(Point::new(60.0, 220.0));
        editor.pointer_up(Point::new(90.0, 260.0));
        editor.wheel(Point::new(100.0, 100.0), 1.0);
        editor
    }

    #[test]
    fn redraw_is_idempotent() {
        let editor = sample_editor();
        let coordinator = RenderCoordinator::new();
        let mut raster = RecordingRaster::default();
        let mut nodes = RecordingNodes::default();
        let mut lines = RecordingLines::default();

        let mut layers = Layers {
            strokes: &mut raster,
            connections: &mut lines,
            nodes: &mut nodes,
        };
        coordinator.redraw(&editor, &mut layers);
        let first = (raster.ops.clone(), nodes.0.clone(), lines.0.clone());

        let mut layers = Layers {
            strokes: &mut raster,
            connections: &mut lines,
            nodes: &mut nodes,
        };
        coordinator.redraw(&editor, &mut layers);

        assert_eq!((raster.ops, nodes.0, lines.0), first);
    }

    #[test]
    fn stroke_width_scales_inversely_with_zoom() {
        let mut strokes = StrokeLayer::new();
        strokes.begin_stroke(Point::ZERO, InteractionMode::Drawing);
        strokes.extend_stroke(Point::new(5.0, 5.0));
        strokes.commit_stroke();
        let viewport = ViewportState::new(4.0, Point::new(1.0, 2.0));
        let mut raster = RecordingRaster::default();

        draw_strokes(&strokes, &viewport, &mut raster);

        assert_eq!(
            raster.ops,
            vec![
                RasterOp::Transform(4.0, Point::new(1.0, 2.0)),
                RasterOp::Width(0.5),
                RasterOp::Join(LineJoin::Round),
                RasterOp::Cap(LineCap::Round),
                RasterOp::Path(vec![Point::ZERO, Point::new(5.0, 5.0)]),
            ]
        );
    }

    #[test]
    fn connection_endpoints_follow_node_moves() {
        let mut editor = sample_editor();
        editor.reset_view();
        let id = editor.store().nodes()[1].id.clone();
        editor.store_mut().move_node(&id, 400.0, 100.0);
        let mut lines = RecordingLines::default();

        draw_connections(editor.store(), editor.viewport(), None, None, &mut lines);

        assert_eq!(lines.0.len(), 1);
        assert_eq!(lines.0[0].0, Point::new(150.0, 50.0));
        assert_eq!(lines.0[0].1, Point::new(400.0, 150.0));
    }

    #[test]
    fn draft_line_starts_at_source_anchor() {
        let mut editor = Editor::new();
        editor.store_mut().add_node(Point::new(0.0, 0.0));
        editor.pointer_down(Point::new(75.0, 100.0), Modifiers::default());
        editor.pointer_move(Point::new(200.0, 300.0));

        let coordinator = RenderCoordinator::new();
        let mut raster = RecordingRaster::default();
        let mut nodes = RecordingNodes::default();
        let mut lines = RecordingLines::default();
        coordinator.redraw(
            &editor,
            &mut Layers {
                strokes: &mut raster,
                connections: &mut lines,
                nodes: &mut nodes,
            },
        );

        assert_eq!(lines.0, vec![(Point::new(75.0, 100.0), Point::new(200.0, 300.0), LineKind::Draft)]);
    }

    #[test]
    fn node_boxes_use_screen_space() {
        let mut editor = Editor::new();
        editor.store_mut().add_node(Point::new(10.0, 20.0));
        let viewport = ViewportState::new(2.0, Point::new(5.0, 0.0));
        let mut nodes = RecordingNodes::default();

        draw_nodes(editor.store(), &viewport, None, &mut nodes);

        let placed = &nodes.0[0];
        assert_eq!(placed.rect.min, Point::new(30.0, 40.0));
        assert_eq!(placed.rect.max, Point::new(330.0, 240.0));
        assert!(!placed.show_handles);
        assert_eq!(placed.zoom, 2.0);
    }

    #[test]
    fn resize_only_on_size_change() {
        let mut coordinator = RenderCoordinator::new();
        let mut raster = RecordingRaster::default();
        assert!(coordinator.resize_surfaces(640, 480, &mut raster));
        assert!(!coordinator.resize_surfaces(640, 480, &mut raster));
        assert!(coordinator.resize_surfaces(800, 600, &mut raster));
        assert_eq!(raster.size(), (800, 600));
    }

    #[test]
    fn pixmap_redraw_is_pixel_identical() {
        let editor = sample_editor();
        let mut surface = PixmapRasterSurface::new(400, 400).unwrap();

        draw_strokes(editor.strokes(), editor.viewport(), &mut surface);
        let first = surface.pixmap().data().to_vec();
        draw_strokes(editor.strokes(), editor.viewport(), &mut surface);

        assert!(first.iter().any(|&byte| byte != 0));
        assert!(first == surface.pixmap().data());
    }

    #[test]
    fn pixmap_paints_at_screen_position() {
        let mut strokes = StrokeLayer::new();
        strokes.begin_stroke(Point::new(0.0, 10.0), InteractionMode::Drawing);
        strokes.extend_stroke(Point::new(50.0, 10.0));
        strokes.commit_stroke();
        let viewport = ViewportState::new(2.0, Point::ZERO);
        let mut surface = PixmapRasterSurface::new(120, 60).unwrap();

        draw_strokes(&strokes, &viewport, &mut surface);

        let on_line = surface.pixmap().pixel(50, 20).unwrap();
        assert_eq!(on_line.red(), 255);
        assert_eq!(on_line.alpha(), 255);
        let off_line = surface.pixmap().pixel(50, 40).unwrap();
        assert_eq!(off_line.alpha(), 0);
    }

    #[test]
    fn snapshot_encodes_png() {
        let editor = sample_editor();
        let bytes = snapshot_strokes_png(editor.strokes(), editor.viewport(), 64, 64).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        assert!(matches!(
            snapshot_strokes_png(editor.strokes(), editor.viewport(), 0, 10),
            Err(SnapshotError::InvalidSize { width: 0, height: 10 })
        ));
    }
}
