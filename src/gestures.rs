//! Per-gesture controllers for panning, drawing, dragging, resizing and
//! connecting.
//!
//! A gesture lives from pointer-down to pointer-up (or pointer-leave). Each
//! controller captures its start pointer position and the value it is about to
//! change, and every update recomputes the result from that captured start
//! value. Per-event deltas are never accumulated, so there is no drift.
//!
//! While a gesture is alive it holds a [`CaptureGuard`]. Dropping the gesture,
//! whichever way it ends, releases the capture.

use crate::constants::MIN_NODE_SIZE;
use crate::geometry::{Anchor, Point, Rect};
use crate::graph::GraphStore;
use crate::strokes::StrokeLayer;
use crate::types::{ConnectionId, NodeId};
use crate::viewport::ViewportState;
use std::cell::Cell;
use std::rc::Rc;

/// Registry of pointer captures held by running gestures.
///
/// This plays the role of the surface-wide pointer listeners a gesture attaches
/// so it keeps receiving moves even when the pointer leaves the node it started
/// on. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct PointerCapture {
    active: Rc<Cell<usize>>,
}

impl PointerCapture {
    /// Creates a registry with no active captures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a capture that lasts until the returned guard is dropped.
    pub fn acquire(&self) -> CaptureGuard {
        self.active.set(self.active.get() + 1);
        CaptureGuard {
            active: Rc::clone(&self.active),
        }
    }

    /// Returns `true` while any gesture holds the pointer.
    pub fn is_captured(&self) -> bool {
        self.active.get() > 0
    }

    /// Number of live captures. Never more than one in practice.
    pub fn active_count(&self) -> usize {
        self.active.get()
    }
}

/// Scoped pointer capture. Released on drop.
#[derive(Debug)]
pub struct CaptureGuard {
    active: Rc<Cell<usize>>,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.active.set(self.active.get().saturating_sub(1));
    }
}

/// The corner handle grabbed by a resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeCorner {
    /// Top-left
    NorthWest,
    /// Top-right
    NorthEast,
    /// Bottom-left
    SouthWest,
    /// Bottom-right
    SouthEast,
}

impl ResizeCorner {
    /// All corners, in hit-testing order.
    pub const ALL: [ResizeCorner; 4] = [
        ResizeCorner::NorthWest,
        ResizeCorner::NorthEast,
        ResizeCorner::SouthWest,
        ResizeCorner::SouthEast,
    ];

    fn is_north(self) -> bool {
        matches!(self, ResizeCorner::NorthWest | ResizeCorner::NorthEast)
    }

    fn is_west(self) -> bool {
        matches!(self, ResizeCorner::NorthWest | ResizeCorner::SouthWest)
    }

    /// Position of this corner on `rect`.
    pub fn point(self, rect: &Rect) -> Point {
        let x = if self.is_west() { rect.min.x } else { rect.max.x };
        let y = if self.is_north() { rect.min.y } else { rect.max.y };
        Point::new(x, y)
    }
}

/// Pans the view by dragging the empty canvas.
#[derive(Debug, Clone)]
pub struct PanGesture {
    start_screen: Point,
    start_pan: Point,
}

impl PanGesture {
    /// Captures the pointer and the pan offset at pointer-down.
    pub fn start(screen: Point, viewport: &ViewportState) -> Self {
        Self {
            start_screen: screen,
            start_pan: viewport.pan_offset(),
        }
    }

    /// Sets the pan offset to the start value plus the world-space drag delta.
    pub fn update(&self, screen: Point, viewport: &mut ViewportState) {
        let delta = viewport.to_world_delta(screen - self.start_screen);
        viewport.set_pan_offset(self.start_pan + delta);
    }

    /// Restarts the drag from `screen` and the current pan offset.
    ///
    /// Called after the zoom changes mid-gesture, since the captured start
    /// values only hold for the zoom they were taken at.
    pub fn rebase(&mut self, screen: Point, viewport: &ViewportState) {
        self.start_screen = screen;
        self.start_pan = viewport.pan_offset();
    }
}

/// Draws a freehand stroke into the stroke layer.
#[derive(Debug, Clone, Default)]
pub struct DrawGesture;

impl DrawGesture {
    /// Appends the pointer position, converted to world space.
    pub fn update(&self, screen: Point, viewport: &ViewportState, strokes: &mut StrokeLayer) {
        strokes.extend_stroke(viewport.to_world(screen));
    }

    /// Commits the stroke (or discards it when it is too short).
    pub fn end(self, strokes: &mut StrokeLayer) -> bool {
        strokes.commit_stroke()
    }
}

/// What a finished node drag amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// The node was moved
    Moved,
    /// Pointer went down and up without moving; treat as a click
    Clicked,
}

/// Moves a node by dragging its body.
#[derive(Debug, Clone)]
pub struct NodeDragGesture {
    node: NodeId,
    start_screen: Point,
    start_position: Point,
    moved: bool,
}

impl NodeDragGesture {
    /// Captures the node's position at pointer-down.
    ///
    /// # Returns
    ///
    /// `None` if the node does not exist.
    pub fn start(node: &NodeId, screen: Point, store: &GraphStore) -> Option<Self> {
        let start_position = store.node(node)?.position();
        Some(Self {
            node: node.clone(),
            start_screen: screen,
            start_position,
            moved: false,
        })
    }

    /// The node being dragged.
    pub fn node(&self) -> &NodeId {
        &self.node
    }

    /// Places the node at its start position plus the world-space drag delta.
    pub fn update(&mut self, screen: Point, viewport: &ViewportState, store: &mut GraphStore) {
        let delta = viewport.to_world_delta(screen - self.start_screen);
        if delta == Point::ZERO && !self.moved {
            return;
        }
        self.moved = true;
        let target = self.start_position + delta;
        store.move_node(&self.node, target.x, target.y);
    }

    /// Restarts the drag from `screen` and the node's current position.
    pub fn rebase(&mut self, screen: Point, store: &GraphStore) {
        if let Some(node) = store.node(&self.node) {
            self.start_screen = screen;
            self.start_position = node.position();
        }
    }

    /// Finishes the drag and reports whether it was a move or a plain click.
    pub fn end(self) -> DragOutcome {
        if self.moved {
            DragOutcome::Moved
        } else {
            DragOutcome::Clicked
        }
    }
}

/// Resizes a node from one corner while the opposite corner stays put.
#[derive(Debug, Clone)]
pub struct ResizeGesture {
    node: NodeId,
    corner: ResizeCorner,
    start_screen: Point,
    start_rect: Rect,
}

impl ResizeGesture {
    /// Captures the node bounds at pointer-down.
    ///
    /// # Returns
    ///
    /// `None` if the node does not exist.
    pub fn start(node: &NodeId, corner: ResizeCorner, screen: Point, store: &GraphStore) -> Option<Self> {
        let start_rect = store.node(node)?.rect();
        Some(Self {
            node: node.clone(),
            corner,
            start_screen: screen,
            start_rect,
        })
    }

    /// The node being resized.
    pub fn node(&self) -> &NodeId {
        &self.node
    }

    /// The grabbed corner.
    pub fn corner(&self) -> ResizeCorner {
        self.corner
    }

    /// Computes the node bounds for a pointer at `screen`.
    ///
    /// East and south components grow with the delta, west and north ones
    /// shrink with it and shift the origin so the opposite corner is fixed.
    /// Both dimensions are clamped to the size floor before the origin is
    /// derived, so the fixed corner survives clamping too.
    pub fn resized_rect(&self, screen: Point, viewport: &ViewportState) -> Rect {
        let delta = viewport.to_world_delta(screen - self.start_screen);
        let start = &self.start_rect;

        let width = if self.corner.is_west() {
            start.width() - delta.x
        } else {
            start.width() + delta.x
        }
        .max(MIN_NODE_SIZE);
        let height = if self.corner.is_north() {
            start.height() - delta.y
        } else {
            start.height() + delta.y
        }
        .max(MIN_NODE_SIZE);

        let x = if self.corner.is_west() {
            start.max.x - width
        } else {
            start.min.x
        };
        let y = if self.corner.is_north() {
            start.max.y - height
        } else {
            start.min.y
        };

        Rect::from_min_size(Point::new(x, y), width, height)
    }

    /// Applies the resized bounds through the store's move and resize primitives.
    pub fn update(&self, screen: Point, viewport: &ViewportState, store: &mut GraphStore) {
        let rect = self.resized_rect(screen, viewport);
        store.resize_node(&self.node, rect.width(), rect.height());
        store.move_node(&self.node, rect.min.x, rect.min.y);
    }

    /// Restarts the resize from `screen` and the node's current bounds.
    pub fn rebase(&mut self, screen: Point, store: &GraphStore) {
        if let Some(node) = store.node(&self.node) {
            self.start_screen = screen;
            self.start_rect = node.rect();
        }
    }
}

/// The in-progress connection shown while dragging from an anchor handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDraft {
    /// Source node
    pub from: NodeId,
    /// Source anchor
    pub from_anchor: Anchor,
    /// Floating endpoint, in screen space
    pub pointer_screen_pos: Point,
}

/// Drags a new connection out of a node's anchor handle.
#[derive(Debug, Clone)]
pub struct ConnectGesture {
    draft: ConnectionDraft,
}

impl ConnectGesture {
    /// Starts a draft at the given source anchor.
    pub fn start(from: &NodeId, from_anchor: Anchor, screen: Point) -> Self {
        Self {
            draft: ConnectionDraft {
                from: from.clone(),
                from_anchor,
                pointer_screen_pos: screen,
            },
        }
    }

    /// The draft being dragged.
    pub fn draft(&self) -> &ConnectionDraft {
        &self.draft
    }

    /// Moves the floating endpoint.
    pub fn update(&mut self, screen: Point) {
        self.draft.pointer_screen_pos = screen;
    }

    /// Completes the draft onto `target`, the anchor under the pointer at release.
    ///
    /// # Returns
    ///
    /// The created connection, or `None` when there is no target, the target is
    /// the source node, or the store rejects the connection. The draft is
    /// consumed either way.
    pub fn finish(self, target: Option<(NodeId, Anchor)>, store: &mut GraphStore) -> Option<ConnectionId> {
        let (to, to_anchor) = target?;
        if to == self.draft.from {
            return None;
        }
        store.add_connection(&self.draft.from, self.draft.from_anchor, &to, to_anchor)
    }
}

/// The controller that owns the current gesture.
#[derive(Debug, Clone)]
pub enum Gesture {
    /// Panning the canvas
    Pan(PanGesture),
    /// Drawing a stroke
    Draw(DrawGesture),
    /// Dragging a node body
    NodeDrag(NodeDragGesture),
    /// Resizing a node from a corner
    Resize(ResizeGesture),
    /// Dragging out a connection
    Connect(ConnectGesture),
}

/// A running gesture together with the pointer capture it holds.
#[derive(Debug)]
pub struct ActiveGesture {
    /// The controller receiving pointer updates
    pub gesture: Gesture,
    _capture: CaptureGuard,
}

impl ActiveGesture {
    /// Acquires a capture from `capture` for `gesture`.
    pub fn new(gesture: Gesture, capture: &PointerCapture) -> Self {
        Self {
            gesture,
            _capture: capture.acquire(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::InteractionMode;

    fn store_with_node(x: f32, y: f32) -> (GraphStore, NodeId) {
        let mut store = GraphStore::new();
        let id = store.add_node(Point::new(x, y));
        (store, id)
    }

    #[test]
    fn capture_released_on_drop() {
        let capture = PointerCapture::new();
        {
            let _active = ActiveGesture::new(
                Gesture::Pan(PanGesture::start(Point::ZERO, &ViewportState::default())),
                &capture,
            );
            assert!(capture.is_captured());
            assert_eq!(capture.active_count(), 1);
        }
        assert!(!capture.is_captured());
    }

    #[test]
    fn pan_gesture_uses_start_value() {
        let mut viewport = ViewportState::new(2.0, Point::new(5.0, 5.0));
        let gesture = PanGesture::start(Point::new(100.0, 100.0), &viewport);

        gesture.update(Point::new(110.0, 100.0), &mut viewport);
        gesture.update(Point::new(120.0, 140.0), &mut viewport);

        assert_eq!(viewport.pan_offset(), Point::new(15.0, 25.0));
    }

    #[test]
    fn node_drag_scales_delta_by_zoom() {
        let (mut store, id) = store_with_node(100.0, 100.0);
        let viewport = ViewportState::new(2.0, Point::ZERO);
        let mut drag = NodeDragGesture::start(&id, Point::new(300.0, 300.0), &store).unwrap();

        drag.update(Point::new(310.0, 305.0), &viewport, &mut store);
        drag.update(Point::new(320.0, 320.0), &viewport, &mut store);

        assert_eq!(store.node(&id).unwrap().position(), Point::new(110.0, 110.0));
        assert_eq!(drag.end(), DragOutcome::Moved);
    }

    #[test]
    fn node_drag_without_movement_is_click() {
        let (mut store, id) = store_with_node(0.0, 0.0);
        let viewport = ViewportState::default();
        let mut drag = NodeDragGesture::start(&id, Point::new(10.0, 10.0), &store).unwrap();

        drag.update(Point::new(10.0, 10.0), &viewport, &mut store);

        assert_eq!(drag.end(), DragOutcome::Clicked);
        assert_eq!(store.node(&id).unwrap().position(), Point::ZERO);
    }

    #[test]
    fn node_drag_on_missing_node_does_not_start() {
        let store = GraphStore::new();
        assert!(NodeDragGesture::start(&NodeId::from("nope"), Point::ZERO, &store).is_none());
    }

    #[test]
    fn resize_south_east_grows_with_delta() {
        let (mut store, id) = store_with_node(0.0, 0.0);
        let viewport = ViewportState::default();
        let resize = ResizeGesture::start(&id, ResizeCorner::SouthEast, Point::new(150.0, 100.0), &store).unwrap();

        resize.update(Point::new(180.0, 140.0), &viewport, &mut store);

        let node = store.node(&id).unwrap();
        assert_eq!(node.position(), Point::ZERO);
        assert_eq!((node.width, node.height), (180.0, 140.0));
    }

    #[test]
    fn resize_north_west_keeps_opposite_corner() {
        let (mut store, id) = store_with_node(100.0, 100.0);
        let viewport = ViewportState::new(2.0, Point::ZERO);
        let resize = ResizeGesture::start(&id, ResizeCorner::NorthWest, Point::new(200.0, 200.0), &store).unwrap();

        // Screen delta (-40, -20) at zoom 2 is (-20, -10) in world units
        resize.update(Point::new(160.0, 180.0), &viewport, &mut store);

        let rect = store.node(&id).unwrap().rect();
        assert_eq!(rect.min, Point::new(80.0, 90.0));
        assert_eq!(rect.max, Point::new(250.0, 200.0));
    }

    #[test]
    fn resize_floor_keeps_fixed_corner() {
        let (mut store, id) = store_with_node(0.0, 0.0);
        let viewport = ViewportState::default();

        for corner in ResizeCorner::ALL {
            store.resize_node(&id, 150.0, 100.0);
            store.move_node(&id, 0.0, 0.0);
            let start_rect = store.node(&id).unwrap().rect();
            let fixed = match corner {
                ResizeCorner::NorthWest => ResizeCorner::SouthEast,
                ResizeCorner::NorthEast => ResizeCorner::SouthWest,
                ResizeCorner::SouthWest => ResizeCorner::NorthEast,
                ResizeCorner::SouthEast => ResizeCorner::NorthWest,
            }
            .point(&start_rect);

            let grab = corner.point(&start_rect);
            let resize = ResizeGesture::start(&id, corner, grab, &store).unwrap();
            for (dx, dy) in [(-1000.0, -1000.0), (1000.0, -1000.0), (-1000.0, 1000.0), (1000.0, 1000.0), (3.0, -7.0)] {
                resize.update(grab + Point::new(dx, dy), &viewport, &mut store);
                let node = store.node(&id).unwrap();
                assert!(node.width >= MIN_NODE_SIZE && node.height >= MIN_NODE_SIZE);
                let opposite = match corner {
                    ResizeCorner::NorthWest => ResizeCorner::SouthEast,
                    ResizeCorner::NorthEast => ResizeCorner::SouthWest,
                    ResizeCorner::SouthWest => ResizeCorner::NorthEast,
                    ResizeCorner::SouthEast => ResizeCorner::NorthWest,
                };
                assert_eq!(opposite.point(&node.rect()), fixed, "{corner:?} {dx} {dy}");
            }
        }
    }

    #[test]
    fn connect_gesture_requires_other_node() {
        let mut store = GraphStore::new();
        let a = store.add_node(Point::ZERO);
        let b = store.add_node(Point::new(300.0, 0.0));

        let mut gesture = ConnectGesture::start(&a, Anchor::Right, Point::new(150.0, 50.0));
        gesture.update(Point::new(250.0, 60.0));
        assert_eq!(gesture.draft().pointer_screen_pos, Point::new(250.0, 60.0));
        assert!(gesture.clone().finish(None, &mut store).is_none());
        assert!(gesture.clone().finish(Some((a.clone(), Anchor::Left)), &mut store).is_none());
        assert!(store.connections().is_empty());

        let id = gesture.finish(Some((b.clone(), Anchor::Left)), &mut store).unwrap();
        let connection = store.connection(&id).unwrap();
        assert_eq!((connection.from_anchor, connection.to_anchor), (Anchor::Right, Anchor::Left));
    }

    #[test]
    fn draw_gesture_converts_to_world() {
        let mut strokes = StrokeLayer::new();
        let viewport = ViewportState::new(2.0, Point::new(10.0, 0.0));
        strokes.begin_stroke(viewport.to_world(Point::new(20.0, 20.0)), InteractionMode::Drawing);

        let gesture = DrawGesture;
        gesture.update(Point::new(40.0, 20.0), &viewport, &mut strokes);
        assert!(gesture.end(&mut strokes));

        assert_eq!(
            strokes.history()[0].points(),
            &[Point::new(0.0, 10.0), Point::new(10.0, 10.0)]
        );
    }
}
