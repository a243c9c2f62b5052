//! Pointer and keyboard dispatch for the whiteboard.
//!
//! [`Editor`] owns every piece of session state: the viewport, the graph store,
//! the stroke layer, the mode controller and the gesture in progress. Raw
//! pointer events come in through [`Editor::pointer_down`],
//! [`Editor::pointer_move`], [`Editor::pointer_up`] and
//! [`Editor::pointer_leave`] in screen coordinates relative to the surface
//! origin.
//!
//! Hits on a node always win over the canvas, whatever the mode. For each node,
//! topmost first, anchor handles are tested before resize handles, which are
//! tested before the body. Only a pointer-down on empty canvas consults the
//! [`InteractionMode`].

use crate::constants::{ANCHOR_HANDLE_RADIUS, CONNECTION_HIT_TOLERANCE, RESIZE_HANDLE_RADIUS};
use crate::geometry::{nearest_anchor, Anchor, Point};
use crate::gestures::{
    ActiveGesture, ConnectGesture, ConnectionDraft, DragOutcome, DrawGesture, Gesture, NodeDragGesture,
    PanGesture, PointerCapture, ResizeCorner, ResizeGesture,
};
use crate::graph::{GraphEvent, GraphStore};
use crate::mode::{InteractionMode, ModeController};
use crate::strokes::StrokeLayer;
use crate::types::{ConnectionId, NodeId};
use crate::viewport::ViewportState;
use log::{debug, info};
use std::sync::mpsc::Sender;

/// Keyboard modifiers held during a pointer press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Shift turns a node click into a click-to-connect step
    pub shift: bool,
}

/// What lies under a screen position.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    /// A connection anchor handle of a node
    AnchorHandle(NodeId, Anchor),
    /// A corner resize handle of a node
    ResizeHandle(NodeId, ResizeCorner),
    /// The body of a node
    NodeBody(NodeId),
    /// Empty canvas
    Canvas,
}

impl PointerTarget {
    /// The node hit, if any.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            PointerTarget::AnchorHandle(id, _)
            | PointerTarget::ResizeHandle(id, _)
            | PointerTarget::NodeBody(id) => Some(id),
            PointerTarget::Canvas => None,
        }
    }
}

/// The whiteboard editing session.
#[derive(Debug, Default)]
pub struct Editor {
    viewport: ViewportState,
    store: GraphStore,
    strokes: StrokeLayer,
    modes: ModeController,
    capture: PointerCapture,
    active: Option<ActiveGesture>,
    /// Modifiers held when the active gesture started
    press_modifiers: Modifiers,
    /// Last known pointer position over the surface
    hover: Option<Point>,
}

impl Editor {
    /// Creates an empty session in panning mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session whose store reports changes on `observer`.
    pub fn with_observer(observer: Sender<GraphEvent>) -> Self {
        Self {
            store: GraphStore::with_observer(observer),
            ..Self::default()
        }
    }

    /// The current view transform.
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Read access to the graph.
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Direct access to the graph, for the properties panel.
    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    /// The freehand stroke layer.
    pub fn strokes(&self) -> &StrokeLayer {
        &self.strokes
    }

    /// The selected tool.
    pub fn mode(&self) -> InteractionMode {
        self.modes.mode()
    }

    /// The pointer capture registry shared by gestures.
    pub fn capture(&self) -> &PointerCapture {
        &self.capture
    }

    /// The gesture currently owning the pointer.
    pub fn active_gesture(&self) -> Option<&Gesture> {
        self.active.as_ref().map(|active| &active.gesture)
    }

    /// Returns `true` while a gesture is in progress.
    pub fn is_gesture_active(&self) -> bool {
        self.active.is_some()
    }

    /// The connection being dragged out of an anchor, if any.
    pub fn connection_draft(&self) -> Option<&ConnectionDraft> {
        match self.active_gesture() {
            Some(Gesture::Connect(gesture)) => Some(gesture.draft()),
            _ => None,
        }
    }

    /// Last pointer position seen over the surface.
    pub fn hover_position(&self) -> Option<Point> {
        self.hover
    }

    /// What the pointer is currently over.
    pub fn hover_target(&self) -> PointerTarget {
        self.hover
            .map(|screen| self.hit_test(screen))
            .unwrap_or(PointerTarget::Canvas)
    }

    /// The node under the pointer, used to show its handles.
    pub fn hovered_node(&self) -> Option<NodeId> {
        self.hover_target().node().cloned()
    }

    /// The connection under the pointer, if the pointer is over empty canvas.
    pub fn hovered_connection(&self) -> Option<&ConnectionId> {
        let screen = self.hover?;
        if self.hit_test(screen) != PointerTarget::Canvas {
            return None;
        }
        let tolerance = CONNECTION_HIT_TOLERANCE / self.viewport.zoom_factor();
        self.store.connection_at(self.viewport.to_world(screen), tolerance)
    }

    /// Resolves what lies under `screen`.
    ///
    /// Handle radii are screen-space sizes, so they are converted to world units
    /// with the current zoom before testing. They never exceed a quarter of the
    /// node's shorter side, which keeps the body grabbable when zoomed far out.
    pub fn hit_test(&self, screen: Point) -> PointerTarget {
        let world = self.viewport.to_world(screen);
        let zoom = self.viewport.zoom_factor();

        for node in self.store.nodes().iter().rev() {
            let rect = node.rect();
            let handle_cap = rect.width().min(rect.height()) / 4.0;
            let anchor_radius = (ANCHOR_HANDLE_RADIUS / zoom).min(handle_cap);
            let resize_radius = (RESIZE_HANDLE_RADIUS / zoom).min(handle_cap);
            if let Some((anchor, _)) = nearest_anchor(&rect, world, anchor_radius) {
                return PointerTarget::AnchorHandle(node.id.clone(), anchor);
            }
            if let Some(corner) = ResizeCorner::ALL
                .into_iter()
                .find(|corner| corner.point(&rect).distance(world) <= resize_radius)
            {
                return PointerTarget::ResizeHandle(node.id.clone(), corner);
            }
            if rect.contains(world) {
                return PointerTarget::NodeBody(node.id.clone());
            }
        }
        PointerTarget::Canvas
    }

    /// Handles a pointer press.
    ///
    /// Ignored while another gesture is active.
    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
        self.hover = Some(screen);
        if self.active.is_some() {
            debug!("pointer down ignored: gesture already active");
            return;
        }

        let gesture = match self.hit_test(screen) {
            PointerTarget::AnchorHandle(node, anchor) => {
                debug!("connect gesture started from {node} {}", anchor.name());
                Some(Gesture::Connect(ConnectGesture::start(&node, anchor, screen)))
            }
            PointerTarget::ResizeHandle(node, corner) => {
                debug!("resize gesture started on {node} ({corner:?})");
                ResizeGesture::start(&node, corner, screen, &self.store).map(Gesture::Resize)
            }
            PointerTarget::NodeBody(node) => {
                debug!("drag gesture started on {node}");
                NodeDragGesture::start(&node, screen, &self.store).map(Gesture::NodeDrag)
            }
            PointerTarget::Canvas => self.canvas_pointer_down(screen),
        };

        if let Some(gesture) = gesture {
            self.press_modifiers = modifiers;
            self.active = Some(ActiveGesture::new(gesture, &self.capture));
        }
    }

    fn canvas_pointer_down(&mut self, screen: Point) -> Option<Gesture> {
        self.store.select_node(None);
        self.store.clear_pending_source();

        let world = self.viewport.to_world(screen);
        match self.modes.mode() {
            InteractionMode::Panning => Some(Gesture::Pan(PanGesture::start(screen, &self.viewport))),
            InteractionMode::Drawing => self
                .strokes
                .begin_stroke(world, InteractionMode::Drawing)
                .then_some(Gesture::Draw(DrawGesture)),
            InteractionMode::AddingNode => {
                self.store.add_node(world);
                self.modes.node_placed();
                None
            }
        }
    }

    /// Handles pointer movement over the surface.
    pub fn pointer_move(&mut self, screen: Point) {
        self.hover = Some(screen);
        let Some(active) = self.active.as_mut() else {
            return;
        };
        match &mut active.gesture {
            Gesture::Pan(gesture) => gesture.update(screen, &mut self.viewport),
            Gesture::Draw(gesture) => gesture.update(screen, &self.viewport, &mut self.strokes),
            Gesture::NodeDrag(gesture) => gesture.update(screen, &self.viewport, &mut self.store),
            Gesture::Resize(gesture) => gesture.update(screen, &self.viewport, &mut self.store),
            Gesture::Connect(gesture) => gesture.update(screen),
        }
    }

    /// Handles a pointer release, finishing the active gesture.
    pub fn pointer_up(&mut self, screen: Point) {
        self.pointer_move(screen);
        let Some(active) = self.active.take() else {
            return;
        };
        let modifiers = std::mem::take(&mut self.press_modifiers);

        match active.gesture {
            Gesture::Pan(_) | Gesture::Resize(_) => {}
            Gesture::Draw(gesture) => {
                gesture.end(&mut self.strokes);
            }
            Gesture::NodeDrag(gesture) => {
                let node = gesture.node().clone();
                if gesture.end() == DragOutcome::Clicked {
                    self.node_clicked(&node, modifiers);
                }
            }
            Gesture::Connect(gesture) => {
                let target = match self.hit_test(screen) {
                    PointerTarget::AnchorHandle(node, anchor) => Some((node, anchor)),
                    _ => None,
                };
                if gesture.finish(target, &mut self.store).is_none() {
                    debug!("connection draft discarded");
                }
            }
        }
    }

    /// Shift+click steps click-to-connect, a plain click toggles selection.
    fn node_clicked(&mut self, node: &NodeId, modifiers: Modifiers) {
        if modifiers.shift {
            self.store.toggle_multi_select_anchor(node);
        } else if self.store.selected_node() == Some(node) {
            self.store.select_node(None);
        } else {
            self.store.select_node(Some(node));
        }
    }

    /// Handles the pointer leaving the surface. Ends the gesture like a release
    /// that hit nothing, so a connection draft is discarded.
    pub fn pointer_leave(&mut self) {
        self.hover = None;
        self.cancel_gesture();
    }

    /// Ends any active gesture without completing a connection or a click.
    ///
    /// Moves, resizes and pans already applied are kept, and an open stroke is
    /// committed as drawn so far.
    pub fn cancel_gesture(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        self.press_modifiers = Modifiers::default();
        match active.gesture {
            Gesture::Draw(gesture) => {
                gesture.end(&mut self.strokes);
            }
            Gesture::Connect(_) => debug!("connection draft discarded"),
            Gesture::Pan(_) | Gesture::NodeDrag(_) | Gesture::Resize(_) => {}
        }
    }

    /// Applies one wheel event anchored at `screen`.
    ///
    /// A pan, drag or resize in progress is rebased on the new zoom, so the
    /// next pointer move continues from where things are now.
    pub fn wheel(&mut self, screen: Point, scroll_delta: f32) {
        self.viewport.zoom_by_wheel(screen, scroll_delta);

        let Some(active) = self.active.as_mut() else {
            return;
        };
        let pointer = self.hover.unwrap_or(screen);
        match &mut active.gesture {
            Gesture::Pan(gesture) => gesture.rebase(pointer, &self.viewport),
            Gesture::NodeDrag(gesture) => gesture.rebase(pointer, &self.store),
            Gesture::Resize(gesture) => gesture.rebase(pointer, &self.store),
            Gesture::Draw(_) | Gesture::Connect(_) => {}
        }
    }

    /// Switches tools. A gesture already in progress is unaffected.
    pub fn select_tool(&mut self, mode: InteractionMode) {
        self.modes.select_tool(mode);
    }

    /// Deletes the selected node and its connections.
    ///
    /// # Returns
    ///
    /// `true` if a node was deleted.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.store.selected_node().cloned() else {
            return false;
        };
        let targets_node = match self.active_gesture() {
            Some(Gesture::NodeDrag(gesture)) => gesture.node() == &id,
            Some(Gesture::Resize(gesture)) => gesture.node() == &id,
            Some(Gesture::Connect(gesture)) => gesture.draft().from == id,
            _ => false,
        };
        if targets_node {
            self.cancel_gesture();
        }
        self.store.delete_node(&id)
    }

    /// Restores zoom 1 and no pan.
    pub fn reset_view(&mut self) {
        info!("view reset");
        self.viewport.reset();
    }

    /// Removes every stroke.
    pub fn clear_strokes(&mut self) {
        info!("strokes cleared");
        self.strokes.clear();
    }
}
