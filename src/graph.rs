//! Node/connection graph store.
//!
//! The store is the single authority over node and connection state. It keeps
//! the invariants that callers cannot be trusted with: ids are unique, at most
//! one node is selected, node sizes never drop below the floor, and deleting a
//! node never leaves a connection pointing at it.
//!
//! Every operation is total. Unknown ids and invalid requests are ignored and
//! reported through the return value instead of an error.

use crate::constants::MIN_NODE_SIZE;
use crate::geometry::{anchor_point, point_to_segment_distance, Anchor, Point};
use crate::types::{Connection, ConnectionId, IdGenerator, Node, NodeId};
use log::{debug, info};
use std::sync::mpsc::Sender;

/// Notifications emitted by the store to an optional observer.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// The selected node changed (`None` means nothing is selected)
    SelectionChanged(Option<NodeId>),
    /// A node was created
    NodeAdded(NodeId),
    /// A node was removed, along with the listed connections
    NodeDeleted {
        /// The removed node
        node: NodeId,
        /// Connections removed by the cascade
        connections: Vec<ConnectionId>,
    },
    /// A connection was created
    ConnectionAdded(ConnectionId),
    /// A connection was removed explicitly
    ConnectionDeleted(ConnectionId),
}

/// Authoritative node and connection state.
#[derive(Debug, Default)]
pub struct GraphStore {
    /// Nodes in paint order; the last node is drawn on top.
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    ids: IdGenerator,
    /// Source picked by the first click of the click-to-connect workflow.
    pending_source: Option<NodeId>,
    observer: Option<Sender<GraphEvent>>,
}

impl GraphStore {
    /// Creates an empty store without an observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that reports changes on `observer`.
    pub fn with_observer(observer: Sender<GraphEvent>) -> Self {
        Self {
            observer: Some(observer),
            ..Self::default()
        }
    }

    /// Installs or replaces the change observer.
    pub fn set_observer(&mut self, observer: Sender<GraphEvent>) {
        self.observer = Some(observer);
    }

    fn notify(&mut self, event: GraphEvent) {
        if let Some(observer) = &self.observer {
            // A dropped receiver only means nobody is listening any more
            if observer.send(event).is_err() {
                self.observer = None;
            }
        }
    }

    /// All nodes in paint order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All connections in creation order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == *id)
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == *id)
    }

    /// Looks up a connection by id.
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|connection| connection.id == *id)
    }

    /// The selected node, if any.
    pub fn selected_node(&self) -> Option<&NodeId> {
        self.nodes.iter().find(|node| node.selected).map(|node| &node.id)
    }

    /// Source node recorded by the first click of click-to-connect.
    pub fn pending_source(&self) -> Option<&NodeId> {
        self.pending_source.as_ref()
    }

    /// Creates a node with the default size at `position` (its top-left corner).
    ///
    /// # Returns
    ///
    /// The ID of the newly added node.
    pub fn add_node(&mut self, position: Point) -> NodeId {
        let id = self.ids.next_node_id();
        self.nodes.push(Node::new(id.clone(), position));
        info!("node {id} added at ({:.1}, {:.1})", position.x, position.y);
        self.notify(GraphEvent::NodeAdded(id.clone()));
        id
    }

    /// Selects exactly one node, or clears the selection when `id` is `None`.
    ///
    /// An id that does not exist leaves the selection untouched.
    ///
    /// # Returns
    ///
    /// `true` if the selection changed.
    pub fn select_node(&mut self, id: Option<&NodeId>) -> bool {
        if let Some(id) = id {
            if self.node(id).is_none() {
                return false;
            }
        }
        if self.selected_node() == id {
            return false;
        }

        for node in &mut self.nodes {
            node.selected = Some(&node.id) == id;
        }
        let selected = id.cloned();
        debug!("selection changed to {selected:?}");
        self.notify(GraphEvent::SelectionChanged(selected));
        true
    }

    /// Click-to-connect: records a pending source or completes a connection.
    ///
    /// - With no pending source, `id` becomes the pending source.
    /// - With a pending source equal to `id`, the pending source is cleared.
    /// - With a different pending source, a connection from it (right anchor)
    ///   to `id` (left anchor) is created and the pending source is cleared.
    ///
    /// # Returns
    ///
    /// The id of the connection created by the second click, if any.
    pub fn toggle_multi_select_anchor(&mut self, id: &NodeId) -> Option<ConnectionId> {
        if self.node(id).is_none() {
            return None;
        }
        match self.pending_source.take() {
            None => {
                debug!("click-to-connect source set to {id}");
                self.pending_source = Some(id.clone());
                None
            }
            Some(source) if source == *id => {
                debug!("click-to-connect cancelled on {id}");
                None
            }
            Some(source) => self.add_connection(&source, Anchor::Right, id, Anchor::Left),
        }
    }

    /// Forgets the pending click-to-connect source.
    pub fn clear_pending_source(&mut self) {
        self.pending_source = None;
    }

    /// Creates a connection between two existing, distinct nodes.
    ///
    /// Self-connections, unknown endpoints and exact duplicates (same nodes and
    /// anchors) are ignored.
    ///
    /// # Returns
    ///
    /// The id of the new connection, or `None` if nothing was created.
    pub fn add_connection(
        &mut self,
        from: &NodeId,
        from_anchor: Anchor,
        to: &NodeId,
        to_anchor: Anchor,
    ) -> Option<ConnectionId> {
        if from == to || self.node(from).is_none() || self.node(to).is_none() {
            return None;
        }
        let exists = self.connections.iter().any(|c| {
            c.from == *from && c.to == *to && c.from_anchor == from_anchor && c.to_anchor == to_anchor
        });
        if exists {
            return None;
        }

        let id = self.ids.next_connection_id();
        self.connections.push(Connection {
            id: id.clone(),
            from: from.clone(),
            to: to.clone(),
            from_anchor,
            to_anchor,
        });
        info!(
            "connection {id}: {from}.{} -> {to}.{}",
            from_anchor.name(),
            to_anchor.name()
        );
        self.notify(GraphEvent::ConnectionAdded(id.clone()));
        Some(id)
    }

    /// Moves a node's top-left corner. Positions are not clamped.
    pub fn move_node(&mut self, id: &NodeId, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        match self.node_mut(id) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => false,
        }
    }

    /// Resizes a node, clamping each dimension to `MIN_NODE_SIZE`.
    ///
    /// The top-left corner is unchanged; keeping another corner fixed is the
    /// job of the resize gesture.
    pub fn resize_node(&mut self, id: &NodeId, width: f32, height: f32) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.width = clamp_size(width);
                node.height = clamp_size(height);
                true
            }
            None => false,
        }
    }

    /// Replaces a node's content verbatim.
    pub fn edit_content(&mut self, id: &NodeId, text: impl Into<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.content = text.into();
                true
            }
            None => false,
        }
    }

    /// Removes a node and every connection that references it.
    ///
    /// Clears the selection and the pending click-to-connect source when they
    /// pointed at the removed node.
    ///
    /// # Returns
    ///
    /// `true` if the node existed.
    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        let Some(index) = self.nodes.iter().position(|node| node.id == *id) else {
            return false;
        };
        let node = self.nodes.remove(index);

        let mut removed = Vec::new();
        self.connections.retain(|connection| {
            if connection.touches(id) {
                removed.push(connection.id.clone());
                false
            } else {
                true
            }
        });

        if self.pending_source.as_ref() == Some(id) {
            self.pending_source = None;
        }

        info!("node {id} deleted with {} connection(s)", removed.len());
        self.notify(GraphEvent::NodeDeleted {
            node: id.clone(),
            connections: removed,
        });
        if node.selected {
            self.notify(GraphEvent::SelectionChanged(None));
        }
        true
    }

    /// Removes a connection.
    pub fn delete_connection(&mut self, id: &ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|connection| connection.id != *id);
        let removed = self.connections.len() != before;
        if removed {
            info!("connection {id} deleted");
            self.notify(GraphEvent::ConnectionDeleted(id.clone()));
        }
        removed
    }

    /// Midpoint of the requested edge of `node`, in world space.
    pub fn anchor_world_position(node: &Node, anchor: Anchor) -> Point {
        anchor_point(&node.rect(), anchor)
    }

    /// World-space endpoints of a connection, derived from current node geometry.
    ///
    /// # Returns
    ///
    /// `(start, end)`, or `None` if either node is missing.
    pub fn connection_endpoints(&self, connection: &Connection) -> Option<(Point, Point)> {
        let from = self.node(&connection.from)?;
        let to = self.node(&connection.to)?;
        Some((
            Self::anchor_world_position(from, connection.from_anchor),
            Self::anchor_world_position(to, connection.to_anchor),
        ))
    }

    /// Finds the topmost node whose bounds contain `position` (world space).
    pub fn node_at(&self, position: Point) -> Option<&NodeId> {
        self.nodes
            .iter()
            .rev()
            .find(|node| node.rect().contains(position))
            .map(|node| &node.id)
    }

    /// Finds the first connection passing within `tolerance` world units of `position`.
    pub fn connection_at(&self, position: Point, tolerance: f32) -> Option<&ConnectionId> {
        self.connections
            .iter()
            .find(|connection| {
                self.connection_endpoints(connection)
                    .map(|(start, end)| point_to_segment_distance(position, start, end) <= tolerance)
                    .unwrap_or(false)
            })
            .map(|connection| &connection.id)
    }
}

fn clamp_size(value: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_NODE_SIZE)
    } else {
        MIN_NODE_SIZE
    }
}
