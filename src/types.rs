//! Core data types for the whiteboard graph.
//!
//! This module defines the entities stored by the graph store: nodes, the
//! directional connections between them and the identifiers that name both.

use crate::constants::{NODE_HEIGHT, NODE_PLACEHOLDER, NODE_WIDTH};
use crate::geometry::{Anchor, Point, Rect};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for whiteboard nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

/// Unique identifier for connections between nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Borrows the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(NodeId);
string_id!(ConnectionId);

/// Produces identifiers of the form `<prefix>-<millis>-<sequence>`.
///
/// The sequence number increases on every call, so two ids minted in the same
/// millisecond still differ. The timestamp never goes backwards even if the
/// system clock does.
#[derive(Debug, Default)]
pub struct IdGenerator {
    sequence: u64,
    last_millis: u128,
}

impl IdGenerator {
    /// Creates a generator starting at sequence zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self, prefix: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        self.last_millis = self.last_millis.max(now);
        let sequence = self.sequence;
        self.sequence += 1;
        format!("{prefix}-{}-{sequence}", self.last_millis)
    }

    /// Mints a fresh node id.
    pub fn next_node_id(&mut self) -> NodeId {
        NodeId(self.next("node"))
    }

    /// Mints a fresh connection id.
    pub fn next_connection_id(&mut self) -> ConnectionId {
        ConnectionId(self.next("conn"))
    }
}

/// A resizable text box placed on the canvas.
///
/// Position and size are in world units; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Left edge in world space
    pub x: f32,
    /// Top edge in world space
    pub y: f32,
    /// Width in world units, never below `MIN_NODE_SIZE`
    pub width: f32,
    /// Height in world units, never below `MIN_NODE_SIZE`
    pub height: f32,
    /// Free-form text shown inside the node
    pub content: String,
    /// Whether this node is the current selection
    pub selected: bool,
}

impl Node {
    /// Creates a node with the default size and placeholder content.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier minted by the store's [`IdGenerator`]
    /// * `position` - World position of the top-left corner
    ///
    /// # Returns
    ///
    /// An unselected node of `NODE_WIDTH` x `NODE_HEIGHT`.
    pub fn new(id: NodeId, position: Point) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
            content: NODE_PLACEHOLDER.to_string(),
            selected: false,
        }
    }

    /// Top-left corner in world space.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// World-space bounds of the node.
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position(), self.width, self.height)
    }
}

/// A directional link from an anchor of one node to an anchor of another.
///
/// Only the endpoints' node ids and anchors are stored. The world positions of
/// the line ends are derived from the current node geometry at draw time.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// ID of the source node
    pub from: NodeId,
    /// ID of the destination node
    pub to: NodeId,
    /// Edge of the source node the line leaves from
    pub from_anchor: Anchor,
    /// Edge of the destination node the line arrives at
    pub to_anchor: Anchor,
}

impl Connection {
    /// Returns `true` if either endpoint is `node_id`.
    pub fn touches(&self, node_id: &NodeId) -> bool {
        self.from == *node_id || self.to == *node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_node_creation() {
        let node = Node::new(NodeId::from("node-a"), Point::new(100.0, 200.0));

        assert_eq!(node.position(), Point::new(100.0, 200.0));
        assert_eq!(node.width, NODE_WIDTH);
        assert_eq!(node.height, NODE_HEIGHT);
        assert_eq!(node.content, NODE_PLACEHOLDER);
        assert!(!node.selected);
    }

    #[test]
    fn test_node_rect() {
        let node = Node::new(NodeId::from("node-a"), Point::new(-10.0, 5.0));
        let rect = node.rect();

        assert_eq!(rect.min, Point::new(-10.0, 5.0));
        assert_eq!(rect.max, Point::new(140.0, 105.0));
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut ids = IdGenerator::new();
        let minted: HashSet<NodeId> = (0..1000).map(|_| ids.next_node_id()).collect();
        assert_eq!(minted.len(), 1000);
    }

    #[test]
    fn test_id_prefixes() {
        let mut ids = IdGenerator::new();
        assert!(ids.next_node_id().as_str().starts_with("node-"));
        assert!(ids.next_connection_id().as_str().starts_with("conn-"));
    }

    #[test]
    fn test_connection_touches() {
        let connection = Connection {
            id: ConnectionId::from("conn-1"),
            from: NodeId::from("a"),
            to: NodeId::from("b"),
            from_anchor: Anchor::Right,
            to_anchor: Anchor::Left,
        };

        assert!(connection.touches(&NodeId::from("a")));
        assert!(connection.touches(&NodeId::from("b")));
        assert!(!connection.touches(&NodeId::from("c")));
    }
}
