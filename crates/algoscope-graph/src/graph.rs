//! Append-only undirected graph with positioned nodes.
//!
//! Node identifiers are handed out densely starting at 1 and are never
//! reused: there is no node removal. Edges are unordered pairs, unique per
//! pair, and may carry a weight for shortest-path inputs.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{EditError, Result};

/// Identifier of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point on the editing canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// A node and where it sits on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
}

/// An unordered connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub weight: Option<u32>,
}

impl Edge {
    /// Whether this edge joins `x` and `y` in either orientation.
    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }
}

/// One entry of a node's adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub node: NodeId,
    pub weight: u32,
}

/// Adjacency lists keyed by node, in edge insertion order.
pub type Adjacency = BTreeMap<NodeId, Vec<Neighbor>>;

/// The graph an editor builds and producers consume.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_id: u32,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            next_id: 1,
        }
    }

    /// Build a graph from literal node and edge lists.
    pub fn from_parts(nodes: &[(u32, f32, f32)], edges: &[(u32, u32, Option<u32>)]) -> Result<Self> {
        let mut graph = Self::new();
        for &(id, x, y) in nodes {
            graph.nodes.push(Node {
                id: NodeId(id),
                position: Position::new(x, y),
            });
            graph.next_id = graph.next_id.max(id + 1);
        }
        for &(a, b, weight) in edges {
            graph.add_edge(NodeId(a), NodeId(b), weight)?;
        }
        Ok(graph)
    }

    /// The four-node graph shown by the traversal visualizations.
    pub fn traversal_default() -> Self {
        Self {
            nodes: vec![
                Node { id: NodeId(1), position: Position::new(100.0, 150.0) },
                Node { id: NodeId(2), position: Position::new(250.0, 100.0) },
                Node { id: NodeId(3), position: Position::new(250.0, 200.0) },
                Node { id: NodeId(4), position: Position::new(400.0, 150.0) },
            ],
            edges: [(1, 2), (1, 3), (2, 3), (2, 4), (3, 4)]
                .into_iter()
                .map(|(a, b)| Edge { a: NodeId(a), b: NodeId(b), weight: None })
                .collect(),
            next_id: 5,
        }
    }

    /// The five-node weighted graph shown by the shortest-path visualization.
    pub fn weighted_default() -> Self {
        Self {
            nodes: vec![
                Node { id: NodeId(1), position: Position::new(100.0, 50.0) },
                Node { id: NodeId(2), position: Position::new(250.0, 150.0) },
                Node { id: NodeId(3), position: Position::new(100.0, 250.0) },
                Node { id: NodeId(4), position: Position::new(400.0, 50.0) },
                Node { id: NodeId(5), position: Position::new(400.0, 250.0) },
            ],
            edges: [(1, 2, 10), (1, 3, 3), (2, 3, 1), (2, 4, 2), (3, 5, 8), (2, 5, 4), (4, 5, 5)]
                .into_iter()
                .map(|(a, b, w)| Edge { a: NodeId(a), b: NodeId(b), weight: Some(w) })
                .collect(),
            next_id: 6,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Identifiers of all nodes in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    pub fn has_edge(&self, x: NodeId, y: NodeId) -> bool {
        self.edges.iter().any(|e| e.connects(x, y))
    }

    /// Append a node at `position` and return its fresh identifier.
    pub fn add_node(&mut self, position: Position) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(Node { id, position });
        id
    }

    /// Connect two nodes.
    ///
    /// Returns `Ok(false)` when the pair is already connected; the existing
    /// edge (and its weight) is left alone.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, weight: Option<u32>) -> Result<bool> {
        if !self.contains(a) {
            return Err(EditError::UnknownNode(a));
        }
        if !self.contains(b) {
            return Err(EditError::UnknownNode(b));
        }
        if a == b {
            return Err(EditError::SelfLoop(a));
        }
        if self.has_edge(a, b) {
            return Ok(false);
        }
        self.edges.push(Edge { a, b, weight });
        Ok(true)
    }

    /// Move a node. Identifiers and edges are untouched.
    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<()> {
        if !position.is_finite() {
            return Err(EditError::InvalidPosition);
        }
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(EditError::UnknownNode(id))?;
        node.position = position;
        Ok(())
    }

    /// Topmost node whose disc of `radius` contains `point`.
    pub fn node_at(&self, point: Position, radius: f32) -> Option<NodeId> {
        self.nodes
            .iter()
            .rev()
            .find(|n| n.position.distance(&point) <= radius)
            .map(|n| n.id)
    }

    /// Undirected adjacency: every edge contributes both directions.
    ///
    /// Unweighted edges count as weight 1.
    pub fn adjacency(&self) -> Adjacency {
        let mut adj: Adjacency = self.nodes.iter().map(|n| (n.id, Vec::new())).collect();
        for edge in &self.edges {
            let weight = edge.weight.unwrap_or(1);
            if let Some(list) = adj.get_mut(&edge.a) {
                list.push(Neighbor { node: edge.b, weight });
            }
            if let Some(list) = adj.get_mut(&edge.b) {
                list.push(Neighbor { node: edge.a, weight });
            }
        }
        adj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_increasing() {
        let mut graph = Graph::new();
        let a = graph.add_node(Position::new(0.0, 0.0));
        let b = graph.add_node(Position::new(10.0, 0.0));
        assert_eq!(a, NodeId(1));
        assert_eq!(b, NodeId(2));

        let mut graph = Graph::traversal_default();
        assert_eq!(graph.add_node(Position::default()), NodeId(5));
    }

    #[test]
    fn duplicate_edges_are_ignored_in_both_orientations() {
        let mut graph = Graph::traversal_default();
        let before = graph.edge_count();
        assert!(!graph.add_edge(NodeId(2), NodeId(1), None).unwrap());
        assert!(!graph.add_edge(NodeId(1), NodeId(2), None).unwrap());
        assert_eq!(graph.edge_count(), before);
    }

    #[test]
    fn self_loops_and_unknown_nodes_rejected() {
        let mut graph = Graph::traversal_default();
        assert_eq!(graph.add_edge(NodeId(1), NodeId(1), None), Err(EditError::SelfLoop(NodeId(1))));
        assert_eq!(graph.add_edge(NodeId(1), NodeId(9), None), Err(EditError::UnknownNode(NodeId(9))));
    }

    #[test]
    fn adjacency_is_symmetric_in_edge_order() {
        let graph = Graph::traversal_default();
        let adj = graph.adjacency();
        let of_two: Vec<_> = adj[&NodeId(2)].iter().map(|n| n.node).collect();
        assert_eq!(of_two, vec![NodeId(1), NodeId(3), NodeId(4)]);
        let total: usize = adj.values().map(Vec::len).sum();
        assert_eq!(total, graph.edge_count() * 2);
    }

    #[test]
    fn weighted_default_carries_weights() {
        let graph = Graph::weighted_default();
        let adj = graph.adjacency();
        let from_one: Vec<_> = adj[&NodeId(1)].iter().map(|n| (n.node.0, n.weight)).collect();
        assert_eq!(from_one, vec![(2, 10), (3, 3)]);
    }

    #[test]
    fn node_at_hits_within_radius() {
        let graph = Graph::traversal_default();
        assert_eq!(graph.node_at(Position::new(105.0, 150.0), 20.0), Some(NodeId(1)));
        assert_eq!(graph.node_at(Position::new(175.0, 150.0), 20.0), None);
    }

    #[test]
    fn move_rejects_non_finite_positions() {
        let mut graph = Graph::traversal_default();
        assert_eq!(
            graph.move_node(NodeId(1), Position::new(f32::NAN, 0.0)),
            Err(EditError::InvalidPosition)
        );
    }
}
