//! Pointer-driven graph editor.
//!
//! The editor is a small state machine over three modes. Structural edits
//! (adding nodes or edges) are refused while the editor is locked, which the
//! owning session does for as long as a producer built from this graph is
//! alive. Dragging only ever rewrites a node's position, so it stays allowed.

use crate::error::{EditError, Result};
use crate::graph::{Graph, NodeId, Position};

/// Radius of a node disc for hit-testing, in canvas units.
pub const NODE_RADIUS: f32 = 20.0;

/// Largest weight the editor will stamp on a new edge.
pub const MAX_EDGE_WEIGHT: u32 = 999;

/// What a pointer click does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EditorMode {
    /// Drag existing nodes
    #[default]
    Select,
    /// Click empty canvas to append a node
    AddNode,
    /// Click two nodes to connect them
    AddEdge,
}

/// Result of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum EditOutcome {
    NodeAdded { node: NodeId },
    EdgeStarted { node: NodeId },
    EdgeAdded { a: NodeId, b: NodeId },
    /// The pair was already connected
    EdgeExists { a: NodeId, b: NodeId },
    EdgeCancelled { node: NodeId },
    DragStarted { node: NodeId },
    Moved { node: NodeId, position: Position },
    DragEnded { node: NodeId },
    /// The gesture has no meaning in the current mode
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    node: NodeId,
    offset: Position,
}

/// Interactive editor owning the graph under construction.
#[derive(Debug, Clone)]
pub struct GraphEditor {
    graph: Graph,
    mode: EditorMode,
    pending_edge: Option<NodeId>,
    drag: Option<Drag>,
    locked: bool,
    weighted: bool,
    edge_weight: u32,
}

impl GraphEditor {
    /// Editor for an unweighted graph.
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            mode: EditorMode::Select,
            pending_edge: None,
            drag: None,
            locked: false,
            weighted: false,
            edge_weight: 1,
        }
    }

    /// Editor that stamps every new edge with the current edge weight.
    pub fn weighted(graph: Graph) -> Self {
        Self {
            weighted: true,
            ..Self::new(graph)
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn pending_edge(&self) -> Option<NodeId> {
        self.pending_edge
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    pub fn edge_weight(&self) -> u32 {
        self.edge_weight
    }

    /// Switch modes. Graph content is untouched; in-flight gestures are dropped.
    pub fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
        self.pending_edge = None;
        self.drag = None;
    }

    /// Forbid structural edits until [`unlock`](Self::unlock).
    pub fn lock(&mut self) {
        self.locked = true;
        self.pending_edge = None;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Set the weight used for edges added from now on.
    pub fn set_edge_weight(&mut self, weight: i64) -> Result<()> {
        match u32::try_from(weight) {
            Ok(w) if (1..=MAX_EDGE_WEIGHT).contains(&w) => {
                self.edge_weight = w;
                Ok(())
            }
            _ => Err(EditError::InvalidWeight {
                got: weight,
                max: MAX_EDGE_WEIGHT,
            }),
        }
    }

    /// A click anywhere on the canvas: resolves to a node click when the
    /// pointer lands on a node, otherwise an empty-canvas click.
    pub fn click(&mut self, at: Position) -> Result<EditOutcome> {
        if !at.is_finite() {
            return Err(EditError::InvalidPosition);
        }
        match self.graph.node_at(at, NODE_RADIUS) {
            Some(node) => self.click_node(node),
            None => self.click_canvas(at),
        }
    }

    /// A click on empty canvas.
    pub fn click_canvas(&mut self, at: Position) -> Result<EditOutcome> {
        if !at.is_finite() {
            return Err(EditError::InvalidPosition);
        }
        if self.mode != EditorMode::AddNode {
            return Ok(EditOutcome::Ignored);
        }
        if self.locked {
            return Err(EditError::Locked);
        }
        let node = self.graph.add_node(at);
        Ok(EditOutcome::NodeAdded { node })
    }

    /// A click on an existing node.
    pub fn click_node(&mut self, node: NodeId) -> Result<EditOutcome> {
        if !self.graph.contains(node) {
            return Err(EditError::UnknownNode(node));
        }
        if self.mode != EditorMode::AddEdge {
            return Ok(EditOutcome::Ignored);
        }
        if self.locked {
            return Err(EditError::Locked);
        }

        let Some(start) = self.pending_edge.take() else {
            self.pending_edge = Some(node);
            return Ok(EditOutcome::EdgeStarted { node });
        };
        if start == node {
            return Ok(EditOutcome::EdgeCancelled { node });
        }

        let weight = self.weighted.then_some(self.edge_weight);
        if self.graph.add_edge(start, node, weight)? {
            Ok(EditOutcome::EdgeAdded { a: start, b: node })
        } else {
            Ok(EditOutcome::EdgeExists { a: start, b: node })
        }
    }

    /// Pointer pressed: in select mode, grab the node under the pointer.
    pub fn press(&mut self, at: Position) -> Result<EditOutcome> {
        if !at.is_finite() {
            return Err(EditError::InvalidPosition);
        }
        if self.mode != EditorMode::Select {
            return Ok(EditOutcome::Ignored);
        }
        let Some(node) = self.graph.node_at(at, NODE_RADIUS) else {
            return Ok(EditOutcome::Ignored);
        };
        let origin = self.graph.node(node).map(|n| n.position).unwrap_or_default();
        self.drag = Some(Drag {
            node,
            offset: at - origin,
        });
        Ok(EditOutcome::DragStarted { node })
    }

    /// Pointer moved while pressed.
    pub fn drag_to(&mut self, at: Position) -> Result<EditOutcome> {
        let Some(drag) = self.drag else {
            return Ok(EditOutcome::Ignored);
        };
        let position = at - drag.offset;
        self.graph.move_node(drag.node, position)?;
        Ok(EditOutcome::Moved {
            node: drag.node,
            position,
        })
    }

    /// Pointer released.
    pub fn release(&mut self) -> EditOutcome {
        match self.drag.take() {
            Some(drag) => EditOutcome::DragEnded { node: drag.node },
            None => EditOutcome::Ignored,
        }
    }
}
