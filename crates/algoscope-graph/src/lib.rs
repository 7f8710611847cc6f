//! Algoscope Graph Editing
//!
//! The input model for graph visualizations (traversal and shortest path).
//!
//! - **Graph**: append-only nodes with canvas positions, unordered unique
//!   edges with optional weights
//! - **Editor**: select / add-node / add-edge modes driven by pointer
//!   gestures, lockable while a producer consumes the graph
//!
//! Nothing here knows about playback; a session locks the editor when it
//! builds a producer and unlocks it on reset.

mod editor;
mod error;
mod graph;

pub use editor::{EditOutcome, EditorMode, GraphEditor, MAX_EDGE_WEIGHT, NODE_RADIUS};
pub use error::{EditError, Result};
pub use graph::{Adjacency, Edge, Graph, Neighbor, Node, NodeId, Position};
