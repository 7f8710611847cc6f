//! Error types for graph editing.

use thiserror::Error;

use crate::graph::NodeId;

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, EditError>;

/// Reasons a graph edit is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// A producer is running over this graph
    #[error("The graph cannot be edited while a traversal is active")]
    Locked,

    /// The node id does not exist in the graph
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    /// Edges must join two distinct nodes
    #[error("Node {0} cannot be connected to itself")]
    SelfLoop(NodeId),

    /// Edge weight outside the accepted range
    #[error("Edge weight must be between 1 and {max}, got {got}")]
    InvalidWeight { got: i64, max: u32 },

    /// Pointer coordinates were NaN or infinite
    #[error("Pointer position must be finite")]
    InvalidPosition,
}
