//! Error types for step production.

use thiserror::Error;

/// Result type for input validation and producer construction.
pub type Result<T> = std::result::Result<T, Error>;

/// User-facing reasons a producer cannot be built.
///
/// Both variants are reported inline and leave any prior visual state
/// untouched; neither is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Non-numeric, out-of-range, or missing required input
    #[error("{0}")]
    InvalidInput(String),

    /// The operation has nothing to act on (empty structure, no start node)
    #[error("{0}")]
    NotApplicable(String),
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_applicable(msg: impl Into<String>) -> Self {
        Self::NotApplicable(msg.into())
    }
}

/// Internal faults raised while pulling or merging a step.
///
/// These never reach the user as-is: the playback boundary treats any fault
/// as forced exhaustion and keeps the last good state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Step family does not match the accumulated state family
    #[error("{step} step cannot be applied to {scene} state")]
    Mismatch {
        step: &'static str,
        scene: &'static str,
    },

    /// Array write outside the backing array
    #[error("index {index} is outside an array of length {len}")]
    OutOfBounds { index: usize, len: usize },

    /// Table write outside the table
    #[error("cell ({row}, {col}) is outside the table")]
    CellOutOfBounds { row: usize, col: usize },

    /// A step arrived after the terminal marker
    #[error("step arrived after the terminal marker")]
    AfterFinish,

    /// A sort finished without every position settled
    #[error("sorted set covers {settled} of {len} positions at completion")]
    Incomplete { settled: usize, len: usize },

    /// Pop with an empty call stack
    #[error("call stack underflow")]
    StackUnderflow,

    /// Reference to a trie node that was never created
    #[error("trie node {0} does not exist")]
    UnknownTrieNode(usize),

    /// The producer kept going past the safety limit
    #[error("producer exceeded {0} steps")]
    Runaway(usize),

    /// The producer panicked while advancing
    #[error("producer panicked: {0}")]
    Panicked(String),
}
