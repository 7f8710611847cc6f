//! The step vocabulary: minimal, mergeable updates to visual state.
//!
//! A step only carries the fields it changes. Merging is field-wise: absent
//! fields leave the accumulated state alone, monotonic sets (sorted, visited,
//! finalized) only ever receive additions, and clearable scalars go through
//! [`Patch`].

use std::collections::BTreeMap;
use std::fmt;

use algoscope_graph::NodeId;
use serde::{Deserialize, Serialize};

/// Three-way update for a clearable field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Patch<T> {
    /// Leave the field as it is
    #[default]
    Keep,
    /// Overwrite the field
    Set(T),
    /// Empty the field
    Clear,
}

impl<T: Clone> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Merge this patch into `slot`.
    pub fn apply_to(&self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Set(value) => *slot = Some(value.clone()),
            Patch::Clear => *slot = None,
        }
    }
}

/// A distance or table entry that may be unbounded.
///
/// Ordering puts every finite value below `Infinite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cost {
    Finite(u64),
    Infinite,
}

impl Cost {
    pub fn finite(self) -> Option<u64> {
        match self {
            Cost::Finite(v) => Some(v),
            Cost::Infinite => None,
        }
    }

    pub fn is_finite(self) -> bool {
        matches!(self, Cost::Finite(_))
    }

    /// Add a finite amount; infinity absorbs.
    pub fn plus(self, amount: u64) -> Cost {
        match self {
            Cost::Finite(v) => Cost::Finite(v.saturating_add(amount)),
            Cost::Infinite => Cost::Infinite,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Finite(v) => write!(f, "{v}"),
            Cost::Infinite => write!(f, "∞"),
        }
    }
}

/// Highlight roles for array positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Pair or element under comparison
    Comparing,
    /// Position being filled or key being inserted
    Current,
    /// Minimum candidate in selection sort
    Minimum,
    Pivot,
    /// Last slot of the "less than pivot" region
    Boundary,
    /// Inclusive `[lo, hi]` bounds of the range being merged
    Range,
    /// Heap positions involved in a sift or extraction
    Active,
    /// Position checked by a search
    Scanned,
    Low,
    High,
    Mid,
    Found,
}

/// Replace the index list for one role; an empty list clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub role: Role,
    pub indices: Vec<usize>,
}

/// A single array position assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Write {
    pub index: usize,
    pub value: i64,
}

/// Update for array-backed visualizations (sorts and searches).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArrayStep {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub writes: Vec<Write>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    /// Positions joining the sorted set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub settled: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ArrayStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(mut self, role: Role, indices: impl IntoIterator<Item = usize>) -> Self {
        self.marks.push(Mark {
            role,
            indices: indices.into_iter().collect(),
        });
        self
    }

    pub fn clear(self, role: Role) -> Self {
        self.mark(role, [])
    }

    pub fn write(mut self, index: usize, value: i64) -> Self {
        self.writes.push(Write { index, value });
        self
    }

    pub fn settle(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.settled.extend(indices);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Update for BFS/DFS.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraversalStep {
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub current: Patch<NodeId>,
    /// Full snapshot of the queue or stack, front/bottom first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontier: Option<Vec<NodeId>>,
    /// Nodes newly marked visited
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visited: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One pending entry of the shortest-path priority queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub node: NodeId,
    pub distance: u64,
}

/// A predecessor link `node ← via` recorded on relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub node: NodeId,
    pub via: NodeId,
}

/// Update for Dijkstra.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distances: Option<BTreeMap<NodeId, Cost>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<Vec<QueueEntry>>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub current: Patch<NodeId>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub neighbor: Patch<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalized: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A DP table coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A single DP cell assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellWrite {
    pub cell: CellRef,
    pub value: Cost,
}

/// Update for dynamic-programming tables.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableStep {
    /// Full table snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Vec<Vec<Cost>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<CellWrite>,
    /// Cell whose value is being computed
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub current: Patch<CellRef>,
    /// Prior cells being combined; an empty list clears
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare: Option<Vec<CellRef>>,
    /// Coin or item under consideration
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub cursor: Patch<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Update for recursive call-stack visualizations.
///
/// Applied in order: memo insert, pop, push.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CallStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<(u64, u64)>,
    /// Value returned by the popped frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A trie node created during insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Growth {
    pub parent: usize,
    pub letter: char,
    pub node: usize,
}

/// Update for trie insert and prefix search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrieStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grow: Option<Growth>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub cursor: Patch<usize>,
    /// Root-to-cursor path snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_end: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// How a producer concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Sorted,
    Found { index: usize, target: i64 },
    NotFound { target: i64 },
    Traversed { order: Vec<NodeId> },
    Route { path: Vec<NodeId>, cost: u64 },
    NoRoute { from: NodeId, to: NodeId },
    /// Shortest-path run without an end node
    Explored { reached: usize },
    Value { label: String, value: u64 },
    Unreachable { amount: u64 },
    Inserted { word: String },
    Matches { prefix: String, words: Vec<String> },
    PrefixMissing { prefix: String },
    /// Forced exhaustion after an internal fault
    Failed { reason: String },
}

impl Outcome {
    /// The completion message shown to the learner.
    pub fn message(&self) -> String {
        match self {
            Outcome::Sorted => "Array sorted.".to_string(),
            Outcome::Found { index, target } => format!("Found {target} at index {index}."),
            Outcome::NotFound { target } => format!("{target} not found in the array."),
            Outcome::Traversed { order } => {
                let order: Vec<String> = order.iter().map(ToString::to_string).collect();
                format!("Traversal complete: {}.", order.join(" → "))
            }
            Outcome::Route { cost, .. } => format!("Shortest path cost: {cost}"),
            Outcome::NoRoute { from, to } => format!("No path found from {from} to {to}."),
            Outcome::Explored { reached } => {
                format!("Algorithm finished; {reached} nodes reachable. Select an end node to see the path.")
            }
            Outcome::Value { label, value } => format!("{label} = {value}"),
            Outcome::Unreachable { amount } => format!("Cannot make amount {amount} with the given coins."),
            Outcome::Inserted { word } => format!("Inserted \"{word}\"."),
            Outcome::Matches { prefix, words } => {
                format!("{} word(s) start with \"{prefix}\": {}", words.len(), words.join(", "))
            }
            Outcome::PrefixMissing { prefix } => format!("No words start with \"{prefix}\"."),
            Outcome::Failed { .. } => "Visualization stopped unexpectedly.".to_string(),
        }
    }
}

/// A single, minimal, mergeable update emitted by a producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Step {
    Array(ArrayStep),
    Traversal(TraversalStep),
    Route(RouteStep),
    Table(TableStep),
    Calls(CallStep),
    Trie(TrieStep),
    /// Terminal marker
    Finished { outcome: Outcome },
}

impl Step {
    pub fn finished(outcome: Outcome) -> Self {
        Step::Finished { outcome }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Finished { .. })
    }

    /// Family name, for diagnostics.
    pub fn family(&self) -> &'static str {
        match self {
            Step::Array(_) => "array",
            Step::Traversal(_) => "traversal",
            Step::Route(_) => "route",
            Step::Table(_) => "table",
            Step::Calls(_) => "calls",
            Step::Trie(_) => "trie",
            Step::Finished { .. } => "finished",
        }
    }

    /// Narration attached to this step, if any.
    pub fn note(&self) -> Option<&str> {
        match self {
            Step::Array(s) => s.note.as_deref(),
            Step::Traversal(s) => s.note.as_deref(),
            Step::Route(s) => s.note.as_deref(),
            Step::Table(s) => s.note.as_deref(),
            Step::Calls(s) => s.note.as_deref(),
            Step::Trie(s) => s.note.as_deref(),
            Step::Finished { .. } => None,
        }
    }
}

impl From<ArrayStep> for Step {
    fn from(step: ArrayStep) -> Self {
        Step::Array(step)
    }
}

impl From<TraversalStep> for Step {
    fn from(step: TraversalStep) -> Self {
        Step::Traversal(step)
    }
}

impl From<RouteStep> for Step {
    fn from(step: RouteStep) -> Self {
        Step::Route(step)
    }
}

impl From<TableStep> for Step {
    fn from(step: TableStep) -> Self {
        Step::Table(step)
    }
}

impl From<CallStep> for Step {
    fn from(step: CallStep) -> Self {
        Step::Calls(step)
    }
}

impl From<TrieStep> for Step {
    fn from(step: TrieStep) -> Self {
        Step::Trie(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_serialization() {
        let step: Step = ArrayStep::new()
            .mark(Role::Comparing, [2, 3])
            .write(2, 7)
            .note("swap")
            .into();

        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"type\":\"Array\""));
        assert!(json.contains("comparing"));
        assert!(!json.contains("settled"));

        let parsed: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, step);
    }

    #[test]
    fn terminal_step_carries_outcome() {
        let step = Step::finished(Outcome::Found { index: 8, target: 27 });
        assert!(step.is_terminal());

        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"kind\":\"found\""));
        let parsed: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, step);
    }

    #[test]
    fn cost_ordering_and_arithmetic() {
        assert!(Cost::Finite(u64::MAX) < Cost::Infinite);
        assert!(Cost::Finite(3) < Cost::Finite(4));
        assert_eq!(Cost::Infinite.plus(5), Cost::Infinite);
        assert_eq!(Cost::Finite(2).plus(5), Cost::Finite(7));
        assert_eq!(Cost::Infinite.to_string(), "∞");
    }

    #[test]
    fn patch_semantics() {
        let mut slot = Some(3usize);
        Patch::Keep.apply_to(&mut slot);
        assert_eq!(slot, Some(3));
        Patch::Set(5).apply_to(&mut slot);
        assert_eq!(slot, Some(5));
        Patch::<usize>::Clear.apply_to(&mut slot);
        assert_eq!(slot, None);
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(
            Outcome::Found { index: 8, target: 27 }.message(),
            "Found 27 at index 8."
        );
        assert_eq!(Outcome::NotFound { target: 28 }.message(), "28 not found in the array.");
    }
}
