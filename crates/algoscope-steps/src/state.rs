//! Accumulated visual state: the fold of every step emitted so far.

use std::collections::{BTreeMap, BTreeSet};

use algoscope_graph::NodeId;
use serde::{Deserialize, Serialize};

use crate::error::Fault;
use crate::step::{
    ArrayStep, CallStep, CellRef, Cost, Outcome, Patch, QueueEntry, Role, RouteStep, Step,
    TableStep, TraversalStep, TrieStep,
};
use crate::trie::Trie;

/// Sort or search over a flat array.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArrayState {
    pub values: Vec<i64>,
    pub marks: BTreeMap<Role, Vec<usize>>,
    pub settled: BTreeSet<usize>,
}

impl ArrayState {
    pub fn new(values: Vec<i64>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Indices currently carrying `role`.
    pub fn marked(&self, role: Role) -> &[usize] {
        self.marks.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    fn apply(&mut self, step: &ArrayStep) -> Result<(), Fault> {
        let len = self.values.len();
        if let Some(bad) = step.writes.iter().find(|w| w.index >= len) {
            return Err(Fault::OutOfBounds { index: bad.index, len });
        }
        if let Some(&bad) = step.settled.iter().find(|&&i| i >= len) {
            return Err(Fault::OutOfBounds { index: bad, len });
        }
        for write in &step.writes {
            self.values[write.index] = write.value;
        }
        for mark in &step.marks {
            if mark.indices.is_empty() {
                self.marks.remove(&mark.role);
            } else {
                self.marks.insert(mark.role, mark.indices.clone());
            }
        }
        self.settled.extend(step.settled.iter().copied());
        Ok(())
    }
}

/// Which container a traversal uses as its frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frontier {
    Queue,
    Stack,
}

/// BFS/DFS progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalState {
    pub frontier_kind: Frontier,
    pub start: NodeId,
    pub current: Option<NodeId>,
    pub frontier: Vec<NodeId>,
    /// Visit order
    pub visited: Vec<NodeId>,
}

impl TraversalState {
    pub fn new(frontier_kind: Frontier, start: NodeId) -> Self {
        Self {
            frontier_kind,
            start,
            current: None,
            frontier: Vec::new(),
            visited: Vec::new(),
        }
    }

    fn apply(&mut self, step: &TraversalStep) {
        step.current.apply_to(&mut self.current);
        if let Some(frontier) = &step.frontier {
            self.frontier = frontier.clone();
        }
        for node in &step.visited {
            if !self.visited.contains(node) {
                self.visited.push(*node);
            }
        }
    }
}

/// Dijkstra progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteState {
    pub start: NodeId,
    pub end: Option<NodeId>,
    pub distances: BTreeMap<NodeId, Cost>,
    pub queue: Vec<QueueEntry>,
    pub current: Option<NodeId>,
    pub neighbor: Option<NodeId>,
    pub finalized: Vec<NodeId>,
    pub predecessors: BTreeMap<NodeId, NodeId>,
}

impl RouteState {
    pub fn new(start: NodeId, end: Option<NodeId>) -> Self {
        Self {
            start,
            end,
            distances: BTreeMap::new(),
            queue: Vec::new(),
            current: None,
            neighbor: None,
            finalized: Vec::new(),
            predecessors: BTreeMap::new(),
        }
    }

    /// Walk predecessor links backward from `end`.
    ///
    /// Returns `None` when the chain never reaches the start node.
    pub fn path_to(&self, end: NodeId) -> Option<Vec<NodeId>> {
        let mut path = vec![end];
        let mut at = end;
        // A simple path never repeats a node
        for _ in 0..=self.predecessors.len() {
            if at == self.start {
                path.reverse();
                return Some(path);
            }
            at = *self.predecessors.get(&at)?;
            path.push(at);
        }
        None
    }

    /// Path and cost to `end`, if reachable.
    pub fn route_to(&self, end: NodeId) -> Option<(Vec<NodeId>, u64)> {
        let cost = self.distances.get(&end)?.finite()?;
        Some((self.path_to(end)?, cost))
    }

    fn apply(&mut self, step: &RouteStep) {
        if let Some(distances) = &step.distances {
            self.distances = distances.clone();
        }
        if let Some(queue) = &step.queue {
            self.queue = queue.clone();
        }
        step.current.apply_to(&mut self.current);
        step.neighbor.apply_to(&mut self.neighbor);
        for node in &step.finalized {
            if !self.finalized.contains(node) {
                self.finalized.push(*node);
            }
        }
        if let Some(link) = step.link {
            self.predecessors.insert(link.node, link.via);
        }
    }
}

/// DP table progress.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableState {
    pub cells: Vec<Vec<Cost>>,
    pub current: Option<CellRef>,
    pub compare: Vec<CellRef>,
    pub cursor: Option<usize>,
}

impl TableState {
    pub fn get(&self, row: usize, col: usize) -> Option<Cost> {
        self.cells.get(row)?.get(col).copied()
    }

    fn apply(&mut self, step: &TableStep) -> Result<(), Fault> {
        if let Some(table) = &step.table {
            self.cells = table.clone();
        }
        if let Some(write) = step.write {
            let CellRef { row, col } = write.cell;
            let cell = self
                .cells
                .get_mut(row)
                .and_then(|r| r.get_mut(col))
                .ok_or(Fault::CellOutOfBounds { row, col })?;
            *cell = write.value;
        }
        step.current.apply_to(&mut self.current);
        if let Some(compare) = &step.compare {
            self.compare = compare.clone();
        }
        step.cursor.apply_to(&mut self.cursor);
        Ok(())
    }
}

/// Recursion progress.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CallState {
    pub function: String,
    /// In-flight call arguments, outermost first
    pub stack: Vec<u64>,
    pub memo: BTreeMap<u64, u64>,
    pub last_return: Option<u64>,
}

impl CallState {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            ..Self::default()
        }
    }

    fn apply(&mut self, step: &CallStep) -> Result<(), Fault> {
        if let Some((arg, value)) = step.memo {
            self.memo.insert(arg, value);
        }
        if let Some(value) = step.pop {
            self.stack.pop().ok_or(Fault::StackUnderflow)?;
            self.last_return = Some(value);
        }
        if let Some(arg) = step.push {
            self.stack.push(arg);
        }
        Ok(())
    }
}

/// Trie operation progress.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrieState {
    pub trie: Trie,
    pub cursor: Option<usize>,
    pub path: Vec<usize>,
    pub matches: Vec<String>,
}

impl TrieState {
    pub fn new(trie: Trie) -> Self {
        Self {
            trie,
            ..Self::default()
        }
    }

    fn apply(&mut self, step: &TrieStep) -> Result<(), Fault> {
        if let Some(growth) = step.grow {
            match self.trie.attach(growth.parent, growth.letter) {
                Some(id) if id == growth.node => {}
                _ => return Err(Fault::UnknownTrieNode(growth.node)),
            }
        }
        if let Some(id) = step.word_end {
            if !self.trie.mark_word(id) {
                return Err(Fault::UnknownTrieNode(id));
            }
        }
        if let Patch::Set(id) = step.cursor {
            if self.trie.node(id).is_none() {
                return Err(Fault::UnknownTrieNode(id));
            }
        }
        step.cursor.apply_to(&mut self.cursor);
        if let Some(path) = &step.path {
            self.path = path.clone();
        }
        if let Some(word) = &step.matched {
            self.matches.push(word.clone());
        }
        Ok(())
    }
}

/// Family-specific part of the visual state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Scene {
    Array(ArrayState),
    Traversal(TraversalState),
    Route(RouteState),
    Table(TableState),
    Calls(CallState),
    Trie(TrieState),
}

impl Scene {
    pub fn family(&self) -> &'static str {
        match self {
            Scene::Array(_) => "array",
            Scene::Traversal(_) => "traversal",
            Scene::Route(_) => "route",
            Scene::Table(_) => "table",
            Scene::Calls(_) => "calls",
            Scene::Trie(_) => "trie",
        }
    }
}

/// Accumulated visual state for one visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualState {
    pub scene: Scene,
    /// Narration of the most recent step
    pub message: Option<String>,
    pub outcome: Option<Outcome>,
    /// Number of steps folded in
    pub applied: usize,
}

impl VisualState {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            message: None,
            outcome: None,
            applied: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Merge one step.
    ///
    /// On error `self` may be partially updated; callers that need atomicity
    /// apply to a clone and commit on success.
    pub fn apply(&mut self, step: &Step) -> Result<(), Fault> {
        if self.outcome.is_some() {
            return Err(Fault::AfterFinish);
        }
        match (&mut self.scene, step) {
            (Scene::Array(state), Step::Array(s)) => state.apply(s)?,
            (Scene::Traversal(state), Step::Traversal(s)) => state.apply(s),
            (Scene::Route(state), Step::Route(s)) => state.apply(s),
            (Scene::Table(state), Step::Table(s)) => state.apply(s)?,
            (Scene::Calls(state), Step::Calls(s)) => state.apply(s)?,
            (Scene::Trie(state), Step::Trie(s)) => state.apply(s)?,
            (scene, Step::Finished { outcome }) => {
                if let (Scene::Array(state), Outcome::Sorted) = (&*scene, outcome) {
                    let full = (0..state.values.len()).all(|i| state.settled.contains(&i));
                    if !full {
                        return Err(Fault::Incomplete {
                            settled: state.settled.len(),
                            len: state.values.len(),
                        });
                    }
                }
                self.message = Some(outcome.message());
                self.outcome = Some(outcome.clone());
            }
            (scene, step) => {
                return Err(Fault::Mismatch {
                    step: step.family(),
                    scene: scene.family(),
                })
            }
        }
        if let Some(note) = step.note() {
            self.message = Some(note.to_string());
        }
        self.applied += 1;
        Ok(())
    }

    /// Rebuild state by folding `steps` over `baseline`.
    pub fn fold<'a>(baseline: VisualState, steps: impl IntoIterator<Item = &'a Step>) -> Result<Self, Fault> {
        let mut state = baseline;
        for step in steps {
            state.apply(step)?;
        }
        Ok(state)
    }

    pub fn array(&self) -> Option<&ArrayState> {
        match &self.scene {
            Scene::Array(s) => Some(s),
            _ => None,
        }
    }

    pub fn traversal(&self) -> Option<&TraversalState> {
        match &self.scene {
            Scene::Traversal(s) => Some(s),
            _ => None,
        }
    }

    pub fn route(&self) -> Option<&RouteState> {
        match &self.scene {
            Scene::Route(s) => Some(s),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&TableState> {
        match &self.scene {
            Scene::Table(s) => Some(s),
            _ => None,
        }
    }

    pub fn calls(&self) -> Option<&CallState> {
        match &self.scene {
            Scene::Calls(s) => Some(s),
            _ => None,
        }
    }

    pub fn trie(&self) -> Option<&TrieState> {
        match &self.scene {
            Scene::Trie(s) => Some(s),
            _ => None,
        }
    }
}
