//! Breadth-first and depth-first traversal over an undirected graph.

use std::collections::{BTreeSet, VecDeque};

use algoscope_graph::{Adjacency, Graph, NodeId};

use crate::error::Fault;
use crate::producer::StepProducer;
use crate::step::{Outcome, Patch, Step, TraversalStep};

fn neighbors(adjacency: &Adjacency, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    adjacency
        .get(&node)
        .into_iter()
        .flatten()
        .map(|n| n.node)
}

#[derive(Debug, Clone, Copy)]
enum BfsPhase {
    Seed,
    Dequeue,
    Scan { node: NodeId, cursor: usize },
    Finish,
    Done,
}

/// FIFO traversal; a node counts as visited when it leaves the queue.
pub struct BreadthFirst {
    adjacency: Adjacency,
    start: NodeId,
    queue: VecDeque<NodeId>,
    discovered: BTreeSet<NodeId>,
    order: Vec<NodeId>,
    phase: BfsPhase,
}

impl BreadthFirst {
    pub fn new(graph: &Graph, start: NodeId) -> Self {
        Self {
            adjacency: graph.adjacency(),
            start,
            queue: VecDeque::new(),
            discovered: BTreeSet::new(),
            order: Vec::new(),
            phase: BfsPhase::Seed,
        }
    }

    fn frontier(&self) -> Option<Vec<NodeId>> {
        Some(self.queue.iter().copied().collect())
    }
}

impl StepProducer for BreadthFirst {
    fn name(&self) -> &'static str {
        "bfs"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        loop {
            let step = match self.phase {
                BfsPhase::Seed => {
                    self.queue.push_back(self.start);
                    self.discovered.insert(self.start);
                    self.phase = BfsPhase::Dequeue;
                    TraversalStep {
                        current: Patch::Clear,
                        frontier: self.frontier(),
                        note: Some(format!("Starting BFS from node {}.", self.start)),
                        ..TraversalStep::default()
                    }
                }
                BfsPhase::Dequeue => match self.queue.pop_front() {
                    Some(node) => {
                        self.order.push(node);
                        self.phase = BfsPhase::Scan { node, cursor: 0 };
                        TraversalStep {
                            current: Patch::Set(node),
                            frontier: self.frontier(),
                            visited: vec![node],
                            note: Some(format!("Dequeued and visiting node {node}.")),
                        }
                    }
                    None => {
                        self.phase = BfsPhase::Finish;
                        TraversalStep {
                            current: Patch::Clear,
                            note: Some("Queue is empty.".to_string()),
                            ..TraversalStep::default()
                        }
                    }
                },
                BfsPhase::Scan { node, cursor } => {
                    let next = neighbors(&self.adjacency, node)
                        .enumerate()
                        .skip(cursor)
                        .find(|(_, n)| !self.discovered.contains(n));
                    let Some((index, found)) = next else {
                        self.phase = BfsPhase::Dequeue;
                        continue;
                    };
                    self.discovered.insert(found);
                    self.queue.push_back(found);
                    self.phase = BfsPhase::Scan { node, cursor: index + 1 };
                    TraversalStep {
                        frontier: self.frontier(),
                        note: Some(format!("Discovered node {found}, added to the queue.")),
                        ..TraversalStep::default()
                    }
                }
                BfsPhase::Finish => {
                    self.phase = BfsPhase::Done;
                    return Ok(Some(Step::finished(Outcome::Traversed {
                        order: self.order.clone(),
                    })));
                }
                BfsPhase::Done => return Ok(None),
            };
            return Ok(Some(step.into()));
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum DfsPhase {
    Pop,
    Visit(NodeId),
    Push(NodeId),
    Finish,
    Done,
}

/// LIFO traversal; neighbors are pushed in reverse so the first listed
/// neighbor is explored first.
pub struct DepthFirst {
    adjacency: Adjacency,
    stack: Vec<NodeId>,
    visited: BTreeSet<NodeId>,
    order: Vec<NodeId>,
    phase: DfsPhase,
}

impl DepthFirst {
    pub fn new(graph: &Graph, start: NodeId) -> Self {
        Self {
            adjacency: graph.adjacency(),
            stack: vec![start],
            visited: BTreeSet::new(),
            order: Vec::new(),
            phase: DfsPhase::Pop,
        }
    }
}

impl StepProducer for DepthFirst {
    fn name(&self) -> &'static str {
        "dfs"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let step = match self.phase {
            DfsPhase::Pop => match self.stack.pop() {
                Some(node) => {
                    let seen = self.visited.contains(&node);
                    self.phase = if seen { DfsPhase::Pop } else { DfsPhase::Visit(node) };
                    let note = if seen {
                        format!("Popped node {node}, already visited.")
                    } else {
                        format!("Popped node {node}.")
                    };
                    TraversalStep {
                        frontier: Some(self.stack.clone()),
                        note: Some(note),
                        ..TraversalStep::default()
                    }
                }
                None => {
                    self.phase = DfsPhase::Finish;
                    TraversalStep {
                        current: Patch::Clear,
                        note: Some("Stack is empty.".to_string()),
                        ..TraversalStep::default()
                    }
                }
            },
            DfsPhase::Visit(node) => {
                self.visited.insert(node);
                self.order.push(node);
                self.phase = DfsPhase::Push(node);
                TraversalStep {
                    current: Patch::Set(node),
                    visited: vec![node],
                    note: Some(format!("Visiting node {node}.")),
                    ..TraversalStep::default()
                }
            }
            DfsPhase::Push(node) => {
                let pending: Vec<NodeId> = neighbors(&self.adjacency, node)
                    .filter(|n| !self.visited.contains(n))
                    .collect();
                self.stack.extend(pending.iter().rev());
                self.phase = DfsPhase::Pop;
                TraversalStep {
                    frontier: Some(self.stack.clone()),
                    note: Some(format!("Pushed {} unvisited neighbor(s) of node {node}.", pending.len())),
                    ..TraversalStep::default()
                }
            }
            DfsPhase::Finish => {
                self.phase = DfsPhase::Done;
                return Ok(Some(Step::finished(Outcome::Traversed {
                    order: self.order.clone(),
                })));
            }
            DfsPhase::Done => return Ok(None),
        };
        Ok(Some(step.into()))
    }
}
