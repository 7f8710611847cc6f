use std::collections::BTreeSet;

use algoscope_graph::{Adjacency, Graph, NodeId};

use crate::error::Fault;
use crate::producer::StepProducer;
use crate::state::RouteState;
use crate::step::{Cost, Link, Outcome, Patch, QueueEntry, RouteStep, Step};

#[derive(Debug, Clone, Copy)]
enum Phase {
    Init,
    Enqueue,
    Dequeue,
    Finalize(NodeId),
    Relax { node: NodeId, cursor: usize },
    Improve { node: NodeId, neighbor: NodeId, distance: u64, cursor: usize },
    Conclude,
    Done,
}

/// Dijkstra's shortest paths with a linear priority queue.
///
/// The queue keeps entries ordered by distance with ties in insertion order.
/// Entries are never decreased in place; an outdated entry for an already
/// finalized node is skipped when it reaches the front.
pub struct Dijkstra {
    adjacency: Adjacency,
    nodes: Vec<NodeId>,
    route: RouteState,
    queue: Vec<QueueEntry>,
    finalized: BTreeSet<NodeId>,
    phase: Phase,
}

impl Dijkstra {
    pub fn new(graph: &Graph, start: NodeId, end: Option<NodeId>) -> Self {
        Self {
            adjacency: graph.adjacency(),
            nodes: graph.node_ids().collect(),
            route: RouteState::new(start, end),
            queue: Vec::new(),
            finalized: BTreeSet::new(),
            phase: Phase::Init,
        }
    }

    fn enqueue(&mut self, entry: QueueEntry) {
        let at = self
            .queue
            .iter()
            .position(|e| e.distance > entry.distance)
            .unwrap_or(self.queue.len());
        self.queue.insert(at, entry);
    }

    fn distance(&self, node: NodeId) -> Cost {
        self.route.distances.get(&node).copied().unwrap_or(Cost::Infinite)
    }

    fn outcome(&self) -> Outcome {
        match self.route.end {
            Some(end) => match self.route.route_to(end) {
                Some((path, cost)) => Outcome::Route { path, cost },
                None => Outcome::NoRoute {
                    from: self.route.start,
                    to: end,
                },
            },
            None => Outcome::Explored {
                reached: self.route.distances.values().filter(|d| d.is_finite()).count(),
            },
        }
    }
}

impl StepProducer for Dijkstra {
    fn name(&self) -> &'static str {
        "dijkstra"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let start = self.route.start;
        let step = match self.phase {
            Phase::Init => {
                self.route.distances = self
                    .nodes
                    .iter()
                    .map(|&n| (n, if n == start { Cost::Finite(0) } else { Cost::Infinite }))
                    .collect();
                self.phase = Phase::Enqueue;
                RouteStep {
                    distances: Some(self.route.distances.clone()),
                    note: Some(format!("All distances start at ∞ except node {start}.")),
                    ..RouteStep::default()
                }
            }
            Phase::Enqueue => {
                self.enqueue(QueueEntry { node: start, distance: 0 });
                self.phase = Phase::Dequeue;
                RouteStep {
                    queue: Some(self.queue.clone()),
                    note: Some(format!("Enqueued node {start} with distance 0.")),
                    ..RouteStep::default()
                }
            }
            Phase::Dequeue if self.queue.is_empty() => {
                self.phase = Phase::Conclude;
                RouteStep {
                    current: Patch::Clear,
                    neighbor: Patch::Clear,
                    note: Some("Priority queue is empty.".to_string()),
                    ..RouteStep::default()
                }
            }
            Phase::Dequeue => {
                let entry = self.queue.remove(0);
                let stale = self.finalized.contains(&entry.node);
                self.phase = if stale { Phase::Dequeue } else { Phase::Finalize(entry.node) };
                let note = if stale {
                    format!("Node {} is already finalized, skipping.", entry.node)
                } else {
                    format!("Dequeued node {} (distance {}).", entry.node, entry.distance)
                };
                RouteStep {
                    queue: Some(self.queue.clone()),
                    current: Patch::Set(entry.node),
                    note: Some(note),
                    ..RouteStep::default()
                }
            }
            Phase::Finalize(node) => {
                self.finalized.insert(node);
                self.phase = Phase::Relax { node, cursor: 0 };
                RouteStep {
                    finalized: vec![node],
                    note: Some(format!("Node {node} finalized at distance {}.", self.distance(node))),
                    ..RouteStep::default()
                }
            }
            Phase::Relax { node, cursor } => {
                let next = self
                    .adjacency
                    .get(&node)
                    .into_iter()
                    .flatten()
                    .enumerate()
                    .skip(cursor)
                    .find(|(_, n)| !self.finalized.contains(&n.node))
                    .map(|(index, n)| (index, *n));
                match next {
                    Some((index, neighbor)) => {
                        let candidate = self.distance(node).plus(u64::from(neighbor.weight));
                        let current = self.distance(neighbor.node);
                        self.phase = match candidate {
                            Cost::Finite(distance) if candidate < current => Phase::Improve {
                                node,
                                neighbor: neighbor.node,
                                distance,
                                cursor: index + 1,
                            },
                            _ => Phase::Relax { node, cursor: index + 1 },
                        };
                        RouteStep {
                            neighbor: Patch::Set(neighbor.node),
                            note: Some(format!(
                                "Checking node {}: {} + {} = {candidate} vs {current}.",
                                neighbor.node,
                                self.distance(node),
                                neighbor.weight
                            )),
                            ..RouteStep::default()
                        }
                    }
                    None => {
                        self.phase = Phase::Dequeue;
                        RouteStep {
                            neighbor: Patch::Clear,
                            note: Some(format!("Done with the neighbors of node {node}.")),
                            ..RouteStep::default()
                        }
                    }
                }
            }
            Phase::Improve { node, neighbor, distance, cursor } => {
                self.route.distances.insert(neighbor, Cost::Finite(distance));
                self.route.predecessors.insert(neighbor, node);
                self.enqueue(QueueEntry { node: neighbor, distance });
                self.phase = Phase::Relax { node, cursor };
                RouteStep {
                    distances: Some(self.route.distances.clone()),
                    queue: Some(self.queue.clone()),
                    link: Some(Link { node: neighbor, via: node }),
                    note: Some(format!("Updated distance of node {neighbor} to {distance}.")),
                    ..RouteStep::default()
                }
            }
            Phase::Conclude => {
                self.phase = Phase::Done;
                return Ok(Some(Step::finished(self.outcome())));
            }
            Phase::Done => return Ok(None),
        };
        Ok(Some(step.into()))
    }
}
