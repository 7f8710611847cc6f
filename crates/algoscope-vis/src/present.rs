//! Maps accumulated visual state onto what the frontend draws.
//!
//! Pure functions of the state; nothing here mutates playback.

use std::collections::BTreeSet;

use serde::Serialize;

use algoscope_graph::{Graph, NodeId};
use algoscope_steps::{
    ArrayState, CallState, Outcome, Role, RouteState, Scene, TableState, TraversalState,
    TrieState, VisualState,
};

use crate::structure::Structure;

/// Minimum bar height, as a percentage of the tallest bar.
const MIN_BAR_HEIGHT: f32 = 5.0;

/// Highlight categories shared by every visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Idle,
    /// Being compared or inspected
    Compare,
    /// Current focus: pivot, key, active node
    Focus,
    /// Secondary marker: minimum, bounds, pending frontier
    Marker,
    /// Settled, found, visited, finalized
    Done,
}

impl Tone {
    pub fn color(self) -> &'static str {
        match self {
            Tone::Idle => "#38bdf8",
            Tone::Compare => "#ef4444",
            Tone::Focus => "#eab308",
            Tone::Marker => "#a855f7",
            Tone::Done => "#22c55e",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub value: i64,
    /// Percentage of the tallest bar
    pub height: f32,
    pub tone: Tone,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    /// Tentative distance, for shortest paths
    pub label: Option<String>,
    pub tone: Tone,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub a: NodeId,
    pub b: NodeId,
    pub weight: Option<u32>,
    pub tone: Tone,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    pub value: String,
    pub tone: Tone,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    pub label: String,
    pub tone: Tone,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrieNodeView {
    pub id: usize,
    pub parent: Option<usize>,
    pub letter: Option<char>,
    pub terminal: bool,
    pub tone: Tone,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    pub key: String,
    pub value: String,
    pub tone: Tone,
    pub color: &'static str,
}

/// How a sequence is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Vertical, top last
    Stack,
    /// Front to back
    Queue,
    /// Nodes joined by arrows, ending in NULL
    Chain,
    /// Cells with their indices
    Indexed,
}

/// Drawable form of a visual state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Presentation {
    Bars { bars: Vec<Bar> },
    Graph { nodes: Vec<NodeView>, edges: Vec<EdgeView> },
    Table { rows: Vec<Vec<CellView>> },
    Calls { frames: Vec<FrameView>, memo: Vec<(u64, u64)> },
    Trie { nodes: Vec<TrieNodeView>, matches: Vec<String> },
    /// Stack, queue, list or linked list, in storage order
    Sequence { layout: Layout, cells: Vec<CellView> },
    Entries { entries: Vec<EntryView> },
}

impl Presentation {
    /// Build the drawable form.
    ///
    /// `graph` supplies node positions for graph scenes. `end` overrides the
    /// shortest-path destination, so a path can be shown for an end node
    /// picked after the run finished.
    pub fn of(visual: &VisualState, graph: Option<&Graph>, end: Option<NodeId>) -> Self {
        match &visual.scene {
            Scene::Array(array) => Self::Bars { bars: bars(array) },
            Scene::Traversal(traversal) => traversal_graph(traversal, graph),
            Scene::Route(route) => {
                let end = end.or(route.end);
                let path = match (&visual.outcome, end) {
                    (Some(Outcome::Route { path, .. }), None) => path.clone(),
                    (Some(_), Some(end)) => route.path_to(end).unwrap_or_default(),
                    _ => Vec::new(),
                };
                route_graph(route, graph, &path)
            }
            Scene::Table(table) => Self::Table {
                rows: table_rows(table, visual.is_finished()),
            },
            Scene::Calls(calls) => call_frames(calls),
            Scene::Trie(trie) => trie_nodes(trie),
        }
    }
}

impl Presentation {
    /// Drawable form of a directly edited container. `focus` is the element
    /// touched by the last edit; the end that would be removed next is marked.
    pub fn of_structure(structure: &Structure, focus: Option<usize>) -> Self {
        let tone = |i: usize, next_out: Option<usize>| {
            if focus == Some(i) {
                Tone::Focus
            } else if next_out == Some(i) {
                Tone::Marker
            } else {
                Tone::Idle
            }
        };
        let cells = |values: Vec<i64>, next_out: Option<usize>| -> Vec<CellView> {
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    let tone = tone(i, next_out);
                    CellView {
                        value: v.to_string(),
                        tone,
                        color: tone.color(),
                    }
                })
                .collect()
        };
        match structure {
            Structure::Stack { items } => Self::Sequence {
                layout: Layout::Stack,
                cells: cells(items.clone(), items.len().checked_sub(1)),
            },
            Structure::Queue { items } => Self::Sequence {
                layout: Layout::Queue,
                cells: cells(items.iter().copied().collect(), (!items.is_empty()).then_some(0)),
            },
            Structure::LinkedList { nodes } => Self::Sequence {
                layout: Layout::Chain,
                cells: cells(nodes.iter().copied().collect(), None),
            },
            Structure::List { items } => Self::Sequence {
                layout: Layout::Indexed,
                cells: cells(items.clone(), None),
            },
            Structure::Dict { entries } => Self::Entries {
                entries: entries
                    .iter()
                    .enumerate()
                    .map(|(i, (key, value))| {
                        let tone = tone(i, None);
                        EntryView {
                            key: key.clone(),
                            value: value.clone(),
                            tone,
                            color: tone.color(),
                        }
                    })
                    .collect(),
            },
        }
    }
}

fn bar_tone(array: &ArrayState, index: usize) -> Tone {
    let has = |roles: &[Role]| roles.iter().any(|&r| array.marked(r).contains(&index));
    if has(&[Role::Found]) || array.settled.contains(&index) {
        Tone::Done
    } else if has(&[Role::Comparing, Role::Scanned]) {
        Tone::Compare
    } else if has(&[Role::Pivot, Role::Current, Role::Mid, Role::Active]) {
        Tone::Focus
    } else if has(&[Role::Minimum, Role::Boundary, Role::Low, Role::High]) {
        Tone::Marker
    } else {
        Tone::Idle
    }
}

fn bars(array: &ArrayState) -> Vec<Bar> {
    let max = array.values.iter().copied().max().unwrap_or(0);
    array
        .values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let height = if max > 0 {
                (value.max(0) as f32 / max as f32 * 100.0).max(MIN_BAR_HEIGHT)
            } else {
                MIN_BAR_HEIGHT
            };
            let tone = bar_tone(array, i);
            Bar {
                value,
                height,
                tone,
                color: tone.color(),
            }
        })
        .collect()
}

fn node_views(graph: Option<&Graph>, mut classify: impl FnMut(NodeId) -> (Tone, Option<String>)) -> Vec<NodeView> {
    graph
        .map(|g| g.nodes())
        .unwrap_or_default()
        .iter()
        .map(|node| {
            let (tone, label) = classify(node.id);
            NodeView {
                id: node.id,
                x: node.position.x,
                y: node.position.y,
                label,
                tone,
                color: tone.color(),
            }
        })
        .collect()
}

fn edge_views(graph: Option<&Graph>, path: &[NodeId]) -> Vec<EdgeView> {
    graph
        .map(|g| g.edges())
        .unwrap_or_default()
        .iter()
        .map(|edge| {
            let on_path = path.windows(2).any(|w| edge.connects(w[0], w[1]));
            let tone = if on_path { Tone::Done } else { Tone::Idle };
            EdgeView {
                a: edge.a,
                b: edge.b,
                weight: edge.weight,
                tone,
                color: tone.color(),
            }
        })
        .collect()
}

fn traversal_graph(traversal: &TraversalState, graph: Option<&Graph>) -> Presentation {
    let nodes = node_views(graph, |id| {
        let tone = if traversal.current == Some(id) {
            Tone::Focus
        } else if traversal.visited.contains(&id) {
            Tone::Done
        } else if traversal.frontier.contains(&id) {
            Tone::Marker
        } else {
            Tone::Idle
        };
        (tone, None)
    });
    Presentation::Graph {
        nodes,
        edges: edge_views(graph, &[]),
    }
}

fn route_graph(route: &RouteState, graph: Option<&Graph>, path: &[NodeId]) -> Presentation {
    let queued: BTreeSet<NodeId> = route.queue.iter().map(|e| e.node).collect();
    let nodes = node_views(graph, |id| {
        let tone = if route.current == Some(id) {
            Tone::Focus
        } else if route.neighbor == Some(id) {
            Tone::Compare
        } else if path.contains(&id) || route.finalized.contains(&id) {
            Tone::Done
        } else if queued.contains(&id) {
            Tone::Marker
        } else {
            Tone::Idle
        };
        (tone, route.distances.get(&id).map(ToString::to_string))
    });
    Presentation::Graph {
        nodes,
        edges: edge_views(graph, path),
    }
}

fn table_rows(table: &TableState, finished: bool) -> Vec<Vec<CellView>> {
    let last_row = table.cells.len().saturating_sub(1);
    table
        .cells
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let last_col = cells.len().saturating_sub(1);
            cells
                .iter()
                .enumerate()
                .map(|(col, cost)| {
                    let here = |c: &algoscope_steps::CellRef| c.row == row && c.col == col;
                    let tone = if table.current.as_ref().is_some_and(here) {
                        Tone::Focus
                    } else if table.compare.iter().any(here) {
                        Tone::Compare
                    } else if finished && row == last_row && col == last_col {
                        Tone::Done
                    } else {
                        Tone::Idle
                    };
                    CellView {
                        value: cost.to_string(),
                        tone,
                        color: tone.color(),
                    }
                })
                .collect()
        })
        .collect()
}

fn call_frames(calls: &CallState) -> Presentation {
    let top = calls.stack.len().saturating_sub(1);
    let frames = calls
        .stack
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let tone = if i == top { Tone::Focus } else { Tone::Idle };
            FrameView {
                label: format!("{}({arg})", calls.function),
                tone,
                color: tone.color(),
            }
        })
        .collect();
    Presentation::Calls {
        frames,
        memo: calls.memo.iter().map(|(&k, &v)| (k, v)).collect(),
    }
}

fn trie_nodes(state: &TrieState) -> Presentation {
    let nodes = state.trie.nodes();
    let mut parents = vec![None; nodes.len()];
    for (id, node) in nodes.iter().enumerate() {
        for &child in node.children.values() {
            if let Some(slot) = parents.get_mut(child) {
                *slot = Some(id);
            }
        }
    }
    let nodes = nodes
        .iter()
        .enumerate()
        .map(|(id, node)| {
            let tone = if state.cursor == Some(id) {
                Tone::Focus
            } else if state.path.contains(&id) {
                Tone::Marker
            } else if node.terminal {
                Tone::Done
            } else {
                Tone::Idle
            };
            TrieNodeView {
                id,
                parent: parents[id],
                letter: node.letter,
                terminal: node.terminal,
                tone,
                color: tone.color(),
            }
        })
        .collect();
    Presentation::Trie {
        nodes,
        matches: state.matches.clone(),
    }
}
