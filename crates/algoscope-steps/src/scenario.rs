//! Validated inputs, ready to build a fresh producer on demand.

use algoscope_graph::{Graph, NodeId};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::input;
use crate::producer::StepProducer;
use crate::producers::{
    BinarySearch, BreadthFirst, BubbleSort, CoinChange, DepthFirst, Dijkstra, Factorial, Fibonacci,
    HeapSort, InsertionSort, Item, Knapsack, LinearSearch, MergeSort, QuickSort, SelectionSort,
    TrieInsert, TrieSearch,
};
use crate::state::{
    ArrayState, CallState, Frontier, RouteState, Scene, TableState, TraversalState, TrieState,
    VisualState,
};
use crate::trie::Trie;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAlgorithm {
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
    Heap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    Breadth,
    Depth,
}

#[derive(Debug, Clone)]
enum Kind {
    Sort { algorithm: SortAlgorithm, values: Vec<i64> },
    LinearSearch { values: Vec<i64>, target: i64 },
    BinarySearch { values: Vec<i64>, target: i64 },
    Traversal { order: TraversalOrder, graph: Graph, start: NodeId },
    ShortestPath { graph: Graph, start: NodeId, end: Option<NodeId> },
    CoinChange { coins: Vec<u64>, amount: u64 },
    Knapsack { items: Vec<Item>, capacity: u64 },
    Fibonacci(u64),
    Factorial(u64),
    TrieInsert { trie: Trie, word: String },
    TrieSearch { trie: Trie, prefix: String },
}

/// One algorithm bound to one validated input.
///
/// Every [`Scenario::build`] returns a brand-new producer over a copy of the
/// input, which is how a reset replays from the beginning.
#[derive(Debug, Clone)]
pub struct Scenario {
    kind: Kind,
}

fn require_start(graph: &Graph, start: Option<NodeId>) -> Result<NodeId> {
    match start {
        Some(node) if graph.contains(node) => Ok(node),
        Some(node) => Err(Error::not_applicable(format!("Node {node} is not in the graph."))),
        None => Err(Error::not_applicable("Select a start node first.")),
    }
}

impl Scenario {
    pub fn sort(algorithm: SortAlgorithm, values: Vec<i64>) -> Self {
        Self {
            kind: Kind::Sort { algorithm, values },
        }
    }

    pub fn linear_search(values: Vec<i64>, target: i64) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::not_applicable("There is nothing to search."));
        }
        Ok(Self {
            kind: Kind::LinearSearch { values, target },
        })
    }

    pub fn binary_search(values: Vec<i64>, target: i64) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::not_applicable("There is nothing to search."));
        }
        input::check_ascending(&values)?;
        Ok(Self {
            kind: Kind::BinarySearch { values, target },
        })
    }

    pub fn traversal(order: TraversalOrder, graph: &Graph, start: Option<NodeId>) -> Result<Self> {
        let start = require_start(graph, start)?;
        Ok(Self {
            kind: Kind::Traversal {
                order,
                graph: graph.clone(),
                start,
            },
        })
    }

    pub fn shortest_path(graph: &Graph, start: Option<NodeId>, end: Option<NodeId>) -> Result<Self> {
        let start = require_start(graph, start)?;
        if let Some(end) = end.filter(|e| !graph.contains(*e)) {
            return Err(Error::invalid(format!("End node {end} is not in the graph.")));
        }
        Ok(Self {
            kind: Kind::ShortestPath {
                graph: graph.clone(),
                start,
                end,
            },
        })
    }

    pub fn coin_change(coins: Vec<u64>, amount: u64) -> Result<Self> {
        if !input::AMOUNT.contains(&amount) {
            return Err(Error::invalid(format!(
                "Amount must be between {} and {}.",
                input::AMOUNT.start(),
                input::AMOUNT.end()
            )));
        }
        if coins.is_empty() {
            return Err(Error::not_applicable("Add at least one coin."));
        }
        if coins.len() > input::MAX_COINS || coins.iter().any(|c| !input::COIN.contains(c)) {
            return Err(Error::invalid("Coins are out of range."));
        }
        Ok(Self {
            kind: Kind::CoinChange { coins, amount },
        })
    }

    pub fn knapsack(items: Vec<Item>, capacity: u64) -> Result<Self> {
        if !input::CAPACITY.contains(&capacity) {
            return Err(Error::invalid(format!(
                "Capacity must be between {} and {}.",
                input::CAPACITY.start(),
                input::CAPACITY.end()
            )));
        }
        if items.is_empty() {
            return Err(Error::not_applicable("Add at least one item."));
        }
        if items.len() > input::MAX_ITEMS {
            return Err(Error::invalid(format!("At most {} items are supported.", input::MAX_ITEMS)));
        }
        if items.iter().any(|i| !input::ITEM_WEIGHT.contains(&i.weight)) {
            return Err(Error::invalid(format!(
                "Item weights must be between {} and {}.",
                input::ITEM_WEIGHT.start(),
                input::ITEM_WEIGHT.end()
            )));
        }
        if items.iter().any(|i| !input::ITEM_VALUE.contains(&i.value)) {
            return Err(Error::invalid(format!(
                "Item values must be between {} and {}.",
                input::ITEM_VALUE.start(),
                input::ITEM_VALUE.end()
            )));
        }
        Ok(Self {
            kind: Kind::Knapsack { items, capacity },
        })
    }

    pub fn fibonacci(n: u64) -> Result<Self> {
        if !input::FIB_N.contains(&n) {
            return Err(Error::invalid(format!(
                "Please enter n between {} and {}.",
                input::FIB_N.start(),
                input::FIB_N.end()
            )));
        }
        Ok(Self {
            kind: Kind::Fibonacci(n),
        })
    }

    pub fn factorial(n: u64) -> Result<Self> {
        if !input::FACTORIAL_N.contains(&n) {
            return Err(Error::invalid(format!(
                "Please enter n between {} and {}.",
                input::FACTORIAL_N.start(),
                input::FACTORIAL_N.end()
            )));
        }
        Ok(Self {
            kind: Kind::Factorial(n),
        })
    }

    pub fn trie_insert(trie: &Trie, word: &str) -> Result<Self> {
        let word = input::parse_word(word)?;
        Ok(Self {
            kind: Kind::TrieInsert {
                trie: trie.clone(),
                word,
            },
        })
    }

    pub fn trie_search(trie: &Trie, prefix: &str) -> Result<Self> {
        let prefix = input::parse_prefix(prefix)?;
        if trie.is_empty() {
            return Err(Error::not_applicable("The trie is empty. Insert a word first."));
        }
        Ok(Self {
            kind: Kind::TrieSearch {
                trie: trie.clone(),
                prefix,
            },
        })
    }

    /// Producer identifier, matching [`StepProducer::name`].
    pub fn name(&self) -> &'static str {
        match &self.kind {
            Kind::Sort { algorithm, .. } => match algorithm {
                SortAlgorithm::Bubble => "bubble_sort",
                SortAlgorithm::Selection => "selection_sort",
                SortAlgorithm::Insertion => "insertion_sort",
                SortAlgorithm::Merge => "merge_sort",
                SortAlgorithm::Quick => "quick_sort",
                SortAlgorithm::Heap => "heap_sort",
            },
            Kind::LinearSearch { .. } => "linear_search",
            Kind::BinarySearch { .. } => "binary_search",
            Kind::Traversal { order: TraversalOrder::Breadth, .. } => "bfs",
            Kind::Traversal { order: TraversalOrder::Depth, .. } => "dfs",
            Kind::ShortestPath { .. } => "dijkstra",
            Kind::CoinChange { .. } => "coin_change",
            Kind::Knapsack { .. } => "knapsack",
            Kind::Fibonacci(_) => "fibonacci",
            Kind::Factorial(_) => "factorial",
            Kind::TrieInsert { .. } => "trie_insert",
            Kind::TrieSearch { .. } => "trie_search",
        }
    }

    /// Fresh producer over a copy of the input.
    pub fn build(&self) -> Box<dyn StepProducer> {
        match &self.kind {
            Kind::Sort { algorithm, values } => {
                let values = values.clone();
                match algorithm {
                    SortAlgorithm::Bubble => Box::new(BubbleSort::new(values)),
                    SortAlgorithm::Selection => Box::new(SelectionSort::new(values)),
                    SortAlgorithm::Insertion => Box::new(InsertionSort::new(values)),
                    SortAlgorithm::Merge => Box::new(MergeSort::new(values)),
                    SortAlgorithm::Quick => Box::new(QuickSort::new(values)),
                    SortAlgorithm::Heap => Box::new(HeapSort::new(values)),
                }
            }
            Kind::LinearSearch { values, target } => Box::new(LinearSearch::new(values.clone(), *target)),
            Kind::BinarySearch { values, target } => Box::new(BinarySearch::new(values.clone(), *target)),
            Kind::Traversal { order, graph, start } => match order {
                TraversalOrder::Breadth => Box::new(BreadthFirst::new(graph, *start)),
                TraversalOrder::Depth => Box::new(DepthFirst::new(graph, *start)),
            },
            Kind::ShortestPath { graph, start, end } => Box::new(Dijkstra::new(graph, *start, *end)),
            Kind::CoinChange { coins, amount } => Box::new(CoinChange::new(coins.clone(), *amount)),
            Kind::Knapsack { items, capacity } => Box::new(Knapsack::new(items.clone(), *capacity)),
            Kind::Fibonacci(n) => Box::new(Fibonacci::new(*n)),
            Kind::Factorial(n) => Box::new(Factorial::new(*n)),
            Kind::TrieInsert { trie, word } => Box::new(TrieInsert::new(trie.clone(), word.clone())),
            Kind::TrieSearch { trie, prefix } => Box::new(TrieSearch::new(trie.clone(), prefix.clone())),
        }
    }

    /// Visual state before any step has been applied.
    pub fn baseline(&self) -> VisualState {
        let scene = match &self.kind {
            Kind::Sort { values, .. }
            | Kind::LinearSearch { values, .. }
            | Kind::BinarySearch { values, .. } => Scene::Array(ArrayState::new(values.clone())),
            Kind::Traversal { order, start, .. } => {
                let frontier = match order {
                    TraversalOrder::Breadth => Frontier::Queue,
                    TraversalOrder::Depth => Frontier::Stack,
                };
                Scene::Traversal(TraversalState::new(frontier, *start))
            }
            Kind::ShortestPath { start, end, .. } => Scene::Route(RouteState::new(*start, *end)),
            Kind::CoinChange { .. } | Kind::Knapsack { .. } => Scene::Table(TableState::default()),
            Kind::Fibonacci(_) => Scene::Calls(CallState::new("fib")),
            Kind::Factorial(_) => Scene::Calls(CallState::new("factorial")),
            Kind::TrieInsert { trie, .. } | Kind::TrieSearch { trie, .. } => {
                Scene::Trie(TrieState::new(trie.clone()))
            }
        };
        VisualState::new(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::run_to_end;
    use crate::step::Outcome;

    #[test]
    fn rebuilt_producers_replay_identically() {
        let scenario = Scenario::sort(SortAlgorithm::Quick, vec![5, 3, 8, 1, 9, 2]);
        let first = run_to_end(scenario.build().as_mut(), scenario.baseline()).unwrap();
        let second = run_to_end(scenario.build().as_mut(), scenario.baseline()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn names_match_producers() {
        let graph = Graph::traversal_default();
        let scenarios = [
            Scenario::sort(SortAlgorithm::Heap, vec![1]),
            Scenario::binary_search(vec![1, 2], 2).unwrap(),
            Scenario::traversal(TraversalOrder::Depth, &graph, Some(NodeId(1))).unwrap(),
            Scenario::coin_change(vec![1], 3).unwrap(),
            Scenario::factorial(3).unwrap(),
        ];
        for scenario in scenarios {
            assert_eq!(scenario.name(), scenario.build().name());
        }
    }

    #[test]
    fn rejects_bad_input() {
        let graph = Graph::traversal_default();
        assert!(matches!(
            Scenario::traversal(TraversalOrder::Breadth, &graph, None),
            Err(Error::NotApplicable(_))
        ));
        assert!(matches!(
            Scenario::traversal(TraversalOrder::Breadth, &graph, Some(NodeId(99))),
            Err(Error::NotApplicable(_))
        ));
        assert!(matches!(
            Scenario::binary_search(vec![3, 1], 1),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(Scenario::linear_search(vec![], 1), Err(Error::NotApplicable(_))));
        assert!(matches!(Scenario::coin_change(vec![1], 0), Err(Error::InvalidInput(_))));
        assert!(matches!(Scenario::fibonacci(21), Err(Error::InvalidInput(_))));
        assert!(matches!(
            Scenario::trie_search(&Trie::new(), "a"),
            Err(Error::NotApplicable(_))
        ));
        assert!(matches!(
            Scenario::trie_insert(&Trie::new(), "n0pe"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn knapsack_items_bounded_before_building() {
        let huge = vec![Item::new(1, u64::MAX), Item::new(1, u64::MAX)];
        assert!(matches!(Scenario::knapsack(huge, 2), Err(Error::InvalidInput(_))));
        assert!(matches!(
            Scenario::knapsack(vec![Item::new(0, 10)], 5),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Scenario::knapsack(vec![Item::new(101, 10)], 5),
            Err(Error::InvalidInput(_))
        ));

        let edge = vec![Item::new(100, 1000), Item::new(1, 1000)];
        let scenario = Scenario::knapsack(edge, 100).unwrap();
        let state = run_to_end(scenario.build().as_mut(), scenario.baseline()).unwrap();
        assert_eq!(state.table().unwrap().get(2, 100), Some(crate::step::Cost::Finite(1000)));
    }

    #[test]
    fn shortest_path_without_end_explores() {
        let graph = Graph::weighted_default();
        let scenario = Scenario::shortest_path(&graph, Some(NodeId(1)), None).unwrap();
        let state = run_to_end(scenario.build().as_mut(), scenario.baseline()).unwrap();
        assert_eq!(state.outcome, Some(Outcome::Explored { reached: 5 }));
        // the end node can be chosen after the run
        assert_eq!(
            state.route().unwrap().route_to(NodeId(4)),
            Some((vec![NodeId(1), NodeId(3), NodeId(2), NodeId(4)], 6))
        );
    }
}
