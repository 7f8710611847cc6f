//! Step producers, one explicit state machine per algorithm.
//!
//! Every producer owns a private working copy of its input. A `Phase` enum
//! plays the role of a program counter; recursive algorithms keep an explicit
//! frame stack instead of native recursion.

mod dijkstra;
mod dp;
mod heap;
mod merge;
mod quick;
mod recursion;
mod search;
mod sorting;
mod traversal;
mod trie;

pub use dijkstra::Dijkstra;
pub use dp::{CoinChange, Item, Knapsack};
pub use heap::HeapSort;
pub use merge::MergeSort;
pub use quick::QuickSort;
pub use recursion::{Factorial, Fibonacci};
pub use search::{BinarySearch, LinearSearch};
pub use sorting::{BubbleSort, InsertionSort, SelectionSort};
pub use traversal::{BreadthFirst, DepthFirst};
pub use trie::{TrieInsert, TrieSearch};

use crate::step::{ArrayStep, Role, Step};

/// Swap two positions of the working copy and describe the writes.
pub(crate) fn swap(values: &mut [i64], a: usize, b: usize) -> ArrayStep {
    values.swap(a, b);
    ArrayStep::new().write(a, values[a]).write(b, values[b])
}

/// Closing array step shared by every sort: clears highlights and settles
/// whatever is left.
pub(crate) fn settle_all(len: usize, roles: &[Role]) -> Step {
    let mut step = ArrayStep::new().settle(0..len);
    for &role in roles {
        step = step.clear(role);
    }
    step.note("Array sorted.").into()
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::producer::{drain, StepProducer};
    use crate::state::{ArrayState, Scene, VisualState};
    use crate::step::Step;

    pub fn array_baseline(values: &[i64]) -> VisualState {
        VisualState::new(Scene::Array(ArrayState::new(values.to_vec())))
    }

    /// Drain and fold, checking the terminal marker comes last exactly once.
    pub fn run(mut producer: impl StepProducer, baseline: VisualState) -> (Vec<Step>, VisualState) {
        let steps = drain(&mut producer).unwrap();
        let terminals = steps.iter().filter(|s| s.is_terminal()).count();
        assert_eq!(terminals, 1, "exactly one terminal step");
        assert!(steps.last().unwrap().is_terminal());
        assert_eq!(producer.advance().unwrap(), None);
        let state = VisualState::fold(baseline, &steps).unwrap();
        (steps, state)
    }

    /// Run a sort and return the final array and sorted set size.
    pub fn sort(producer: impl StepProducer, values: &[i64]) -> (Vec<i64>, usize) {
        let (_, state) = run(producer, array_baseline(values));
        let array = state.array().unwrap();
        (array.values.clone(), array.settled.len())
    }
}
