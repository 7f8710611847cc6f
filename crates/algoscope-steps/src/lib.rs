//! Algoscope Steps
//!
//! Turns algorithm executions into finite sequences of small, mergeable
//! state deltas.
//!
//! - **Step**: a partial update; absent fields leave state untouched
//! - **StepProducer**: an explicit state machine yielding steps on demand,
//!   never restartable; rebuild from a [`Scenario`] to replay
//! - **VisualState**: the fold of every step emitted so far
//!
//! No timing, randomness, or I/O lives here. Playback and scheduling belong to
//! the caller.
//!
//! ```
//! use algoscope_steps::{run_to_end, Scenario, SortAlgorithm};
//!
//! let scenario = Scenario::sort(SortAlgorithm::Bubble, vec![5, 3, 8, 1]);
//! let state = run_to_end(scenario.build().as_mut(), scenario.baseline()).unwrap();
//! assert_eq!(state.array().unwrap().values, vec![1, 3, 5, 8]);
//! ```

mod error;
pub mod input;
mod producer;
pub mod producers;
mod scenario;
mod state;
mod step;
mod trie;

pub use error::{Error, Fault, Result};
pub use producer::{drain, run_to_end, StepProducer, MAX_STEPS};
pub use producers::Item;
pub use scenario::{Scenario, SortAlgorithm, TraversalOrder};
pub use state::{
    ArrayState, CallState, Frontier, RouteState, Scene, TableState, TraversalState, TrieState,
    VisualState,
};
pub use step::{
    ArrayStep, CallStep, CellRef, CellWrite, Cost, Growth, Link, Mark, Outcome, Patch, QueueEntry,
    Role, RouteStep, Step, TableStep, TraversalStep, TrieStep, Write,
};
pub use trie::{Trie, TrieNode, ROOT};

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    const SORTS: [SortAlgorithm; 6] = [
        SortAlgorithm::Bubble,
        SortAlgorithm::Selection,
        SortAlgorithm::Insertion,
        SortAlgorithm::Merge,
        SortAlgorithm::Quick,
        SortAlgorithm::Heap,
    ];

    proptest! {
        #[test]
        fn every_sort_sorts_and_settles_everything(values in prop::collection::vec(10i64..100, 0..30)) {
            let mut expected = values.clone();
            expected.sort();
            for algorithm in SORTS {
                let scenario = Scenario::sort(algorithm, values.clone());
                let state = run_to_end(scenario.build().as_mut(), scenario.baseline()).unwrap();
                let array = state.array().unwrap();
                prop_assert_eq!(&array.values, &expected);
                prop_assert_eq!(array.settled.len(), values.len());
                prop_assert_eq!(state.outcome.clone(), Some(Outcome::Sorted));
            }
        }

        #[test]
        fn sorted_set_only_grows(values in prop::collection::vec(0i64..50, 1..20), pick in 0usize..6) {
            let scenario = Scenario::sort(SORTS[pick], values);
            let mut producer = scenario.build();
            let mut state = scenario.baseline();
            let mut last = 0;
            while let Some(step) = producer.advance().unwrap() {
                state.apply(&step).unwrap();
                let settled = state.array().unwrap().settled.len();
                prop_assert!(settled >= last);
                last = settled;
            }
        }

        #[test]
        fn prefix_fold_matches_incremental_apply(
            values in prop::collection::vec(0i64..50, 1..15),
            cut in 0usize..400,
        ) {
            let scenario = Scenario::sort(SortAlgorithm::Merge, values);
            let steps = drain(scenario.build().as_mut()).unwrap();
            let k = cut.min(steps.len());
            let folded = VisualState::fold(scenario.baseline(), &steps[..k]).unwrap();

            let mut producer = scenario.build();
            let mut live = scenario.baseline();
            for _ in 0..k {
                let step = producer.advance().unwrap().unwrap();
                live.apply(&step).unwrap();
            }
            prop_assert_eq!(folded, live);
        }

        #[test]
        fn binary_search_agrees_with_contains(target in 0i64..50) {
            let values: Vec<i64> = (1..=15).map(|i| i * 3).collect();
            let scenario = Scenario::binary_search(values.clone(), target).unwrap();
            let state = run_to_end(scenario.build().as_mut(), scenario.baseline()).unwrap();
            match state.outcome {
                Some(Outcome::Found { index, .. }) => prop_assert_eq!(values[index], target),
                Some(Outcome::NotFound { .. }) => prop_assert!(!values.contains(&target)),
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
        }
    }
}
