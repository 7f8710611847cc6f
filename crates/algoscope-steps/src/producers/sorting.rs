//! The quadratic sorts: bubble, selection, insertion.

use crate::error::Fault;
use crate::producer::StepProducer;
use crate::producers::{settle_all, swap};
use crate::step::{ArrayStep, Outcome, Role, Step};

#[derive(Debug, Clone, Copy)]
enum BubblePhase {
    Compare { pass: usize, j: usize },
    Swap { pass: usize, j: usize },
    EndPass { pass: usize },
    Wrap,
    Finish,
    Done,
}

/// Adjacent compare-and-swap, largest element bubbling right each pass.
pub struct BubbleSort {
    values: Vec<i64>,
    phase: BubblePhase,
}

impl BubbleSort {
    pub fn new(values: Vec<i64>) -> Self {
        let phase = if values.len() >= 2 {
            BubblePhase::Compare { pass: 0, j: 0 }
        } else {
            BubblePhase::Wrap
        };
        Self { values, phase }
    }

    fn after_compare(&self, pass: usize, j: usize) -> BubblePhase {
        if j + 1 < self.values.len() - 1 - pass {
            BubblePhase::Compare { pass, j: j + 1 }
        } else {
            BubblePhase::EndPass { pass }
        }
    }
}

impl StepProducer for BubbleSort {
    fn name(&self) -> &'static str {
        "bubble_sort"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let n = self.values.len();
        let step = match self.phase {
            BubblePhase::Compare { pass, j } => {
                let (a, b) = (self.values[j], self.values[j + 1]);
                self.phase = if a > b {
                    BubblePhase::Swap { pass, j }
                } else {
                    self.after_compare(pass, j)
                };
                ArrayStep::new()
                    .mark(Role::Comparing, [j, j + 1])
                    .note(format!("Comparing {a} and {b}."))
                    .into()
            }
            BubblePhase::Swap { pass, j } => {
                self.phase = self.after_compare(pass, j);
                let step = swap(&mut self.values, j, j + 1);
                step.note(format!("Swapped {} and {}.", self.values[j + 1], self.values[j]))
                    .into()
            }
            BubblePhase::EndPass { pass } => {
                self.phase = if pass + 1 < n - 1 {
                    BubblePhase::Compare { pass: pass + 1, j: 0 }
                } else {
                    BubblePhase::Wrap
                };
                ArrayStep::new()
                    .clear(Role::Comparing)
                    .settle([n - 1 - pass])
                    .note(format!("{} is in its final position.", self.values[n - 1 - pass]))
                    .into()
            }
            BubblePhase::Wrap => {
                self.phase = BubblePhase::Finish;
                settle_all(n, &[Role::Comparing])
            }
            BubblePhase::Finish => {
                self.phase = BubblePhase::Done;
                Step::finished(Outcome::Sorted)
            }
            BubblePhase::Done => return Ok(None),
        };
        Ok(Some(step))
    }
}

#[derive(Debug, Clone, Copy)]
enum SelectionPhase {
    Begin { i: usize },
    Compare { i: usize, j: usize, min: usize },
    NewMinimum { i: usize, j: usize },
    Swap { i: usize, min: usize },
    Wrap,
    Finish,
    Done,
}

/// Repeatedly select the minimum of the unsorted suffix.
pub struct SelectionSort {
    values: Vec<i64>,
    phase: SelectionPhase,
}

impl SelectionSort {
    pub fn new(values: Vec<i64>) -> Self {
        let phase = if values.len() >= 2 {
            SelectionPhase::Begin { i: 0 }
        } else {
            SelectionPhase::Wrap
        };
        Self { values, phase }
    }

    fn next_candidate(&self, i: usize, j: usize, min: usize) -> SelectionPhase {
        if j + 1 < self.values.len() {
            SelectionPhase::Compare { i, j: j + 1, min }
        } else {
            SelectionPhase::Swap { i, min }
        }
    }
}

impl StepProducer for SelectionSort {
    fn name(&self) -> &'static str {
        "selection_sort"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let n = self.values.len();
        let step = match self.phase {
            SelectionPhase::Begin { i } => {
                self.phase = SelectionPhase::Compare { i, j: i + 1, min: i };
                ArrayStep::new()
                    .mark(Role::Current, [i])
                    .mark(Role::Minimum, [i])
                    .note(format!("Finding the minimum for position {i}."))
                    .into()
            }
            SelectionPhase::Compare { i, j, min } => {
                let smaller = self.values[j] < self.values[min];
                self.phase = if smaller {
                    SelectionPhase::NewMinimum { i, j }
                } else {
                    self.next_candidate(i, j, min)
                };
                ArrayStep::new()
                    .mark(Role::Comparing, [j])
                    .note(format!(
                        "Comparing {} with current minimum {}.",
                        self.values[j], self.values[min]
                    ))
                    .into()
            }
            SelectionPhase::NewMinimum { i, j } => {
                self.phase = self.next_candidate(i, j, j);
                ArrayStep::new()
                    .mark(Role::Minimum, [j])
                    .note(format!("New minimum: {}.", self.values[j]))
                    .into()
            }
            SelectionPhase::Swap { i, min } => {
                self.phase = if i + 2 < n {
                    SelectionPhase::Begin { i: i + 1 }
                } else {
                    SelectionPhase::Wrap
                };
                let step = if min == i {
                    ArrayStep::new().note(format!("{} is already in place.", self.values[i]))
                } else {
                    swap(&mut self.values, i, min)
                        .note(format!("Swapped {} into position {i}.", self.values[i]))
                };
                step.clear(Role::Comparing)
                    .clear(Role::Minimum)
                    .settle([i])
                    .into()
            }
            SelectionPhase::Wrap => {
                self.phase = SelectionPhase::Finish;
                settle_all(n, &[Role::Current, Role::Comparing, Role::Minimum])
            }
            SelectionPhase::Finish => {
                self.phase = SelectionPhase::Done;
                Step::finished(Outcome::Sorted)
            }
            SelectionPhase::Done => return Ok(None),
        };
        Ok(Some(step))
    }
}

#[derive(Debug, Clone, Copy)]
enum InsertionPhase {
    Pick { i: usize },
    Shift { i: usize, hole: usize, key: i64 },
    Wrap,
    Finish,
    Done,
}

/// Grow a sorted prefix by shifting larger elements right of each key.
pub struct InsertionSort {
    values: Vec<i64>,
    phase: InsertionPhase,
}

impl InsertionSort {
    pub fn new(values: Vec<i64>) -> Self {
        let phase = if values.len() >= 2 {
            InsertionPhase::Pick { i: 1 }
        } else {
            InsertionPhase::Wrap
        };
        Self { values, phase }
    }
}

impl StepProducer for InsertionSort {
    fn name(&self) -> &'static str {
        "insertion_sort"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let n = self.values.len();
        let step = match self.phase {
            InsertionPhase::Pick { i } => {
                let key = self.values[i];
                self.phase = InsertionPhase::Shift { i, hole: i, key };
                ArrayStep::new()
                    .mark(Role::Current, [i])
                    .note(format!("Inserting {key} into the sorted prefix."))
                    .into()
            }
            InsertionPhase::Shift { i, hole, key } => {
                if hole > 0 && self.values[hole - 1] > key {
                    let moved = self.values[hole - 1];
                    self.values[hole] = moved;
                    self.phase = InsertionPhase::Shift { i, hole: hole - 1, key };
                    ArrayStep::new()
                        .write(hole, moved)
                        .mark(Role::Comparing, [hole - 1])
                        .note(format!("{moved} > {key}, shifting right."))
                        .into()
                } else {
                    self.values[hole] = key;
                    self.phase = if i + 1 < n {
                        InsertionPhase::Pick { i: i + 1 }
                    } else {
                        InsertionPhase::Wrap
                    };
                    ArrayStep::new()
                        .write(hole, key)
                        .clear(Role::Comparing)
                        .mark(Role::Current, [hole])
                        .note(format!("Placed {key} at index {hole}."))
                        .into()
                }
            }
            InsertionPhase::Wrap => {
                self.phase = InsertionPhase::Finish;
                settle_all(n, &[Role::Current, Role::Comparing])
            }
            InsertionPhase::Finish => {
                self.phase = InsertionPhase::Done;
                Step::finished(Outcome::Sorted)
            }
            InsertionPhase::Done => return Ok(None),
        };
        Ok(Some(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producers::testing;
    use crate::state::VisualState;

    #[test]
    fn bubble_sorts_the_example() {
        let (values, settled) = testing::sort(BubbleSort::new(vec![5, 3, 8, 1]), &[5, 3, 8, 1]);
        assert_eq!(values, vec![1, 3, 5, 8]);
        assert_eq!(settled, 4);
    }

    #[test]
    fn bubble_settles_from_the_right() {
        let input = [4, 3, 2, 1];
        let (steps, _) = testing::run(BubbleSort::new(input.to_vec()), testing::array_baseline(&input));
        let settled: Vec<usize> = steps
            .iter()
            .filter_map(|s| match s {
                Step::Array(a) => Some(a.settled.clone()),
                _ => None,
            })
            .filter(|s| s.len() == 1)
            .flatten()
            .collect();
        assert_eq!(settled, vec![3, 2, 1]);
    }

    #[test]
    fn bubble_one_step_per_comparison_and_swap() {
        // [2, 1]: one compare, one swap, one pass end, wrap, finish
        let (steps, _) = testing::run(BubbleSort::new(vec![2, 1]), testing::array_baseline(&[2, 1]));
        assert_eq!(steps.len(), 5);
    }

    #[test]
    fn selection_and_insertion_sort() {
        let input = [29, 10, 14, 37, 13, 10];
        let mut expected = input.to_vec();
        expected.sort();

        let (values, settled) = testing::sort(SelectionSort::new(input.to_vec()), &input);
        assert_eq!(values, expected);
        assert_eq!(settled, input.len());

        let (values, settled) = testing::sort(InsertionSort::new(input.to_vec()), &input);
        assert_eq!(values, expected);
        assert_eq!(settled, input.len());
    }

    #[test]
    fn trivial_arrays() {
        for input in [vec![], vec![7]] {
            let (values, settled) = testing::sort(BubbleSort::new(input.clone()), &input);
            assert_eq!(values, input);
            assert_eq!(settled, input.len());
            let (values, _) = testing::sort(SelectionSort::new(input.clone()), &input);
            assert_eq!(values, input);
            let (values, _) = testing::sort(InsertionSort::new(input.clone()), &input);
            assert_eq!(values, input);
        }
    }

    #[test]
    fn prefix_fold_is_consistent() {
        let input = vec![9, 4, 7, 1];
        let (steps, _) = testing::run(InsertionSort::new(input.clone()), testing::array_baseline(&input));
        for k in 0..steps.len() {
            let state = VisualState::fold(testing::array_baseline(&input), &steps[..k]).unwrap();
            assert_eq!(state.applied, k);
            assert!(!state.is_finished() || k == steps.len());
        }
    }
}
