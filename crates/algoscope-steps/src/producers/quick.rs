use crate::error::Fault;
use crate::producer::StepProducer;
use crate::producers::{settle_all, swap};
use crate::step::{ArrayStep, Outcome, Role, Step};

#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Pop the next pending range
    Run,
    /// Lomuto scan: `store` is the next slot of the "less" region
    Scan { lo: usize, hi: usize, store: usize, j: usize },
    Swap { lo: usize, hi: usize, store: usize, j: usize },
    Finish,
    Done,
}

/// Quick sort with Lomuto partitioning and the last element as pivot.
pub struct QuickSort {
    values: Vec<i64>,
    /// Pending inclusive ranges, never empty
    ranges: Vec<(usize, usize)>,
    phase: Phase,
}

impl QuickSort {
    pub fn new(values: Vec<i64>) -> Self {
        let ranges = match values.len() {
            0 => Vec::new(),
            n => vec![(0, n - 1)],
        };
        Self {
            values,
            ranges,
            phase: Phase::Run,
        }
    }

    fn place_pivot(&mut self, lo: usize, hi: usize, store: usize) -> Step {
        // Right pushed first so the left side is partitioned first
        if store < hi {
            self.ranges.push((store + 1, hi));
        }
        if store > lo {
            self.ranges.push((lo, store - 1));
        }
        self.phase = Phase::Run;
        let step = swap(&mut self.values, store, hi);
        step.clear(Role::Comparing)
            .clear(Role::Boundary)
            .clear(Role::Pivot)
            .settle([store])
            .note(format!("Pivot {} placed at index {store}.", self.values[store]))
            .into()
    }
}

impl StepProducer for QuickSort {
    fn name(&self) -> &'static str {
        "quick_sort"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let step = match self.phase {
            Phase::Run => match self.ranges.pop() {
                Some((lo, hi)) if lo == hi => ArrayStep::new()
                    .settle([lo])
                    .note(format!("{} is a single element, already sorted.", self.values[lo]))
                    .into(),
                Some((lo, hi)) => {
                    self.phase = Phase::Scan { lo, hi, store: lo, j: lo };
                    ArrayStep::new()
                        .mark(Role::Pivot, [hi])
                        .clear(Role::Boundary)
                        .note(format!("Partitioning [{lo}..{hi}] around pivot {}.", self.values[hi]))
                        .into()
                }
                None => {
                    self.phase = Phase::Finish;
                    settle_all(self.values.len(), &[Role::Pivot, Role::Boundary, Role::Comparing])
                }
            },
            Phase::Scan { lo, hi, store, j } if j < hi => {
                let (value, pivot) = (self.values[j], self.values[hi]);
                self.phase = if value < pivot {
                    Phase::Swap { lo, hi, store, j }
                } else {
                    Phase::Scan { lo, hi, store, j: j + 1 }
                };
                ArrayStep::new()
                    .mark(Role::Comparing, [j])
                    .note(format!("Comparing {value} with pivot {pivot}."))
                    .into()
            }
            Phase::Scan { lo, hi, store, .. } => self.place_pivot(lo, hi, store),
            Phase::Swap { lo, hi, store, j } => {
                self.phase = Phase::Scan { lo, hi, store: store + 1, j: j + 1 };
                let step = swap(&mut self.values, store, j);
                step.mark(Role::Boundary, [store])
                    .note(format!("{} is smaller than the pivot, moved to index {store}.", self.values[store]))
                    .into()
            }
            Phase::Finish => {
                self.phase = Phase::Done;
                Step::finished(Outcome::Sorted)
            }
            Phase::Done => return Ok(None),
        };
        Ok(Some(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producers::testing;

    #[test]
    fn sorts() {
        let input = [10, 80, 30, 90, 40, 50, 70];
        let (values, settled) = testing::sort(QuickSort::new(input.to_vec()), &input);
        assert_eq!(values, vec![10, 30, 40, 50, 70, 80, 90]);
        assert_eq!(settled, input.len());
    }

    #[test]
    fn pivots_settle_before_the_end() {
        let input = [3, 1, 2];
        let (steps, _) = testing::run(QuickSort::new(input.to_vec()), testing::array_baseline(&input));
        // The first partition places pivot 2 at index 1 and settles it
        let first_settle = steps
            .iter()
            .find_map(|s| match s {
                Step::Array(a) if !a.settled.is_empty() => Some(a.settled.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_settle, vec![1]);
    }

    #[test]
    fn already_sorted_and_reversed() {
        for input in [vec![1, 2, 3, 4, 5], vec![5, 4, 3, 2, 1], vec![2, 2, 2]] {
            let mut expected = input.clone();
            expected.sort();
            let (values, settled) = testing::sort(QuickSort::new(input.clone()), &input);
            assert_eq!(values, expected);
            assert_eq!(settled, input.len());
        }
    }
}
