use crate::error::Fault;
use crate::producer::StepProducer;
use crate::producers::{settle_all, swap};
use crate::step::{ArrayStep, Outcome, Role, Step};

/// Where a sift returns once the node has settled.
#[derive(Debug, Clone, Copy)]
enum Resume {
    /// Continue building with the nodes below this one
    Build(usize),
    /// Continue extracting below this end index
    Extract(usize),
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    /// `remaining` internal nodes still to heapify, highest first
    Build { remaining: usize },
    Sift { size: usize, node: usize, resume: Resume },
    SiftSwap { size: usize, node: usize, child: usize, resume: Resume },
    Extract { end: usize },
    Wrap,
    Finish,
    Done,
}

/// Heap sort over an in-place max-heap.
pub struct HeapSort {
    values: Vec<i64>,
    phase: Phase,
}

impl HeapSort {
    pub fn new(values: Vec<i64>) -> Self {
        let remaining = values.len() / 2;
        Self {
            values,
            phase: Phase::Build { remaining },
        }
    }

    fn resume(&self, resume: Resume) -> Phase {
        match resume {
            Resume::Build(node) => Phase::Build { remaining: node },
            Resume::Extract(end) if end > 1 => Phase::Extract { end: end - 1 },
            Resume::Extract(_) => Phase::Wrap,
        }
    }
}

impl StepProducer for HeapSort {
    fn name(&self) -> &'static str {
        "heap_sort"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let n = self.values.len();
        loop {
            let step = match self.phase {
                Phase::Build { remaining: 0 } => {
                    self.phase = if n > 1 {
                        Phase::Extract { end: n - 1 }
                    } else {
                        Phase::Wrap
                    };
                    continue;
                }
                Phase::Build { remaining } => {
                    let node = remaining - 1;
                    self.phase = Phase::Sift { size: n, node, resume: Resume::Build(node) };
                    continue;
                }
                Phase::Sift { size, node, resume } => {
                    let (left, right) = (2 * node + 1, 2 * node + 2);
                    if left >= size {
                        self.phase = self.resume(resume);
                        continue;
                    }
                    let mut largest = node;
                    if self.values[left] > self.values[largest] {
                        largest = left;
                    }
                    if right < size && self.values[right] > self.values[largest] {
                        largest = right;
                    }
                    self.phase = if largest == node {
                        self.resume(resume)
                    } else {
                        Phase::SiftSwap { size, node, child: largest, resume }
                    };
                    let active: Vec<usize> = [node, left, right].into_iter().filter(|&i| i < size).collect();
                    ArrayStep::new()
                        .mark(Role::Active, active)
                        .note(format!("Heapify at index {node}: largest is {}.", self.values[largest]))
                        .into()
                }
                Phase::SiftSwap { size, node, child, resume } => {
                    self.phase = Phase::Sift { size, node: child, resume };
                    let step = swap(&mut self.values, node, child);
                    step.mark(Role::Active, [node, child])
                        .note(format!("Swapped {} down to index {child}.", self.values[child]))
                        .into()
                }
                Phase::Extract { end } => {
                    self.phase = Phase::Sift { size: end, node: 0, resume: Resume::Extract(end) };
                    let step = swap(&mut self.values, 0, end);
                    step.mark(Role::Active, [0, end])
                        .settle([end])
                        .note(format!("Moved max {} to index {end}.", self.values[end]))
                        .into()
                }
                Phase::Wrap => {
                    self.phase = Phase::Finish;
                    settle_all(n, &[Role::Active])
                }
                Phase::Finish => {
                    self.phase = Phase::Done;
                    Step::finished(Outcome::Sorted)
                }
                Phase::Done => return Ok(None),
            };
            return Ok(Some(step));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producers::testing;

    #[test]
    fn sorts() {
        let input = [12, 11, 13, 5, 6, 7];
        let (values, settled) = testing::sort(HeapSort::new(input.to_vec()), &input);
        assert_eq!(values, vec![5, 6, 7, 11, 12, 13]);
        assert_eq!(settled, input.len());
    }

    #[test]
    fn extraction_settles_from_the_end() {
        let input = [1, 2, 3];
        let (steps, _) = testing::run(HeapSort::new(input.to_vec()), testing::array_baseline(&input));
        let settled: Vec<usize> = steps
            .iter()
            .filter_map(|s| match s {
                Step::Array(a) if a.settled.len() == 1 => Some(a.settled[0]),
                _ => None,
            })
            .collect();
        assert_eq!(settled, vec![2, 1]);
    }

    #[test]
    fn small_inputs() {
        for input in [vec![], vec![4], vec![2, 1]] {
            let mut expected = input.clone();
            expected.sort();
            let (values, settled) = testing::sort(HeapSort::new(input.clone()), &input);
            assert_eq!(values, expected);
            assert_eq!(settled, input.len());
        }
    }
}
