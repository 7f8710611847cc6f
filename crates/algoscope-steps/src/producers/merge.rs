use crate::error::Fault;
use crate::producer::StepProducer;
use crate::producers::settle_all;
use crate::step::{ArrayStep, Outcome, Role, Step};

/// Resumption frames for top-down merge sort. Ranges are inclusive.
#[derive(Debug, Clone, Copy)]
enum Frame {
    Split { lo: usize, hi: usize },
    Merge { lo: usize, mid: usize, hi: usize },
}

#[derive(Debug, Clone)]
enum Phase {
    Run,
    Write { lo: usize, merged: Vec<i64>, k: usize },
    Wrap,
    Finish,
    Done,
}

/// Top-down merge sort driven by an explicit frame stack.
pub struct MergeSort {
    values: Vec<i64>,
    frames: Vec<Frame>,
    phase: Phase,
}

impl MergeSort {
    pub fn new(values: Vec<i64>) -> Self {
        let frames = match values.len() {
            0 => Vec::new(),
            n => vec![Frame::Split { lo: 0, hi: n - 1 }],
        };
        Self {
            values,
            frames,
            phase: Phase::Run,
        }
    }

    fn merged(&self, lo: usize, mid: usize, hi: usize) -> Vec<i64> {
        let (left, right) = (&self.values[lo..=mid], &self.values[mid + 1..=hi]);
        let mut out = Vec::with_capacity(hi - lo + 1);
        let (mut i, mut j) = (0, 0);
        while i < left.len() && j < right.len() {
            if left[i] <= right[j] {
                out.push(left[i]);
                i += 1;
            } else {
                out.push(right[j]);
                j += 1;
            }
        }
        out.extend_from_slice(&left[i..]);
        out.extend_from_slice(&right[j..]);
        out
    }
}

impl StepProducer for MergeSort {
    fn name(&self) -> &'static str {
        "merge_sort"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Run => match self.frames.pop() {
                    Some(Frame::Split { lo, hi }) => {
                        self.phase = Phase::Run;
                        if lo < hi {
                            let mid = lo + (hi - lo) / 2;
                            self.frames.push(Frame::Merge { lo, mid, hi });
                            self.frames.push(Frame::Split { lo: mid + 1, hi });
                            self.frames.push(Frame::Split { lo, hi: mid });
                        }
                    }
                    Some(Frame::Merge { lo, mid, hi }) => {
                        let merged = self.merged(lo, mid, hi);
                        self.phase = Phase::Write { lo, merged, k: 0 };
                        let step = ArrayStep::new()
                            .mark(Role::Range, [lo, hi])
                            .clear(Role::Current)
                            .note(format!("Merging [{lo}..{mid}] with [{}..{hi}].", mid + 1));
                        return Ok(Some(step.into()));
                    }
                    None => self.phase = Phase::Wrap,
                },
                Phase::Write { lo, merged, k } => {
                    let Some(&value) = merged.get(k) else {
                        self.phase = Phase::Run;
                        continue;
                    };
                    let index = lo + k;
                    self.values[index] = value;
                    self.phase = Phase::Write { lo, merged, k: k + 1 };
                    let step = ArrayStep::new()
                        .write(index, value)
                        .mark(Role::Current, [index])
                        .note(format!("Writing {value} to index {index}."));
                    return Ok(Some(step.into()));
                }
                Phase::Wrap => {
                    self.phase = Phase::Finish;
                    return Ok(Some(settle_all(self.values.len(), &[Role::Range, Role::Current])));
                }
                Phase::Finish => return Ok(Some(Step::finished(Outcome::Sorted))),
                Phase::Done => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producers::testing;

    #[test]
    fn sorts_with_duplicates() {
        let input = [38, 27, 43, 3, 9, 82, 10, 27];
        let (values, settled) = testing::sort(MergeSort::new(input.to_vec()), &input);
        assert_eq!(values, vec![3, 9, 10, 27, 27, 38, 43, 82]);
        assert_eq!(settled, input.len());
    }

    #[test]
    fn one_write_step_per_output_position() {
        let input = [2, 1];
        let (steps, _) = testing::run(MergeSort::new(input.to_vec()), testing::array_baseline(&input));
        let writes: usize = steps
            .iter()
            .map(|s| match s {
                Step::Array(a) => a.writes.len(),
                _ => 0,
            })
            .sum();
        assert_eq!(writes, 2);
        // range mark, two writes, wrap, finish
        assert_eq!(steps.len(), 5);
    }

    #[test]
    fn empty_input_finishes_immediately() {
        let (steps, _) = testing::run(MergeSort::new(Vec::new()), testing::array_baseline(&[]));
        assert_eq!(steps.len(), 2);
    }
}
