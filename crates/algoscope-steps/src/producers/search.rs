//! Linear and binary search.

use crate::error::Fault;
use crate::producer::StepProducer;
use crate::step::{ArrayStep, Outcome, Role, Step};

#[derive(Debug, Clone)]
enum LinearPhase {
    Scan(usize),
    Hit(usize),
    Finish(Outcome),
    Done,
}

/// Check each index left to right until the target turns up.
pub struct LinearSearch {
    values: Vec<i64>,
    target: i64,
    phase: LinearPhase,
}

impl LinearSearch {
    pub fn new(values: Vec<i64>, target: i64) -> Self {
        Self {
            values,
            target,
            phase: LinearPhase::Scan(0),
        }
    }
}

impl StepProducer for LinearSearch {
    fn name(&self) -> &'static str {
        "linear_search"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let target = self.target;
        let step = match std::mem::replace(&mut self.phase, LinearPhase::Done) {
            LinearPhase::Scan(i) => match self.values.get(i) {
                Some(&value) => {
                    self.phase = if value == target {
                        LinearPhase::Hit(i)
                    } else {
                        LinearPhase::Scan(i + 1)
                    };
                    ArrayStep::new()
                        .mark(Role::Scanned, [i])
                        .note(format!("Checking index {i}: {value}."))
                        .into()
                }
                None => Step::finished(Outcome::NotFound { target }),
            },
            LinearPhase::Hit(index) => {
                self.phase = LinearPhase::Finish(Outcome::Found { index, target });
                ArrayStep::new()
                    .clear(Role::Scanned)
                    .mark(Role::Found, [index])
                    .into()
            }
            LinearPhase::Finish(outcome) => Step::finished(outcome),
            LinearPhase::Done => return Ok(None),
        };
        Ok(Some(step))
    }
}

#[derive(Debug, Clone)]
enum BinaryPhase {
    Init,
    Mid,
    MoveLow { mid: usize },
    MoveHigh { mid: usize },
    Hit { mid: usize },
    Finish(Outcome),
    Done,
}

/// Halve an ascending array around `floor((low + high) / 2)`.
pub struct BinarySearch {
    values: Vec<i64>,
    target: i64,
    low: i64,
    high: i64,
    phase: BinaryPhase,
}

impl BinarySearch {
    pub fn new(values: Vec<i64>, target: i64) -> Self {
        let high = values.len() as i64 - 1;
        let phase = if values.is_empty() {
            BinaryPhase::Finish(Outcome::NotFound { target })
        } else {
            BinaryPhase::Init
        };
        Self {
            values,
            target,
            low: 0,
            high,
            phase,
        }
    }

    /// Mark for a bound, or clear it once the window is empty.
    fn bound(&self, step: ArrayStep, role: Role, at: i64) -> ArrayStep {
        if self.low <= self.high {
            step.mark(role, [at as usize])
        } else {
            step.clear(role)
        }
    }
}

impl StepProducer for BinarySearch {
    fn name(&self) -> &'static str {
        "binary_search"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let target = self.target;
        let step = match std::mem::replace(&mut self.phase, BinaryPhase::Done) {
            BinaryPhase::Init => {
                self.phase = BinaryPhase::Mid;
                ArrayStep::new()
                    .mark(Role::Low, [self.low as usize])
                    .mark(Role::High, [self.high as usize])
                    .note(format!("Searching for {target} between index {} and {}.", self.low, self.high))
                    .into()
            }
            BinaryPhase::Mid if self.low > self.high => Step::finished(Outcome::NotFound { target }),
            BinaryPhase::Mid => {
                let mid = ((self.low + self.high) / 2) as usize;
                let value = self.values[mid];
                self.phase = match value.cmp(&target) {
                    std::cmp::Ordering::Equal => BinaryPhase::Hit { mid },
                    std::cmp::Ordering::Less => BinaryPhase::MoveLow { mid },
                    std::cmp::Ordering::Greater => BinaryPhase::MoveHigh { mid },
                };
                ArrayStep::new()
                    .mark(Role::Mid, [mid])
                    .note(format!("Middle index {mid} holds {value}."))
                    .into()
            }
            BinaryPhase::MoveLow { mid } => {
                self.low = mid as i64 + 1;
                self.phase = BinaryPhase::Mid;
                let step = ArrayStep::new().clear(Role::Mid);
                self.bound(step, Role::Low, self.low)
                    .note(format!("{} < {target}, searching the right half.", self.values[mid]))
                    .into()
            }
            BinaryPhase::MoveHigh { mid } => {
                self.high = mid as i64 - 1;
                self.phase = BinaryPhase::Mid;
                let step = ArrayStep::new().clear(Role::Mid);
                self.bound(step, Role::High, self.high)
                    .note(format!("{} > {target}, searching the left half.", self.values[mid]))
                    .into()
            }
            BinaryPhase::Hit { mid } => {
                self.phase = BinaryPhase::Finish(Outcome::Found { index: mid, target });
                ArrayStep::new()
                    .clear(Role::Mid)
                    .clear(Role::Low)
                    .clear(Role::High)
                    .mark(Role::Found, [mid])
                    .into()
            }
            BinaryPhase::Finish(outcome) => Step::finished(outcome),
            BinaryPhase::Done => return Ok(None),
        };
        Ok(Some(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producers::testing;

    fn multiples_of_three() -> Vec<i64> {
        (1..=15).map(|i| i * 3).collect()
    }

    #[test]
    fn binary_finds_27_at_index_8() {
        let values = multiples_of_three();
        let (_, state) = testing::run(BinarySearch::new(values.clone(), 27), testing::array_baseline(&values));
        assert_eq!(state.outcome, Some(Outcome::Found { index: 8, target: 27 }));
        assert_eq!(state.message.as_deref(), Some("Found 27 at index 8."));
        assert_eq!(state.array().unwrap().marked(Role::Found), &[8]);
    }

    #[test]
    fn binary_reports_28_missing() {
        let values = multiples_of_three();
        let (_, state) = testing::run(BinarySearch::new(values.clone(), 28), testing::array_baseline(&values));
        assert_eq!(state.outcome, Some(Outcome::NotFound { target: 28 }));
        assert_eq!(state.message.as_deref(), Some("28 not found in the array."));
    }

    #[test]
    fn binary_window_narrows_monotonically() {
        let values = multiples_of_three();
        let mut search = BinarySearch::new(values, 1);
        let mut widths = Vec::new();
        while let Some(step) = search.advance().unwrap() {
            if step.is_terminal() {
                break;
            }
            widths.push(search.high - search.low);
        }
        assert!(widths.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn binary_mid_sequence() {
        let values = multiples_of_three();
        let (steps, _) = testing::run(BinarySearch::new(values.clone(), 27), testing::array_baseline(&values));
        let mids: Vec<usize> = steps
            .iter()
            .filter_map(|s| match s {
                Step::Array(a) => a
                    .marks
                    .iter()
                    .find(|m| m.role == Role::Mid && !m.indices.is_empty())
                    .map(|m| m.indices[0]),
                _ => None,
            })
            .collect();
        // low/high: (0,14) -> 7, (8,14) -> 11, (8,10) -> 9, (8,8) -> 8
        assert_eq!(mids, vec![7, 11, 9, 8]);
    }

    #[test]
    fn linear_scans_until_found() {
        let values = vec![4, 8, 15, 16, 23, 42];
        let (steps, state) = testing::run(LinearSearch::new(values.clone(), 16), testing::array_baseline(&values));
        // four checks, found mark, terminal
        assert_eq!(steps.len(), 6);
        assert_eq!(state.outcome, Some(Outcome::Found { index: 3, target: 16 }));
    }

    #[test]
    fn linear_scans_everything_when_missing() {
        let values = vec![4, 8, 15];
        let (steps, state) = testing::run(LinearSearch::new(values.clone(), 99), testing::array_baseline(&values));
        assert_eq!(steps.len(), 4);
        assert_eq!(state.outcome, Some(Outcome::NotFound { target: 99 }));
    }

    #[test]
    fn first_match_wins() {
        let values = vec![7, 3, 7];
        let (_, state) = testing::run(LinearSearch::new(values.clone(), 7), testing::array_baseline(&values));
        assert_eq!(state.outcome, Some(Outcome::Found { index: 0, target: 7 }));
    }
}
