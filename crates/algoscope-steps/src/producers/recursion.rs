//! Recursive algorithms replayed on an explicit call stack.

use std::collections::BTreeMap;

use crate::error::Fault;
use crate::producer::StepProducer;
use crate::step::{CallStep, Outcome, Step};

#[derive(Debug, Clone, Copy)]
enum Stage {
    Enter,
    AwaitLeft,
    AwaitRight { left: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    n: u64,
    stage: Stage,
}

#[derive(Debug, Clone, Copy)]
enum FibPhase {
    Call,
    Run,
    Done,
}

/// Memoized Fibonacci. Each frame resumes where its last child returned.
pub struct Fibonacci {
    n: u64,
    frames: Vec<Frame>,
    memo: BTreeMap<u64, u64>,
    /// Value handed back by the most recently popped frame
    returned: Option<u64>,
    phase: FibPhase,
}

impl Fibonacci {
    pub fn new(n: u64) -> Self {
        Self {
            n,
            frames: Vec::new(),
            memo: BTreeMap::new(),
            returned: None,
            phase: FibPhase::Call,
        }
    }

    fn call(&mut self, n: u64, note: String) -> CallStep {
        self.frames.push(Frame { n, stage: Stage::Enter });
        CallStep {
            push: Some(n),
            note: Some(note),
            ..CallStep::default()
        }
    }

    fn set_stage(&mut self, stage: Stage) {
        if let Some(top) = self.frames.last_mut() {
            top.stage = stage;
        }
    }

    fn ret(&mut self, value: u64, memo: Option<(u64, u64)>, note: String) -> CallStep {
        self.frames.pop();
        self.returned = Some(value);
        if let Some((k, v)) = memo {
            self.memo.insert(k, v);
        }
        CallStep {
            memo,
            pop: Some(value),
            note: Some(note),
            ..CallStep::default()
        }
    }
}

impl StepProducer for Fibonacci {
    fn name(&self) -> &'static str {
        "fibonacci"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let step = match self.phase {
            FibPhase::Call => {
                self.phase = FibPhase::Run;
                let n = self.n;
                self.call(n, format!("Calling fib({n})."))
            }
            FibPhase::Run => {
                let Some(&Frame { n, stage }) = self.frames.last() else {
                    self.phase = FibPhase::Done;
                    let value = self.returned.ok_or(Fault::StackUnderflow)?;
                    return Ok(Some(Step::finished(Outcome::Value {
                        label: format!("fib({})", self.n),
                        value,
                    })));
                };
                match stage {
                    Stage::Enter => {
                        if let Some(&cached) = self.memo.get(&n) {
                            self.ret(cached, None, format!("fib({n}) found in cache. Returning {cached}."))
                        } else if n <= 1 {
                            self.ret(n, Some((n, n)), format!("Base case: fib({n}) is {n}."))
                        } else {
                            self.set_stage(Stage::AwaitLeft);
                            self.call(
                                n - 1,
                                format!("fib({n}) not in cache. Calling fib({}).", n - 1),
                            )
                        }
                    }
                    Stage::AwaitLeft => {
                        let left = self.returned.take().ok_or(Fault::StackUnderflow)?;
                        self.set_stage(Stage::AwaitRight { left });
                        self.call(
                            n - 2,
                            format!("fib({}) returned {left}. Now calling fib({}).", n - 1, n - 2),
                        )
                    }
                    Stage::AwaitRight { left } => {
                        let right = self.returned.take().ok_or(Fault::StackUnderflow)?;
                        let result = left + right;
                        self.ret(
                            result,
                            Some((n, result)),
                            format!("fib({n}) = {left} + {right} = {result}."),
                        )
                    }
                }
            }
            FibPhase::Done => return Ok(None),
        };
        Ok(Some(step.into()))
    }
}

#[derive(Debug, Clone, Copy)]
enum FactorialPhase {
    Descend(u64),
    Ascend { k: u64, acc: u64 },
    Finish(u64),
    Done,
}

/// Plain recursive factorial: calls down to the base case, then returns
/// products back up.
pub struct Factorial {
    n: u64,
    phase: FactorialPhase,
}

impl Factorial {
    pub fn new(n: u64) -> Self {
        Self {
            n,
            phase: FactorialPhase::Descend(n),
        }
    }
}

impl StepProducer for Factorial {
    fn name(&self) -> &'static str {
        "factorial"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let step = match self.phase {
            FactorialPhase::Descend(k) => {
                let note = if k <= 1 {
                    self.phase = FactorialPhase::Ascend { k: 1, acc: 1 };
                    format!("Call factorial({k}), base case.")
                } else {
                    self.phase = FactorialPhase::Descend(k - 1);
                    format!("Call factorial({k}).")
                };
                CallStep {
                    push: Some(k),
                    note: Some(note),
                    ..CallStep::default()
                }
            }
            FactorialPhase::Ascend { k, acc } => {
                let value = acc.saturating_mul(k);
                let note = if k <= 1 {
                    "Return 1.".to_string()
                } else {
                    format!("Return {k} * {acc} = {value}.")
                };
                self.phase = if k >= self.n {
                    FactorialPhase::Finish(value)
                } else {
                    FactorialPhase::Ascend { k: k + 1, acc: value }
                };
                CallStep {
                    pop: Some(value),
                    note: Some(note),
                    ..CallStep::default()
                }
            }
            FactorialPhase::Finish(value) => {
                self.phase = FactorialPhase::Done;
                return Ok(Some(Step::finished(Outcome::Value {
                    label: format!("factorial({})", self.n),
                    value,
                })));
            }
            FactorialPhase::Done => return Ok(None),
        };
        Ok(Some(step.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::drain;
    use crate::state::{CallState, Scene, VisualState};

    fn fold(mut producer: impl StepProducer, function: &str) -> (Vec<Step>, VisualState) {
        let steps = drain(&mut producer).unwrap();
        let state = VisualState::fold(VisualState::new(Scene::Calls(CallState::new(function))), &steps).unwrap();
        (steps, state)
    }

    #[test]
    fn fib_seven() {
        let (_, state) = fold(Fibonacci::new(7), "fib");
        let calls = state.calls().unwrap();
        assert!(calls.stack.is_empty());
        assert_eq!(calls.memo.get(&7), Some(&13));
        assert_eq!(calls.memo.len(), 8);
        assert_eq!(
            state.outcome,
            Some(Outcome::Value { label: "fib(7)".to_string(), value: 13 })
        );
    }

    #[test]
    fn fib_memo_hits_short_circuit() {
        let (steps, _) = fold(Fibonacci::new(5), "fib");
        let pushes = steps
            .iter()
            .filter(|s| matches!(s, Step::Calls(CallStep { push: Some(_), .. })))
            .count();
        // 5, 4, 3, 2, 1, 0, then cached 1, 2, 3
        assert_eq!(pushes, 9);
    }

    #[test]
    fn fib_base_cases() {
        for (n, expected) in [(0, 0), (1, 1), (2, 1)] {
            let (_, state) = fold(Fibonacci::new(n), "fib");
            assert_eq!(
                state.outcome,
                Some(Outcome::Value { label: format!("fib({n})"), value: expected })
            );
        }
    }

    #[test]
    fn stack_depth_never_exceeds_n() {
        let mut fib = Fibonacci::new(10);
        let mut depth: usize = 0;
        let mut max_depth = 0;
        while let Some(step) = fib.advance().unwrap() {
            if let Step::Calls(call) = step {
                if call.pop.is_some() {
                    depth -= 1;
                }
                if call.push.is_some() {
                    depth += 1;
                }
                max_depth = max_depth.max(depth);
            }
        }
        assert_eq!(depth, 0);
        assert_eq!(max_depth, 10);
    }

    #[test]
    fn factorial_five() {
        let (steps, state) = fold(Factorial::new(5), "factorial");
        // five calls, five returns, terminal
        assert_eq!(steps.len(), 11);
        let calls = state.calls().unwrap();
        assert!(calls.stack.is_empty());
        assert_eq!(calls.last_return, Some(120));
        assert_eq!(state.message.as_deref(), Some("factorial(5) = 120"));
    }
}
