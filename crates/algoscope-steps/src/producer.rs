//! The producer seam and helpers for draining one.

use crate::error::Fault;
use crate::state::VisualState;
use crate::step::Step;

/// Upper bound on steps pulled by [`drain`] before giving up.
pub const MAX_STEPS: usize = 200_000;

/// A lazy, finite, non-restartable sequence of steps for one algorithm run.
///
/// `advance` yields `Ok(None)` once the terminal step has been emitted, and
/// keeps yielding `Ok(None)` afterwards.
pub trait StepProducer: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn advance(&mut self) -> Result<Option<Step>, Fault>;
}

impl<P: StepProducer + ?Sized> StepProducer for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        (**self).advance()
    }
}

/// Pull every remaining step.
pub fn drain(producer: &mut dyn StepProducer) -> Result<Vec<Step>, Fault> {
    let mut steps = Vec::new();
    while let Some(step) = producer.advance()? {
        steps.push(step);
        if steps.len() > MAX_STEPS {
            return Err(Fault::Runaway(MAX_STEPS));
        }
    }
    Ok(steps)
}

/// Drain `producer` and fold everything over `baseline`.
pub fn run_to_end(
    producer: &mut dyn StepProducer,
    baseline: VisualState,
) -> Result<VisualState, Fault> {
    let steps = drain(producer)?;
    VisualState::fold(baseline, &steps)
}
