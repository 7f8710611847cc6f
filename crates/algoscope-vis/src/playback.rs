//! Playback controls for a single step timeline.
//!
//! A `Playback` owns at most one live producer and the visual state folded
//! from it. Autoplay is driven from outside: `start` hands out a
//! [`TickTicket`], the caller sleeps for [`PlaybackSpeed::interval`] and then
//! calls [`Playback::fire`]. Every pause, step, reset, or finish bumps the
//! generation, so a ticket issued before that point is silently ignored.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use algoscope_steps::{Fault, Outcome, Scenario, StepProducer, VisualState};

use crate::error::{Error, Result};

/// Something that can build fresh producers for the same input.
pub trait ProducerSource: Send {
    fn build(&self) -> Box<dyn StepProducer>;

    /// State shown before the first step.
    fn baseline(&self) -> VisualState;
}

impl ProducerSource for Scenario {
    fn build(&self) -> Box<dyn StepProducer> {
        Scenario::build(self)
    }

    fn baseline(&self) -> VisualState {
        Scenario::baseline(self)
    }
}

/// Autoplay speed on the 1-100 slider scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackSpeed(u8);

impl PlaybackSpeed {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;
    pub const DEFAULT: PlaybackSpeed = PlaybackSpeed(50);
    /// Floor for the autoplay interval.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(50);

    /// Clamp a slider value into range.
    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Delay between autoplay ticks: `350 - 3 * speed` ms, at least 50 ms.
    pub fn interval(self) -> Duration {
        let ms = 350u64.saturating_sub(3 * u64::from(self.0));
        Duration::from_millis(ms).max(Self::MIN_INTERVAL)
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No producer; showing the baseline
    Idle,
    /// Autoplay ticks are being scheduled
    Running,
    /// Producer kept, waiting for start or step
    Paused,
    /// Terminal marker reached, or forced exhaustion after a fault
    Finished,
}

/// Authorizes exactly one scheduled autoplay tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTicket {
    generation: u64,
}

impl TickTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of firing a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// One step applied; schedule this ticket next
    Next(TickTicket),
    /// The run ended on this tick
    Finished,
    /// Ticket was revoked; nothing happened
    Stale,
}

/// Playback controller for one visualization.
pub struct Playback {
    source: Option<Box<dyn ProducerSource>>,
    producer: Option<Box<dyn StepProducer>>,
    baseline: VisualState,
    visual: VisualState,
    state: PlaybackState,
    speed: PlaybackSpeed,
    generation: u64,
}

impl Playback {
    /// Create an idle controller showing `baseline`, with nothing to play.
    pub fn new(baseline: VisualState, speed: PlaybackSpeed) -> Self {
        Self {
            source: None,
            producer: None,
            visual: baseline.clone(),
            baseline,
            state: PlaybackState::Idle,
            speed,
            generation: 0,
        }
    }

    /// Create an idle controller ready to play `source`.
    pub fn with_source(source: impl ProducerSource + 'static, speed: PlaybackSpeed) -> Self {
        let mut playback = Self::new(source.baseline(), speed);
        playback.source = Some(Box::new(source));
        playback
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    /// State folded from every step applied so far.
    pub fn visual(&self) -> &VisualState {
        &self.visual
    }

    pub fn baseline(&self) -> &VisualState {
        &self.baseline
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Name of the live producer, if any.
    pub fn algorithm(&self) -> Option<&'static str> {
        self.producer.as_ref().map(|p| p.name())
    }

    /// A producer exists and has not finished.
    pub fn is_active(&self) -> bool {
        matches!(self.state, PlaybackState::Running | PlaybackState::Paused)
    }

    /// Replace the input. Rejected while a producer is active.
    pub fn load(&mut self, source: impl ProducerSource + 'static) -> Result<()> {
        let baseline = source.baseline();
        self.replace(Some(Box::new(source)), baseline)
    }

    fn replace(&mut self, source: Option<Box<dyn ProducerSource>>, baseline: VisualState) -> Result<()> {
        if self.is_active() {
            return Err(Error::Busy);
        }
        self.source = source;
        self.baseline = baseline;
        self.reset();
        Ok(())
    }

    /// Begin or resume autoplay.
    ///
    /// Returns the ticket for the first tick, or `None` when playback is
    /// already running or finished.
    pub fn start(&mut self) -> Result<Option<TickTicket>> {
        match self.state {
            PlaybackState::Idle => self.spawn_producer()?,
            PlaybackState::Paused => {}
            PlaybackState::Running | PlaybackState::Finished => return Ok(None),
        }
        self.state = PlaybackState::Running;
        Ok(Some(self.revoke()))
    }

    /// Run one autoplay tick.
    pub fn fire(&mut self, ticket: TickTicket) -> Tick {
        if self.state != PlaybackState::Running || ticket.generation != self.generation {
            return Tick::Stale;
        }
        if self.pull() {
            Tick::Next(ticket)
        } else {
            Tick::Finished
        }
    }

    /// Stop autoplay, keeping the producer and state.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Running {
            self.state = PlaybackState::Paused;
            self.revoke();
            tracing::debug!("Playback paused after {} steps", self.visual.applied);
        }
    }

    /// Apply exactly one step, then stay paused.
    pub fn step(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Idle => self.spawn_producer()?,
            PlaybackState::Running | PlaybackState::Paused => {}
            PlaybackState::Finished => return Ok(()),
        }
        self.state = PlaybackState::Paused;
        self.revoke();
        self.pull();
        Ok(())
    }

    /// Discard the producer and return to the baseline.
    pub fn reset(&mut self) {
        self.producer = None;
        self.visual = self.baseline.clone();
        self.state = PlaybackState::Idle;
        self.revoke();
    }

    /// Takes effect from the next scheduled tick.
    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    fn spawn_producer(&mut self) -> Result<()> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| Error::Unsupported("This visualization has nothing to play.".into()))?;
        let producer = source.build();
        tracing::info!("Starting {}", producer.name());
        self.producer = Some(producer);
        self.visual = self.baseline.clone();
        Ok(())
    }

    /// Invalidate outstanding tickets and return a fresh one.
    fn revoke(&mut self) -> TickTicket {
        self.generation += 1;
        TickTicket {
            generation: self.generation,
        }
    }

    /// Pull and merge one step. Returns whether playback can continue.
    fn pull(&mut self) -> bool {
        let Some(producer) = self.producer.as_mut() else {
            return false;
        };
        let pulled = panic::catch_unwind(AssertUnwindSafe(|| producer.advance()))
            .unwrap_or_else(|payload| Err(Fault::Panicked(panic_message(payload.as_ref()))));

        match pulled {
            Ok(Some(step)) => {
                let mut next = self.visual.clone();
                match next.apply(&step) {
                    Ok(()) => {
                        self.visual = next;
                        if step.is_terminal() {
                            self.finish();
                            false
                        } else {
                            true
                        }
                    }
                    Err(fault) => {
                        self.fail(fault);
                        false
                    }
                }
            }
            Ok(None) => {
                self.finish();
                false
            }
            Err(fault) => {
                self.fail(fault);
                false
            }
        }
    }

    fn finish(&mut self) {
        if let Some(producer) = self.producer.take() {
            tracing::info!("{} finished after {} steps", producer.name(), self.visual.applied);
        }
        self.state = PlaybackState::Finished;
        self.revoke();
    }

    fn fail(&mut self, fault: Fault) {
        tracing::warn!("Visualization fault: {}", fault);
        let outcome = Outcome::Failed {
            reason: fault.to_string(),
        };
        self.visual.message = Some(outcome.message());
        self.visual.outcome = Some(outcome);
        self.finish();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Playback status for sending to frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub speed: PlaybackSpeed,
    pub interval_ms: u64,
    pub steps_applied: usize,
    pub algorithm: Option<String>,
}

impl From<&Playback> for PlaybackStatus {
    fn from(playback: &Playback) -> Self {
        Self {
            state: playback.state,
            speed: playback.speed,
            interval_ms: playback.speed.interval().as_millis() as u64,
            steps_applied: playback.visual.applied,
            algorithm: playback.algorithm().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_steps::{run_to_end, ArrayState, ArrayStep, Scene, SortAlgorithm, Step};

    fn bubble() -> Scenario {
        Scenario::sort(SortAlgorithm::Bubble, vec![5, 3, 8, 1, 9, 2])
    }

    /// Run autoplay to the end without sleeping.
    fn drive(playback: &mut Playback, ticket: TickTicket) -> usize {
        let mut ticket = ticket;
        let mut ticks = 1;
        loop {
            match playback.fire(ticket) {
                Tick::Next(next) => ticket = next,
                Tick::Finished => return ticks,
                Tick::Stale => panic!("ticket went stale"),
            }
            ticks += 1;
            assert!(ticks < 10_000, "autoplay never finished");
        }
    }

    struct Scripted<F: FnMut(usize) -> std::result::Result<Option<Step>, Fault> + Send> {
        calls: usize,
        script: F,
    }

    impl<F: FnMut(usize) -> std::result::Result<Option<Step>, Fault> + Send> StepProducer for Scripted<F> {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn advance(&mut self) -> std::result::Result<Option<Step>, Fault> {
            self.calls += 1;
            (self.script)(self.calls)
        }
    }

    /// Two good writes, then the third call misbehaves.
    struct Faulty {
        panics: bool,
    }

    impl ProducerSource for Faulty {
        fn build(&self) -> Box<dyn StepProducer> {
            let panics = self.panics;
            Box::new(Scripted {
                calls: 0,
                script: move |call| match call {
                    1 | 2 => Ok(Some(ArrayStep::new().write(call - 1, 7).into())),
                    _ if panics => panic!("boom"),
                    _ => Ok(Some(ArrayStep::new().write(99, 1).into())),
                },
            })
        }

        fn baseline(&self) -> VisualState {
            VisualState::new(Scene::Array(ArrayState::new(vec![1, 2, 3])))
        }
    }

    #[test]
    fn speed_interval() {
        assert_eq!(PlaybackSpeed::new(1).interval(), Duration::from_millis(347));
        assert_eq!(PlaybackSpeed::new(50).interval(), Duration::from_millis(200));
        assert_eq!(PlaybackSpeed::new(100).interval(), Duration::from_millis(50));
        assert_eq!(PlaybackSpeed::new(0).value(), 1);
        assert_eq!(PlaybackSpeed::new(200).value(), 100);
    }

    #[test]
    fn playback_starts_idle() {
        let playback = Playback::with_source(bubble(), PlaybackSpeed::DEFAULT);
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.visual(), &bubble().baseline());
        assert!(playback.algorithm().is_none());
    }

    #[test]
    fn autoplay_reaches_finished() {
        let mut playback = Playback::with_source(bubble(), PlaybackSpeed::DEFAULT);
        let ticket = playback.start().unwrap().unwrap();
        assert_eq!(playback.state(), PlaybackState::Running);

        drive(&mut playback, ticket);
        assert_eq!(playback.state(), PlaybackState::Finished);
        assert_eq!(playback.visual().array().unwrap().values, vec![1, 2, 3, 5, 8, 9]);
        assert_eq!(playback.visual().outcome, Some(Outcome::Sorted));
        assert!(playback.start().unwrap().is_none());
    }

    #[test]
    fn pause_revokes_ticket() {
        let mut playback = Playback::with_source(bubble(), PlaybackSpeed::DEFAULT);
        let ticket = playback.start().unwrap().unwrap();
        let Tick::Next(ticket) = playback.fire(ticket) else { panic!("expected next") };

        playback.pause();
        let applied = playback.visual().applied;
        assert_eq!(playback.fire(ticket), Tick::Stale);
        assert_eq!(playback.visual().applied, applied);

        // resuming issues a new ticket; the old one stays dead
        let resumed = playback.start().unwrap().unwrap();
        assert_eq!(playback.fire(ticket), Tick::Stale);
        assert!(matches!(playback.fire(resumed), Tick::Next(_)));
    }

    #[test]
    fn pause_and_resume_match_uninterrupted_run() {
        let expected = run_to_end(bubble().build().as_mut(), bubble().baseline()).unwrap();

        let mut playback = Playback::with_source(bubble(), PlaybackSpeed::DEFAULT);
        let mut ticket = playback.start().unwrap().unwrap();
        loop {
            match playback.fire(ticket) {
                Tick::Next(_) => {
                    // interleave a manual step between every pair of ticks
                    playback.pause();
                    playback.step().unwrap();
                    match playback.start().unwrap() {
                        Some(next) => ticket = next,
                        None => break,
                    }
                }
                Tick::Finished => break,
                Tick::Stale => panic!("ticket went stale"),
            }
        }
        assert_eq!(playback.visual(), &expected);
    }

    #[test]
    fn step_from_idle_pauses() {
        let mut playback = Playback::with_source(bubble(), PlaybackSpeed::DEFAULT);
        playback.step().unwrap();
        assert_eq!(playback.state(), PlaybackState::Paused);
        assert_eq!(playback.visual().applied, 1);
        assert_eq!(playback.algorithm(), Some("bubble_sort"));
    }

    #[test]
    fn step_while_running_cancels_autoplay() {
        let mut playback = Playback::with_source(bubble(), PlaybackSpeed::DEFAULT);
        let ticket = playback.start().unwrap().unwrap();
        playback.step().unwrap();
        assert_eq!(playback.state(), PlaybackState::Paused);
        assert_eq!(playback.fire(ticket), Tick::Stale);
    }

    #[test]
    fn reset_is_idempotent_after_any_prefix() {
        for k in [0usize, 1, 5, 40] {
            let mut playback = Playback::with_source(bubble(), PlaybackSpeed::DEFAULT);
            for _ in 0..k {
                playback.step().unwrap();
            }
            playback.reset();
            assert_eq!(playback.state(), PlaybackState::Idle);
            assert_eq!(playback.visual(), &bubble().baseline());
            playback.reset();
            assert_eq!(playback.visual(), &bubble().baseline());
        }
    }

    #[test]
    fn load_rejected_while_active() {
        let mut playback = Playback::with_source(bubble(), PlaybackSpeed::DEFAULT);
        playback.step().unwrap();
        assert!(matches!(playback.load(bubble()), Err(Error::Busy)));

        playback.reset();
        let other = Scenario::sort(SortAlgorithm::Heap, vec![2, 1]);
        playback.load(other.clone()).unwrap();
        assert_eq!(playback.visual(), &other.baseline());
    }

    #[test]
    fn nothing_to_play() {
        let mut playback = Playback::new(bubble().baseline(), PlaybackSpeed::DEFAULT);
        assert!(matches!(playback.start(), Err(Error::Unsupported(_))));
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[test]
    fn merge_fault_keeps_last_good_state() {
        let mut playback = Playback::with_source(Faulty { panics: false }, PlaybackSpeed::DEFAULT);
        let ticket = playback.start().unwrap().unwrap();
        drive(&mut playback, ticket);

        assert_eq!(playback.state(), PlaybackState::Finished);
        assert_eq!(playback.visual().array().unwrap().values, vec![7, 7, 3]);
        assert!(matches!(playback.visual().outcome, Some(Outcome::Failed { .. })));
    }

    #[test]
    fn panic_becomes_failure() {
        let mut playback = Playback::with_source(Faulty { panics: true }, PlaybackSpeed::DEFAULT);
        for _ in 0..3 {
            playback.step().unwrap();
        }
        assert_eq!(playback.state(), PlaybackState::Finished);
        assert_eq!(playback.visual().applied, 2);
        match &playback.visual().outcome {
            Some(Outcome::Failed { reason }) => assert!(reason.contains("boom")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn status_conversion() {
        let mut playback = Playback::with_source(bubble(), PlaybackSpeed::new(100));
        playback.step().unwrap();

        let status: PlaybackStatus = (&playback).into();
        assert_eq!(status.state, PlaybackState::Paused);
        assert_eq!(status.interval_ms, 50);
        assert_eq!(status.steps_applied, 1);
    }
}
