//! Driving layer.
//!
//! Owns the clock, the sequencer and the cue dispatcher, and is the only
//! thing that calls into an engine. Hosts forward their periodic interval,
//! app-state changes and user commands here.

use crate::clock::{whole_seconds_between, Clock};
use crate::cues::{Cue, CueDispatcher, CueRules, CueSink};
use crate::sequencer::{SequenceStep, Sequencer};
use crate::{EngineState, Result, TransitionEvent};
use chrono::{DateTime, Utc};

/// What one driver call produced
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriverOutput {
    pub events: Vec<TransitionEvent>,
    /// Set when a timer completed and the sequence moved on
    pub step: Option<SequenceStep>,
}

impl DriverOutput {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.step.is_none()
    }
}

pub struct Driver<C: Clock, S: CueSink> {
    clock: C,
    sequencer: Sequencer,
    cues: CueDispatcher<S>,
    suspended_at: Option<DateTime<Utc>>,
}

impl<C: Clock, S: CueSink> Driver<C, S> {
    pub fn new(clock: C, sequencer: Sequencer, sink: S, rules: CueRules) -> Self {
        Self {
            clock,
            sequencer,
            cues: CueDispatcher::new(sink, rules),
            suspended_at: None,
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn sink(&self) -> &S {
        self.cues.sink()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.sequencer.is_finished()
    }

    pub fn is_paused(&self) -> bool {
        self.sequencer
            .engine()
            .map_or(false, |engine| engine.state().paused)
    }

    /// State of the active timer, if the sequence has started
    pub fn snapshot(&self) -> Option<EngineState> {
        self.sequencer.engine().map(|engine| engine.snapshot())
    }

    /// Bring up the cue sink and start the first timer
    pub fn start(&mut self) -> Result<EngineState> {
        self.cues.init()?;
        self.suspended_at = None;
        self.sequencer.start(self.clock.now())
    }

    /// Release the cue sink
    pub fn shutdown(&mut self) {
        self.cues.teardown();
    }

    /// Periodic foreground tick
    pub fn on_interval(&mut self) -> Result<DriverOutput> {
        if self.suspended_at.is_some() {
            return Ok(DriverOutput::default());
        }
        let now = self.clock.now();
        let Some(engine) = self.sequencer.engine_mut() else {
            return Ok(DriverOutput::default());
        };
        let events = engine.tick(now);
        self.finish(events, now, true)
    }

    /// The host is about to stop delivering intervals
    pub fn enter_background(&mut self) {
        if self.suspended_at.is_none() {
            let now = self.clock.now();
            tracing::debug!("Entering background at {}", now);
            self.suspended_at = Some(now);
        }
    }

    /// Catch up on the time spent in the background.
    ///
    /// Events crossed while suspended are returned for display but never
    /// produce per-event cues.
    pub fn enter_foreground(&mut self) -> Result<DriverOutput> {
        let Some(suspended_at) = self.suspended_at.take() else {
            return Ok(DriverOutput::default());
        };
        let now = self.clock.now();
        let Some(engine) = self.sequencer.engine_mut() else {
            return Ok(DriverOutput::default());
        };

        // Measure from the last whole-second anchor so no partial second
        // from before the suspension is lost.
        let since = engine.state().last_tick.unwrap_or(suspended_at);
        let secs = whole_seconds_between(since, now);
        tracing::info!(
            "Back in foreground after {}s ({}s since last tick)",
            whole_seconds_between(suspended_at, now),
            secs
        );

        let events = engine.reconcile(secs, now);
        self.finish(events, now, false)
    }

    pub fn pause(&mut self) {
        if let Some(engine) = self.sequencer.engine_mut() {
            engine.pause();
        }
    }

    pub fn resume(&mut self) {
        let now = self.clock.now();
        if let Some(engine) = self.sequencer.engine_mut() {
            engine.resume(now);
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.is_paused() {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Skip the rest of the current phase
    pub fn skip(&mut self) -> Result<DriverOutput> {
        let now = self.clock.now();
        let Some(engine) = self.sequencer.engine_mut() else {
            return Ok(DriverOutput::default());
        };
        let events = engine.advance(now);
        self.finish(events, now, true)
    }

    /// Abandon the run and return the sequence to its unstarted state
    pub fn reset(&mut self) {
        self.suspended_at = None;
        self.sequencer.reset();
        tracing::info!("Driver reset");
    }

    /// Play cues for live events and move the sequence on after a completion
    fn finish(
        &mut self,
        events: Vec<TransitionEvent>,
        now: DateTime<Utc>,
        live: bool,
    ) -> Result<DriverOutput> {
        if live {
            // Per-timer completion is not the end of the workout; the final
            // cue is played below once the whole sequence is done.
            let cued: Vec<TransitionEvent> = events
                .iter()
                .filter(|e| !e.is_completion())
                .cloned()
                .collect();
            self.cues.dispatch(&cued);
        }

        let mut step = None;
        if events.iter().any(TransitionEvent::is_completion) {
            let next = self.sequencer.advance(now)?;
            if next == SequenceStep::Finished {
                self.cues.play(Cue::WorkoutComplete);
            }
            step = Some(next);
        }

        Ok(DriverOutput { events, step })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::{EventKind, PhaseKind, PhasePlan, TimerMode};
    use chrono::TimeZone;

    #[derive(Default)]
    struct RecordingSink {
        played: Vec<Cue>,
    }

    impl CueSink for RecordingSink {
        fn play(&mut self, cue: Cue) {
            self.played.push(cue);
        }
    }

    fn driver(plans: Vec<PhasePlan>) -> (Driver<ManualClock, RecordingSink>, ManualClock) {
        crate::logging::init_test();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 7, 30, 0).unwrap());
        let mut driver = Driver::new(
            clock.clone(),
            Sequencer::from_plans(plans),
            RecordingSink::default(),
            CueRules::default(),
        );
        driver.start().unwrap();
        (driver, clock)
    }

    fn run_seconds(
        driver: &mut Driver<ManualClock, RecordingSink>,
        clock: &ManualClock,
        n: u32,
    ) -> Vec<DriverOutput> {
        let mut outputs = Vec::new();
        for _ in 0..n {
            clock.advance_secs(1);
            outputs.push(driver.on_interval().unwrap());
        }
        outputs
    }

    fn remaining(driver: &Driver<ManualClock, RecordingSink>) -> Option<u32> {
        driver.snapshot().and_then(|s| s.clock.remaining())
    }

    #[test]
    fn test_live_run_plays_cues_in_order() {
        let (mut driver, clock) = driver(vec![PhasePlan::tabata(1, 20, 10)]);
        run_seconds(&mut driver, &clock, 30);

        assert!(driver.is_finished());
        assert_eq!(
            driver.sink().played,
            vec![
                Cue::CountdownBeep(3),
                Cue::CountdownBeep(2),
                Cue::CountdownBeep(1),
                Cue::Midpoint,
                Cue::FiveSecondsRemaining,
                Cue::WorkoutComplete,
            ]
        );
    }

    #[test]
    fn test_sequence_moves_on_and_completes_once() {
        let (mut driver, clock) = driver(vec![
            PhasePlan::emom(1, 10).with_countdown(0),
            PhasePlan::tabata(1, 5, 5).with_countdown(0),
        ]);

        let outputs = run_seconds(&mut driver, &clock, 10);
        assert_eq!(
            outputs.last().and_then(|o| o.step),
            Some(SequenceStep::Started {
                index: 1,
                mode: TimerMode::Tabata
            })
        );
        assert_eq!(driver.sequencer().progress(), (2, 2));
        assert!(!driver.is_finished());

        let outputs = run_seconds(&mut driver, &clock, 5);
        assert_eq!(outputs.last().and_then(|o| o.step), Some(SequenceStep::Finished));
        assert!(driver.is_finished());

        let completions = driver
            .sink()
            .played
            .iter()
            .filter(|c| **c == Cue::WorkoutComplete)
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_background_reconciles_silently() {
        let (mut driver, clock) = driver(vec![PhasePlan::tabata(8, 20, 10)]);
        run_seconds(&mut driver, &clock, 3);

        driver.enter_background();
        clock.advance_secs(102);
        assert!(driver.on_interval().unwrap().is_empty());

        let output = driver.enter_foreground().unwrap();
        let state = driver.snapshot().unwrap();
        assert_eq!(state.phase, PhaseKind::Work);
        assert_eq!(state.round, 4);
        assert_eq!(state.clock.remaining(), Some(15));
        assert_eq!(
            output
                .events
                .iter()
                .filter(|e| matches!(e.kind, EventKind::RoundAdvanced { .. }))
                .count(),
            4
        );
        assert!(driver.sink().played.is_empty());

        // Live ticking picks up from the reconciled state
        run_seconds(&mut driver, &clock, 1);
        assert_eq!(remaining(&driver), Some(14));
    }

    #[test]
    fn test_background_through_end_of_sequence() {
        let (mut driver, clock) = driver(vec![PhasePlan::tabata(2, 20, 10)]);

        driver.enter_background();
        clock.advance_secs(300);
        let output = driver.enter_foreground().unwrap();

        assert_eq!(output.step, Some(SequenceStep::Finished));
        assert!(driver.is_finished());
        assert_eq!(driver.sink().played, vec![Cue::WorkoutComplete]);
    }

    #[test]
    fn test_pause_survives_background() {
        let (mut driver, clock) = driver(vec![PhasePlan::tabata(8, 20, 10)]);
        run_seconds(&mut driver, &clock, 33);
        assert_eq!(driver.snapshot().unwrap().phase, PhaseKind::Rest);
        assert_eq!(remaining(&driver), Some(7));

        driver.pause();
        driver.enter_background();
        clock.advance_secs(500);
        assert!(driver.enter_foreground().unwrap().events.is_empty());
        driver.resume();
        assert_eq!(remaining(&driver), Some(7));

        run_seconds(&mut driver, &clock, 1);
        assert_eq!(remaining(&driver), Some(6));
    }

    #[test]
    fn test_skip_countdown() {
        let (mut driver, _clock) = driver(vec![PhasePlan::for_time(3, 30)]);
        let output = driver.skip().unwrap();

        assert_eq!(output.events.len(), 2);
        assert_eq!(
            output.events[0].kind,
            EventKind::PhaseBoundary {
                from: PhaseKind::Countdown,
                to: PhaseKind::Work
            }
        );
        assert_eq!(driver.snapshot().unwrap().phase, PhaseKind::Work);
    }

    #[test]
    fn test_reset_then_restart() {
        let (mut driver, clock) = driver(vec![PhasePlan::amrap(60)]);
        run_seconds(&mut driver, &clock, 20);

        driver.reset();
        assert!(driver.snapshot().is_none());
        assert!(driver.on_interval().unwrap().is_empty());

        let state = driver.start().unwrap();
        assert_eq!(state.phase, PhaseKind::Countdown);
        assert_eq!(state.clock.remaining(), Some(10));
    }

    #[test]
    fn test_subsecond_intervals_tick_once_per_second() {
        let (mut driver, clock) = driver(vec![PhasePlan::amrap(60)]);
        let mut ticks = 0;
        for _ in 0..16 {
            clock.advance_millis(250);
            let output = driver.on_interval().unwrap();
            ticks += output.events.iter().filter(|e| !e.is_structural()).count();
        }
        assert_eq!(ticks, 4);
        assert_eq!(remaining(&driver), Some(6));

        // A partial second carries over into the next interval
        clock.advance_millis(900);
        driver.on_interval().unwrap();
        assert_eq!(remaining(&driver), Some(6));
        clock.advance_millis(100);
        driver.on_interval().unwrap();
        assert_eq!(remaining(&driver), Some(5));
    }

    #[test]
    fn test_toggle_pause() {
        let (mut driver, clock) = driver(vec![PhasePlan::amrap(60)]);
        driver.toggle_pause();
        assert!(driver.is_paused());
        clock.advance_secs(5);
        assert!(driver.on_interval().unwrap().is_empty());

        driver.toggle_pause();
        assert!(!driver.is_paused());
        run_seconds(&mut driver, &clock, 2);
        assert_eq!(remaining(&driver), Some(8));
    }
}
