//! Timer engine: the phase/round state machine.
//!
//! One engine runs one `PhasePlan`. The engine is synchronous and owns no
//! timers; a driving layer calls:
//! - `tick(now)` once per second while foregrounded
//! - `reconcile(secs, now)` once on return from background
//! - `advance(now)` when the user skips to the next phase
//! - `pause` / `resume(now)` / `reset`
//!
//! Automatic and manual phase changes go through the same transition rule
//! (`finish_phase`), and live ticking and reconciliation share the same
//! stepping code (`step`), so the two paths cannot drift apart.

mod reconcile;

use crate::clock::whole_seconds_between;
use crate::{
    EngineState, EventKind, PhaseClock, PhaseKind, PhasePlan, Result, TransitionEvent,
};
use chrono::{DateTime, Duration, Utc};

/// State machine for one workout run
#[derive(Clone, Debug)]
pub struct TimerEngine {
    plan: PhasePlan,
    state: EngineState,
}

impl TimerEngine {
    /// Create an engine in `Idle` for the given plan.
    ///
    /// The plan is validated by `start`, not here, so a host can show an
    /// idle timer for a half-edited plan.
    pub fn new(plan: PhasePlan) -> Self {
        let state = idle_state(&plan);
        Self { plan, state }
    }

    pub fn plan(&self) -> &PhasePlan {
        &self.plan
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Owned copy of the current state for observers
    pub fn snapshot(&self) -> EngineState {
        self.state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn is_complete(&self) -> bool {
        self.state.phase == PhaseKind::Complete
    }

    /// Validate the plan and enter the countdown.
    ///
    /// A zero-second countdown starts directly in round 1's work phase.
    /// Starting again from any state restarts the run.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<EngineState> {
        if let Err(e) = self.plan.validate() {
            tracing::warn!("Refusing to start {} timer: {}", self.plan.mode, e);
            return Err(e);
        }

        let countdown = self.plan.countdown_seconds;
        self.state = EngineState {
            phase: PhaseKind::Countdown,
            round: 1,
            total_rounds: self.plan.total_rounds(),
            clock: PhaseClock::down(countdown),
            total_elapsed: 0,
            running: true,
            paused: false,
            last_tick: Some(now),
        };

        if countdown == 0 {
            self.state.phase = PhaseKind::Work;
            self.state.clock = self.plan.work_clock();
        }

        tracing::info!(
            "Started {} timer: countdown {}s, rounds {:?}, duration {:?}",
            self.plan.mode,
            countdown,
            self.plan.total_rounds(),
            self.plan.total_duration()
        );
        Ok(self.snapshot())
    }

    /// Advance by every whole second elapsed since the last tick.
    ///
    /// Emits one `TickOneSecond` per second followed by any boundary events
    /// that second caused. Sub-second residue is carried to the next call.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<TransitionEvent> {
        if !self.state.running || self.state.paused {
            return Vec::new();
        }
        let Some(anchor) = self.state.last_tick else {
            debug_assert!(false, "running engine without an anchor");
            return Vec::new();
        };

        let seconds = whole_seconds_between(anchor, now);
        let mut events = Vec::new();
        let mut consumed = 0u32;

        while consumed < seconds && self.state.running {
            consumed += 1;
            let at = anchor + Duration::seconds(i64::from(consumed));
            self.step(1, at, true, &mut events);
        }

        if self.state.running {
            self.state.last_tick = Some(anchor + Duration::seconds(i64::from(consumed)));
        }
        if seconds > 1 {
            tracing::debug!("Tick consumed {} seconds in one call", consumed);
        }
        events
    }

    /// Skip to the next phase as if the current one had run out.
    ///
    /// Ignored while idle, complete or paused.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Vec<TransitionEvent> {
        if !self.state.running {
            tracing::debug!("Ignoring skip: timer is not running");
            return Vec::new();
        }
        if self.state.paused {
            tracing::debug!("Ignoring skip: timer is paused");
            return Vec::new();
        }

        let mut events = Vec::new();
        self.finish_phase(now, &mut events);
        if self.state.running {
            self.state.last_tick = Some(now);
        }
        events
    }

    /// Freeze the run. The anchor stays where it was until `resume`.
    pub fn pause(&mut self) {
        if !self.state.running {
            tracing::debug!("Ignoring pause: timer is not running");
            return;
        }
        if !self.state.paused {
            self.state.paused = true;
            tracing::info!(
                "Paused in {:?} round {} at {}s",
                self.state.phase,
                self.state.round,
                self.state.display_seconds()
            );
        }
    }

    /// Unfreeze and re-anchor on `now`
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if !self.state.running || !self.state.paused {
            tracing::debug!("Ignoring resume: timer is not paused");
            return;
        }
        self.state.paused = false;
        self.state.last_tick = Some(now);
        tracing::info!("Resumed in {:?} round {}", self.state.phase, self.state.round);
    }

    /// Discard the run and return to `Idle`
    pub fn reset(&mut self) {
        if self.state.running {
            tracing::info!("Reset {} timer mid-run", self.plan.mode);
        }
        self.state = idle_state(&self.plan);
    }

    // ------------------------------------------------------------------------
    // Stepping and the transition rule
    // ------------------------------------------------------------------------

    /// Seconds until the current phase or the workout-wide cap runs out
    fn seconds_to_boundary(&self) -> Option<u32> {
        let phase_left = self.state.clock.remaining();
        let cap_left = if self.state.phase.counts_toward_total() {
            self.plan
                .total_limit()
                .map(|limit| limit.saturating_sub(self.state.total_elapsed))
        } else {
            None
        };

        match (phase_left, cap_left) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    fn cap_reached(&self) -> bool {
        self.state.phase.counts_toward_total()
            && self
                .plan
                .total_limit()
                .map_or(false, |limit| self.state.total_elapsed >= limit)
    }

    /// Move `secs` forward inside the current phase, then cross whatever
    /// boundary that lands on.
    ///
    /// `secs` never exceeds `seconds_to_boundary`.
    fn step(&mut self, secs: u32, at: DateTime<Utc>, live: bool, events: &mut Vec<TransitionEvent>) {
        debug_assert!(self.state.phase.is_active());
        debug_assert!(self.seconds_to_boundary().map_or(true, |left| secs <= left));

        self.state.clock.advance(secs);
        if self.state.phase.counts_toward_total() {
            self.state.total_elapsed = self.state.total_elapsed.saturating_add(secs);
        }

        if live {
            events.push(TransitionEvent::new(
                EventKind::TickOneSecond {
                    phase: self.state.phase,
                    elapsed: self.state.clock.elapsed(),
                    remaining: self.state.clock.remaining(),
                    duration: self.state.clock.duration(),
                },
                at,
            ));
        }

        if self.cap_reached() {
            self.complete(at, events);
        } else if self.state.clock.is_exhausted() {
            self.finish_phase(at, events);
        }
    }

    /// The phase-transition rule shared by every mode and by manual skips
    fn finish_phase(&mut self, at: DateTime<Utc>, events: &mut Vec<TransitionEvent>) {
        match self.state.phase {
            PhaseKind::Countdown => self.enter_work(at, events),
            PhaseKind::Work => {
                if let Some(rest) = self.plan.rest_after(self.state.round) {
                    self.enter_rest(rest, at, events);
                } else if self.plan.is_final_round(self.state.round) {
                    self.complete(at, events);
                } else {
                    self.state.round += 1;
                    self.enter_work(at, events);
                }
            }
            PhaseKind::Rest => {
                if self.plan.is_final_round(self.state.round) {
                    self.complete(at, events);
                } else {
                    self.state.round += 1;
                    self.enter_work(at, events);
                }
            }
            PhaseKind::Idle | PhaseKind::Complete => {
                debug_assert!(false, "phase transition from {:?}", self.state.phase);
            }
        }

        debug_assert!(self
            .state
            .total_rounds
            .map_or(true, |total| self.state.round <= total));
    }

    fn enter_work(&mut self, at: DateTime<Utc>, events: &mut Vec<TransitionEvent>) {
        let from = self.state.phase;
        self.state.phase = PhaseKind::Work;
        self.state.clock = self.plan.work_clock();

        tracing::debug!("{:?} -> Work, round {}", from, self.state.round);
        events.push(TransitionEvent::new(
            EventKind::PhaseBoundary {
                from,
                to: PhaseKind::Work,
            },
            at,
        ));
        events.push(TransitionEvent::new(
            EventKind::RoundAdvanced {
                round: self.state.round,
            },
            at,
        ));
    }

    fn enter_rest(&mut self, rest_seconds: u32, at: DateTime<Utc>, events: &mut Vec<TransitionEvent>) {
        let from = self.state.phase;
        self.state.phase = PhaseKind::Rest;
        self.state.clock = PhaseClock::down(rest_seconds);

        tracing::debug!("{:?} -> Rest ({}s), round {}", from, rest_seconds, self.state.round);
        events.push(TransitionEvent::new(
            EventKind::PhaseBoundary {
                from,
                to: PhaseKind::Rest,
            },
            at,
        ));
    }

    fn complete(&mut self, at: DateTime<Utc>, events: &mut Vec<TransitionEvent>) {
        let from = self.state.phase;
        self.state.phase = PhaseKind::Complete;
        self.state.running = false;
        self.state.paused = false;
        self.state.last_tick = None;

        tracing::info!(
            "{} timer complete after round {} ({}s of work and rest)",
            self.plan.mode,
            self.state.round,
            self.state.total_elapsed
        );
        events.push(TransitionEvent::new(
            EventKind::PhaseBoundary {
                from,
                to: PhaseKind::Complete,
            },
            at,
        ));
        events.push(TransitionEvent::new(EventKind::Completed, at));
    }
}

fn idle_state(plan: &PhasePlan) -> EngineState {
    EngineState {
        phase: PhaseKind::Idle,
        round: 1,
        total_rounds: plan.total_rounds(),
        clock: PhaseClock::down(plan.countdown_seconds),
        total_elapsed: 0,
        running: false,
        paused: false,
        last_tick: None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Error;
    use chrono::TimeZone;

    pub(crate) fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 7, 30, 0).unwrap()
    }

    /// Tick one second at a time, `n` times, stopping early if the run ends
    pub(crate) fn tick_seconds(engine: &mut TimerEngine, n: u32) -> Vec<TransitionEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            let Some(anchor) = engine.state().last_tick else {
                break;
            };
            events.extend(engine.tick(anchor + Duration::seconds(1)));
        }
        events
    }

    pub(crate) fn count<F>(events: &[TransitionEvent], pred: F) -> usize
    where
        F: Fn(&EventKind) -> bool,
    {
        events.iter().filter(|e| pred(&e.kind)).count()
    }

    fn started(plan: PhasePlan) -> TimerEngine {
        crate::logging::init_test();
        let mut engine = TimerEngine::new(plan);
        engine.start(t0()).unwrap();
        engine
    }

    #[test]
    fn test_new_engine_is_idle() {
        let engine = TimerEngine::new(PhasePlan::tabata(8, 20, 10));
        assert_eq!(engine.state().phase, PhaseKind::Idle);
        assert!(!engine.is_running());
        assert_eq!(engine.state().clock.remaining(), Some(10));
    }

    #[test]
    fn test_start_enters_countdown() {
        let engine = started(PhasePlan::tabata(8, 20, 10));
        let state = engine.state();
        assert_eq!(state.phase, PhaseKind::Countdown);
        assert_eq!(state.round, 1);
        assert_eq!(state.clock.remaining(), Some(10));
        assert_eq!(state.last_tick, Some(t0()));
        assert!(state.running);
    }

    #[test]
    fn test_start_rejects_invalid_plan() {
        let mut engine = TimerEngine::new(PhasePlan::emom(0, 60));
        let err = engine.start(t0()).unwrap_err();
        assert!(matches!(err, Error::InvalidPlan(_)));
        assert_eq!(engine.state().phase, PhaseKind::Idle);
    }

    #[test]
    fn test_zero_countdown_starts_in_work() {
        let engine = started(PhasePlan::tabata(2, 20, 10).with_countdown(0));
        assert_eq!(engine.state().phase, PhaseKind::Work);
        assert_eq!(engine.state().clock.remaining(), Some(20));
    }

    #[test]
    fn test_tick_emits_one_second() {
        let mut engine = started(PhasePlan::tabata(8, 20, 10));
        let events = engine.tick(t0() + Duration::seconds(1));

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            EventKind::TickOneSecond {
                phase: PhaseKind::Countdown,
                elapsed: 1,
                remaining: Some(9),
                duration: Some(10),
            }
        );
        assert_eq!(engine.state().last_tick, Some(t0() + Duration::seconds(1)));
    }

    #[test]
    fn test_tick_keeps_subsecond_residue() {
        let mut engine = started(PhasePlan::tabata(8, 20, 10));

        assert!(engine.tick(t0() + Duration::milliseconds(900)).is_empty());
        let events = engine.tick(t0() + Duration::milliseconds(1500));
        assert_eq!(events.len(), 1);
        assert_eq!(engine.state().last_tick, Some(t0() + Duration::seconds(1)));

        let events = engine.tick(t0() + Duration::milliseconds(2100));
        assert_eq!(events.len(), 1);
        assert_eq!(engine.state().clock.remaining(), Some(8));
    }

    #[test]
    fn test_tick_ignores_backwards_clock() {
        let mut engine = started(PhasePlan::tabata(8, 20, 10));
        assert!(engine.tick(t0() - Duration::seconds(30)).is_empty());
        assert_eq!(engine.state().clock.remaining(), Some(10));
    }

    #[test]
    fn test_countdown_to_work_transition() {
        let mut engine = started(PhasePlan::tabata(8, 20, 10));
        let events = tick_seconds(&mut engine, 10);

        assert_eq!(engine.state().phase, PhaseKind::Work);
        assert_eq!(engine.state().round, 1);
        assert_eq!(engine.state().clock.remaining(), Some(20));

        let structural: Vec<_> = events.iter().filter(|e| e.is_structural()).collect();
        assert_eq!(structural.len(), 2);
        assert_eq!(
            structural[0].kind,
            EventKind::PhaseBoundary {
                from: PhaseKind::Countdown,
                to: PhaseKind::Work
            }
        );
        assert_eq!(structural[1].kind, EventKind::RoundAdvanced { round: 1 });
    }

    #[test]
    fn test_tabata_full_run() {
        let mut engine = started(PhasePlan::tabata(8, 20, 10));
        let events = tick_seconds(&mut engine, 240);

        assert!(engine.is_complete());
        assert_eq!(engine.state().round, 8);
        assert_eq!(count(&events, |k| matches!(k, EventKind::RoundAdvanced { .. })), 8);
        // countdown->work, 7x (work->rest, rest->work), work->complete
        assert_eq!(count(&events, |k| matches!(k, EventKind::PhaseBoundary { .. })), 16);
        assert_eq!(count(&events, |k| matches!(k, EventKind::Completed)), 1);
        assert_eq!(count(&events, |k| matches!(k, EventKind::TickOneSecond { .. })), 240);
    }

    #[test]
    fn test_tabata_not_complete_one_second_early() {
        let mut engine = started(PhasePlan::tabata(8, 20, 10));
        tick_seconds(&mut engine, 239);
        assert_eq!(engine.state().phase, PhaseKind::Work);
        assert_eq!(engine.state().round, 8);
        assert_eq!(engine.state().clock.remaining(), Some(1));
    }

    #[test]
    fn test_tabata_with_final_rest_runs_longer() {
        let mut engine = started(PhasePlan::tabata(8, 20, 10).with_final_rest(true));
        tick_seconds(&mut engine, 240);
        assert_eq!(engine.state().phase, PhaseKind::Rest);
        assert_eq!(engine.state().round, 8);

        let events = tick_seconds(&mut engine, 10);
        assert!(engine.is_complete());
        assert_eq!(
            events.iter().filter(|e| e.is_structural()).map(|e| e.kind.clone()).collect::<Vec<_>>(),
            vec![
                EventKind::PhaseBoundary {
                    from: PhaseKind::Rest,
                    to: PhaseKind::Complete
                },
                EventKind::Completed,
            ]
        );
    }

    #[test]
    fn test_emom_repeats_work() {
        let mut engine = started(PhasePlan::emom(3, 60));
        let events = tick_seconds(&mut engine, 70);

        assert_eq!(engine.state().phase, PhaseKind::Work);
        assert_eq!(engine.state().round, 2);
        assert!(events.iter().any(|e| e.kind
            == EventKind::PhaseBoundary {
                from: PhaseKind::Work,
                to: PhaseKind::Work
            }));

        tick_seconds(&mut engine, 120);
        assert!(engine.is_complete());
        assert_eq!(engine.state().round, 3);
    }

    #[test]
    fn test_completed_emitted_once() {
        let mut engine = started(PhasePlan::emom(2, 10));
        let mut events = tick_seconds(&mut engine, 30);
        events.extend(engine.tick(t0() + Duration::seconds(500)));
        events.extend(engine.advance(t0() + Duration::seconds(501)));

        assert_eq!(count(&events, |k| matches!(k, EventKind::Completed)), 1);
        assert!(!engine.is_running());
        assert_eq!(engine.state().last_tick, None);
    }

    #[test]
    fn test_amrap_completes_at_total() {
        let mut engine = started(PhasePlan::amrap(60));
        tick_seconds(&mut engine, 10 + 59);
        assert_eq!(engine.state().phase, PhaseKind::Work);
        assert_eq!(engine.state().clock.elapsed(), 59);
        assert_eq!(engine.state().clock.remaining(), Some(1));

        tick_seconds(&mut engine, 1);
        assert!(engine.is_complete());
        assert_eq!(engine.state().total_elapsed, 60);
    }

    #[test]
    fn test_amrap_intervals_capped_mid_work() {
        // 30 work + 10 rest per cycle; second work phase spans 40..70, cap lands at 55
        let mut engine = started(PhasePlan::amrap_intervals(30, 10, Some(55)));
        tick_seconds(&mut engine, 10 + 54);
        assert_eq!(engine.state().phase, PhaseKind::Work);
        assert_eq!(engine.state().round, 2);
        assert_eq!(engine.state().clock.remaining(), Some(16));

        let events = tick_seconds(&mut engine, 1);
        assert!(engine.is_complete());
        assert!(events.iter().any(|e| e.kind
            == EventKind::PhaseBoundary {
                from: PhaseKind::Work,
                to: PhaseKind::Complete
            }));
    }

    #[test]
    fn test_amrap_intervals_unbounded_keeps_going() {
        let mut engine = started(PhasePlan::amrap_intervals(20, 10, None));
        tick_seconds(&mut engine, 10 + 30 * 100);
        assert!(engine.is_running());
        assert_eq!(engine.state().round, 101);
        assert_eq!(engine.state().total_rounds, None);
    }

    #[test]
    fn test_for_time_work_counts_up() {
        let mut engine = started(PhasePlan::for_time(3, 30));
        tick_seconds(&mut engine, 10 + 500);
        assert_eq!(engine.state().phase, PhaseKind::Work);
        assert_eq!(engine.state().clock.elapsed(), 500);
        assert_eq!(engine.state().display_seconds(), 500);
    }

    #[test]
    fn test_manual_advance_matches_automatic() {
        let mut manual = started(PhasePlan::tabata(3, 20, 10));
        let mut automatic = manual.clone();

        tick_seconds(&mut manual, 15);
        tick_seconds(&mut automatic, 15);

        // Skip the remaining 15s of work by hand, let the other run it out
        let skip_events = manual.advance(manual.state().last_tick.unwrap());
        let auto_events = tick_seconds(&mut automatic, 15);

        assert_eq!(manual.state().phase, automatic.state().phase);
        assert_eq!(manual.state().round, automatic.state().round);
        assert_eq!(manual.state().clock, automatic.state().clock);
        let auto_kinds: Vec<_> = auto_events
            .iter()
            .filter(|e| e.is_structural())
            .map(|e| e.kind.clone())
            .collect();
        let skip_kinds: Vec<_> = skip_events.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(skip_kinds, auto_kinds);
    }

    #[test]
    fn test_for_time_manual_run_to_completion() {
        let mut engine = started(PhasePlan::for_time(3, 30));
        let mut events = Vec::new();
        let mut at = t0();

        // countdown, then work/rest/work/rest/work
        for _ in 0..6 {
            at += Duration::seconds(7);
            events.extend(engine.advance(at));
        }

        assert!(engine.is_complete());
        assert_eq!(engine.state().round, 3);
        assert_eq!(count(&events, |k| matches!(k, EventKind::Completed)), 1);
        assert_eq!(
            events.last().map(|e| &e.kind),
            Some(&EventKind::Completed)
        );
    }

    #[test]
    fn test_advance_ignored_while_paused() {
        let mut engine = started(PhasePlan::tabata(3, 20, 10));
        engine.pause();
        assert!(engine.advance(t0() + Duration::seconds(1)).is_empty());
        assert_eq!(engine.state().phase, PhaseKind::Countdown);
    }

    #[test]
    fn test_tick_while_paused_is_noop() {
        let mut engine = started(PhasePlan::tabata(3, 20, 10));
        tick_seconds(&mut engine, 12);
        let before = engine.snapshot();

        engine.pause();
        assert!(engine.tick(t0() + Duration::seconds(300)).is_empty());

        let after = engine.state();
        assert_eq!(after.clock, before.clock);
        assert_eq!(after.round, before.round);
        assert_eq!(after.last_tick, before.last_tick);
        assert!(after.paused);
    }

    #[test]
    fn test_resume_reanchors() {
        let mut engine = started(PhasePlan::tabata(3, 20, 10));
        tick_seconds(&mut engine, 3);
        engine.pause();

        let resumed_at = t0() + Duration::seconds(100);
        engine.resume(resumed_at);
        assert_eq!(engine.state().last_tick, Some(resumed_at));

        let events = engine.tick(resumed_at + Duration::seconds(1));
        assert_eq!(events.len(), 1);
        assert_eq!(engine.state().clock.remaining(), Some(6));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let fresh = TimerEngine::new(PhasePlan::tabata(3, 20, 10));

        let mut engine = started(PhasePlan::tabata(3, 20, 10));
        tick_seconds(&mut engine, 47);
        engine.pause();
        engine.reset();
        assert_eq!(engine.state(), fresh.state());

        engine.reset();
        assert_eq!(engine.state(), fresh.state());

        engine.start(t0()).unwrap();
        tick_seconds(&mut engine, 1000);
        engine.reset();
        assert_eq!(engine.state(), fresh.state());
    }

    #[test]
    fn test_start_huge_plan_with_logging() {
        // init_test enables debug, so the start summary is formatted
        let mut engine = started(PhasePlan::tabata(100_000, 100_000, 5));
        assert_eq!(engine.plan().total_duration(), None);
        assert_eq!(engine.state().total_rounds, Some(100_000));

        engine.reconcile(10 + 250_000, t0() + Duration::seconds(250_010));
        assert_eq!(engine.state().round, 3);
        assert_eq!(engine.state().phase, PhaseKind::Work);
    }

    #[test]
    fn test_total_elapsed_saturates_on_unbounded_plan() {
        let mut engine = started(PhasePlan::amrap_intervals(u32::MAX, 0, None).with_countdown(0));
        let anchor = engine.state().last_tick.unwrap();

        engine.reconcile(u32::MAX - 10, anchor + Duration::seconds(1));
        assert_eq!(engine.state().total_elapsed, u32::MAX - 10);

        // Next work phase starts, elapsed keeps counting without wrapping
        engine.reconcile(u32::MAX, anchor + Duration::seconds(2));
        assert_eq!(engine.state().total_elapsed, u32::MAX);
        assert!(engine.is_running());
        assert_eq!(engine.state().round, 2);
    }

    #[test]
    fn test_pause_and_resume_ignored_when_idle() {
        let mut engine = TimerEngine::new(PhasePlan::amrap(60));
        engine.pause();
        engine.resume(t0());
        assert_eq!(engine.state().phase, PhaseKind::Idle);
        assert!(!engine.state().paused);
    }
}
