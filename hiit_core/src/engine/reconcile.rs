//! Background reconciliation.
//!
//! When the host returns from a suspension of `secs` seconds, the engine
//! replays that time in closed-form chunks: each loop iteration jumps
//! straight to the next phase boundary (or the end of the window), so the
//! cost is proportional to the number of boundaries crossed, not to the
//! number of seconds. Every boundary on the way is still crossed through the
//! ordinary transition rule, so round counts and completion are exact.

use super::TimerEngine;
use crate::{PhaseKind, TransitionEvent};
use chrono::{DateTime, Duration, Utc};

impl TimerEngine {
    /// Replay `secs` seconds of unobserved time and re-anchor on `now`.
    ///
    /// Returns the structural events crossed on the way (no per-second
    /// ticks). Time left over after the workout completes is discarded.
    /// A paused engine ignores the call entirely.
    pub fn reconcile(&mut self, secs: u32, now: DateTime<Utc>) -> Vec<TransitionEvent> {
        if !self.state.running {
            tracing::debug!("Ignoring reconcile of {}s: timer is not running", secs);
            return Vec::new();
        }
        if self.state.paused {
            tracing::info!("Timer paused while backgrounded, discarding {}s", secs);
            return Vec::new();
        }

        let anchor = self.state.last_tick.unwrap_or(now);
        let from_phase = self.state.phase;
        let from_round = self.state.round;
        let mut events = Vec::new();
        let mut left = secs;
        let mut consumed = 0u32;
        let mut chunks = 0u32;

        while left > 0 && self.state.phase != PhaseKind::Complete {
            let step = self
                .seconds_to_boundary()
                .map_or(left, |boundary| boundary.min(left));
            debug_assert!(step > 0, "zero-length phase in {:?}", self.state.phase);

            left -= step;
            consumed += step;
            chunks += 1;
            let at = anchor + Duration::seconds(i64::from(consumed));
            self.step(step, at, false, &mut events);
        }

        if self.state.running {
            self.state.last_tick = Some(now);
        } else if left > 0 {
            tracing::debug!("Workout finished in background, dropping {}s", left);
        }

        tracing::info!(
            "Reconciled {}s in {} steps: {:?} round {} -> {:?} round {}",
            secs,
            chunks,
            from_phase,
            from_round,
            self.state.phase,
            self.state.round
        );
        events
    }
}
