//! Audio cue dispatch.
//!
//! Maps live engine events to cues and hands them to a host-provided sink.
//! The dispatcher is only ever fed events from `tick`; events produced by
//! reconciliation describe time nobody was watching and must stay silent.

use crate::config::CueConfig;
use crate::{EventKind, PhaseKind, Result, TransitionEvent};
use serde::{Deserialize, Serialize};

/// A sound the host should play
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// One of the last seconds of the lead-in; carries the number shown
    CountdownBeep(u32),
    FiveSecondsRemaining,
    Midpoint,
    /// Every full minute of an open-ended ascending work phase
    MinuteMark,
    WorkoutComplete,
}

/// Output device for cues, with an explicit lifecycle owned by the host
pub trait CueSink {
    /// Load sounds, open the device, ...
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn play(&mut self, cue: Cue);

    fn teardown(&mut self) {}
}

/// Thresholds deciding which seconds get a cue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CueRules {
    /// `FiveSecondsRemaining` fires when this many seconds remain
    pub warning_seconds: u32,
    /// Phases must be longer than this to get a `Midpoint` cue
    pub midpoint_min_duration: u32,
    /// Countdown seconds at or below this value beep
    pub countdown_beeps: u32,
    pub minute_marks: bool,
}

impl Default for CueRules {
    fn default() -> Self {
        Self {
            warning_seconds: 5,
            midpoint_min_duration: 10,
            countdown_beeps: 3,
            minute_marks: true,
        }
    }
}

impl From<&CueConfig> for CueRules {
    fn from(config: &CueConfig) -> Self {
        Self {
            warning_seconds: config.warning_seconds,
            midpoint_min_duration: config.midpoint_min_duration,
            countdown_beeps: config.countdown_beeps,
            minute_marks: config.minute_marks,
        }
    }
}

impl CueRules {
    /// Cue for a single event, if any
    pub fn cue_for(&self, kind: &EventKind) -> Option<Cue> {
        match *kind {
            EventKind::TickOneSecond {
                phase: PhaseKind::Countdown,
                remaining: Some(remaining),
                ..
            } => (remaining > 0 && remaining <= self.countdown_beeps)
                .then_some(Cue::CountdownBeep(remaining)),
            EventKind::TickOneSecond {
                remaining: Some(remaining),
                duration: Some(duration),
                ..
            } => {
                if remaining == self.warning_seconds {
                    Some(Cue::FiveSecondsRemaining)
                } else if duration > self.midpoint_min_duration && remaining == duration / 2 {
                    Some(Cue::Midpoint)
                } else {
                    None
                }
            }
            EventKind::TickOneSecond {
                phase: PhaseKind::Work,
                remaining: None,
                elapsed,
                ..
            } => (self.minute_marks && elapsed > 0 && elapsed % 60 == 0).then_some(Cue::MinuteMark),
            EventKind::Completed => Some(Cue::WorkoutComplete),
            _ => None,
        }
    }
}

/// Routes live events to a `CueSink`
pub struct CueDispatcher<S: CueSink> {
    sink: S,
    rules: CueRules,
    active: bool,
}

impl<S: CueSink> CueDispatcher<S> {
    pub fn new(sink: S, rules: CueRules) -> Self {
        Self {
            sink,
            rules,
            active: false,
        }
    }

    pub fn rules(&self) -> &CueRules {
        &self.rules
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn init(&mut self) -> Result<()> {
        if !self.active {
            self.sink.init()?;
            self.active = true;
            tracing::debug!("Cue dispatcher initialized");
        }
        Ok(())
    }

    pub fn teardown(&mut self) {
        if self.active {
            self.sink.teardown();
            self.active = false;
            tracing::debug!("Cue dispatcher torn down");
        }
    }

    /// Cues the given events would trigger, in order
    pub fn cues_for(&self, events: &[TransitionEvent]) -> Vec<Cue> {
        events
            .iter()
            .filter_map(|e| self.rules.cue_for(&e.kind))
            .collect()
    }

    /// Play cues for live events. Returns how many were played.
    pub fn dispatch(&mut self, events: &[TransitionEvent]) -> usize {
        if !self.active {
            return 0;
        }
        let cues = self.cues_for(events);
        for cue in &cues {
            tracing::trace!("Cue {:?}", cue);
            self.sink.play(*cue);
        }
        cues.len()
    }

    /// Play a single cue outside the event stream
    pub fn play(&mut self, cue: Cue) {
        if self.active {
            self.sink.play(cue);
        }
    }
}
