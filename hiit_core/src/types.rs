//! Core domain types for the interval timer.
//!
//! This module defines the vocabulary shared by the engine, the cue
//! dispatcher and any host driving them:
//! - Phase kinds and counting direction
//! - The per-phase clock
//! - Run-time engine state (the read-only snapshot observers receive)
//! - Transition events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Modes and Phases
// ============================================================================

/// Workout style a plan was built from (display tag only)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Amrap,
    Emom,
    Tabata,
    ForTime,
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimerMode::Amrap => "AMRAP",
            TimerMode::Emom => "EMOM",
            TimerMode::Tabata => "TABATA",
            TimerMode::ForTime => "FOR TIME",
        };
        f.write_str(label)
    }
}

/// Segment of a workout the engine is currently in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Idle,
    Countdown,
    Work,
    Rest,
    Complete,
}

impl PhaseKind {
    /// Whether time spent in this phase counts toward a workout-wide cap
    pub fn counts_toward_total(self) -> bool {
        matches!(self, PhaseKind::Work | PhaseKind::Rest)
    }

    /// Countdown, work and rest are the phases time can flow through
    pub fn is_active(self) -> bool {
        matches!(self, PhaseKind::Countdown | PhaseKind::Work | PhaseKind::Rest)
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PhaseKind::Idle => "IDLE",
            PhaseKind::Countdown => "READY",
            PhaseKind::Work => "GO",
            PhaseKind::Rest => "REST",
            PhaseKind::Complete => "DONE",
        };
        f.write_str(label)
    }
}

/// Counting direction of a phase
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

// ============================================================================
// Phase Clock
// ============================================================================

/// Time counter for the current phase
///
/// Descending phases carry a fixed duration. Ascending phases count from zero
/// and may be open-ended (`target: None`), in which case only a manual
/// advance or a workout-wide cap ends them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum PhaseClock {
    Down { duration: u32, remaining: u32 },
    Up { elapsed: u32, target: Option<u32> },
}

impl PhaseClock {
    pub fn down(duration: u32) -> Self {
        PhaseClock::Down {
            duration,
            remaining: duration,
        }
    }

    pub fn up(target: Option<u32>) -> Self {
        PhaseClock::Up { elapsed: 0, target }
    }

    pub fn direction(&self) -> Direction {
        match self {
            PhaseClock::Down { .. } => Direction::Down,
            PhaseClock::Up { .. } => Direction::Up,
        }
    }

    /// Seconds spent in the phase so far
    pub fn elapsed(&self) -> u32 {
        match *self {
            PhaseClock::Down {
                duration,
                remaining,
            } => duration - remaining,
            PhaseClock::Up { elapsed, .. } => elapsed,
        }
    }

    /// Seconds left before the phase ends on its own, if it ever does
    pub fn remaining(&self) -> Option<u32> {
        match *self {
            PhaseClock::Down { remaining, .. } => Some(remaining),
            PhaseClock::Up { elapsed, target } => target.map(|t| t.saturating_sub(elapsed)),
        }
    }

    /// Full length of the phase, if bounded
    pub fn duration(&self) -> Option<u32> {
        match *self {
            PhaseClock::Down { duration, .. } => Some(duration),
            PhaseClock::Up { target, .. } => target,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == Some(0)
    }

    /// Move the clock forward by `secs`.
    ///
    /// Callers never step past the phase end; crossing a boundary is the
    /// engine's job.
    pub(crate) fn advance(&mut self, secs: u32) {
        match self {
            PhaseClock::Down { remaining, .. } => {
                debug_assert!(secs <= *remaining, "stepped past end of phase");
                *remaining -= secs;
            }
            PhaseClock::Up { elapsed, target } => {
                debug_assert!(
                    target.map_or(true, |t| elapsed.saturating_add(secs) <= t),
                    "stepped past end of phase"
                );
                *elapsed = elapsed.saturating_add(secs);
            }
        }
    }
}

// ============================================================================
// Engine State
// ============================================================================

/// Run-time state of one engine.
///
/// Observers only ever receive clones of this; the engine is the sole writer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineState {
    pub phase: PhaseKind,
    /// 1-based round number
    pub round: u32,
    /// Round bound, `None` for open-ended plans
    pub total_rounds: Option<u32>,
    pub clock: PhaseClock,
    /// Seconds spent in work and rest phases since the countdown ended
    pub total_elapsed: u32,
    pub running: bool,
    pub paused: bool,
    /// Anchor for converting wall-clock time into whole elapsed seconds
    pub last_tick: Option<DateTime<Utc>>,
}

impl EngineState {
    /// Seconds a timer display should show: remaining for descending phases,
    /// elapsed for ascending ones.
    pub fn display_seconds(&self) -> u32 {
        match self.clock {
            PhaseClock::Down { remaining, .. } => remaining,
            PhaseClock::Up { elapsed, .. } => elapsed,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == PhaseKind::Complete
    }
}

// ============================================================================
// Events
// ============================================================================

/// What happened
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// One live second elapsed; carries the clock after the step
    TickOneSecond {
        phase: PhaseKind,
        elapsed: u32,
        remaining: Option<u32>,
        duration: Option<u32>,
    },
    PhaseBoundary { from: PhaseKind, to: PhaseKind },
    /// The work phase of round `n` was entered
    RoundAdvanced { round: u32 },
    Completed,
}

/// Event emitted by the engine on each state change
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionEvent {
    pub kind: EventKind,
    pub at: DateTime<Utc>,
}

impl TransitionEvent {
    pub fn new(kind: EventKind, at: DateTime<Utc>) -> Self {
        Self { kind, at }
    }

    /// Phase, round and completion events; everything but per-second ticks
    pub fn is_structural(&self) -> bool {
        !matches!(self.kind, EventKind::TickOneSecond { .. })
    }

    pub fn is_completion(&self) -> bool {
        matches!(self.kind, EventKind::Completed)
    }
}

/// Format seconds as `M:SS`
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
