//! Phase plans: declarative descriptions of a workout's phase structure.
//!
//! Every timer mode (AMRAP, EMOM, TABATA, FOR TIME) is one of three
//! structures. The engine never branches on the mode itself, only on the
//! structure, so one transition rule serves them all.

use crate::{Error, PhaseClock, Result, TimerMode};
use serde::{Deserialize, Serialize};

/// Lead-in before the first work phase in every mode
pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 10;

/// How a work phase counts
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum WorkClock {
    /// Fixed duration counted down
    Descending { seconds: u32 },
    /// Counted up from zero; open-ended when `cap` is `None`
    Ascending { cap: Option<u32> },
}

impl WorkClock {
    fn fresh(self) -> PhaseClock {
        match self {
            WorkClock::Descending { seconds } => PhaseClock::down(seconds),
            WorkClock::Ascending { cap } => PhaseClock::up(cap),
        }
    }
}

/// Phase structure following the countdown
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Structure {
    /// `total_rounds` work phases, each optionally followed by rest.
    ///
    /// `rest_seconds == 0` means no rest phase at all (EMOM).
    FixedRounds {
        total_rounds: u32,
        work: WorkClock,
        rest_seconds: u32,
        skip_final_rest: bool,
    },
    /// One uninterrupted effort of `total_seconds`
    Amrap { total_seconds: u32 },
    /// Unbounded work/rest alternation, optionally capped by a workout-wide duration
    AmrapIntervals {
        work_seconds: u32,
        rest_seconds: u32,
        total_seconds: Option<u32>,
    },
}

/// Immutable description of one workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhasePlan {
    pub mode: TimerMode,
    pub countdown_seconds: u32,
    pub structure: Structure,
}

impl PhasePlan {
    /// AMRAP: a single timed effort
    pub fn amrap(total_seconds: u32) -> Self {
        Self {
            mode: TimerMode::Amrap,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            structure: Structure::Amrap { total_seconds },
        }
    }

    /// AMRAP with alternating work and rest, capped at `total_seconds` if given
    pub fn amrap_intervals(work_seconds: u32, rest_seconds: u32, total_seconds: Option<u32>) -> Self {
        Self {
            mode: TimerMode::Amrap,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            structure: Structure::AmrapIntervals {
                work_seconds,
                rest_seconds,
                total_seconds,
            },
        }
    }

    /// EMOM: `rounds` back-to-back intervals, no rest phase
    pub fn emom(rounds: u32, interval_seconds: u32) -> Self {
        Self {
            mode: TimerMode::Emom,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            structure: Structure::FixedRounds {
                total_rounds: rounds,
                work: WorkClock::Descending {
                    seconds: interval_seconds,
                },
                rest_seconds: 0,
                skip_final_rest: true,
            },
        }
    }

    /// TABATA: fixed work/rest rounds; the last round's rest is skipped
    /// unless `with_final_rest(true)` is applied.
    pub fn tabata(rounds: u32, work_seconds: u32, rest_seconds: u32) -> Self {
        Self {
            mode: TimerMode::Tabata,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            structure: Structure::FixedRounds {
                total_rounds: rounds,
                work: WorkClock::Descending {
                    seconds: work_seconds,
                },
                rest_seconds,
                skip_final_rest: true,
            },
        }
    }

    /// FOR TIME: open-ended ascending work, fixed rest between rounds
    pub fn for_time(rounds: u32, rest_seconds: u32) -> Self {
        Self {
            mode: TimerMode::ForTime,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            structure: Structure::FixedRounds {
                total_rounds: rounds,
                work: WorkClock::Ascending { cap: None },
                rest_seconds,
                skip_final_rest: true,
            },
        }
    }

    pub fn with_countdown(mut self, seconds: u32) -> Self {
        self.countdown_seconds = seconds;
        self
    }

    /// Keep (or drop) the rest phase after the final round. No effect on
    /// structures without a round bound.
    pub fn with_final_rest(mut self, final_rest: bool) -> Self {
        if let Structure::FixedRounds {
            skip_final_rest, ..
        } = &mut self.structure
        {
            *skip_final_rest = !final_rest;
        }
        self
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> Result<()> {
        match self.structure {
            Structure::FixedRounds {
                total_rounds,
                work,
                ..
            } => {
                if total_rounds == 0 {
                    return Err(Error::InvalidPlan("total_rounds must be at least 1".into()));
                }
                match work {
                    WorkClock::Descending { seconds: 0 } => {
                        return Err(Error::InvalidPlan("work_seconds must be at least 1".into()));
                    }
                    WorkClock::Ascending { cap: Some(0) } => {
                        return Err(Error::InvalidPlan("work cap must be at least 1".into()));
                    }
                    _ => {}
                }
            }
            Structure::Amrap { total_seconds } => {
                if total_seconds == 0 {
                    return Err(Error::InvalidPlan("total_seconds must be at least 1".into()));
                }
            }
            Structure::AmrapIntervals {
                work_seconds,
                total_seconds,
                ..
            } => {
                if work_seconds == 0 {
                    return Err(Error::InvalidPlan("work_seconds must be at least 1".into()));
                }
                if total_seconds == Some(0) {
                    return Err(Error::InvalidPlan("total_seconds must be at least 1".into()));
                }
            }
        }
        Ok(())
    }

    /// Round bound, `None` when rounds are unlimited
    pub fn total_rounds(&self) -> Option<u32> {
        match self.structure {
            Structure::FixedRounds { total_rounds, .. } => Some(total_rounds),
            Structure::Amrap { .. } => Some(1),
            Structure::AmrapIntervals { .. } => None,
        }
    }

    /// Workout-wide cap on work + rest seconds
    pub fn total_limit(&self) -> Option<u32> {
        match self.structure {
            Structure::FixedRounds { .. } => None,
            Structure::Amrap { total_seconds } => Some(total_seconds),
            Structure::AmrapIntervals { total_seconds, .. } => total_seconds,
        }
    }

    /// Fresh clock for a work phase
    pub fn work_clock(&self) -> PhaseClock {
        match self.structure {
            Structure::FixedRounds { work, .. } => work.fresh(),
            Structure::Amrap { total_seconds } => PhaseClock::up(Some(total_seconds)),
            Structure::AmrapIntervals { work_seconds, .. } => PhaseClock::down(work_seconds),
        }
    }

    /// Rest that follows the work phase of `round`, if any
    pub fn rest_after(&self, round: u32) -> Option<u32> {
        match self.structure {
            Structure::FixedRounds {
                total_rounds,
                rest_seconds,
                skip_final_rest,
                ..
            } => {
                if rest_seconds == 0 || (skip_final_rest && round >= total_rounds) {
                    None
                } else {
                    Some(rest_seconds)
                }
            }
            Structure::Amrap { .. } => None,
            Structure::AmrapIntervals { rest_seconds, .. } => {
                (rest_seconds > 0).then_some(rest_seconds)
            }
        }
    }

    /// Whether finishing `round` finishes the workout
    pub fn is_final_round(&self, round: u32) -> bool {
        self.total_rounds().map_or(false, |total| round >= total)
    }

    /// Length of the workout after the countdown, or `None` when it depends
    /// on the athlete (ascending work) or runs until stopped.
    pub fn total_duration(&self) -> Option<u32> {
        match self.structure {
            Structure::FixedRounds {
                total_rounds,
                work,
                rest_seconds,
                skip_final_rest,
            } => {
                let work_seconds = match work {
                    WorkClock::Descending { seconds } => seconds,
                    WorkClock::Ascending { cap: Some(cap) } => cap,
                    WorkClock::Ascending { cap: None } => return None,
                };
                let rests = match (rest_seconds, skip_final_rest) {
                    (0, _) => 0,
                    (_, true) => total_rounds.saturating_sub(1),
                    (_, false) => total_rounds,
                };
                // Too long to express in seconds as u32
                let work_total = u64::from(total_rounds).checked_mul(u64::from(work_seconds))?;
                let rest_total = u64::from(rests).checked_mul(u64::from(rest_seconds))?;
                u32::try_from(work_total.checked_add(rest_total)?).ok()
            }
            Structure::Amrap { total_seconds } => Some(total_seconds),
            Structure::AmrapIntervals { total_seconds, .. } => total_seconds,
        }
    }
}
