//! User-facing plan input and range validation.
//!
//! A `PlanRequest` is what a settings screen (or a sequence file, or the
//! command line) produces. Ranges match the number pickers each mode offers;
//! anything outside them is rejected here, before a `PhasePlan` exists.

use crate::{Config, Error, PhasePlan, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const AMRAP_MINUTES: RangeInclusive<u32> = 1..=180;
pub const AMRAP_WORK: RangeInclusive<u32> = 1..=180;
pub const AMRAP_REST: RangeInclusive<u32> = 1..=120;
pub const EMOM_ROUNDS: RangeInclusive<u32> = 1..=99;
pub const EMOM_INTERVAL: RangeInclusive<u32> = 10..=300;
pub const TABATA_ROUNDS: RangeInclusive<u32> = 1..=30;
pub const TABATA_WORK: RangeInclusive<u32> = 5..=120;
pub const TABATA_REST: RangeInclusive<u32> = 5..=120;
pub const FOR_TIME_ROUNDS: RangeInclusive<u32> = 1..=30;
pub const FOR_TIME_REST: RangeInclusive<u32> = 5..=300;

/// Parameters for one timer, tagged by mode
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlanRequest {
    Amrap {
        minutes: u32,
    },
    AmrapIntervals {
        work: u32,
        rest: u32,
        #[serde(default)]
        minutes: Option<u32>,
    },
    Emom {
        rounds: u32,
        interval: u32,
    },
    Tabata {
        rounds: u32,
        work: u32,
        rest: u32,
        #[serde(default)]
        final_rest: Option<bool>,
    },
    ForTime {
        rounds: u32,
        rest: u32,
    },
}

fn check(name: &str, value: u32, range: RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}

impl PlanRequest {
    /// Check every value against its picker range
    pub fn validate(&self) -> Result<()> {
        match *self {
            PlanRequest::Amrap { minutes } => check("minutes", minutes, AMRAP_MINUTES),
            PlanRequest::AmrapIntervals {
                work,
                rest,
                minutes,
            } => {
                check("work", work, AMRAP_WORK)?;
                check("rest", rest, AMRAP_REST)?;
                if let Some(minutes) = minutes {
                    check("minutes", minutes, AMRAP_MINUTES)?;
                }
                Ok(())
            }
            PlanRequest::Emom { rounds, interval } => {
                check("rounds", rounds, EMOM_ROUNDS)?;
                check("interval", interval, EMOM_INTERVAL)
            }
            PlanRequest::Tabata {
                rounds, work, rest, ..
            } => {
                check("rounds", rounds, TABATA_ROUNDS)?;
                check("work", work, TABATA_WORK)?;
                check("rest", rest, TABATA_REST)
            }
            PlanRequest::ForTime { rounds, rest } => {
                check("rounds", rounds, FOR_TIME_ROUNDS)?;
                check("rest", rest, FOR_TIME_REST)
            }
        }
    }

    /// Validate and build the phase plan, applying config-level policy
    pub fn into_plan(self, config: &Config) -> Result<PhasePlan> {
        self.validate()?;

        let plan = match self {
            PlanRequest::Amrap { minutes } => PhasePlan::amrap(minutes * 60),
            PlanRequest::AmrapIntervals {
                work,
                rest,
                minutes,
            } => PhasePlan::amrap_intervals(work, rest, minutes.map(|m| m * 60)),
            PlanRequest::Emom { rounds, interval } => PhasePlan::emom(rounds, interval),
            PlanRequest::Tabata {
                rounds,
                work,
                rest,
                final_rest,
            } => PhasePlan::tabata(rounds, work, rest)
                .with_final_rest(final_rest.unwrap_or(config.tabata.final_rest)),
            PlanRequest::ForTime { rounds, rest } => PhasePlan::for_time(rounds, rest),
        };

        Ok(plan.with_countdown(config.countdown.seconds))
    }
}
