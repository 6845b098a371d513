#![forbid(unsafe_code)]

//! Core timing engine for the hiit workout timer.
//!
//! This crate provides:
//! - Phase plans for AMRAP, EMOM, TABATA and FOR TIME workouts
//! - The timer engine (ticking, manual advance, background reconciliation)
//! - Mixed-workout sequencing
//! - Audio cue selection behind a host-provided sink
//! - A driving layer tying clock, sequencer and cues together
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod plan;
pub mod clock;
pub mod engine;
pub mod cues;
pub mod config;
pub mod request;
pub mod sequencer;
pub mod driver;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use plan::{PhasePlan, Structure, WorkClock};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::TimerEngine;
pub use cues::{Cue, CueDispatcher, CueRules, CueSink};
pub use config::Config;
pub use request::PlanRequest;
pub use sequencer::{SequenceItem, SequenceStep, Sequencer};
pub use driver::{Driver, DriverOutput};
