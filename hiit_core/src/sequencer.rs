//! Sequencer for mixed workouts.
//!
//! Runs a list of plans back to back. Each plan gets a fresh engine when it
//! starts; nothing carries over from one timer to the next.

use crate::engine::TimerEngine;
use crate::{EngineState, Error, PhasePlan, Result, TimerMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One timer in a sequence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SequenceItem {
    pub id: Uuid,
    pub plan: PhasePlan,
    pub completed: bool,
}

/// Result of moving the sequence forward
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceStep {
    /// The timer at `index` has started
    Started { index: usize, mode: TimerMode },
    /// Every timer has completed
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceStatus {
    Editing,
    Running,
    Finished,
}

/// Ordered list of plans plus the engine for the active one
#[derive(Debug)]
pub struct Sequencer {
    items: Vec<SequenceItem>,
    current: usize,
    engine: Option<TimerEngine>,
    status: SequenceStatus,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            current: 0,
            engine: None,
            status: SequenceStatus::Editing,
        }
    }

    pub fn from_plans(plans: impl IntoIterator<Item = PhasePlan>) -> Self {
        let mut sequencer = Self::new();
        sequencer.items = plans
            .into_iter()
            .map(|plan| SequenceItem {
                id: Uuid::new_v4(),
                plan,
                completed: false,
            })
            .collect();
        sequencer
    }

    pub fn items(&self) -> &[SequenceItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn status(&self) -> SequenceStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status == SequenceStatus::Finished
    }

    /// 1-based position of the active timer and the sequence length
    pub fn progress(&self) -> (usize, usize) {
        (self.current + 1, self.items.len())
    }

    pub fn current_item(&self) -> Option<&SequenceItem> {
        match self.status {
            SequenceStatus::Editing => None,
            _ => self.items.get(self.current),
        }
    }

    pub fn engine(&self) -> Option<&TimerEngine> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut TimerEngine> {
        self.engine.as_mut()
    }

    fn ensure_editing(&self) -> Result<()> {
        if self.status == SequenceStatus::Editing {
            Ok(())
        } else {
            Err(Error::Sequence("cannot edit a sequence once it has started".into()))
        }
    }

    /// Append a plan; returns its id
    pub fn push(&mut self, plan: PhasePlan) -> Result<Uuid> {
        self.ensure_editing()?;
        let id = Uuid::new_v4();
        self.items.push(SequenceItem {
            id,
            plan,
            completed: false,
        });
        Ok(id)
    }

    pub fn remove(&mut self, index: usize) -> Result<SequenceItem> {
        self.ensure_editing()?;
        if index >= self.items.len() {
            return Err(Error::Sequence(format!(
                "no timer at position {} (sequence has {})",
                index,
                self.items.len()
            )));
        }
        Ok(self.items.remove(index))
    }

    /// Move the timer at `from` so it ends up at `to`
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.ensure_editing()?;
        let len = self.items.len();
        if from >= len || to >= len {
            return Err(Error::Sequence(format!(
                "cannot move {} to {} in a sequence of {}",
                from, to, len
            )));
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        Ok(())
    }

    /// Validate every plan, then start the first one.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<EngineState> {
        if self.items.is_empty() {
            return Err(Error::Sequence("add at least one timer to the sequence".into()));
        }
        for (index, item) in self.items.iter().enumerate() {
            item.plan.validate().map_err(|e| match e {
                Error::InvalidPlan(msg) => {
                    Error::InvalidPlan(format!("timer {} ({}): {}", index + 1, item.plan.mode, msg))
                }
                other => other,
            })?;
        }

        for item in &mut self.items {
            item.completed = false;
        }
        self.current = 0;
        self.status = SequenceStatus::Running;
        tracing::info!("Starting sequence of {} timers", self.items.len());
        self.start_current(now)
    }

    fn start_current(&mut self, now: DateTime<Utc>) -> Result<EngineState> {
        let plan = self.items[self.current].plan.clone();
        let mut engine = TimerEngine::new(plan);
        let state = engine.start(now)?;
        self.engine = Some(engine);
        Ok(state)
    }

    /// Move on after the active engine reported `Completed`.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<SequenceStep> {
        if self.status != SequenceStatus::Running {
            return Err(Error::Sequence("sequence is not running".into()));
        }
        debug_assert!(
            self.engine.as_ref().map_or(false, TimerEngine::is_complete),
            "advancing past a timer that has not completed"
        );

        self.items[self.current].completed = true;

        if self.current + 1 < self.items.len() {
            self.current += 1;
            self.start_current(now)?;
            let mode = self.items[self.current].plan.mode;
            tracing::info!(
                "Sequence timer {}/{} started ({})",
                self.current + 1,
                self.items.len(),
                mode
            );
            Ok(SequenceStep::Started {
                index: self.current,
                mode,
            })
        } else {
            self.status = SequenceStatus::Finished;
            tracing::info!("Sequence finished");
            Ok(SequenceStep::Finished)
        }
    }

    /// Stop everything and go back to editing, keeping the timer list
    pub fn reset(&mut self) {
        self.engine = None;
        self.current = 0;
        self.status = SequenceStatus::Editing;
        for item in &mut self.items {
            item.completed = false;
        }
    }
}
