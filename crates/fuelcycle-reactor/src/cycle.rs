//! The reactor's operating-cycle state machine.
//!
//! Two clocks are kept apart. `cycle_step` counts operating steps only and
//! resets when a new cycle starts. `refuel_step` counts steps since the
//! current cycle's batch was discharged. Neither runs while the other does.
//!
//! Per step the reactor asks [`CycleState::discharge_due`] during `tick`,
//! calls [`CycleState::mark_discharged`] when a discharge succeeds, and
//! advances both clocks with [`CycleState::end_step`] during `tock`.

use fuelcycle_core::fixed::Ticks;
use serde::{Deserialize, Serialize};

/// Fixed durations of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTiming {
    /// Operating steps per cycle.
    pub cycle_time: Ticks,
    /// Minimum steps between discharge and the next cycle start.
    pub refuel_time: Ticks,
}

/// Why the reactor cannot make progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StallReason {
    /// Refuelling time has elapsed but the core is still short.
    MissingFuel,
    /// A discharge is due but the spent buffer cannot take the batch.
    SpentFull,
}

/// Observable phase, derived from [`CycleState`] and inventory levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclePhase {
    Operating,
    AwaitingDischarge,
    Refueling,
    Stalled { reason: StallReason },
}

/// Cycle boundaries crossed by one call to [`CycleState::end_step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleEdges {
    pub started: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    pub cycle_step: Ticks,
    pub discharged: bool,
    pub refuel_step: Ticks,
}

impl CycleState {
    /// State resumed from configured values. A resumed discharged state
    /// starts its refuelling clock from zero.
    pub fn resume(cycle_step: Ticks, discharged: bool) -> Self {
        Self {
            cycle_step,
            discharged,
            refuel_step: 0,
        }
    }

    /// The cycle is over and its batch has not left the core yet.
    pub fn discharge_due(&self, timing: &CycleTiming) -> bool {
        self.cycle_step >= timing.cycle_time && !self.discharged
    }

    pub fn mark_discharged(&mut self) {
        self.discharged = true;
        self.refuel_step = 0;
    }

    /// Advance the clocks at the end of a step.
    ///
    /// A discharged reactor whose core is full and whose refuelling time
    /// has elapsed starts a new cycle, and that step counts as the cycle's
    /// first operating step. The operating clock only runs on a full core.
    pub fn end_step(&mut self, timing: &CycleTiming, core_full: bool) -> CycleEdges {
        if self.discharged {
            if core_full && self.refuel_step >= timing.refuel_time {
                self.cycle_step = 0;
                self.discharged = false;
                self.refuel_step = 0;
            } else {
                self.refuel_step = self.refuel_step.saturating_add(1);
                return CycleEdges::default();
            }
        }

        if self.cycle_step < timing.cycle_time && core_full {
            let started = self.cycle_step == 0;
            self.cycle_step += 1;
            return CycleEdges {
                started,
                completed: self.cycle_step == timing.cycle_time,
            };
        }
        CycleEdges::default()
    }

    /// Current phase. `spent_room` is whether the spent buffer can take the
    /// batch that would be discharged now.
    pub fn phase(&self, timing: &CycleTiming, core_full: bool, spent_room: bool) -> CyclePhase {
        if self.discharged {
            if self.refuel_step >= timing.refuel_time && !core_full {
                CyclePhase::Stalled {
                    reason: StallReason::MissingFuel,
                }
            } else {
                CyclePhase::Refueling
            }
        } else if self.cycle_step >= timing.cycle_time {
            if spent_room {
                CyclePhase::AwaitingDischarge
            } else {
                CyclePhase::Stalled {
                    reason: StallReason::SpentFull,
                }
            }
        } else if !core_full {
            CyclePhase::Refueling
        } else {
            CyclePhase::Operating
        }
    }
}
