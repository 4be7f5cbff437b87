mod engine;
mod outcome;

use std::fmt;

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{ReservationId, TableId};

pub use engine::AssignmentEngine;
pub use outcome::{AssignmentOutcome, Compensation, FailureCause, UnavailableReason};

/// What to do with a table whose reservation could not be confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationPolicy{
    // Put the table back to available
    #[default]
    Revert,
    // Keep it reserved and leave it for staff to reconcile
    LeaveReserved
}

// Labels shown to staff; never used to decide anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayInfo{
    pub guest_name: String,
    pub table_number: String
}

impl DisplayInfo {
    pub fn new(guest_name: impl Into<String>, table_number: impl Into<String>) -> Self {
        Self{
            guest_name: guest_name.into(),
            table_number: table_number.into()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentPhase{
    Idle,
    Verifying,
    Reserving,
    Confirming,
    RolledBack,
    Done
}

impl fmt::Display for AssignmentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssignmentPhase::Idle => "idle",
            AssignmentPhase::Verifying => "verifying",
            AssignmentPhase::Reserving => "reserving",
            AssignmentPhase::Confirming => "confirming",
            AssignmentPhase::RolledBack => "rolled back",
            AssignmentPhase::Done => "done"
        };
        f.write_str(label)
    }
}

/// In-memory record of a single assignment run. Lives only as long as the
/// call that created it.
#[derive(Debug, Clone)]
pub struct AssignmentAttempt{
    pub id: Uuid,
    pub reservation_id: ReservationId,
    pub table_id: TableId,
    phase: AssignmentPhase
}

impl AssignmentAttempt {
    pub fn new(reservation_id: ReservationId, table_id: TableId) -> Self {
        Self{
            id: Uuid::new_v4(),
            reservation_id,
            table_id,
            phase: AssignmentPhase::Idle
        }
    }

    pub fn phase(&self) -> AssignmentPhase {
        self.phase
    }

    pub fn advance(&mut self, next: AssignmentPhase) {
        tracing::debug!(
            attempt_id = %self.id,
            from = %self.phase,
            to = %next,
            "Assignment phase changed"
        );
        self.phase = next;
    }
}
