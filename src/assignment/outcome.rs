use reqwest::StatusCode;

use crate::{
    api_client::ApiError,
    domain::{ReservationStatus, TableStatus},
    notifier::Severity,
};

/// Terminal result of one assignment run. Every run ends in exactly one of
/// these; nothing raw is handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentOutcome{
    Succeeded{
        message: String
    },
    // Nothing was written
    Unavailable{
        reason: UnavailableReason,
        message: String
    },
    // Another actor reserved the table first; nothing was written
    Conflict{
        error_code: Option<String>,
        message: String
    },
    // The table write may have landed but the reservation was not confirmed
    PartiallyFailed{
        cause: FailureCause,
        compensation: Compensation,
        message: String
    }
}

impl AssignmentOutcome {
    pub fn message(&self) -> &str {
        match self {
            AssignmentOutcome::Succeeded{ message }
            | AssignmentOutcome::Unavailable{ message, .. }
            | AssignmentOutcome::Conflict{ message, .. }
            | AssignmentOutcome::PartiallyFailed{ message, .. } => message
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AssignmentOutcome::Succeeded{ .. } => "Table Assigned",
            AssignmentOutcome::Unavailable{ .. } => "Table Unavailable",
            AssignmentOutcome::Conflict{ .. } => "Assignment Conflict",
            AssignmentOutcome::PartiallyFailed{ .. } => "Assignment Failed"
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AssignmentOutcome::Succeeded{ .. } => Severity::Success,
            AssignmentOutcome::Unavailable{ .. } | AssignmentOutcome::Conflict{ .. } => Severity::Warning,
            AssignmentOutcome::PartiallyFailed{ .. } => Severity::Error
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AssignmentOutcome::Succeeded{ .. })
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            AssignmentOutcome::Succeeded{ .. } => "succeeded",
            AssignmentOutcome::Unavailable{ .. } => "unavailable",
            AssignmentOutcome::Conflict{ .. } => "conflict",
            AssignmentOutcome::PartiallyFailed{ .. } => "partially_failed"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnavailableReason{
    // Fetched record was not available
    Status(TableStatus),
    Missing,
    // The reservation was no longer pending when re-read
    ReservationStatus(ReservationStatus),
    ReservationMissing,
    // The table could not be read, so nothing was attempted
    Unverifiable,
    // The reserve write was refused outright
    Rejected{
        status: StatusCode
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause{
    Conflict,
    Validation,
    NotFound,
    Unexpected
}

impl FailureCause {
    pub(crate) fn from_error(error: &ApiError) -> Self {
        match error.status() {
            Some(StatusCode::CONFLICT) => FailureCause::Conflict,
            Some(StatusCode::BAD_REQUEST) => FailureCause::Validation,
            Some(StatusCode::NOT_FOUND) => FailureCause::NotFound,
            _ => FailureCause::Unexpected
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FailureCause::Conflict => "Assignment failed: reservation was already claimed by another assignment",
            FailureCause::Validation => "Assignment failed: reservation update was rejected as invalid",
            FailureCause::NotFound => "Assignment failed: reservation no longer exists",
            FailureCause::Unexpected => "Assignment failed: unexpected error, please try again"
        }
    }
}

/// Result of the single compensating action taken after a partial failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Compensation{
    Reverted,
    RevertFailed{
        reason: String
    },
    FlaggedForReconciliation
}

impl Compensation {
    pub fn needs_reconciliation(&self) -> bool {
        !matches!(self, Compensation::Reverted)
    }
}
