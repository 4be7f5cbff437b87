use std::sync::Arc;

use crate::{
    api_client::{ApiError, BackendClient},
    cache::CacheInput,
    domain::{
        Reservation, ReservationId, ReservationStatus, ReservationUpdate, Table, TableId,
        TableStatus, TableStatusUpdate,
    },
    floor_view::FloorView,
    notifier::Notifier,
};

use super::{
    AssignmentAttempt, AssignmentOutcome, AssignmentPhase, Compensation, CompensationPolicy,
    DisplayInfo, FailureCause, UnavailableReason,
};

const CONFLICT_FALLBACK_MESSAGE: &str = "Table is no longer available.";
const RESERVE_UNKNOWN_MESSAGE: &str = "Assignment failed: could not reach the server while reserving the table";

/// Binds pending reservations to available tables.
///
/// Runs Verifying, Reserving and Confirming strictly in order. The cached
/// floor view is only ever corrected, never trusted: the table and the
/// reservation are re-read from the backend before anything is written, and
/// the server's 409 is the only mutual exclusion between staff members
/// assigning at the same time.
#[derive(Clone)]
pub struct AssignmentEngine {
    client: BackendClient,
    notifier: Arc<dyn Notifier>,
    policy: CompensationPolicy,
}

impl AssignmentEngine {
    pub fn new(client: BackendClient, notifier: Arc<dyn Notifier>, policy: CompensationPolicy) -> Self {
        Self {
            client,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> CompensationPolicy {
        self.policy
    }

    /// Assigns `reservation_id` to `table_id` and reports the outcome through
    /// the notifier.
    ///
    /// The view is borrowed for the whole run, so a single view can never
    /// host two assignments at once.
    #[tracing::instrument(
        "Assigning reservation to table",
        skip(self, view, display),
        fields(attempt_id = tracing::field::Empty, outcome = tracing::field::Empty)
    )]
    pub async fn assign_reservation_to_table(
        &self,
        view: &mut FloorView,
        reservation_id: &ReservationId,
        table_id: &TableId,
        display: &DisplayInfo,
    ) -> AssignmentOutcome {
        let mut attempt = AssignmentAttempt::new(reservation_id.clone(), table_id.clone());
        tracing::Span::current().record("attempt_id", tracing::field::display(&attempt.id));

        let outcome = self.run(&mut attempt, view, display).await;

        tracing::Span::current().record("outcome", outcome.label());
        self.notifier.notify(outcome.title(), outcome.message(), outcome.severity());
        outcome
    }

    async fn run(
        &self,
        attempt: &mut AssignmentAttempt,
        view: &mut FloorView,
        display: &DisplayInfo,
    ) -> AssignmentOutcome {
        let table_id = attempt.table_id.clone();

        attempt.advance(AssignmentPhase::Verifying);
        let (current, reservation) = match self.verify(attempt, view, display).await {
            Ok(verified) => verified,
            Err(outcome) => {
                attempt.advance(AssignmentPhase::Done);
                return outcome;
            }
        };
        let table_label = label_or(&display.table_number, current.label());
        let guest = label_or(&display.guest_name, reservation.guest_name());

        attempt.advance(AssignmentPhase::Reserving);
        let reserve = TableStatusUpdate::new(TableStatus::Reserved);
        match self.client.update_table_status(&table_id, &reserve).await {
            Ok(reserved) => {
                view.apply_table(reserved);
            }
            Err(ApiError::Decode(e)) => {
                // 2xx with an unreadable body: the write landed
                tracing::warn!(error = ?e, "Reserved table but could not read the response");
                view.tables.apply(CacheInput::LocalOptimistic(with_status(current, TableStatus::Reserved)));
            }
            Err(e) if e.is_conflict() => {
                tracing::info!(error = ?e, "Lost the race for the table");
                self.refresh_tables(view).await;
                attempt.advance(AssignmentPhase::Done);
                return AssignmentOutcome::Conflict {
                    error_code: e.error_code().map(str::to_string),
                    message: e
                        .server_message()
                        .unwrap_or(CONFLICT_FALLBACK_MESSAGE)
                        .to_string(),
                };
            }
            Err(e) if e.outcome_unknown() => {
                tracing::error!(error = ?e, "Reserve call failed without a response");
                if let Err(outcome) = self.settle_unknown_reserve(attempt, view, &reserve, &table_label).await {
                    attempt.advance(AssignmentPhase::Done);
                    return outcome;
                }
            }
            Err(e) => {
                tracing::warn!(error = ?e, "Reserve call was rejected");
                self.refresh_tables(view).await;
                attempt.advance(AssignmentPhase::Done);
                return match e.status() {
                    Some(_) if e.is_not_found() => AssignmentOutcome::Unavailable {
                        reason: UnavailableReason::Missing,
                        message: format!("Table {} no longer exists", table_label),
                    },
                    Some(status) => AssignmentOutcome::Unavailable {
                        reason: UnavailableReason::Rejected { status },
                        message: format!("Table {} could not be reserved", table_label),
                    },
                    None => AssignmentOutcome::Unavailable {
                        reason: UnavailableReason::Unverifiable,
                        message: format!("Table {} could not be reserved", table_label),
                    },
                };
            }
        }

        attempt.advance(AssignmentPhase::Confirming);
        let update = ReservationUpdate::confirm_at(table_id.clone());
        match self.client.update_reservation(&attempt.reservation_id, &update).await {
            Ok(confirmed) => {
                view.apply_reservation(confirmed);
            }
            Err(ApiError::Decode(e)) => {
                tracing::warn!(error = ?e, "Confirmed reservation but could not read the response");
                if view.reservations.get(&attempt.reservation_id).is_some() {
                    let mut patched = reservation;
                    patched.status = ReservationStatus::Confirmed;
                    patched.assigned_table = Some(table_id.clone());
                    patched.confirmed_at = update.confirmed_at;
                    view.reservations.apply(CacheInput::LocalOptimistic(patched));
                }
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to confirm reservation after reserving the table");
                let cause = FailureCause::from_error(&e);
                return self.fail_after_reserve(attempt, view, cause, cause.message()).await;
            }
        }

        attempt.advance(AssignmentPhase::Done);
        AssignmentOutcome::Succeeded {
            message: format!("Table {} assigned to {} successfully!", table_label, guest),
        }
    }

    // Reads both records from the backend; Err carries the terminal outcome, and nothing has been written
    async fn verify(
        &self,
        attempt: &AssignmentAttempt,
        view: &mut FloorView,
        display: &DisplayInfo,
    ) -> Result<(Table, Reservation), AssignmentOutcome> {
        let table = match self.client.get_table_by_id(&attempt.table_id).await {
            Ok(table) => table,
            Err(e) => return Err(self.unverifiable(view, &attempt.table_id, display, e)),
        };

        if !table.is_available() {
            let table_label = label_or(&display.table_number, table.label());
            let status = table.status;
            view.apply_table(table);
            self.refresh_tables(view).await;
            return Err(AssignmentOutcome::Unavailable {
                reason: UnavailableReason::Status(status),
                message: format!("Table {} is {}", table_label, status.describe()),
            });
        }

        let reservation = match self.client.get_reservation(&attempt.reservation_id).await {
            Ok(reservation) => reservation,
            Err(e) if e.is_not_found() => {
                view.reservations
                    .apply(CacheInput::ServerDeleted(attempt.reservation_id.clone()));
                return Err(AssignmentOutcome::Unavailable {
                    reason: UnavailableReason::ReservationMissing,
                    message: "Reservation no longer exists".to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(error = ?e, "Failed to verify reservation before assignment");
                return Err(AssignmentOutcome::Unavailable {
                    reason: UnavailableReason::Unverifiable,
                    message: "Could not check whether the reservation is still pending".to_string(),
                });
            }
        };

        if !reservation.is_pending() {
            let guest = label_or(&display.guest_name, reservation.guest_name());
            let status = reservation.status;
            view.apply_reservation(reservation);
            return Err(AssignmentOutcome::Unavailable {
                reason: UnavailableReason::ReservationStatus(status),
                message: format!("Reservation for {} is already {}", guest, status),
            });
        }

        Ok((table, reservation))
    }

    /// The reserve got no response, so re-read the table to learn whether it
    /// landed. Only a table carrying our own `lastAssignedAt` stamp is ours;
    /// anything else belongs to someone else and must not be touched.
    ///
    /// `Ok` means our write landed and the workflow carries on to Confirming.
    async fn settle_unknown_reserve(
        &self,
        attempt: &mut AssignmentAttempt,
        view: &mut FloorView,
        reserve: &TableStatusUpdate,
        table_label: &str,
    ) -> Result<(), AssignmentOutcome> {
        let table = match self.client.get_table_by_id(&attempt.table_id).await {
            Ok(table) => table,
            Err(e) => {
                // Cannot tell whose reservation the table holds, so no revert
                tracing::error!(
                    error = ?e,
                    reconciliation_required = true,
                    reservation_id = %attempt.reservation_id,
                    "Could not re-read table after unanswered reserve"
                );
                attempt.advance(AssignmentPhase::RolledBack);
                return Err(AssignmentOutcome::PartiallyFailed {
                    cause: FailureCause::Unexpected,
                    compensation: Compensation::FlaggedForReconciliation,
                    message: RESERVE_UNKNOWN_MESSAGE.to_string(),
                });
            }
        };

        if reserved_by(&table, reserve) {
            tracing::info!("Unanswered reserve had landed; continuing");
            view.apply_table(table);
            return Ok(());
        }

        let available = table.is_available();
        view.apply_table(table);
        if available {
            return Err(AssignmentOutcome::Unavailable {
                reason: UnavailableReason::Unverifiable,
                message: format!("Table {} could not be reserved; nothing was changed", table_label),
            });
        }

        self.refresh_tables(view).await;
        Err(AssignmentOutcome::Conflict {
            error_code: None,
            message: CONFLICT_FALLBACK_MESSAGE.to_string(),
        })
    }

    // Verifying could not read the table; nothing has been written
    fn unverifiable(
        &self,
        view: &mut FloorView,
        table_id: &TableId,
        display: &DisplayInfo,
        error: ApiError,
    ) -> AssignmentOutcome {
        let table_label = label_or(&display.table_number, table_id.as_str());
        if error.is_not_found() {
            view.tables.apply(CacheInput::ServerDeleted(table_id.clone()));
            return AssignmentOutcome::Unavailable {
                reason: UnavailableReason::Missing,
                message: format!("Table {} no longer exists", table_label),
            };
        }

        tracing::warn!(error = ?error, "Failed to verify table before assignment");
        AssignmentOutcome::Unavailable {
            reason: UnavailableReason::Unverifiable,
            message: format!("Could not check whether table {} is available", table_label),
        }
    }

    async fn fail_after_reserve(
        &self,
        attempt: &mut AssignmentAttempt,
        view: &mut FloorView,
        cause: FailureCause,
        message: &str,
    ) -> AssignmentOutcome {
        let compensation = self.compensate(attempt, view).await;
        self.refresh_tables(view).await;
        attempt.advance(AssignmentPhase::Done);
        AssignmentOutcome::PartiallyFailed {
            cause,
            compensation,
            message: message.to_string(),
        }
    }

    // Exactly one attempt; a failed revert is flagged, never retried
    #[tracing::instrument("Compensating partial assignment", skip_all, fields(table_id = %attempt.table_id))]
    async fn compensate(&self, attempt: &mut AssignmentAttempt, view: &mut FloorView) -> Compensation {
        attempt.advance(AssignmentPhase::RolledBack);

        if self.policy == CompensationPolicy::LeaveReserved {
            tracing::warn!(
                reconciliation_required = true,
                reservation_id = %attempt.reservation_id,
                "Table left reserved without a confirmed reservation"
            );
            return Compensation::FlaggedForReconciliation;
        }

        match self
            .client
            .update_table_status(&attempt.table_id, &TableStatusUpdate::new(TableStatus::Available))
            .await
        {
            Ok(table) => {
                view.apply_table(table);
                Compensation::Reverted
            }
            Err(ApiError::Decode(_)) => Compensation::Reverted,
            Err(e) => {
                tracing::error!(
                    error = ?e,
                    reconciliation_required = true,
                    reservation_id = %attempt.reservation_id,
                    "Failed to revert reserved table"
                );
                Compensation::RevertFailed { reason: e.to_string() }
            }
        }
    }

    async fn refresh_tables(&self, view: &mut FloorView) {
        if let Err(e) = view.refresh_tables(&self.client).await {
            tracing::warn!(error = ?e, "Failed to refresh tables after assignment");
        }
    }
}

fn label_or(preferred: &str, fallback: &str) -> String {
    let preferred = preferred.trim();
    if preferred.is_empty() {
        fallback.to_string()
    } else {
        preferred.to_string()
    }
}

// Backend timestamps may be truncated to milliseconds
fn reserved_by(table: &Table, reserve: &TableStatusUpdate) -> bool {
    table.status == TableStatus::Reserved
        && table
            .last_assigned_at
            .zip(reserve.last_assigned_at)
            .is_some_and(|(held, ours)| held.timestamp_millis() == ours.timestamp_millis())
}

fn with_status(mut table: Table, status: TableStatus) -> Table {
    table.status = status;
    table
}
