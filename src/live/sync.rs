use std::sync::Arc;

use crate::{
    api_client::BackendClient,
    cache::{CacheChange, CacheInput},
    domain::{ReservationStatus, TableId, TableStatus},
    floor_view::FloorView,
    notifier::{Notifier, Severity},
};

use super::{
    channel::{Delivery, EventSource, Subscription},
    event::LiveEvent,
};

/// Keeps one [`FloorView`] converged with the backend using live events.
///
/// Events are treated as at-least-once: re-applying a state the view already
/// holds changes nothing, notifies nobody and touches no network.
pub struct LiveSync {
    client: BackendClient,
    notifier: Arc<dyn Notifier>,
    subscription: Subscription,
}

impl LiveSync {
    pub fn attach(source: &dyn EventSource, client: BackendClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            subscription: source.subscribe(),
        }
    }

    pub fn detach(self) {
        self.subscription.unsubscribe();
    }

    /// Waits for the next delivery and applies it. `None` once the source
    /// has closed.
    pub async fn next(&mut self, view: &mut FloorView) -> Option<bool> {
        let delivery = self.subscription.recv().await?;
        Some(self.handle(view, delivery).await)
    }

    // Applies everything already queued without waiting; returns how many deliveries changed the view
    pub async fn drain(&mut self, view: &mut FloorView) -> usize {
        let mut changed = 0;
        while let Some(delivery) = self.subscription.try_recv() {
            if self.handle(view, delivery).await {
                changed += 1;
            }
        }
        changed
    }

    pub async fn handle(&self, view: &mut FloorView, delivery: Delivery) -> bool {
        match delivery {
            Delivery::Event(event) => self.apply(view, event).await,
            Delivery::Missed(_) => {
                // Dropped events can't be replayed; re-read both collections
                if let Err(e) = view.refresh(&self.client).await {
                    tracing::error!(error = ?e, "Failed to resync floor view after missed events");
                    return false;
                }
                true
            }
        }
    }

    #[tracing::instrument("Applying live event", skip_all, fields(event = event.name()))]
    pub async fn apply(&self, view: &mut FloorView, event: LiveEvent) -> bool {
        match event {
            LiveEvent::TableCreated(table) => {
                let label = table.label().to_string();
                let change = view.apply_table(table);
                if change == CacheChange::Inserted {
                    self.notifier.notify(
                        "Table Created",
                        &format!("Table {} has been created", label),
                        Severity::Success,
                    );
                }
                change.is_visible()
            }
            LiveEvent::TableUpdated(table) => {
                let previous = view.tables.get(&table.id).map(|t| t.status);
                let (label, status) = (table.label().to_string(), table.status);
                let change = view.apply_table(table);
                if change.is_visible() && previous.is_some_and(|p| p != status) {
                    self.notify_table_status(&label, status);
                }
                change.is_visible()
            }
            LiveEvent::TableDeleted(table_id) => {
                let change = view.tables.apply(CacheInput::ServerDeleted(table_id));
                if change == CacheChange::Removed {
                    self.notifier.notify("Table Deleted", "Table has been removed", Severity::Warning);
                }
                change.is_visible()
            }
            LiveEvent::TablesUpdated { table_ids, tables } => {
                let mut changed = false;
                let covered = table_ids.iter().all(|id| tables.iter().any(|t| &t.id == id));
                for table in tables {
                    changed |= view.apply_table(table).is_visible();
                }
                if !covered {
                    // Bulk edit arrived without records; the list is the only source of truth
                    match view.refresh_tables(&self.client).await {
                        Ok(()) => changed = true,
                        Err(e) => tracing::error!(error = ?e, "Failed to refresh tables after bulk update"),
                    }
                }
                if changed {
                    self.notifier.notify(
                        "Bulk Update",
                        &format!("{} tables updated", table_ids.len()),
                        Severity::Info,
                    );
                }
                changed
            }
            LiveEvent::TablesDeleted(table_ids) => {
                let removed = table_ids
                    .into_iter()
                    .filter(|id| view.tables.apply(CacheInput::ServerDeleted(id.clone())) == CacheChange::Removed)
                    .count();
                if removed > 0 {
                    self.notifier.notify(
                        "Bulk Delete",
                        &format!("{} tables deleted", removed),
                        Severity::Warning,
                    );
                }
                removed > 0
            }
            LiveEvent::TableStatusChanged { table_id, table_number, status } => {
                self.apply_status_change(view, table_id, table_number, status).await
            }
            LiveEvent::ReservationCreated(reservation) => {
                let guest = reservation.guest_info.name.trim().to_string();
                let change = view.apply_reservation(reservation);
                if change == CacheChange::Inserted {
                    let guest = if guest.is_empty() { "Guest".to_string() } else { guest };
                    self.notifier.notify(
                        "New Reservation",
                        &format!("Reservation created for {}", guest),
                        Severity::Success,
                    );
                }
                change.is_visible()
            }
            LiveEvent::ReservationStatusChanged(reservation) => {
                let previous = view.reservations.get(&reservation.id).map(|r| r.status);
                let status = reservation.status;
                let change = view.apply_reservation(reservation);
                if change.is_visible() && previous != Some(status) {
                    let severity = if status == ReservationStatus::Confirmed {
                        Severity::Success
                    } else {
                        Severity::Info
                    };
                    self.notifier.notify("Reservation Updated", reservation_status_message(status), severity);
                }
                change.is_visible()
            }
            LiveEvent::ReservationDeleted(reservation_id) => {
                let change = view.reservations.apply(CacheInput::ServerDeleted(reservation_id));
                if change == CacheChange::Removed {
                    self.notifier.notify(
                        "Reservation Deleted",
                        "A reservation has been cancelled",
                        Severity::Warning,
                    );
                }
                change.is_visible()
            }
        }
    }

    async fn apply_status_change(
        &self,
        view: &mut FloorView,
        table_id: TableId,
        table_number: Option<String>,
        status: TableStatus,
    ) -> bool {
        let patched = match view.tables.get(&table_id) {
            Some(cached) if cached.status == status => return false,
            Some(cached) => {
                let mut patched = cached.clone();
                patched.status = status;
                patched
            }
            // Not in the view; only a fresh read can tell whether it belongs there now
            None => match self.client.get_table_by_id(&table_id).await {
                Ok(table) => table,
                Err(e) => {
                    tracing::warn!(error = ?e, %table_id, "Failed to fetch table named by status change");
                    return false;
                }
            },
        };

        let label = table_number.unwrap_or_else(|| patched.label().to_string());
        let change = view.apply_table(patched);
        if change.is_visible() {
            self.notify_table_status(&label, status);
        }
        change.is_visible()
    }

    fn notify_table_status(&self, label: &str, status: TableStatus) {
        let (title, message, severity) = table_status_notice(label, status);
        self.notifier.notify(title, &message, severity);
    }
}

pub fn table_status_notice(label: &str, status: TableStatus) -> (&'static str, String, Severity) {
    match status {
        TableStatus::Available => (
            "Table Available",
            format!("Table {} is now available for seating", label),
            Severity::Success,
        ),
        TableStatus::Reserved => ("Table Reserved", format!("Table {} has been reserved", label), Severity::Info),
        TableStatus::Occupied => (
            "Table Occupied",
            format!("Table {} is currently occupied", label),
            Severity::Warning,
        ),
        TableStatus::Dirty => ("Table Needs Cleaning", format!("Table {} needs cleaning", label), Severity::Warning),
        TableStatus::Maintenance => (
            "Maintenance Required",
            format!("Table {} requires maintenance", label),
            Severity::Error,
        ),
        TableStatus::OutOfService => (
            "Table Out of Service",
            format!("Table {} is out of service", label),
            Severity::Error,
        ),
    }
}

pub fn reservation_status_message(status: ReservationStatus) -> &'static str {
    match status {
        ReservationStatus::Pending => "Reservation is pending confirmation",
        ReservationStatus::Confirmed => "Reservation has been confirmed",
        ReservationStatus::Seated => "Guests have been seated",
        ReservationStatus::Completed => "Reservation completed",
        ReservationStatus::Cancelled => "Reservation cancelled",
        ReservationStatus::NoShow => "Guest did not show up",
    }
}
