use crate::{
    api_client::{ApiError, BackendClient},
    cache::{CacheChange, CacheInput, EntityCache},
    domain::{PartySizeBucket, Reservation, ReservationFilter, Table, TableFilter},
};

/// A view's cached copy of the floor: tables plus reservations.
///
/// Contents are advisory. Anything that decides on a write re-reads the
/// backend first.
#[derive(Debug, Clone, Default)]
pub struct FloorView {
    pub tables: EntityCache<Table>,
    pub reservations: EntityCache<Reservation>,
    table_filter: TableFilter,
    reservation_filter: ReservationFilter,
}

impl FloorView {
    pub fn new(table_filter: TableFilter, reservation_filter: ReservationFilter) -> Self {
        Self {
            table_filter,
            reservation_filter,
            ..Default::default()
        }
    }

    pub fn table_filter(&self) -> &TableFilter {
        &self.table_filter
    }

    pub fn reservation_filter(&self) -> &ReservationFilter {
        &self.reservation_filter
    }

    // Server record for a table; tables that stop matching the view's filter leave the view
    pub fn apply_table(&mut self, table: Table) -> CacheChange {
        if self.table_filter.matches(&table) {
            self.tables.apply(CacheInput::ServerConfirmed(table))
        } else {
            self.tables.apply(CacheInput::ServerDeleted(table.id))
        }
    }

    pub fn apply_reservation(&mut self, reservation: Reservation) -> CacheChange {
        if self.reservation_filter.matches(&reservation) {
            self.reservations.apply(CacheInput::ServerConfirmed(reservation))
        } else {
            self.reservations.apply(CacheInput::ServerDeleted(reservation.id))
        }
    }

    #[tracing::instrument("Refreshing table list", skip_all)]
    pub async fn refresh_tables(&mut self, client: &BackendClient) -> Result<(), ApiError> {
        let tables = client.list_tables(&self.table_filter).await?;
        tracing::debug!(count = tables.len(), "Replaced cached tables");
        self.tables.replace_all(tables);
        Ok(())
    }

    #[tracing::instrument("Refreshing reservation list", skip_all)]
    pub async fn refresh_reservations(&mut self, client: &BackendClient) -> Result<(), ApiError> {
        let reservations = client.list_reservations(&self.reservation_filter).await?;
        tracing::debug!(count = reservations.len(), "Replaced cached reservations");
        self.reservations.replace_all(reservations);
        Ok(())
    }

    pub async fn refresh(&mut self, client: &BackendClient) -> Result<(), ApiError> {
        self.refresh_tables(client).await?;
        self.refresh_reservations(client).await
    }

    // Pending reservations, newest first
    pub fn pending_queue(&self) -> Vec<&Reservation> {
        let mut pending: Vec<&Reservation> = self
            .reservations
            .iter()
            .filter(|reservation| reservation.is_pending())
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        pending
    }

    pub fn pending_queue_for(&self, bucket: PartySizeBucket) -> Vec<&Reservation> {
        self.pending_queue()
            .into_iter()
            .filter(|reservation| bucket.contains(reservation.no_of_diners))
            .collect()
    }

    // Candidate tables for an assignment dialog, as far as the cache knows
    pub fn available_tables_for(&self, party_size: u32) -> Vec<&Table> {
        self.tables
            .iter()
            .filter(|table| table.is_available() && table.seats(party_size))
            .collect()
    }
}
