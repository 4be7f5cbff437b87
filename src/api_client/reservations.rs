use reqwest::Method;
use serde::Serialize;

use super::{ApiError, BackendClient};
use crate::domain::{
    guest_contact::validate_new_reservation, NewReservation, Reservation, ReservationFilter,
    ReservationId, ReservationStatus, ReservationUpdate,
};

#[derive(Serialize)]
struct StatusBody {
    status: ReservationStatus,
}

impl BackendClient {
    fn reservation_path(&self, reservation_id: &ReservationId) -> String {
        format!("/reservations/{}/{}", self.reservation_type, reservation_id)
    }

    #[tracing::instrument("Listing reservations", skip(self))]
    pub async fn list_reservations(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, ApiError> {
        // The backend requires a type on every listing
        let mut filter = filter.clone();
        if filter.kind.is_none() {
            filter.kind = Some(self.reservation_type.clone());
        }

        let request = self.request(Method::GET, "/reservations/").query(&filter);
        self.execute(request).await
    }

    #[tracing::instrument("Fetching reservation", skip(self))]
    pub async fn get_reservation(&self, reservation_id: &ReservationId) -> Result<Reservation, ApiError> {
        let request = self.request(Method::GET, &self.reservation_path(reservation_id));
        self.execute(request).await
    }

    #[tracing::instrument(
        "Creating reservation",
        skip(self, reservation),
        fields(party_size = reservation.no_of_diners)
    )]
    pub async fn create_reservation(&self, reservation: &NewReservation) -> Result<Reservation, ApiError> {
        validate_new_reservation(reservation)?;

        let request = self
            .request(Method::POST, &format!("/reservations/{}", self.reservation_type))
            .json(reservation);
        self.execute(request).await
    }

    #[tracing::instrument("Updating reservation", skip(self))]
    pub async fn update_reservation(
        &self,
        reservation_id: &ReservationId,
        update: &ReservationUpdate,
    ) -> Result<Reservation, ApiError> {
        let request = self
            .request(Method::PUT, &self.reservation_path(reservation_id))
            .json(update);
        self.execute(request).await
    }

    #[tracing::instrument("Updating reservation status", skip(self))]
    pub async fn update_reservation_status(
        &self,
        reservation_id: &ReservationId,
        status: ReservationStatus,
    ) -> Result<Reservation, ApiError> {
        let request = self
            .request(Method::PUT, &format!("{}/status", self.reservation_path(reservation_id)))
            .json(&StatusBody { status });
        self.execute(request).await
    }

    #[tracing::instrument("Deleting reservation", skip(self))]
    pub async fn delete_reservation(&self, reservation_id: &ReservationId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &self.reservation_path(reservation_id));
        self.execute_discarding_body(request).await
    }
}
