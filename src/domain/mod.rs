pub mod guest_contact;
pub mod reservation;
pub mod table;

pub use guest_contact::{GuestContactError, GuestEmail, GuestPhone};
pub use reservation::{
    GuestInfo, NewReservation, PartySizeBucket, Reservation, ReservationFilter, ReservationId,
    ReservationStatus, ReservationUpdate,
};
pub use table::{
    AnalyticsRange, MaintenanceRequest, MaintenanceSchedule, NewTable, Table, TableFilter,
    TableId, TableStatus, TableStatusUpdate, TableUpdate,
};
