use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::table::TableId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub String);

impl ReservationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReservationStatus{
    Pending,
    Confirmed,
    Seated,
    Completed,
    Cancelled,
    NoShow
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Seated => "seated",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::NoShow => "no-show"
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestInfo{
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation{
    #[serde(rename = "_id", alias = "id")]
    pub id: ReservationId,
    #[serde(default)]
    pub guest_info: GuestInfo,
    #[serde(default)]
    pub no_of_diners: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_of_reservation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
    pub status: ReservationStatus,
    #[serde(
        default,
        deserialize_with = "deserialize_table_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_table: Option<TableId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>
}

impl Reservation {
    pub fn guest_name(&self) -> &str {
        if self.guest_info.name.trim().is_empty() {
            "Unknown Guest"
        } else {
            &self.guest_info.name
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ReservationStatus::Pending
    }
}

// assignedTable arrives either as a bare id or as a populated table document
#[derive(Deserialize)]
#[serde(untagged)]
enum TableRef{
    Id(TableId),
    Populated{
        #[serde(rename = "_id", alias = "id")]
        id: TableId
    }
}

fn deserialize_table_ref<'de, D>(deserializer: D) -> Result<Option<TableId>, D::Error>
where
    D: Deserializer<'de>,
{
    let table_ref = Option::<TableRef>::deserialize(deserializer)?;
    Ok(table_ref.map(|r| match r {
        TableRef::Id(id) => id,
        TableRef::Populated{ id } => id
    }))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation{
    pub guest_info: GuestInfo,
    pub no_of_diners: u32,
    pub date: String,
    pub time_slot: String,
    pub type_of_reservation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
    pub agree_to_tn_c: bool
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationUpdate{
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_table: Option<TableId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_of_diners: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>
}

impl ReservationUpdate {
    // The write issued by the Confirming phase of an assignment
    pub fn confirm_at(table_id: TableId) -> Self {
        Self{
            status: Some(ReservationStatus::Confirmed),
            assigned_table: Some(table_id),
            confirmed_at: Some(Utc::now()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFilter{
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_reservation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>
}

impl ReservationFilter {
    // Date range and free-text search are evaluated server-side only
    pub fn matches(&self, reservation: &Reservation) -> bool {
        self.status.map_or(true, |status| reservation.status == status)
            && self
                .type_of_reservation
                .as_ref()
                .map_or(true, |kind| reservation.type_of_reservation.as_ref() == Some(kind))
            && self
                .time_slot
                .as_ref()
                .map_or(true, |slot| reservation.time_slot.as_ref() == Some(slot))
    }
}

/// Party-size buckets offered by the reservation queue filter.
///
/// The backend has no party-size query parameter, so these are applied to
/// already fetched reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartySizeBucket{
    One,
    Two,
    ThreeToFour,
    FiveToSix,
    SevenPlus
}

impl PartySizeBucket {
    pub fn contains(&self, party_size: u32) -> bool {
        match self {
            PartySizeBucket::One => party_size == 1,
            PartySizeBucket::Two => party_size == 2,
            PartySizeBucket::ThreeToFour => (3..=4).contains(&party_size),
            PartySizeBucket::FiveToSix => (5..=6).contains(&party_size),
            PartySizeBucket::SevenPlus => party_size >= 7
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "1" => Some(PartySizeBucket::One),
            "2" => Some(PartySizeBucket::Two),
            "3-4" => Some(PartySizeBucket::ThreeToFour),
            "5-6" => Some(PartySizeBucket::FiveToSix),
            "7+" => Some(PartySizeBucket::SevenPlus),
            _ => None
        }
    }
}
