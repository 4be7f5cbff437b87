use std::{error::Error, fmt::Debug};

use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::{
    domain::{Reservation, ReservationId, Table, TableId, TableStatus},
    utils::error_fmt_chain,
};

/// Mutation broadcast by the backend to every connected client.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    TableCreated(Table),
    TableUpdated(Table),
    TableDeleted(TableId),
    // Bulk edits may carry only ids; records are included when the backend sends them
    TablesUpdated {
        table_ids: Vec<TableId>,
        tables: Vec<Table>,
    },
    TablesDeleted(Vec<TableId>),
    TableStatusChanged {
        table_id: TableId,
        table_number: Option<String>,
        status: TableStatus,
    },
    ReservationCreated(Reservation),
    ReservationStatusChanged(Reservation),
    ReservationDeleted(ReservationId),
}

impl LiveEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::TableCreated(_) => "tableCreated",
            LiveEvent::TableUpdated(_) => "tableUpdated",
            LiveEvent::TableDeleted(_) => "tableDeleted",
            LiveEvent::TablesUpdated { .. } => "tablesUpdated",
            LiveEvent::TablesDeleted(_) => "tablesDeleted",
            LiveEvent::TableStatusChanged { .. } => "tableStatusChanged",
            LiveEvent::ReservationCreated(_) => "reservationCreated",
            LiveEvent::ReservationStatusChanged(_) => "reservationStatusChanged",
            LiveEvent::ReservationDeleted(_) => "reservationDeleted",
        }
    }

    /// Decode a socket event frame: a JSON array of `[eventName, payload]`.
    pub fn from_frame(frame: &str) -> Result<LiveEvent, FrameError> {
        let (name, payload): (String, serde_json::Value) =
            serde_json::from_str(frame).map_err(FrameError::Malformed)?;
        Self::from_parts(&name, payload)
    }

    pub fn from_parts(name: &str, payload: serde_json::Value) -> Result<LiveEvent, FrameError> {
        let event = match name {
            "tableCreated" => LiveEvent::TableCreated(decode(name, payload)?),
            "tableUpdated" => LiveEvent::TableUpdated(decode(name, payload)?),
            "tableDeleted" => LiveEvent::TableDeleted(TableId(decode::<IdPayload>(name, payload)?.into_inner())),
            "tablesUpdated" => {
                let bulk: BulkPayload = decode(name, payload)?;
                LiveEvent::TablesUpdated { table_ids: bulk.table_ids, tables: bulk.tables }
            }
            "tablesDeleted" => LiveEvent::TablesDeleted(decode::<BulkPayload>(name, payload)?.table_ids),
            "tableStatusChanged" => {
                let change: StatusPayload = decode(name, payload)?;
                LiveEvent::TableStatusChanged {
                    table_id: change.table_id,
                    table_number: change.table_number,
                    status: change.status,
                }
            }
            "reservationCreated" => LiveEvent::ReservationCreated(decode(name, payload)?),
            "reservationStatusChanged" => LiveEvent::ReservationStatusChanged(decode(name, payload)?),
            "reservationDeleted" => {
                LiveEvent::ReservationDeleted(ReservationId(decode::<IdPayload>(name, payload)?.into_inner()))
            }
            other => return Err(FrameError::UnknownEvent(other.to_string())),
        };

        Ok(event)
    }
}

fn decode<T: DeserializeOwned>(event: &str, payload: serde_json::Value) -> Result<T, FrameError> {
    serde_json::from_value(payload).map_err(|source| FrameError::Payload {
        event: event.to_string(),
        source,
    })
}

// Deletion payloads: a bare id or an object naming it
#[derive(Deserialize)]
#[serde(untagged)]
enum IdPayload {
    Bare(String),
    Object {
        #[serde(alias = "_id", alias = "tableId", alias = "reservationId")]
        id: String,
    },
}

impl IdPayload {
    fn into_inner(self) -> String {
        match self {
            IdPayload::Bare(id) => id,
            IdPayload::Object { id } => id,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkPayload {
    table_ids: Vec<TableId>,
    #[serde(default)]
    tables: Vec<Table>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusPayload {
    #[serde(alias = "_id", alias = "id")]
    table_id: TableId,
    #[serde(default)]
    table_number: Option<String>,
    status: TableStatus,
}

#[derive(Error)]
pub enum FrameError {
    #[error("live frame is not a [name, payload] array")]
    Malformed(#[source] serde_json::Error),
    #[error("unknown live event `{0}`")]
    UnknownEvent(String),
    #[error("invalid payload for live event `{event}`")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Debug for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}
