use std::{error::Error, fmt::Debug};

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::{domain::GuestContactError, utils::error_fmt_chain};

pub const TABLE_NOT_AVAILABLE: &str = "TABLE_NOT_AVAILABLE";

// Failure of a single backend call
#[derive(Error)]
pub enum ApiError{
    #[error("backend responded with {status}: {message}")]
    Status{
        status: StatusCode,
        error_code: Option<String>,
        message: String
    },
    #[error("failed to reach the backend")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode backend response")]
    Decode(#[source] serde_json::Error),
    #[error("request rejected before sending")]
    InvalidRequest(#[from] GuestContactError)
}

impl Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status{ status, .. } => Some(*status),
            _ => None
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            ApiError::Status{ error_code, .. } => error_code.as_deref(),
            _ => None
        }
    }

    // Message the backend attached to a rejection, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status{ message, .. } if !message.is_empty() => Some(message),
            _ => None
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// True when the backend never produced a response to a request that
    /// was sent, so a write may or may not have been applied. A request that
    /// could not even be built never reached the backend.
    pub fn outcome_unknown(&self) -> bool {
        matches!(self, ApiError::Transport(e) if !e.is_builder())
    }

    pub(crate) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();
        let (error_code, message) = match parsed {
            Some(body) => (body.error_code, body.message.or(body.error).unwrap_or_default()),
            None => (None, String::new())
        };

        ApiError::Status{ status, error_code, message }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody{
    error_code: Option<String>,
    message: Option<String>,
    error: Option<String>
}
