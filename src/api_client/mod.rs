mod error;
mod reservations;
mod tables;

use std::time::Duration;

use reqwest::{header::AUTHORIZATION, Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};

use crate::configuration::BackendSettings;

pub use error::{ApiError, TABLE_NOT_AVAILABLE};
pub use tables::{BulkTableRequest, BulkOperationResult};

// Client for the floor backend's REST API
#[derive(Clone)]
pub struct BackendClient {
    http_client: Client,
    base_url: String,
    authorization_token: SecretString,
    reservation_type: String,
}

impl BackendClient {
    pub fn new(
        base_url: String,
        authorization_token: SecretString,
        timeout: Duration,
    ) -> Result<BackendClient, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization_token,
            reservation_type: "restaurant".to_string(),
        })
    }

    pub fn from_settings(settings: &BackendSettings) -> Result<BackendClient, reqwest::Error> {
        Ok(Self::new(
            settings.base_url.clone(),
            settings.auth_token.clone(),
            settings.timeout(),
        )?
        .with_reservation_type(settings.reservation_type.clone()))
    }

    // Reservation routes are namespaced by type, e.g. /reservations/restaurant/{id}
    pub fn with_reservation_type(mut self, reservation_type: String) -> Self {
        self.reservation_type = reservation_type;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, format!("{}{}", self.base_url, path))
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.authorization_token.expose_secret()),
            )
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let error = ApiError::from_response(status, &body);
            tracing::warn!(status = status.as_u16(), error_code = ?error.error_code(), "Backend rejected request");
            return Err(error);
        }

        serde_json::from_slice::<Envelope<T>>(&body)
            .map(Envelope::into_inner)
            .map_err(ApiError::Decode)
    }

    // For endpoints whose response body carries nothing the caller needs
    async fn execute_discarding_body(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await?;
            let error = ApiError::from_response(status, &body);
            tracing::warn!(status = status.as_u16(), error_code = ?error.error_code(), "Backend rejected request");
            return Err(error);
        }

        Ok(())
    }
}

// The backend wraps payloads inconsistently: {data: ..}, {items: ..} or bare
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Data { data: T },
    Items { items: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Data { data } => data,
            Envelope::Items { items } => items,
            Envelope::Bare(inner) => inner,
        }
    }
}
