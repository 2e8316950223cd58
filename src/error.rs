//! Error types for the desk client.
//!
//! This module defines `DeskError`, the single error channel every
//! operation reports through. Network, protocol and parse failures all
//! carry a human-readable message (see [`DeskError::message`]); the
//! variants keep them distinguishable for callers that care.

use reqwest::StatusCode;
use thiserror::Error;

/// Message used whenever the backend did not supply a usable `detail`.
pub const GENERIC_FAILURE: &str = "Request failed";

/// Unified error type for all desk client operations.
#[derive(Error, Debug)]
pub enum DeskError {
    /// Host configuration error (binary only).
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The backend could not be reached, or the transfer broke off.
    #[error("Request failed")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-success status and a JSON body.
    #[error("{message}")]
    Api {
        /// The HTTP status code returned.
        status: StatusCode,
        /// The backend `detail`, or the generic fallback.
        message: String,
    },

    /// The response body was not valid JSON, whatever the status.
    #[error("Request failed")]
    InvalidJson {
        /// The HTTP status code returned alongside the unparsable body.
        status: StatusCode,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be encoded, or a response did not have the expected shape.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Durable session storage failed.
    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl DeskError {
    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        DeskError::Config(message.into())
    }

    /// Builds the protocol-failure error from a parsed error body.
    ///
    /// A string `detail` is used as-is; any other non-null `detail` (the
    /// backend sends arrays for request validation failures) is rendered as
    /// compact JSON. Everything else falls back to [`GENERIC_FAILURE`].
    pub fn from_error_body(status: StatusCode, body: &serde_json::Value) -> Self {
        let message = match body.get("detail") {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(serde_json::Value::Null) | None => GENERIC_FAILURE.to_string(),
            Some(serde_json::Value::String(_)) => GENERIC_FAILURE.to_string(),
            Some(other) => other.to_string(),
        };
        DeskError::Api { status, message }
    }

    /// The human-readable message presented to callers.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The HTTP status of the response that caused this error, if there was one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DeskError::Api { status, .. } | DeskError::InvalidJson { status, .. } => Some(*status),
            DeskError::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Returns true if the backend rejected the credentials (HTTP 401 or 403).
    ///
    /// Expired and missing tokens are not told apart; callers that redirect
    /// to a login screen should check this.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }

    /// Returns true if the backend returned a body that is not JSON.
    #[must_use]
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, DeskError::InvalidJson { .. })
    }
}
