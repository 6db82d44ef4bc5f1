//! # Error Types
//!
//! `LicenseError` carries the three failure kinds the operator can see:
//! invalid input, network failure and package-generation failure. None of
//! them is retried automatically.

use thiserror::Error;
use vtp_core::ValidationError;

use crate::download::DownloadError;
use crate::license::StatusError;

/// Failure at the backend seam.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend could not be reached (connect, TLS, timeout).
    #[error("backend unreachable at {endpoint}: {message}")]
    Unreachable {
        /// Endpoint that was called, e.g. `POST /licenses`.
        endpoint: String,
        /// Transport-level description.
        message: String,
    },

    /// The backend answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        /// Endpoint that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response from {endpoint}: {message}")]
    Decode {
        /// Endpoint that was called.
        endpoint: String,
        /// Decoder error.
        message: String,
    },

    /// The backend refused the request on business grounds.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// No usable credentials for the request.
    #[error("cannot authenticate: {0}")]
    Credentials(String),
}

/// Errors surfaced by the licensing operations.
#[derive(Error, Debug)]
pub enum LicenseError {
    /// A required field was missing or malformed. Raised before any side effect.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The backend was unreachable or answered with an error.
    #[error("network error: {0}")]
    Network(#[from] BackendError),

    /// The packaging backend failed while preparing an installation package.
    #[error("package generation failed: {0}")]
    PackageGeneration(#[source] BackendError),

    /// A license status transition was not allowed.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// The host environment could not start a download.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl LicenseError {
    /// Human-readable message for operator notifications.
    pub fn operator_message(&self) -> String {
        match self {
            Self::InvalidInput(e) => format!("Please check the form: {e}."),
            Self::Network(BackendError::Rejected(reason)) => {
                format!("The licensing service rejected the request: {reason}.")
            }
            Self::Network(BackendError::Credentials(_)) => {
                "You are not signed in to the licensing service.".to_string()
            }
            Self::Network(_) => {
                "Could not reach the licensing service. Please try again.".to_string()
            }
            Self::PackageGeneration(_) => {
                "Failed to generate the installation package. Please try again.".to_string()
            }
            Self::Status(e) => format!("The license cannot be changed: {e}."),
            Self::Download(e) => format!("The download could not be started: {e}."),
        }
    }
}
