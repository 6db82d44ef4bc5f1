//! Client errors.
//!
//! Construction and configuration failures are `ClientError`. Failures of
//! individual backend calls surface as `vtp_license::BackendError`, the
//! type the [`LicenseBackend`](vtp_license::LicenseBackend) seam speaks.

use thiserror::Error;

use crate::config::ConfigError;
use crate::session::SessionError;

/// Errors raised while setting up the HTTP client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("session store error: {0}")]
    Session(#[from] SessionError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
