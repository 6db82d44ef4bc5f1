//! # Download Hand-off
//!
//! `trigger_download(url, filename)` is synchronous and delegates to the
//! host environment's file-download mechanism. The host decides how the
//! transfer happens; this crate only names the seam.

use thiserror::Error;

/// Failure to start a download.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// No download mechanism is available in this environment.
    #[error("downloads are not supported by this host")]
    Unsupported,

    /// The host tried and failed.
    #[error("download of {url} failed: {message}")]
    Failed {
        /// URL that was requested.
        url: String,
        /// Host-specific description.
        message: String,
    },
}

/// The host environment's file-download mechanism.
pub trait DownloadHost: Send + Sync {
    /// Save the resource at `url` under `filename`.
    fn trigger_download(&self, url: &str, filename: &str) -> Result<(), DownloadError>;
}

/// Host without a download mechanism.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDownloads;

impl DownloadHost for NoDownloads {
    fn trigger_download(&self, _url: &str, _filename: &str) -> Result<(), DownloadError> {
        Err(DownloadError::Unsupported)
    }
}
