//! # vtp-client -- HTTP backend, configuration and session state
//!
//! Connects the licensing flow in `vtp-license` to the real backend:
//!
//! - [`HttpBackend`] implements [`vtp_license::LicenseBackend`] over the
//!   licensing REST API with `reqwest`.
//! - [`ConsoleConfig`] loads base URLs and the request timeout from the
//!   environment.
//! - [`SessionStore`] holds the access token and operator settings, with an
//!   in-memory and a JSON-file implementation.
//!
//! This crate is the only place that talks HTTP to the licensing backend.

pub mod config;
pub mod error;
pub mod licenses;
pub mod session;

pub use config::{ConfigError, ConsoleConfig};
pub use error::ClientError;
pub use licenses::HttpBackend;
pub use session::{
    FileSessionStore, MemorySessionStore, SessionError, SessionStore, ACCESS_TOKEN_KEY,
};
