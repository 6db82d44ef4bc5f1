//! # vtp-core: Foundational Types for Visit Tracking Pro Licensing
//!
//! Leaf crate of the workspace. Defines the identifier newtypes and value
//! types that the licensing, client and console crates share. It depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **No bare strings for identifiers.** `TenantId` and `LicenseKey` are
//!    newtypes; a blank tenant identifier cannot be constructed.
//!
//! 2. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision and
//!    offers calendar-year arithmetic (`add_calendar_years`) for license
//!    validity windows. A year is never approximated as 365 days.
//!
//! 3. **Secrets do not leak through `Debug`.** `Secret` renders as
//!    `[REDACTED]` and zeroizes its buffer on drop.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vtp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod secret;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{LicenseKey, TenantId, LICENSE_KEY_PREFIX};
pub use secret::Secret;
pub use temporal::Timestamp;
