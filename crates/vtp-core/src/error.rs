//! # Error Types
//!
//! Construction and parse failures for the core value types. Higher-level
//! crates wrap these in their own `thiserror` enums.

use thiserror::Error;

/// A value failed validation while being constructed or parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty or whitespace-only.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A value did not match the expected format.
    #[error("malformed {kind} {value:?}: {reason}")]
    Malformed {
        /// What kind of value was being parsed (e.g. "license key").
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Why the input was rejected.
        reason: String,
    },

    /// A date computation left the representable range.
    #[error("timestamp out of range: {0}")]
    OutOfRange(String),
}
