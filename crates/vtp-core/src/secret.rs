//! # Secret Strings
//!
//! Wrapper for one-time credentials such as the temporary admin password of
//! an installation package.
//!
//! ## Security Invariant
//!
//! - `Debug` renders `[REDACTED]`, so a secret never reaches logs through
//!   `{:?}` formatting of an enclosing struct.
//! - The buffer is zeroized on drop.
//! - `Display` is deliberately not implemented; callers must go through
//!   [`Secret::expose`].
//!
//! `Serialize` does emit the plain value: the operator has to receive the
//! credential in the package descriptor.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that must not be logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the plain value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length of the secret in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}
