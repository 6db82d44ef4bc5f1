//! # Operator Notifications
//!
//! Every licensing operation reports its outcome to an [`OutcomeSink`], the
//! toast-equivalent of the admin console. Failures are never swallowed:
//! the service reports them here and also returns them to the caller.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::flags::Operation;

/// Outcome of one operation, as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    Success { operation: Operation, message: String },
    Failure { operation: Operation, message: String },
}

impl Outcome {
    /// The operation this outcome belongs to.
    pub fn operation(&self) -> Operation {
        match self {
            Self::Success { operation, .. } | Self::Failure { operation, .. } => *operation,
        }
    }

    /// The operator-facing message.
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    /// Whether this is a success notification.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Receives operator notifications.
pub trait OutcomeSink: Send + Sync {
    /// Deliver one notification.
    fn report(&self, outcome: Outcome);
}

/// Sink that writes notifications to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl OutcomeSink for TracingSink {
    fn report(&self, outcome: Outcome) {
        match &outcome {
            Outcome::Success { operation, message } => {
                tracing::info!(%operation, "{message}");
            }
            Outcome::Failure { operation, message } => {
                tracing::warn!(%operation, "{message}");
            }
        }
    }
}

/// Sink that keeps notifications in memory until drained.
#[derive(Debug, Default)]
pub struct CollectingSink {
    outcomes: Mutex<Vec<Outcome>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all collected notifications, oldest first.
    pub fn drain(&self) -> Vec<Outcome> {
        std::mem::take(&mut *self.outcomes.lock())
    }
}

impl OutcomeSink for CollectingSink {
    fn report(&self, outcome: Outcome) {
        self.outcomes.lock().push(outcome);
    }
}
