//! # In-Flight Operation Flags
//!
//! Each long-running operation exposes a busy flag the presentation layer
//! can poll: `idle → in_progress → idle`. A flag is held by an RAII guard
//! ([`InFlight`]) whose `Drop` clears it, so no exit path (early `?`
//! return, error, panic) can leave a control stuck busy.
//!
//! Flags count concurrent invocations; a flag reads busy while at least one
//! invocation of that operation is running.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// A licensing operation that carries a busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// License issuance ("generating").
    Issue,
    /// Key validation ("validating").
    Validate,
    /// Installation-package build ("downloading").
    Package,
    /// License revocation.
    Revoke,
    /// Hand-off to the host download mechanism.
    Download,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Issue => "issue",
            Self::Validate => "validate",
            Self::Package => "package",
            Self::Revoke => "revoke",
            Self::Download => "download",
        };
        f.write_str(s)
    }
}

/// Busy counters for every [`Operation`].
#[derive(Debug, Default)]
pub struct OperationFlags {
    issue: AtomicUsize,
    validate: AtomicUsize,
    package: AtomicUsize,
    revoke: AtomicUsize,
    download: AtomicUsize,
}

/// Point-in-time view of all flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagSnapshot {
    pub issuing: bool,
    pub validating: bool,
    pub packaging: bool,
    pub revoking: bool,
    pub downloading: bool,
}

impl FlagSnapshot {
    /// Whether any operation is in flight.
    pub fn any(&self) -> bool {
        self.issuing || self.validating || self.packaging || self.revoking || self.downloading
    }
}

impl OperationFlags {
    /// Create a fresh set of idle flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `op` as in progress until the returned guard is dropped.
    pub fn begin(&self, op: Operation) -> InFlight<'_> {
        let counter = self.counter(op);
        counter.fetch_add(1, Ordering::AcqRel);
        InFlight { counter }
    }

    /// Whether `op` is currently in progress.
    pub fn is_in_progress(&self, op: Operation) -> bool {
        self.counter(op).load(Ordering::Acquire) > 0
    }

    /// Snapshot of every flag.
    pub fn snapshot(&self) -> FlagSnapshot {
        FlagSnapshot {
            issuing: self.is_in_progress(Operation::Issue),
            validating: self.is_in_progress(Operation::Validate),
            packaging: self.is_in_progress(Operation::Package),
            revoking: self.is_in_progress(Operation::Revoke),
            downloading: self.is_in_progress(Operation::Download),
        }
    }

    fn counter(&self, op: Operation) -> &AtomicUsize {
        match op {
            Operation::Issue => &self.issue,
            Operation::Validate => &self.validate,
            Operation::Package => &self.package,
            Operation::Revoke => &self.revoke,
            Operation::Download => &self.download,
        }
    }
}

/// Guard returned by [`OperationFlags::begin`].
#[must_use = "the flag is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_start_idle() {
        let flags = OperationFlags::new();
        assert!(!flags.snapshot().any());
    }

    #[test]
    fn test_guard_sets_and_clears_flag() {
        let flags = OperationFlags::new();
        {
            let _guard = flags.begin(Operation::Package);
            assert!(flags.is_in_progress(Operation::Package));
            assert!(flags.snapshot().packaging);
            assert!(!flags.snapshot().issuing);
        }
        assert!(!flags.is_in_progress(Operation::Package));
    }

    #[test]
    fn test_flag_cleared_on_error_path() {
        fn failing(flags: &OperationFlags) -> Result<(), &'static str> {
            let _guard = flags.begin(Operation::Issue);
            Err::<(), _>("backend down")?;
            Ok(())
        }
        let flags = OperationFlags::new();
        assert!(failing(&flags).is_err());
        assert!(!flags.is_in_progress(Operation::Issue));
    }

    #[test]
    fn test_overlapping_invocations_keep_flag_busy() {
        let flags = OperationFlags::new();
        let first = flags.begin(Operation::Validate);
        let second = flags.begin(Operation::Validate);
        drop(first);
        assert!(flags.is_in_progress(Operation::Validate));
        drop(second);
        assert!(!flags.is_in_progress(Operation::Validate));
    }

    #[test]
    fn test_flag_cleared_after_panic() {
        let flags = OperationFlags::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = flags.begin(Operation::Revoke);
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(!flags.is_in_progress(Operation::Revoke));
    }
}
