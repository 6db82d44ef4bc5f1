//! # License Lifecycle
//!
//! ```text
//! Active ──▶ Expired   (time-driven; terminal)
//!    │
//!    └────▶ Revoked   (operator action; terminal)
//! ```
//!
//! Expiry is driven by an external clock check ([`License::refresh`]);
//! revocation by an explicit operator call. Neither terminal state can be
//! left.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vtp_core::{LicenseKey, TenantId, Timestamp};

// ─── License Status ──────────────────────────────────────────────────

/// The lifecycle status of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// License is valid for use.
    Active,
    /// Validity window has elapsed (terminal).
    Expired,
    /// License was withdrawn by an operator (terminal).
    Revoked,
}

impl LicenseStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::Revoked)
    }
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Rejected status transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The license is already in a terminal status.
    #[error("license is already {status}")]
    Terminal {
        /// The terminal status.
        status: LicenseStatus,
    },

    /// The license has not reached its expiry date.
    #[error("license does not expire until {expiry_date}")]
    NotYetExpired {
        /// Stored expiry date.
        expiry_date: Timestamp,
    },
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    /// Status before the transition.
    pub from: LicenseStatus,
    /// Status after the transition.
    pub to: LicenseStatus,
    /// When the transition occurred.
    pub timestamp: Timestamp,
    /// Why it happened.
    pub reason: String,
}

// ─── License ─────────────────────────────────────────────────────────

/// A license issued to a tenant.
///
/// At issuance `expiry_date` is exactly one calendar year after
/// `issued_date` and `status` is `Active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// The license key.
    pub key: LicenseKey,
    /// Tenant the license belongs to.
    pub tenant_id: TenantId,
    /// Display name of the tenant's company.
    pub company_name: String,
    /// Subscription plan the license was issued under.
    pub plan_name: String,
    /// Issue instant.
    pub issued_date: Timestamp,
    /// Expiry instant.
    pub expiry_date: Timestamp,
    /// Maximum number of users the instance may register.
    pub max_users: u32,
    /// Enabled feature flags.
    pub features: BTreeSet<String>,
    /// Current status.
    pub status: LicenseStatus,
    /// Ordered log of status transitions.
    #[serde(default)]
    pub transitions: Vec<StatusTransition>,
}

impl License {
    /// Whether the validity window has elapsed at `now`.
    pub fn is_past_expiry(&self, now: Timestamp) -> bool {
        now >= self.expiry_date
    }

    /// The status an up-to-date clock check would report at `now`.
    pub fn effective_status(&self, now: Timestamp) -> LicenseStatus {
        match self.status {
            LicenseStatus::Active if self.is_past_expiry(now) => LicenseStatus::Expired,
            status => status,
        }
    }

    /// Revoke the license (ACTIVE → REVOKED).
    pub fn revoke(&mut self, reason: &str, at: Timestamp) -> Result<(), StatusError> {
        self.require_active()?;
        self.transition(LicenseStatus::Revoked, reason, at);
        Ok(())
    }

    /// Expire the license (ACTIVE → EXPIRED). Only allowed once the expiry date is reached.
    pub fn expire(&mut self, at: Timestamp) -> Result<(), StatusError> {
        self.require_active()?;
        if !self.is_past_expiry(at) {
            return Err(StatusError::NotYetExpired {
                expiry_date: self.expiry_date,
            });
        }
        self.transition(LicenseStatus::Expired, "validity period ended", at);
        Ok(())
    }

    /// Apply the time-driven expiry check. Returns `true` if the status changed.
    pub fn refresh(&mut self, now: Timestamp) -> bool {
        self.status == LicenseStatus::Active && self.expire(now).is_ok()
    }

    fn require_active(&self) -> Result<(), StatusError> {
        if self.status.is_terminal() {
            return Err(StatusError::Terminal {
                status: self.status,
            });
        }
        Ok(())
    }

    fn transition(&mut self, to: LicenseStatus, reason: &str, at: Timestamp) {
        self.transitions.push(StatusTransition {
            from: self.status,
            to,
            timestamp: at,
            reason: reason.to_string(),
        });
        self.status = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
