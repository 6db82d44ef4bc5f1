//! # License Issuer
//!
//! Builds a fresh `License` for a tenant. The backend round trip that makes
//! the license authoritative lives in [`crate::service::LicenseService`];
//! this module is the pure part.

use std::collections::BTreeSet;

use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use vtp_core::{TenantId, Timestamp, ValidationError};

use crate::keygen;
use crate::license::{License, LicenseStatus};

/// Length of a license's validity window.
pub const VALIDITY_YEARS: u32 = 1;

/// Input for issuing a license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    /// Tenant to issue the license for.
    pub tenant_id: String,
    /// Display name of the tenant's company.
    pub company_name: String,
    /// Subscription plan name.
    pub plan_name: String,
    /// Maximum number of users. Must be at least 1.
    pub max_users: u32,
    /// Feature flags to enable. Blank entries are dropped.
    #[serde(default)]
    pub features: BTreeSet<String>,
}

impl IssueRequest {
    /// Check required fields and return the typed tenant identifier.
    pub fn validate(&self) -> Result<TenantId, ValidationError> {
        let tenant = TenantId::new(self.tenant_id.as_str())?;
        require("companyName", &self.company_name)?;
        require("planName", &self.plan_name)?;
        if self.max_users == 0 {
            return Err(ValidationError::Malformed {
                kind: "maxUsers",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(tenant)
    }
}

/// Issue a license at `now`: new key, one-calendar-year window, `Active`.
pub fn issue<R: Rng + CryptoRng>(
    req: &IssueRequest,
    now: Timestamp,
    rng: &mut R,
) -> Result<License, ValidationError> {
    let tenant_id = req.validate()?;
    let expiry_date = now.add_calendar_years(VALIDITY_YEARS)?;
    let key = keygen::generate_key(&tenant_id, now.year(), rng);

    Ok(License {
        key,
        tenant_id,
        company_name: req.company_name.clone(),
        plan_name: req.plan_name.clone(),
        issued_date: now,
        expiry_date,
        max_users: req.max_users,
        features: req
            .features
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect(),
        status: LicenseStatus::Active,
        transitions: Vec::new(),
    })
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}
