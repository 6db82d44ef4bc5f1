//! # License Validator
//!
//! Two checks:
//!
//! - [`check_key`]: stateless: a key is accepted iff it starts with `VTP-`.
//!   Its `expires_at` is a placeholder of one year from the call, because
//!   the real expiry is only known to the backend.
//! - [`check_record`]: authoritative: status and expiry come from the
//!   stored license.
//!
//! [`crate::service::LicenseService::validate_license`] uses the record when
//! the backend has one and falls back to the key check otherwise.

use serde::{Deserialize, Serialize};
use vtp_core::{LicenseKey, Timestamp, LICENSE_KEY_PREFIX};

use crate::issuer::VALIDITY_YEARS;
use crate::license::{License, LicenseStatus};

/// Result of validating a license key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseValidation {
    pub valid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

/// Syntactic check of a raw key.
pub fn check_key(key: &str, now: Timestamp) -> LicenseValidation {
    if !LicenseKey::has_prefix(key) {
        return LicenseValidation {
            valid: false,
            message: format!(
                "Invalid license key: expected a key starting with {LICENSE_KEY_PREFIX}"
            ),
            expires_at: None,
        };
    }
    LicenseValidation {
        valid: true,
        message: "License key is valid".to_string(),
        expires_at: now.add_calendar_years(VALIDITY_YEARS).ok(),
    }
}

/// Check a stored license at `now`.
pub fn check_record(license: &License, now: Timestamp) -> LicenseValidation {
    let expires_at = Some(license.expiry_date);
    match license.effective_status(now) {
        LicenseStatus::Active => LicenseValidation {
            valid: true,
            message: format!(
                "License is active until {}",
                license.expiry_date.to_date_string()
            ),
            expires_at,
        },
        LicenseStatus::Expired => LicenseValidation {
            valid: false,
            message: format!(
                "License expired on {}",
                license.expiry_date.to_date_string()
            ),
            expires_at,
        },
        LicenseStatus::Revoked => LicenseValidation {
            valid: false,
            message: "License has been revoked".to_string(),
            expires_at,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use vtp_core::TenantId;

    fn now() -> Timestamp {
        Timestamp::parse("2024-05-01T12:00:00Z").unwrap()
    }

    fn stored(status: LicenseStatus) -> License {
        License {
            key: LicenseKey::parse("VTP-2024-ACME-1234-5678-90AB").unwrap(),
            tenant_id: TenantId::new("acme").unwrap(),
            company_name: "Acme".to_string(),
            plan_name: "Basic".to_string(),
            issued_date: Timestamp::parse("2024-01-01T00:00:00Z").unwrap(),
            expiry_date: Timestamp::parse("2025-01-01T00:00:00Z").unwrap(),
            max_users: 5,
            features: BTreeSet::new(),
            status,
            transitions: Vec::new(),
        }
    }

    #[test]
    fn test_prefixed_key_is_valid_with_placeholder_expiry() {
        let result = check_key("VTP-2024-ABCD-1234-5678-90AB", now());
        assert!(result.valid);
        assert_eq!(
            result.expires_at.map(|t| t.to_iso8601()),
            Some("2025-05-01T12:00:00Z".to_string())
        );
    }

    #[test]
    fn test_garbage_is_invalid_with_message() {
        let result = check_key("garbage", now());
        assert!(!result.valid);
        assert!(!result.message.is_empty());
        assert!(result.expires_at.is_none());
    }

    #[test]
    fn test_empty_key_is_invalid() {
        assert!(!check_key("", now()).valid);
    }

    #[test]
    fn test_record_active_uses_stored_expiry() {
        let result = check_record(&stored(LicenseStatus::Active), now());
        assert!(result.valid);
        assert_eq!(
            result.expires_at,
            Some(Timestamp::parse("2025-01-01T00:00:00Z").unwrap())
        );
    }

    #[test]
    fn test_record_revoked_is_invalid() {
        let result = check_record(&stored(LicenseStatus::Revoked), now());
        assert!(!result.valid);
        assert!(result.message.contains("revoked"));
    }

    #[test]
    fn test_record_past_expiry_is_invalid_even_if_marked_active() {
        let later = Timestamp::parse("2025-02-01T00:00:00Z").unwrap();
        let result = check_record(&stored(LicenseStatus::Active), later);
        assert!(!result.valid);
        assert!(result.message.contains("2025-01-01"));
    }

    #[test]
    fn test_expires_at_omitted_from_json_when_absent() {
        let json = serde_json::to_value(check_key("nope", now())).unwrap();
        assert!(json.get("expiresAt").is_none());
        assert_eq!(json["valid"], false);
    }
}
