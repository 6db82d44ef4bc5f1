//! # Identity Newtypes
//!
//! `TenantId` names a customer organization; `LicenseKey` is the formatted
//! credential issued to a tenant for running a self-hosted instance.
//!
//! ## License Key Format
//!
//! ```text
//! VTP-<year>-<companyCode>-<seg1>-<seg2>-<seg3>
//!      2026   ACME          K3Z9   0QWE   7YHN
//! ```
//!
//! `companyCode` is the first four characters of the tenant identifier,
//! upper-cased (fewer if the identifier is shorter). The three trailing
//! segments are four upper-case alphanumeric characters each.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Prefix shared by every Visit Tracking Pro license key.
pub const LICENSE_KEY_PREFIX: &str = "VTP-";

/// Number of characters of the tenant identifier that form the company code.
pub const COMPANY_CODE_LEN: usize = 4;

/// Number of characters in each random key segment.
pub const SEGMENT_LEN: usize = 4;

/// Identifier of a tenant (customer organization).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant identifier, rejecting blank input.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "tenantId" });
        }
        Ok(Self(id))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The company code embedded in license keys for this tenant.
    ///
    /// First `min(4, len)` characters, upper-cased.
    pub fn company_code(&self) -> String {
        self.0
            .chars()
            .take(COMPANY_CODE_LEN)
            .collect::<String>()
            .to_uppercase()
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A formatted license key. Immutable once issued.
///
/// Deserialization does not re-validate the format: keys coming back from
/// the backend are taken as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Assemble a key from its parts.
    ///
    /// Segments are upper-cased; the company code is taken as given.
    pub fn assemble(year: i32, company_code: &str, segments: &[String; 3]) -> Self {
        Self(format!(
            "{LICENSE_KEY_PREFIX}{year:04}-{company_code}-{}-{}-{}",
            segments[0].to_uppercase(),
            segments[1].to_uppercase(),
            segments[2].to_uppercase(),
        ))
    }

    /// Parse a key, enforcing the full `VTP-YYYY-CODE-XXXX-XXXX-XXXX` format.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let malformed = |reason: &str| ValidationError::Malformed {
            kind: "license key",
            value: s.to_string(),
            reason: reason.to_string(),
        };

        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "licenseKey" });
        }
        let (year, company, segments) =
            split_parts(s).ok_or_else(|| malformed("expected VTP-YYYY-CODE-XXXX-XXXX-XXXX"))?;

        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed("year must be four digits"));
        }
        if company.is_empty() {
            return Err(malformed("company code is empty"));
        }
        if company != company.to_uppercase() {
            return Err(malformed("company code must be upper-case"));
        }
        for segment in segments {
            let well_formed = segment.len() == SEGMENT_LEN
                && segment
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase());
            if !well_formed {
                return Err(malformed(
                    "segments must be four upper-case alphanumeric characters",
                ));
            }
        }
        Ok(Self(s.to_string()))
    }

    /// Whether `s` carries the license key prefix.
    pub fn has_prefix(s: &str) -> bool {
        s.starts_with(LICENSE_KEY_PREFIX)
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The issue year encoded in the key, if the key is well formed.
    pub fn year(&self) -> Option<i32> {
        split_parts(&self.0).and_then(|(year, _, _)| year.parse().ok())
    }

    /// The company code encoded in the key, if the key is well formed.
    pub fn company_code(&self) -> Option<&str> {
        split_parts(&self.0).map(|(_, company, _)| company)
    }

    /// The three random segments, if the key is well formed.
    pub fn segments(&self) -> Option<[&str; 3]> {
        split_parts(&self.0).map(|(_, _, segments)| segments)
    }
}

impl std::fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LicenseKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split a key into (year, company code, segments).
///
/// The company code may itself contain `-` when the tenant identifier does,
/// so segments are peeled from the right.
fn split_parts(s: &str) -> Option<(&str, &str, [&str; 3])> {
    let rest = s.strip_prefix(LICENSE_KEY_PREFIX)?;
    let (year, rest) = rest.split_once('-')?;
    let mut tail = rest.rsplitn(4, '-');
    let seg3 = tail.next()?;
    let seg2 = tail.next()?;
    let seg1 = tail.next()?;
    let company = tail.next()?;
    Some((year, company, [seg1, seg2, seg3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_rejects_blank() {
        assert_eq!(
            TenantId::new("   ").unwrap_err(),
            ValidationError::Empty { field: "tenantId" }
        );
        assert!(TenantId::new("").is_err());
    }

    #[test]
    fn test_company_code_takes_first_four_uppercased() {
        let tenant = TenantId::new("acme-logistics").unwrap();
        assert_eq!(tenant.company_code(), "ACME");
    }

    #[test]
    fn test_company_code_short_identifier_uses_all_characters() {
        let tenant = TenantId::new("xy").unwrap();
        assert_eq!(tenant.company_code(), "XY");
    }

    #[test]
    fn test_assemble_and_accessors() {
        let segments = ["k3z9".to_string(), "0qwe".to_string(), "7YHN".to_string()];
        let key = LicenseKey::assemble(2026, "ACME", &segments);
        assert_eq!(key.as_str(), "VTP-2026-ACME-K3Z9-0QWE-7YHN");
        assert_eq!(key.year(), Some(2026));
        assert_eq!(key.company_code(), Some("ACME"));
        assert_eq!(key.segments(), Some(["K3Z9", "0QWE", "7YHN"]));
    }

    #[test]
    fn test_parse_accepts_well_formed_key() {
        let key = LicenseKey::parse("VTP-2024-ABCD-1234-5678-90AB").unwrap();
        assert_eq!(key.year(), Some(2024));
        assert_eq!(key.company_code(), Some("ABCD"));
    }

    #[test]
    fn test_parse_accepts_company_code_with_dash() {
        let key = LicenseKey::parse("VTP-2024-AB-C-1234-5678-90AB").unwrap();
        assert_eq!(key.company_code(), Some("AB-C"));
    }

    #[test]
    fn test_parse_accepts_every_generated_company_code() {
        // `ª` has no upper-case mapping but is still a lower-case letter.
        for tenant in ["ªcme-corp", "straße", "éclair", "東京-branch"] {
            let code = TenantId::new(tenant).unwrap().company_code();
            let segments = ["AB12".to_string(), "CD34".to_string(), "EF56".to_string()];
            let key = LicenseKey::assemble(2026, &code, &segments);
            let parsed = LicenseKey::parse(key.as_str()).unwrap();
            assert_eq!(parsed.company_code(), Some(code.as_str()));
        }
    }

    #[test]
    fn test_parse_rejects_lower_case_company_code() {
        assert!(LicenseKey::parse("VTP-2026-Acme-AB12-CD34-EF56").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in [
            "garbage",
            "VTP-",
            "VTP-24-ABCD-1234-5678-90AB",
            "VTP-2024-ABCD-1234-5678",
            "VTP-2024-ABCD-12345-5678-90AB",
            "VTP-2024-ABCD-1234-5678-90ab",
            "VTP-2024-abcd-1234-5678-90AB",
            "XYZ-2024-ABCD-1234-5678-90AB",
        ] {
            assert!(LicenseKey::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_parse_empty_is_empty_error() {
        assert_eq!(
            LicenseKey::parse("").unwrap_err(),
            ValidationError::Empty { field: "licenseKey" }
        );
    }

    #[test]
    fn test_has_prefix() {
        assert!(LicenseKey::has_prefix("VTP-anything"));
        assert!(!LicenseKey::has_prefix("vtp-2024"));
        assert!(!LicenseKey::has_prefix(""));
    }

    #[test]
    fn test_serde_is_transparent() {
        let key = LicenseKey::parse("VTP-2024-ABCD-1234-5678-90AB").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"VTP-2024-ABCD-1234-5678-90AB\"");
        let tenant: TenantId = serde_json::from_str("\"t-1\"").unwrap();
        assert_eq!(tenant.as_str(), "t-1");
    }
}
