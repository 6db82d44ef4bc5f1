//! # Key Generator
//!
//! Derives `VTP-<year>-<companyCode>-<seg1>-<seg2>-<seg3>` license keys.
//! Each segment is four characters drawn uniformly from the base-36
//! alphabet and upper-cased. The random source must be a CSPRNG
//! (`rand::rngs::OsRng` in production); keys gate access to self-hosted
//! instances.

use rand::{CryptoRng, Rng};
use sha2::{Digest, Sha256};
use vtp_core::identity::SEGMENT_LEN;
use vtp_core::{LicenseKey, TenantId, Timestamp};

/// Lower-case base-36 alphabet: digits then letters.
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Hex characters of the SHA-256 digest kept in a key fingerprint.
const FINGERPRINT_LEN: usize = 12;

/// Draw `len` characters from the base-36 alphabet.
pub fn random_base36<R: Rng + CryptoRng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Generate a license key for `tenant` issued in `year`.
pub fn generate_key<R: Rng + CryptoRng>(tenant: &TenantId, year: i32, rng: &mut R) -> LicenseKey {
    let segments = [
        random_base36(rng, SEGMENT_LEN),
        random_base36(rng, SEGMENT_LEN),
        random_base36(rng, SEGMENT_LEN),
    ];
    LicenseKey::assemble(year, &tenant.company_code(), &segments)
}

/// Generate a key for the current UTC year using the OS random source.
pub fn generate_key_now(tenant: &TenantId) -> LicenseKey {
    generate_key(tenant, Timestamp::now().year(), &mut rand::rngs::OsRng)
}

/// Short, non-reversible identifier for a key, safe to put in logs.
///
/// Accepts raw text so that keys which fail to parse can still be logged.
pub fn fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    digest
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<String>()
        .chars()
        .take(FINGERPRINT_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn is_segment(s: &str) -> bool {
        s.len() == 4 && s.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    }

    #[test]
    fn test_key_has_expected_shape() {
        let tenant = TenantId::new("acme01").unwrap();
        let key = generate_key(&tenant, 2026, &mut StdRng::seed_from_u64(7));
        let parts: Vec<&str> = key.as_str().split('-').collect();
        assert_eq!(parts.len(), 6);
        assert_eq!(parts[0], "VTP");
        assert_eq!(parts[1], "2026");
        assert_eq!(parts[2], "ACME");
        assert!(parts[3..].iter().all(|s| is_segment(s)), "{key}");
        assert!(LicenseKey::parse(key.as_str()).is_ok());
    }

    #[test]
    fn test_short_tenant_uses_whole_identifier() {
        let tenant = TenantId::new("ab").unwrap();
        let key = generate_key(&tenant, 2026, &mut StdRng::seed_from_u64(1));
        assert!(key.as_str().starts_with("VTP-2026-AB-"));
        assert_eq!(key.company_code(), Some("AB"));
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let tenant = TenantId::new("tenant-9").unwrap();
        let a = generate_key(&tenant, 2026, &mut StdRng::seed_from_u64(42));
        let b = generate_key(&tenant, 2026, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeated_keys_share_prefix_and_differ() {
        let tenant = TenantId::new("globex").unwrap();
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let key = generate_key_now(&tenant);
            let year = Timestamp::now().year();
            assert!(key.as_str().starts_with(&format!("VTP-{year}-GLOB-")));
            seen.insert(key);
        }
        // 36^12 possible suffixes; a repeat among 500 draws would indicate a broken source.
        assert_eq!(seen.len(), 500);
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let key = "VTP-2024-ABCD-1234-5678-90AB";
        let fp = fingerprint(key);
        assert_eq!(fp.len(), FINGERPRINT_LEN);
        assert_eq!(fp, fingerprint(key));
        assert_ne!(fp, fingerprint("VTP-2024-ABCD-1234-5678-90AC"));
        assert!(!fp.contains("ABCD"));
    }

    proptest! {
        #[test]
        fn prop_key_format_for_alphanumeric_tenants(
            tenant in "[a-zA-Z0-9]{1,24}",
            year in 2000i32..2100,
            seed in any::<u64>(),
        ) {
            let id = TenantId::new(tenant.clone()).unwrap();
            let key = generate_key(&id, year, &mut StdRng::seed_from_u64(seed));
            let expected_code: String = tenant.chars().take(4).collect::<String>().to_uppercase();

            prop_assert_eq!(key.year(), Some(year));
            prop_assert_eq!(key.company_code(), Some(expected_code.as_str()));
            let segments = key.segments().unwrap();
            prop_assert!(segments.iter().all(|s| is_segment(s)));
            prop_assert!(LicenseKey::parse(key.as_str()).is_ok());
        }

        #[test]
        fn prop_generated_keys_parse_for_any_tenant(
            tenant in "\\PC{1,24}",
            seed in any::<u64>(),
        ) {
            prop_assume!(!tenant.trim().is_empty());
            let id = TenantId::new(tenant).unwrap();
            let key = generate_key(&id, 2026, &mut StdRng::seed_from_u64(seed));
            let parsed = LicenseKey::parse(key.as_str());
            prop_assert!(parsed.is_ok(), "{} did not parse", key);
            let expected_code = id.company_code();
            prop_assert_eq!(key.company_code(), Some(expected_code.as_str()));
        }
    }
}
