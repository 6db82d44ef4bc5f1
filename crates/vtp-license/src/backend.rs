//! # Backend Seam
//!
//! The backend owns all real license state. [`LicenseBackend`] is the
//! asynchronous boundary every licensing operation crosses; `vtp-client`
//! implements it over HTTP.
//!
//! [`LocalBackend`] keeps licenses in process memory. It links revocation
//! to validation (a revoked key stops validating) and applies the
//! time-driven expiry check on lookup. An optional artificial latency
//! stands in for a network round trip in demos.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use vtp_core::{LicenseKey, TenantId, Timestamp};

use crate::error::BackendError;
use crate::license::{License, LicenseStatus, StatusError};
use crate::package::PackageMetadata;

/// Size reported by [`LocalBackend`] for the self-hosted archive (45 MiB).
pub const LOCAL_PACKAGE_SIZE_BYTES: u64 = 47_185_920;

/// The authoritative licensing backend.
#[async_trait]
pub trait LicenseBackend: Send + Sync {
    /// Persist a freshly issued license and return the stored record.
    async fn register_license(&self, license: &License) -> Result<License, BackendError>;

    /// Look up a license by key. `Ok(None)` when the key is unknown.
    async fn find_license(&self, key: &str) -> Result<Option<License>, BackendError>;

    /// Revoke a license.
    async fn revoke_license(&self, key: &LicenseKey, reason: &str) -> Result<(), BackendError>;

    /// Packaging metadata for a tenant's self-hosted distribution.
    async fn package_metadata(
        &self,
        tenant_id: &TenantId,
        version: &str,
    ) -> Result<PackageMetadata, BackendError>;
}

/// In-process backend.
#[derive(Debug, Default)]
pub struct LocalBackend {
    licenses: RwLock<HashMap<String, License>>,
    latency: Duration,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of stored licenses.
    pub fn len(&self) -> usize {
        self.licenses.read().len()
    }

    /// Whether no license is stored.
    pub fn is_empty(&self) -> bool {
        self.licenses.read().is_empty()
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl LicenseBackend for LocalBackend {
    async fn register_license(&self, license: &License) -> Result<License, BackendError> {
        self.round_trip().await;
        let mut licenses = self.licenses.write();
        if licenses.contains_key(license.key.as_str()) {
            return Err(BackendError::Rejected(format!(
                "license key {} already exists",
                license.key
            )));
        }
        licenses.insert(license.key.as_str().to_string(), license.clone());
        Ok(license.clone())
    }

    async fn find_license(&self, key: &str) -> Result<Option<License>, BackendError> {
        self.round_trip().await;
        let mut licenses = self.licenses.write();
        Ok(licenses.get_mut(key).map(|license| {
            license.refresh(Timestamp::now());
            license.clone()
        }))
    }

    async fn revoke_license(&self, key: &LicenseKey, reason: &str) -> Result<(), BackendError> {
        self.round_trip().await;
        let mut licenses = self.licenses.write();
        let license = licenses
            .get_mut(key.as_str())
            .ok_or_else(|| BackendError::Rejected(format!("unknown license key {key}")))?;
        match license.revoke(reason, Timestamp::now()) {
            Ok(()) => Ok(()),
            Err(StatusError::Terminal {
                status: LicenseStatus::Revoked,
            }) => Ok(()),
            Err(e) => Err(BackendError::Rejected(e.to_string())),
        }
    }

    async fn package_metadata(
        &self,
        _tenant_id: &TenantId,
        version: &str,
    ) -> Result<PackageMetadata, BackendError> {
        self.round_trip().await;
        Ok(PackageMetadata {
            size_bytes: LOCAL_PACKAGE_SIZE_BYTES,
            version: version.to_string(),
        })
    }
}
