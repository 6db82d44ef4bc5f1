//! # License Service
//!
//! The surface the presentation layer calls. Every operation follows the
//! same shape:
//!
//! 1. raise the operation's in-flight flag (cleared by guard drop),
//! 2. validate input before any side effect,
//! 3. cross the backend seam,
//! 4. report the outcome to the [`OutcomeSink`] and return it.
//!
//! License keys appear in logs only as fingerprints. The temporary admin
//! password never does.

use std::sync::Arc;

use rand::rngs::OsRng;
use vtp_core::{LicenseKey, Timestamp, ValidationError};

use crate::backend::LicenseBackend;
use crate::download::{DownloadHost, NoDownloads};
use crate::error::LicenseError;
use crate::flags::{Operation, OperationFlags};
use crate::issuer::{self, require, IssueRequest};
use crate::keygen::fingerprint;
use crate::license::{License, LicenseStatus, StatusError};
use crate::outcome::{Outcome, OutcomeSink, TracingSink};
use crate::package::{
    human_size, InstallationPackage, PackageBuilder, PackageRequest, PACKAGE_VERSION,
};
use crate::tenant::TenantProfile;
use crate::validator::{self, LicenseValidation};

/// Revocation reason recorded when the caller gives none.
pub const DEFAULT_REVOKE_REASON: &str = "revoked by operator";

/// Licensing operations for the admin console.
pub struct LicenseService {
    backend: Arc<dyn LicenseBackend>,
    packages: PackageBuilder,
    sink: Arc<dyn OutcomeSink>,
    downloads: Arc<dyn DownloadHost>,
    flags: Arc<OperationFlags>,
}

impl std::fmt::Debug for LicenseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseService")
            .field("download_base", &self.packages.download_base().as_str())
            .field("flags", &self.flags.snapshot())
            .finish_non_exhaustive()
    }
}

impl LicenseService {
    /// Start building a service over `backend`.
    pub fn builder(backend: Arc<dyn LicenseBackend>) -> LicenseServiceBuilder {
        LicenseServiceBuilder {
            backend,
            packages: None,
            sink: None,
            downloads: None,
        }
    }

    /// In-flight flags, shared with whoever renders busy state.
    pub fn flags(&self) -> &Arc<OperationFlags> {
        &self.flags
    }

    /// The package builder in use.
    pub fn package_builder(&self) -> &PackageBuilder {
        &self.packages
    }

    // ─── Issue ───────────────────────────────────────────────────────

    /// Issue a license valid for one calendar year and register it with the backend.
    pub async fn issue_license(&self, req: IssueRequest) -> Result<License, LicenseError> {
        let _guard = self.flags.begin(Operation::Issue);
        let result = self.issue_inner(&req).await;
        self.finish(Operation::Issue, result, |license| {
            format!(
                "License issued to {} ({} plan), valid until {}",
                license.company_name,
                license.plan_name,
                license.expiry_date.to_date_string()
            )
        })
    }

    async fn issue_inner(&self, req: &IssueRequest) -> Result<License, LicenseError> {
        let draft = issuer::issue(req, Timestamp::now(), &mut OsRng)?;
        let key_fingerprint = fingerprint(draft.key.as_str());
        tracing::debug!(
            tenant_id = %draft.tenant_id,
            key_fingerprint = %key_fingerprint,
            "registering license with backend"
        );

        let stored = self.backend.register_license(&draft).await?;
        tracing::info!(
            tenant_id = %stored.tenant_id,
            key_fingerprint = %key_fingerprint,
            expiry = %stored.expiry_date,
            max_users = stored.max_users,
            "license issued"
        );
        Ok(stored)
    }

    // ─── Validate ────────────────────────────────────────────────────

    /// Validate a license key.
    ///
    /// Keys without the `VTP-` prefix are rejected without a backend call.
    /// Otherwise a stored record decides; unknown keys fall back to the
    /// prefix rule with a placeholder expiry.
    pub async fn validate_license(&self, key: &str) -> Result<LicenseValidation, LicenseError> {
        let _guard = self.flags.begin(Operation::Validate);
        let result = self.validate_inner(key).await;

        if let Ok(validation) = &result {
            let outcome = if validation.valid {
                Outcome::Success {
                    operation: Operation::Validate,
                    message: validation.message.clone(),
                }
            } else {
                Outcome::Failure {
                    operation: Operation::Validate,
                    message: validation.message.clone(),
                }
            };
            self.sink.report(outcome);
            return result;
        }
        self.finish(Operation::Validate, result, |_| String::new())
    }

    async fn validate_inner(&self, key: &str) -> Result<LicenseValidation, LicenseError> {
        let now = Timestamp::now();
        let key_fingerprint = fingerprint(key);

        if !LicenseKey::has_prefix(key) {
            tracing::warn!(key_fingerprint = %key_fingerprint, "license key rejected by prefix check");
            return Ok(validator::check_key(key, now));
        }

        tracing::debug!(key_fingerprint = %key_fingerprint, "looking up license");
        let validation = match self.backend.find_license(key).await? {
            Some(license) => validator::check_record(&license, now),
            None => {
                tracing::debug!(key_fingerprint = %key_fingerprint, "no stored license, using prefix rule");
                validator::check_key(key, now)
            }
        };
        tracing::info!(
            key_fingerprint = %key_fingerprint,
            valid = validation.valid,
            "license validated"
        );
        Ok(validation)
    }

    // ─── Package ─────────────────────────────────────────────────────

    /// Build the installation package for a self-hosted tenant.
    ///
    /// Each call draws a new temporary admin password.
    pub async fn build_installation_package(
        &self,
        req: PackageRequest,
    ) -> Result<InstallationPackage, LicenseError> {
        let _guard = self.flags.begin(Operation::Package);
        let result = self.package_inner(&req).await;
        self.finish(Operation::Package, result, |pkg| {
            format!(
                "Installation package ready for {} ({}, {})",
                pkg.tenant_id,
                pkg.version,
                human_size(pkg.package_size_bytes)
            )
        })
    }

    /// Build the installation package from a tenant's console profile.
    pub async fn build_package_for_tenant(
        &self,
        profile: &TenantProfile,
    ) -> Result<InstallationPackage, LicenseError> {
        match profile.package_request() {
            Ok(req) => self.build_installation_package(req).await,
            Err(e) => {
                let _guard = self.flags.begin(Operation::Package);
                self.finish(Operation::Package, Err(e.into()), |_| String::new())
            }
        }
    }

    async fn package_inner(&self, req: &PackageRequest) -> Result<InstallationPackage, LicenseError> {
        let tenant_id = req.validate()?;
        tracing::debug!(tenant_id = %tenant_id, version = PACKAGE_VERSION, "fetching package metadata");

        let metadata = self
            .backend
            .package_metadata(&tenant_id, PACKAGE_VERSION)
            .await
            .map_err(LicenseError::PackageGeneration)?;

        let pkg = self.packages.build(req, metadata, &mut OsRng)?;
        tracing::info!(
            tenant_id = %pkg.tenant_id,
            key_fingerprint = %fingerprint(&pkg.license_key),
            package_url = %pkg.package_url,
            size_bytes = pkg.package_size_bytes,
            "installation package built"
        );
        Ok(pkg)
    }

    // ─── Revoke ──────────────────────────────────────────────────────

    /// Revoke a license. Subsequent validations of the key report it invalid.
    ///
    /// A license whose stored record has already expired cannot be revoked
    /// and yields [`LicenseError::Status`].
    pub async fn revoke_license(&self, key: &str, reason: Option<&str>) -> Result<(), LicenseError> {
        let _guard = self.flags.begin(Operation::Revoke);
        let result = self.revoke_inner(key, reason.unwrap_or(DEFAULT_REVOKE_REASON)).await;
        self.finish(Operation::Revoke, result, |_| "License revoked".to_string())
    }

    async fn revoke_inner(&self, key: &str, reason: &str) -> Result<(), LicenseError> {
        let key = LicenseKey::parse(key)?;
        require("reason", reason)?;
        let key_fingerprint = fingerprint(key.as_str());

        tracing::debug!(key_fingerprint = %key_fingerprint, "revoking license");
        if let Some(record) = self.backend.find_license(key.as_str()).await? {
            let status = record.effective_status(Timestamp::now());
            if status == LicenseStatus::Expired {
                return Err(StatusError::Terminal { status }.into());
            }
        }
        self.backend.revoke_license(&key, reason).await?;
        tracing::info!(key_fingerprint = %key_fingerprint, reason, "license revoked");
        Ok(())
    }

    // ─── Download ────────────────────────────────────────────────────

    /// Hand `url` to the host's download mechanism, saving as `filename`.
    pub fn trigger_download(&self, url: &str, filename: &str) -> Result<(), LicenseError> {
        let _guard = self.flags.begin(Operation::Download);
        let result = Self::download_inner(self.downloads.as_ref(), url, filename);
        self.finish(Operation::Download, result, |_| format!("Downloading {filename}"))
    }

    /// Download the archive a package descriptor points to.
    pub fn download_package(&self, pkg: &InstallationPackage) -> Result<(), LicenseError> {
        self.trigger_download(&pkg.package_url, &pkg.archive_file_name())
    }

    fn download_inner(
        host: &dyn DownloadHost,
        url: &str,
        filename: &str,
    ) -> Result<(), LicenseError> {
        require("url", url)?;
        require("filename", filename)?;
        host.trigger_download(url, filename)?;
        tracing::info!(url, filename, "download started");
        Ok(())
    }

    // ─── Reporting ───────────────────────────────────────────────────

    fn finish<T>(
        &self,
        operation: Operation,
        result: Result<T, LicenseError>,
        describe: impl FnOnce(&T) -> String,
    ) -> Result<T, LicenseError> {
        let outcome = match &result {
            Ok(value) => Outcome::Success {
                operation,
                message: describe(value),
            },
            Err(e) => {
                tracing::warn!(%operation, error = %e, "operation failed");
                Outcome::Failure {
                    operation,
                    message: e.operator_message(),
                }
            }
        };
        self.sink.report(outcome);
        result
    }
}

/// Builder for [`LicenseService`].
pub struct LicenseServiceBuilder {
    backend: Arc<dyn LicenseBackend>,
    packages: Option<PackageBuilder>,
    sink: Option<Arc<dyn OutcomeSink>>,
    downloads: Option<Arc<dyn DownloadHost>>,
}

impl LicenseServiceBuilder {
    /// Use `packages` instead of the default download base.
    pub fn package_builder(mut self, packages: PackageBuilder) -> Self {
        self.packages = Some(packages);
        self
    }

    /// Send operator notifications to `sink` (default: tracing).
    pub fn sink(mut self, sink: Arc<dyn OutcomeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Delegate downloads to `host` (default: none available).
    pub fn download_host(mut self, host: Arc<dyn DownloadHost>) -> Self {
        self.downloads = Some(host);
        self
    }

    /// Finish the service, falling back to the default download base when no
    /// package builder was given.
    pub fn build(self) -> Result<LicenseService, ValidationError> {
        let packages = match self.packages {
            Some(p) => p,
            None => PackageBuilder::with_default_base()?,
        };
        Ok(LicenseService {
            backend: self.backend,
            packages,
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingSink)),
            downloads: self.downloads.unwrap_or_else(|| Arc::new(NoDownloads)),
            flags: Arc::new(OperationFlags::new()),
        })
    }
}
