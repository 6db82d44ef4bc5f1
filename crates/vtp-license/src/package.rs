//! # Package Builder
//!
//! Synthesizes the installation-package descriptor handed to a self-hosted
//! tenant: download URL, packaging metadata, a freshly generated temporary
//! admin password, and setup instructions.
//!
//! ## Security Invariant
//!
//! The temporary password is generated per call from a CSPRNG and is held
//! in a [`Secret`]. It is interpolated into the instructions text (which the
//! operator hands to the tenant) and nowhere else. It is never logged.
//!
//! Nothing here persists or transmits the package.

use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use url::Url;
use vtp_core::{Secret, TenantId, ValidationError};

use crate::issuer::require;
use crate::keygen::random_base36;

/// Version tag of the self-hosted distribution.
pub const PACKAGE_VERSION: &str = "v1.0.0";

/// Default base URL for package downloads.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://downloads.visittrackingpro.com";

/// Characters in each half of a temporary password.
const PASSWORD_HALF_LEN: usize = 8;

/// Request to build an installation package. Blank fields count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRequest {
    /// Tenant the package is built for.
    pub tenant_id: String,
    /// License key embedded in the instructions.
    pub license_key: String,
    /// Display name of the tenant's company.
    pub company_name: String,
    /// Subscription plan name.
    pub plan_name: String,
    /// Email of the instance's first administrator.
    pub admin_email: String,
}

impl PackageRequest {
    /// Check that every field is present and return the typed tenant identifier.
    pub fn validate(&self) -> Result<TenantId, ValidationError> {
        let tenant = TenantId::new(self.tenant_id.as_str())?;
        require("licenseKey", &self.license_key)?;
        require("companyName", &self.company_name)?;
        require("planName", &self.plan_name)?;
        require("adminEmail", &self.admin_email)?;
        Ok(tenant)
    }
}

/// Metadata reported by the packaging backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    /// Archive size in bytes.
    pub size_bytes: u64,
    /// Distribution version tag.
    pub version: String,
}

/// Generated admin credentials for a new self-hosted instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub admin_email: String,
    pub temporary_password: Secret,
}

/// Installation-package descriptor.
///
/// `Debug` elides `instructions`, which embed the temporary password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationPackage {
    pub tenant_id: TenantId,
    pub license_key: String,
    pub package_url: String,
    pub package_size_bytes: u64,
    pub version: String,
    pub instructions: String,
    pub credentials: Credentials,
}

impl std::fmt::Debug for InstallationPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationPackage")
            .field("tenant_id", &self.tenant_id)
            .field("license_key", &self.license_key)
            .field("package_url", &self.package_url)
            .field("package_size_bytes", &self.package_size_bytes)
            .field("version", &self.version)
            .field("instructions", &format_args!("<{} bytes>", self.instructions.len()))
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl InstallationPackage {
    /// File name under which the package archive is offered for download.
    pub fn archive_file_name(&self) -> String {
        archive_name()
    }

    /// File name for the instructions document.
    pub fn instructions_file_name(&self) -> String {
        format!("{}-installation-instructions.txt", self.tenant_id)
    }
}

/// Builds [`InstallationPackage`] descriptors.
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    download_base: Url,
}

impl PackageBuilder {
    /// Builder that serves packages from `download_base`.
    pub fn new(download_base: Url) -> Self {
        Self { download_base }
    }

    /// Builder for a base URL given as text.
    pub fn from_base_str(base: &str) -> Result<Self, ValidationError> {
        Url::parse(base)
            .map(Self::new)
            .map_err(|e| ValidationError::Malformed {
                kind: "download base URL",
                value: base.to_string(),
                reason: e.to_string(),
            })
    }

    /// Builder for [`DEFAULT_DOWNLOAD_BASE`].
    pub fn with_default_base() -> Result<Self, ValidationError> {
        Self::from_base_str(DEFAULT_DOWNLOAD_BASE)
    }

    /// The configured download base.
    pub fn download_base(&self) -> &Url {
        &self.download_base
    }

    /// `<base>/packages/<tenant>/visit-tracking-pro-v1.0.0.zip`.
    pub fn package_url(&self, tenant: &TenantId) -> Result<Url, ValidationError> {
        let archive = archive_name();
        let mut url = self.download_base.clone();
        url.path_segments_mut()
            .map_err(|()| ValidationError::Malformed {
                kind: "download base URL",
                value: self.download_base.to_string(),
                reason: "cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["packages", tenant.as_str(), archive.as_str()]);
        Ok(url)
    }

    /// Build a package descriptor. The temporary password is drawn from `rng`.
    pub fn build<R: Rng + CryptoRng>(
        &self,
        req: &PackageRequest,
        metadata: PackageMetadata,
        rng: &mut R,
    ) -> Result<InstallationPackage, ValidationError> {
        let tenant_id = req.validate()?;
        let package_url = self.package_url(&tenant_id)?.to_string();
        let temporary_password = generate_temporary_password(rng);

        let instructions = render_instructions(&InstructionContext {
            tenant_id: &tenant_id,
            company_name: &req.company_name,
            plan_name: &req.plan_name,
            license_key: &req.license_key,
            admin_email: &req.admin_email,
            temporary_password: &temporary_password,
            package_url: &package_url,
            metadata: &metadata,
        });

        Ok(InstallationPackage {
            tenant_id,
            license_key: req.license_key.clone(),
            package_url,
            package_size_bytes: metadata.size_bytes,
            version: metadata.version,
            instructions,
            credentials: Credentials {
                admin_email: req.admin_email.clone(),
                temporary_password,
            },
        })
    }
}

/// Two independently drawn base-36 strings, concatenated.
pub fn generate_temporary_password<R: Rng + CryptoRng>(rng: &mut R) -> Secret {
    let mut password = random_base36(rng, PASSWORD_HALF_LEN);
    password.push_str(&random_base36(rng, PASSWORD_HALF_LEN));
    Secret::new(password)
}

/// Render a byte count as `12.3 MB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

fn archive_name() -> String {
    format!("visit-tracking-pro-{PACKAGE_VERSION}.zip")
}

struct InstructionContext<'a> {
    tenant_id: &'a TenantId,
    company_name: &'a str,
    plan_name: &'a str,
    license_key: &'a str,
    admin_email: &'a str,
    temporary_password: &'a Secret,
    package_url: &'a str,
    metadata: &'a PackageMetadata,
}

fn render_instructions(ctx: &InstructionContext<'_>) -> String {
    let archive = archive_name();
    let password = ctx.temporary_password.expose();
    format!(
        "\
Visit Tracking Pro - Self-Hosted Installation
=============================================

Company:   {company}
Plan:      {plan}
Tenant ID: {tenant}
Package:   {url}
Version:   {version} ({size})

License Key
-----------
{key}

Administrator Credentials
-------------------------
Email:              {email}
Temporary password: {password}

Change the temporary password after the first login.

Setup
-----
1. Download and extract the package:
     curl -fLO {url}
     unzip {archive} && cd visit-tracking-pro

2. Install dependencies:
     npm ci --omit=dev

3. Configure the environment. Copy .env.example to .env and set:
     LICENSE_KEY={key}
     ADMIN_EMAIL={email}
     ADMIN_PASSWORD={password}
     DATABASE_URL=postgres://<user>:<password>@<host>:5432/visit_tracking_pro

4. Run database migrations:
     npm run migrate

5. Start the server:
     npm start
",
        company = ctx.company_name,
        plan = ctx.plan_name,
        tenant = ctx.tenant_id,
        url = ctx.package_url,
        version = ctx.metadata.version,
        size = human_size(ctx.metadata.size_bytes),
        key = ctx.license_key,
        email = ctx.admin_email,
        password = password,
        archive = archive,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request() -> PackageRequest {
        PackageRequest {
            tenant_id: "acme-corp".to_string(),
            license_key: "VTP-2026-ACME-K3Z9-0QWE-7YHN".to_string(),
            company_name: "Acme Corp".to_string(),
            plan_name: "Enterprise".to_string(),
            admin_email: "it@acme.example".to_string(),
        }
    }

    fn metadata() -> PackageMetadata {
        PackageMetadata {
            size_bytes: 47_185_920,
            version: PACKAGE_VERSION.to_string(),
        }
    }

    fn builder() -> PackageBuilder {
        PackageBuilder::with_default_base().unwrap()
    }

    #[test]
    fn test_package_url_is_deterministic() {
        let tenant = TenantId::new("acme-corp").unwrap();
        let url = builder().package_url(&tenant).unwrap();
        assert_eq!(
            url.as_str(),
            "https://downloads.visittrackingpro.com/packages/acme-corp/visit-tracking-pro-v1.0.0.zip"
        );
        assert_eq!(url, builder().package_url(&tenant).unwrap());
    }

    #[test]
    fn test_package_url_encodes_tenant_as_one_segment() {
        let tenant = TenantId::new("a/b c").unwrap();
        let url = builder().package_url(&tenant).unwrap();
        assert!(url.as_str().contains("/packages/a%2Fb%20c/"), "{url}");
    }

    #[test]
    fn test_package_url_respects_base_path() {
        let pb = PackageBuilder::from_base_str("https://cdn.example.com/vtp/").unwrap();
        let tenant = TenantId::new("t1").unwrap();
        assert_eq!(
            pb.package_url(&tenant).unwrap().as_str(),
            "https://cdn.example.com/vtp/packages/t1/visit-tracking-pro-v1.0.0.zip"
        );
    }

    #[test]
    fn test_build_embeds_credentials_in_instructions() {
        let pkg = builder()
            .build(&request(), metadata(), &mut StdRng::seed_from_u64(3))
            .unwrap();
        let password = pkg.credentials.temporary_password.expose();
        assert!(pkg.instructions.contains("VTP-2026-ACME-K3Z9-0QWE-7YHN"));
        assert!(pkg.instructions.contains("it@acme.example"));
        assert!(pkg.instructions.contains(password));
        assert!(pkg.instructions.contains("npm run migrate"));
        assert!(pkg.instructions.contains("45.0 MB"));
        assert_eq!(pkg.version, PACKAGE_VERSION);
        assert_eq!(pkg.package_size_bytes, 47_185_920);
    }

    #[test]
    fn test_password_is_two_base36_halves() {
        let password = generate_temporary_password(&mut StdRng::seed_from_u64(11));
        assert_eq!(password.len(), 2 * PASSWORD_HALF_LEN);
        assert!(password
            .expose()
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_successive_builds_get_fresh_passwords() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = builder().build(&request(), metadata(), &mut rng).unwrap();
        let b = builder().build(&request(), metadata(), &mut rng).unwrap();
        assert_ne!(a.credentials.temporary_password, b.credentials.temporary_password);
        assert!(b
            .instructions
            .contains(b.credentials.temporary_password.expose()));
        assert!(!b
            .instructions
            .contains(a.credentials.temporary_password.expose()));
    }

    #[test]
    fn test_missing_admin_email_is_rejected() {
        let mut req = request();
        req.admin_email = String::new();
        assert_eq!(
            builder()
                .build(&req, metadata(), &mut StdRng::seed_from_u64(1))
                .unwrap_err(),
            ValidationError::Empty { field: "adminEmail" }
        );
    }

    #[test]
    fn test_debug_output_redacts_password() {
        let pkg = builder()
            .build(&request(), metadata(), &mut StdRng::seed_from_u64(8))
            .unwrap();
        let password = pkg.credentials.temporary_password.expose();
        assert!(!format!("{:?}", pkg.credentials).contains(password));
        assert!(!format!("{pkg:?}").contains(password));
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(47_185_920), "45.0 MB");
    }
}
