//! # Tenant Profile
//!
//! The invocation context the presentation layer passes in: the tenant
//! fields shown on the tenant detail screen.

use serde::{Deserialize, Serialize};
use vtp_core::ValidationError;

use crate::package::PackageRequest;

/// Where a tenant's instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentType {
    /// Vendor's shared infrastructure.
    #[default]
    Centralized,
    /// Tenant's own servers.
    SelfHosted,
}

/// Tenant identity fields from the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantProfile {
    pub id: String,
    pub company_name: String,
    pub plan_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub license_key: Option<String>,
    #[serde(default)]
    pub deployment_type: DeploymentType,
}

impl TenantProfile {
    /// Package request for this tenant; the contact email becomes the admin login.
    ///
    /// Only self-hosted tenants with an issued license key qualify.
    pub fn package_request(&self) -> Result<PackageRequest, ValidationError> {
        if self.deployment_type != DeploymentType::SelfHosted {
            return Err(ValidationError::Malformed {
                kind: "deploymentType",
                value: "centralized".to_string(),
                reason: "installation packages are only available for self-hosted tenants"
                    .to_string(),
            });
        }
        let license_key = self
            .license_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ValidationError::Empty { field: "licenseKey" })?;

        Ok(PackageRequest {
            tenant_id: self.id.clone(),
            license_key,
            company_name: self.company_name.clone(),
            plan_name: self.plan_name.clone(),
            admin_email: self.contact_email.clone(),
        })
    }
}
