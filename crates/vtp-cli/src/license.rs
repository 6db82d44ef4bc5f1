//! # License Subcommand
//!
//! - `issue`: Issue a one-year license for a tenant.
//! - `validate`: Check a key; exits with [`EXIT_INVALID_LICENSE`] when invalid.
//! - `revoke`: Revoke a license.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use vtp_license::{IssueRequest, License, LicenseValidation};

use crate::context::Console;
use crate::output::emit;
use crate::EXIT_INVALID_LICENSE;

/// Arguments for the `vtp license` subcommand.
#[derive(Args, Debug)]
pub struct LicenseArgs {
    #[command(subcommand)]
    pub command: LicenseCommand,
}

/// License subcommands.
#[derive(Subcommand, Debug)]
pub enum LicenseCommand {
    /// Issue a license valid for one calendar year.
    Issue {
        /// Tenant identifier.
        #[arg(long)]
        tenant_id: String,
        /// Company display name.
        #[arg(long)]
        company: String,
        /// Subscription plan name.
        #[arg(long)]
        plan: String,
        /// Maximum number of users.
        #[arg(long)]
        max_users: u32,
        /// Enabled feature flag. Repeatable.
        #[arg(long = "feature")]
        features: Vec<String>,
    },

    /// Validate a license key.
    Validate {
        /// The license key.
        key: String,
    },

    /// Revoke a license (ACTIVE → REVOKED).
    Revoke {
        /// The license key.
        key: String,
        /// Reason recorded with the revocation.
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokeReport<'a> {
    key: &'a str,
    status: &'static str,
}

/// Execute the license subcommand.
pub async fn run_license(args: &LicenseArgs, console: &Console) -> Result<u8> {
    let service = console.service(Path::new("."))?;

    match &args.command {
        LicenseCommand::Issue {
            tenant_id,
            company,
            plan,
            max_users,
            features,
        } => {
            let req = IssueRequest {
                tenant_id: tenant_id.clone(),
                company_name: company.clone(),
                plan_name: plan.clone(),
                max_users: *max_users,
                features: features.iter().cloned().collect::<BTreeSet<_>>(),
            };
            let license = service.issue_license(req).await?;
            emit(console.format, &license, describe_license)?;
            Ok(0)
        }

        LicenseCommand::Validate { key } => {
            let validation = service.validate_license(key).await?;
            emit(console.format, &validation, describe_validation)?;
            Ok(if validation.valid { 0 } else { EXIT_INVALID_LICENSE })
        }

        LicenseCommand::Revoke { key, reason } => {
            service.revoke_license(key, reason.as_deref()).await?;
            let report = RevokeReport {
                key,
                status: "revoked",
            };
            emit(console.format, &report, |r| format!("{} revoked", r.key))?;
            Ok(0)
        }
    }
}

fn describe_license(license: &License) -> String {
    let features = if license.features.is_empty() {
        "-".to_string()
    } else {
        license.features.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    format!(
        "License key: {}\n\
         Tenant:      {} ({})\n\
         Plan:        {} (max {} users)\n\
         Features:    {}\n\
         Issued:      {}\n\
         Expires:     {}\n\
         Status:      {}",
        license.key,
        license.company_name,
        license.tenant_id,
        license.plan_name,
        license.max_users,
        features,
        license.issued_date.to_date_string(),
        license.expiry_date.to_date_string(),
        license.status,
    )
}

fn describe_validation(validation: &LicenseValidation) -> String {
    let verdict = if validation.valid { "VALID" } else { "INVALID" };
    match &validation.expires_at {
        Some(expires) => format!(
            "{verdict}: {} (expires {})",
            validation.message,
            expires.to_date_string()
        ),
        None => format!("{verdict}: {}", validation.message),
    }
}
