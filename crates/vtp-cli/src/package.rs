//! # Package Subcommand
//!
//! `vtp package build` synthesizes the installation package for a
//! self-hosted tenant, either from flags or from a tenant profile file
//! (`--profile tenant.json`).
//!
//! With `--out-dir` the setup instructions are written to
//! `<out-dir>/<tenant>-installation-instructions.txt`; without it they are
//! printed. `--download` additionally fetches the archive into the same
//! directory.
//!
//! The instructions embed the temporary admin password. They go to the
//! operator's terminal or file and nowhere else.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use vtp_license::package::human_size;
use vtp_license::{InstallationPackage, PackageRequest, TenantProfile};

use crate::context::Console;
use crate::output::emit;

/// Arguments for the `vtp package` subcommand.
#[derive(Args, Debug)]
pub struct PackageArgs {
    #[command(subcommand)]
    pub command: PackageCommand,
}

/// Package subcommands.
#[derive(Subcommand, Debug)]
pub enum PackageCommand {
    /// Build an installation package.
    Build(BuildArgs),
}

/// Arguments for `vtp package build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Tenant profile (JSON) to build from, instead of the individual flags.
    #[arg(long, conflicts_with_all = ["tenant_id", "license_key", "company", "plan", "admin_email"])]
    pub profile: Option<PathBuf>,

    /// Tenant identifier.
    #[arg(long, required_unless_present = "profile")]
    pub tenant_id: Option<String>,

    /// License key issued to the tenant.
    #[arg(long, required_unless_present = "profile")]
    pub license_key: Option<String>,

    /// Company display name.
    #[arg(long, required_unless_present = "profile")]
    pub company: Option<String>,

    /// Subscription plan name.
    #[arg(long, required_unless_present = "profile")]
    pub plan: Option<String>,

    /// Email of the instance's first administrator.
    #[arg(long, required_unless_present = "profile")]
    pub admin_email: Option<String>,

    /// Directory to write the instructions (and archive) into.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Also download the package archive.
    #[arg(long)]
    pub download: bool,
}

impl BuildArgs {
    fn request(&self) -> PackageRequest {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        PackageRequest {
            tenant_id: field(&self.tenant_id),
            license_key: field(&self.license_key),
            company_name: field(&self.company),
            plan_name: field(&self.plan),
            admin_email: field(&self.admin_email),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildReport<'a> {
    #[serde(flatten)]
    package: &'a InstallationPackage,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    archive_path: Option<PathBuf>,
}

/// Execute the package subcommand.
pub async fn run_package(args: &PackageArgs, console: &Console) -> Result<u8> {
    match &args.command {
        PackageCommand::Build(build) => cmd_build(build, console).await,
    }
}

async fn cmd_build(args: &BuildArgs, console: &Console) -> Result<u8> {
    let out_dir = args.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let service = console.service(&out_dir)?;

    let pkg = match &args.profile {
        Some(path) => {
            let profile = read_profile(path)?;
            service.build_package_for_tenant(&profile).await?
        }
        None => service.build_installation_package(args.request()).await?,
    };

    let instructions_path = match &args.out_dir {
        Some(dir) => Some(write_instructions(dir, &pkg)?),
        None => None,
    };

    let archive_path = if args.download {
        service.download_package(&pkg)?;
        Some(out_dir.join(pkg.archive_file_name()))
    } else {
        None
    };

    let report = BuildReport {
        package: &pkg,
        instructions_path,
        archive_path,
    };
    emit(console.format, &report, describe_build)?;
    Ok(0)
}

fn read_profile(path: &Path) -> Result<TenantProfile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read tenant profile {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse tenant profile {}", path.display()))
}

fn write_instructions(dir: &Path, pkg: &InstallationPackage) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(pkg.instructions_file_name());
    fs::write(&path, &pkg.instructions)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "instructions written");
    Ok(path)
}

fn describe_build(report: &BuildReport<'_>) -> String {
    let pkg = report.package;
    let mut out = format!(
        "Installation package for {}\n\
         Package URL:  {}\n\
         Version:      {} ({})\n\
         Admin email:  {}\n\
         Temporary password: {}",
        pkg.tenant_id,
        pkg.package_url,
        pkg.version,
        human_size(pkg.package_size_bytes),
        pkg.credentials.admin_email,
        pkg.credentials.temporary_password.expose(),
    );
    match &report.instructions_path {
        Some(path) => out.push_str(&format!("\nInstructions: {}", path.display())),
        None => {
            out.push_str("\n\n");
            out.push_str(&pkg.instructions);
        }
    }
    if let Some(path) = &report.archive_path {
        out.push_str(&format!("\nArchive:      {}", path.display()));
    }
    out
}
