//! # vtp-cli: Operator Console for Visit Tracking Pro Licensing
//!
//! Provides the `vtp` command-line interface over `vtp-license` and
//! `vtp-client`.
//!
//! ## Subcommands
//!
//! - `vtp license`: Issue, validate and revoke licenses.
//! - `vtp package`: Build a self-hosted installation package.
//! - `vtp session`: Store or clear the backend access token.
//! - `vtp download`: Fetch a file through the host download mechanism.
//!
//! ```bash
//! vtp session login --token "$TOKEN"
//! vtp license issue --tenant-id acme --company "Acme Corp" --plan Enterprise --max-users 50
//! vtp package build --tenant-id acme --license-key VTP-2026-ACME-... \
//!     --company "Acme Corp" --plan Enterprise --admin-email ops@acme.example --out-dir ./acme
//! ```
//!
//! Results go to stdout in the selected `--format`; operator notifications
//! and logs go to stderr.

pub mod context;
pub mod download;
pub mod license;
pub mod output;
pub mod package;
pub mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::context::{Console, GlobalOpts};
use crate::download::{run_download, DownloadArgs};
use crate::license::{run_license, LicenseArgs};
use crate::package::{run_package, PackageArgs};
use crate::session::{run_session, SessionArgs};

/// Exit code for a license key that failed validation.
pub const EXIT_INVALID_LICENSE: u8 = 2;

/// Visit Tracking Pro licensing console
///
/// Issues and validates license keys, revokes licenses, and builds
/// installation packages for self-hosted tenants.
#[derive(Parser, Debug)]
#[command(name = "vtp", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issue, validate and revoke licenses.
    License(LicenseArgs),

    /// Build installation packages for self-hosted tenants.
    Package(PackageArgs),

    /// Manage the console session (access token).
    Session(SessionArgs),

    /// Download a file through the host download mechanism.
    Download(DownloadArgs),
}

/// Dispatch a parsed command line. Returns the process exit code.
pub async fn run(cli: Cli) -> Result<u8> {
    let console = Console::from_opts(&cli.global)?;
    match cli.command {
        Commands::License(args) => run_license(&args, &console).await,
        Commands::Package(args) => run_package(&args, &console).await,
        Commands::Session(args) => run_session(&args, &console),
        Commands::Download(args) => run_download(&args, &console),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
