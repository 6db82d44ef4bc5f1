//! # Session Subcommand
//!
//! - `login`: Store the backend access token.
//! - `logout`: Clear the session.
//! - `show`: Report whether a token is stored. The token itself is never printed.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use vtp_client::{SessionStore, ACCESS_TOKEN_KEY};

use crate::context::Console;
use crate::output::emit;

/// Arguments for the `vtp session` subcommand.
#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands.
#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Store an access token for the licensing backend.
    Login {
        /// Bearer token issued by the backend.
        #[arg(long, env = "VTP_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Remove the stored session.
    Logout,

    /// Show session status.
    Show,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionStatus {
    session_file: String,
    authenticated: bool,
}

/// Execute the session subcommand.
pub fn run_session(args: &SessionArgs, console: &Console) -> Result<u8> {
    let store: &dyn SessionStore = console.session.as_ref();
    match &args.command {
        SessionCommand::Login { token } => {
            if token.trim().is_empty() {
                bail!("access token must not be empty");
            }
            store
                .write(ACCESS_TOKEN_KEY, token.trim())
                .context("failed to store access token")?;
            tracing::info!(session = %console.session_path.display(), "access token stored");
            eprintln!("Logged in.");
            Ok(0)
        }

        SessionCommand::Logout => {
            store.clear().context("failed to clear session")?;
            eprintln!("Logged out.");
            Ok(0)
        }

        SessionCommand::Show => {
            let status = SessionStatus {
                session_file: console.session_path.display().to_string(),
                authenticated: store.access_token()?.is_some(),
            };
            emit(console.format, &status, |s| {
                let state = if s.authenticated {
                    "logged in"
                } else {
                    "not logged in"
                };
                format!("{state} (session file: {})", s.session_file)
            })?;
            Ok(0)
        }
    }
}
