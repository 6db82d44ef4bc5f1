//! # Console Context
//!
//! Global flags and everything derived from them: configuration, the
//! session store, and a ready-to-use [`LicenseService`].
//!
//! Every setting can come from a flag or its environment variable; flags
//! win. Unset settings fall back to the [`ConsoleConfig`] defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, ValueEnum};
use vtp_client::{ConsoleConfig, FileSessionStore, HttpBackend, SessionStore};
use vtp_license::{LicenseBackend, LicenseService, LocalBackend, PackageBuilder};

use crate::download::CommandDownloadHost;
use crate::output::{OutputFormat, StderrSink};

/// Which [`LicenseBackend`] the console talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// In-process backend; state lasts for one invocation.
    Local,
    /// The licensing REST backend at `--api-url`.
    Http,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Licensing backend to use.
    #[arg(long, value_enum, default_value_t = BackendKind::Http, global = true, env = "VTP_BACKEND")]
    pub backend: BackendKind,

    /// Base URL of the licensing backend.
    #[arg(long, global = true, env = "VTP_API_URL")]
    pub api_url: Option<String>,

    /// Base URL installation packages are served from.
    #[arg(long, global = true, env = "VTP_DOWNLOAD_BASE_URL")]
    pub download_base_url: Option<String>,

    /// HTTP request timeout in seconds.
    #[arg(long, global = true, env = "VTP_TIMEOUT_SECS")]
    pub timeout_secs: Option<String>,

    /// Session file holding the access token.
    #[arg(long, global = true, env = "VTP_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Artificial delay per call of the local backend, in milliseconds.
    #[arg(long, default_value_t = 0, global = true)]
    pub simulate_latency_ms: u64,
}

/// Resolved console state for one invocation.
pub struct Console {
    pub config: ConsoleConfig,
    pub session: Arc<dyn SessionStore>,
    pub session_path: PathBuf,
    pub format: OutputFormat,
    backend: BackendKind,
    latency: Duration,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("config", &self.config)
            .field("session_path", &self.session_path)
            .field("format", &self.format)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Resolve configuration and open the session store.
    pub fn from_opts(opts: &GlobalOpts) -> Result<Self> {
        let config = ConsoleConfig::from_lookup(|var| {
            let flag = match var {
                "VTP_API_URL" => opts.api_url.clone(),
                "VTP_DOWNLOAD_BASE_URL" => opts.download_base_url.clone(),
                "VTP_TIMEOUT_SECS" => opts.timeout_secs.clone(),
                _ => None,
            };
            flag.or_else(|| std::env::var(var).ok())
        })
        .context("invalid console configuration")?;

        let session_path = opts
            .session_file
            .clone()
            .unwrap_or_else(default_session_path);
        let store = FileSessionStore::new(&session_path);
        store
            .init()
            .with_context(|| format!("cannot open session file {}", session_path.display()))?;

        tracing::debug!(
            api_url = %config.api_url,
            backend = ?opts.backend,
            session = %session_path.display(),
            "console configured"
        );

        Ok(Self {
            config,
            session: Arc::new(store),
            session_path,
            format: opts.format,
            backend: opts.backend,
            latency: Duration::from_millis(opts.simulate_latency_ms),
        })
    }

    /// Build the licensing service. Downloads are saved under `download_dir`.
    pub fn service(&self, download_dir: &Path) -> Result<LicenseService> {
        let backend: Arc<dyn LicenseBackend> = match self.backend {
            BackendKind::Local => Arc::new(LocalBackend::new().with_latency(self.latency)),
            BackendKind::Http => Arc::new(
                HttpBackend::new(&self.config, self.session.clone())
                    .context("failed to create HTTP client")?,
            ),
        };
        LicenseService::builder(backend)
            .package_builder(PackageBuilder::new(self.config.download_base_url.clone()))
            .sink(Arc::new(StderrSink))
            .download_host(Arc::new(CommandDownloadHost::new(download_dir)))
            .build()
            .context("failed to build license service")
    }
}

/// `$HOME/.vtp/session.json`, or `.vtp-session.json` without a home directory.
pub fn default_session_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".vtp").join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".vtp-session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn flags_override_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("s.json");
        let cli = Cli::try_parse_from([
            "vtp",
            "--api-url",
            "https://licensing.example",
            "--timeout-secs",
            "9",
            "--session-file",
            session.to_str().unwrap(),
            "session",
            "show",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Session(_)));

        let console = Console::from_opts(&cli.global).unwrap();
        assert_eq!(console.config.api_url.as_str(), "https://licensing.example/");
        assert_eq!(console.config.timeout_secs, 9);
        assert_eq!(console.session_path, session);
    }

    #[test]
    fn bad_timeout_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("s.json");
        let cli = Cli::try_parse_from([
            "vtp",
            "--timeout-secs",
            "never",
            "--session-file",
            session.to_str().unwrap(),
            "session",
            "show",
        ])
        .unwrap();
        assert!(Console::from_opts(&cli.global).is_err());
    }

    #[test]
    fn local_backend_service_builds() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("s.json");
        let cli = Cli::try_parse_from([
            "vtp",
            "--backend",
            "local",
            "--session-file",
            session.to_str().unwrap(),
            "session",
            "show",
        ])
        .unwrap();
        let console = Console::from_opts(&cli.global).unwrap();
        let service = console.service(dir.path()).unwrap();
        assert!(!service.flags().snapshot().any());
    }
}
