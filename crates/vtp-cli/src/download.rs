//! # Download Subcommand
//!
//! The console's download mechanism: `curl` saves the file into a target
//! directory. Filenames are bare names; anything that would escape the
//! target directory is refused.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use vtp_license::{DownloadError, DownloadHost};

use crate::context::Console;
use crate::output::emit;

/// Arguments for `vtp download`.
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// URL to fetch.
    #[arg(long)]
    pub url: String,

    /// Name to save the file under.
    #[arg(long)]
    pub filename: String,

    /// Directory to save into.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

/// [`DownloadHost`] that runs `curl -fsSL -o <dir>/<filename> <url>`.
#[derive(Debug, Clone)]
pub struct CommandDownloadHost {
    dir: PathBuf,
    program: String,
}

impl CommandDownloadHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            program: "curl".to_string(),
        }
    }

    /// Use `program` instead of `curl`. It receives curl's arguments.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Where `filename` would be written.
    pub fn target(&self, filename: &str) -> Result<PathBuf, DownloadError> {
        let name = Path::new(filename);
        let is_bare = name.components().count() == 1
            && name.file_name().map(|n| n == name.as_os_str()).unwrap_or(false);
        if !is_bare {
            return Err(DownloadError::Failed {
                url: String::new(),
                message: format!("{filename:?} is not a plain file name"),
            });
        }
        Ok(self.dir.join(name))
    }
}

impl DownloadHost for CommandDownloadHost {
    fn trigger_download(&self, url: &str, filename: &str) -> Result<(), DownloadError> {
        let target = self.target(filename).map_err(|e| match e {
            DownloadError::Failed { message, .. } => DownloadError::Failed {
                url: url.to_string(),
                message,
            },
            other => other,
        })?;
        let failed = |message: String| DownloadError::Failed {
            url: url.to_string(),
            message,
        };

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| failed(format!("cannot create {}: {e}", self.dir.display())))?;

        tracing::debug!(program = %self.program, target = %target.display(), "starting download");
        let status = Command::new(&self.program)
            .arg("-fsSL")
            .arg("-o")
            .arg(&target)
            .arg(url)
            .status()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => DownloadError::Unsupported,
                _ => failed(format!("cannot run {}: {e}", self.program)),
            })?;

        if !status.success() {
            return Err(failed(format!("{} exited with {status}", self.program)));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DownloadReport {
    url: String,
    saved_to: PathBuf,
}

/// Execute `vtp download`.
pub fn run_download(args: &DownloadArgs, console: &Console) -> Result<u8> {
    let service = console.service(&args.out_dir)?;
    service.trigger_download(&args.url, &args.filename)?;

    let report = DownloadReport {
        url: args.url.clone(),
        saved_to: args.out_dir.join(&args.filename),
    };
    emit(console.format, &report, |r| {
        format!("Saved {} to {}", r.url, r.saved_to.display())
    })?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_joins_bare_names() {
        let host = CommandDownloadHost::new("/tmp/out");
        assert_eq!(
            host.target("pkg.zip").unwrap(),
            PathBuf::from("/tmp/out/pkg.zip")
        );
    }

    #[test]
    fn target_refuses_paths() {
        let host = CommandDownloadHost::new("/tmp/out");
        for bad in ["../pkg.zip", "a/b.zip", "/etc/passwd", ".."] {
            assert!(host.target(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn missing_program_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let host = CommandDownloadHost::new(dir.path()).with_program("vtp-no-such-downloader");
        assert!(matches!(
            host.trigger_download("https://example.com/a.zip", "a.zip"),
            Err(DownloadError::Unsupported)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let host = CommandDownloadHost::new(dir.path()).with_program("false");
        assert!(matches!(
            host.trigger_download("https://example.com/a.zip", "a.zip"),
            Err(DownloadError::Failed { .. })
        ));
    }
}
