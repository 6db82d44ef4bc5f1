//! End-to-end runs of the `vtp` command line against the local backend.

use std::path::Path;

use clap::Parser;
use vtp_cli::{run, Cli, EXIT_INVALID_LICENSE};

fn cli(session_file: &Path, argv: &[&str]) -> Cli {
    let mut full = vec![
        "vtp",
        "--backend",
        "local",
        "--format",
        "json",
        "--session-file",
        session_file.to_str().unwrap(),
    ];
    full.extend_from_slice(argv);
    Cli::try_parse_from(full).unwrap()
}

#[tokio::test]
async fn issue_license_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let code = run(cli(
        &dir.path().join("session.json"),
        &[
            "license",
            "issue",
            "--tenant-id",
            "acme",
            "--company",
            "Acme Corp",
            "--plan",
            "Enterprise",
            "--max-users",
            "25",
        ],
    ))
    .await
    .unwrap();
    assert_eq!(code, 0);
}

#[tokio::test]
async fn issue_license_with_zero_users_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = run(cli(
        &dir.path().join("session.json"),
        &[
            "license",
            "issue",
            "--tenant-id",
            "acme",
            "--company",
            "Acme Corp",
            "--plan",
            "Enterprise",
            "--max-users",
            "0",
        ],
    ))
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn validate_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");

    let valid = run(cli(&session, &["license", "validate", "VTP-2024-ABCD-1234-5678-90AB"]))
        .await
        .unwrap();
    assert_eq!(valid, 0);

    let invalid = run(cli(&session, &["license", "validate", "garbage"]))
        .await
        .unwrap();
    assert_eq!(invalid, EXIT_INVALID_LICENSE);
}

#[tokio::test]
async fn revoke_unknown_key_fails_on_local_backend() {
    let dir = tempfile::tempdir().unwrap();
    let result = run(cli(
        &dir.path().join("session.json"),
        &["license", "revoke", "VTP-2026-ACME-AAAA-BBBB-CCCC"],
    ))
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn package_build_writes_instructions_file() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("acme");
    let key = "VTP-2026-ACME-AAAA-BBBB-CCCC";

    let code = run(cli(
        &dir.path().join("session.json"),
        &[
            "package",
            "build",
            "--tenant-id",
            "acme",
            "--license-key",
            key,
            "--company",
            "Acme Corp",
            "--plan",
            "Enterprise",
            "--admin-email",
            "ops@acme.example",
            "--out-dir",
            out_dir.to_str().unwrap(),
        ],
    ))
    .await
    .unwrap();
    assert_eq!(code, 0);

    let instructions =
        std::fs::read_to_string(out_dir.join("acme-installation-instructions.txt")).unwrap();
    assert!(instructions.contains(key));
    assert!(instructions.contains("ops@acme.example"));
    assert!(instructions.contains("ADMIN_PASSWORD="));
}

#[tokio::test]
async fn package_build_from_centralized_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    let profile = dir.path().join("tenant.json");
    std::fs::write(
        &profile,
        r#"{"id":"acme","companyName":"Acme","planName":"Basic","contactEmail":"ops@acme.example","licenseKey":"VTP-2026-ACME-AAAA-BBBB-CCCC"}"#,
    )
    .unwrap();

    let result = run(cli(
        &dir.path().join("session.json"),
        &["package", "build", "--profile", profile.to_str().unwrap()],
    ))
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn session_show_without_login() {
    let dir = tempfile::tempdir().unwrap();
    let code = run(cli(&dir.path().join("session.json"), &["session", "show"]))
        .await
        .unwrap();
    assert_eq!(code, 0);
}
