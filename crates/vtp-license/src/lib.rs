//! # vtp-license: License Keys, Licenses and Installation Packages
//!
//! The client-side licensing flow of the Visit Tracking Pro admin console.
//!
//! ## Components
//!
//! - **Key Generator** (`keygen.rs`): `VTP-<year>-<code>-XXXX-XXXX-XXXX`
//!   keys from a tenant identifier and a CSPRNG.
//! - **License Issuer** (`issuer.rs`): builds an active `License` valid for
//!   one calendar year.
//! - **License Validator** (`validator.rs`): prefix check for raw keys and
//!   authoritative checks against a stored record.
//! - **Package Builder** (`package.rs`): installation-package descriptor
//!   with a fresh temporary admin password and rendered setup instructions.
//! - **License lifecycle** (`license.rs`): `active → expired | revoked`.
//!
//! ## Seams
//!
//! - [`LicenseBackend`]: the authoritative REST backend. `LocalBackend`
//!   is an in-process implementation; `vtp-client` provides the HTTP one.
//! - [`OutcomeSink`]: where operator notifications go.
//! - [`DownloadHost`]: the host environment's file-download mechanism.
//!
//! [`LicenseService`] ties these together and tracks in-flight flags.

pub mod backend;
pub mod download;
pub mod error;
pub mod flags;
pub mod issuer;
pub mod keygen;
pub mod license;
pub mod outcome;
pub mod package;
pub mod service;
pub mod tenant;
pub mod validator;

pub use backend::{LicenseBackend, LocalBackend};
pub use download::{DownloadError, DownloadHost};
pub use error::{BackendError, LicenseError};
pub use flags::{FlagSnapshot, Operation, OperationFlags};
pub use issuer::IssueRequest;
pub use license::{License, LicenseStatus, StatusError, StatusTransition};
pub use outcome::{CollectingSink, Outcome, OutcomeSink, TracingSink};
pub use package::{
    Credentials, InstallationPackage, PackageBuilder, PackageMetadata, PackageRequest,
    PACKAGE_VERSION,
};
pub use service::{LicenseService, LicenseServiceBuilder};
pub use tenant::{DeploymentType, TenantProfile};
pub use validator::LicenseValidation;
