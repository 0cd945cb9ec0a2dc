//! Exchange a GCP-signed OIDC identity token for temporary AWS credentials
//! and render them for the AWS CLI `credential_process` protocol.
//!
//! The library side never terminates the process: every failure surfaces as
//! an [`ExchangeError`] naming the stage that failed.

pub mod aws;
pub mod cli;
pub mod constants;
pub mod error;
pub mod exchange;
pub mod gcp;
pub mod output;

pub use aws::{RoleAssumer, RoleAssumptionError, StsRoleAssumer, TemporaryCredentials, WebIdentityRequest};
pub use error::{ExchangeError, Result};
pub use exchange::{Exchange, ExchangeRequest};
pub use gcp::{CredentialOrigin, GoogleIdentityIssuer, GoogleTokenSource, IdentityError, IdentityIssuer, IdentityToken, TokenSource};
pub use output::ProcessCredentialsResponse;
