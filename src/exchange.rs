//! The credential exchange pipeline: `AcquireToken -> AssumeRole -> Emit`.
//!
//! Every stage either hands its output to the next by value or aborts the
//! run with an [`ExchangeError`]. There is no retry edge.

use std::path::PathBuf;

use tracing::{debug, info};
use uuid::Uuid;

use crate::aws::{RoleAssumer, TemporaryCredentials, WebIdentityRequest};
use crate::constants::{DEFAULT_AUDIENCE, DEFAULT_SESSION_DURATION_SECONDS, SESSION_NAME_PREFIX};
use crate::error::{ExchangeError, Result};
use crate::gcp::{IdentityIssuer, TokenSource};
use crate::output;

/// Parameters of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    /// Audience of the GCP identity token.
    pub audience: String,
    /// Google credential file; Application Default Credentials are used when absent.
    pub credential_file: Option<PathBuf>,
    /// ARN of the IAM role to assume.
    pub role_arn: String,
    /// Role session name sent to STS.
    pub role_session_name: String,
    /// Region the STS client is scoped to.
    pub region: String,
    /// Requested session lifetime in seconds.
    pub duration_seconds: i32,
}

impl ExchangeRequest {
    /// Creates a request with default audience, duration and a freshly generated session name.
    pub fn new(role_arn: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            audience: DEFAULT_AUDIENCE.to_string(),
            credential_file: None,
            role_arn: role_arn.into(),
            role_session_name: generate_session_name(),
            region: region.into(),
            duration_seconds: DEFAULT_SESSION_DURATION_SECONDS,
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    pub fn with_credential_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_file = Some(path.into());
        self
    }

    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.role_session_name = session_name.into();
        self
    }

    pub fn with_duration_seconds(mut self, duration_seconds: i32) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }

    /// Checks required parameters. Duration bounds are left to STS.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("role ARN", &self.role_arn),
            ("AWS region", &self.region),
            ("role session name", &self.role_session_name),
            ("audience", &self.audience),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ExchangeError::Configuration(format!(
                "{name} must not be empty"
            ))),
            None => Ok(()),
        }
    }
}

/// Generates a unique role session name (`gcp-<uuid>`).
pub fn generate_session_name() -> String {
    format!("{SESSION_NAME_PREFIX}-{}", Uuid::new_v4())
}

/// Straight-line composition of an identity issuer and a role assumer.
#[derive(Debug, Clone)]
pub struct Exchange<I, R> {
    issuer: I,
    assumer: R,
}

impl<I, R> Exchange<I, R>
where
    I: IdentityIssuer,
    R: RoleAssumer,
{
    pub fn new(issuer: I, assumer: R) -> Self {
        Self { issuer, assumer }
    }

    /// Runs the exchange and returns the temporary credentials.
    pub async fn run(&self, request: &ExchangeRequest) -> Result<TemporaryCredentials> {
        request.validate()?;

        info!("Acquiring GCP identity token");
        let source = self
            .issuer
            .token_source(&request.audience, request.credential_file.as_deref())
            .await?;
        let token = source.token().await?;

        if let Some(claims) = token.claims() {
            debug!(
                "Identity token issuer: {:?}, subject: {:?}, email: {:?}, expires: {:?}",
                claims.iss, claims.sub, claims.email, claims.exp
            );
        }

        info!("Assuming role {}", request.role_arn);
        let credentials = self
            .assumer
            .assume_role_with_web_identity(
                &request.region,
                WebIdentityRequest {
                    role_arn: request.role_arn.clone(),
                    role_session_name: request.role_session_name.clone(),
                    web_identity_token: token.into_string(),
                    duration_seconds: request.duration_seconds,
                },
            )
            .await?;

        debug!("Credentials expire at {}", credentials.expiration);
        Ok(credentials)
    }

    /// Runs the exchange and renders the credential_process document.
    pub async fn run_to_json(&self, request: &ExchangeRequest) -> Result<String> {
        let credentials = self.run(request).await?;
        output::render(&credentials)
    }
}
