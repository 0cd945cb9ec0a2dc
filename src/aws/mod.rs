use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod sts;

pub use sts::StsRoleAssumer;

/// AWS temporary credentials structure
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"****")
            .field("session_token", &"****")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Parameters of a single AssumeRoleWithWebIdentity call
#[derive(Clone)]
pub struct WebIdentityRequest {
    /// ARN of the IAM role to assume.
    pub role_arn: String,
    /// Session name recorded in CloudTrail.
    pub role_session_name: String,
    /// Signed OIDC token presented to STS.
    pub web_identity_token: String,
    /// Requested session lifetime, passed through to STS unchanged.
    pub duration_seconds: i32,
}

impl fmt::Debug for WebIdentityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebIdentityRequest")
            .field("role_arn", &self.role_arn)
            .field("role_session_name", &self.role_session_name)
            .field("web_identity_token", &"****")
            .field("duration_seconds", &self.duration_seconds)
            .finish()
    }
}

/// Errors from the role-assumption exchange.
#[derive(Debug, Error)]
pub enum RoleAssumptionError {
    /// STS (or the transport in front of it) rejected the call.
    #[error("{message}")]
    Service {
        code: Option<String>,
        message: String,
    },

    /// STS answered without a credentials block.
    #[error("AWS STS returned no credentials")]
    MissingCredentials,

    /// The expiration instant cannot be represented.
    #[error("AWS STS returned an unrepresentable expiration: {0}")]
    InvalidExpiration(String),
}

impl RoleAssumptionError {
    /// Returns the service error code (e.g. `AccessDenied`), if STS supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            RoleAssumptionError::Service { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// A service able to exchange a web identity token for temporary credentials.
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    /// Performs exactly one exchange against the given region.
    async fn assume_role_with_web_identity(
        &self,
        region: &str,
        request: WebIdentityRequest,
    ) -> Result<TemporaryCredentials, RoleAssumptionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = TemporaryCredentials {
            access_key_id: "ASIAEXAMPLE".to_string(),
            secret_access_key: "very-secret".to_string(),
            session_token: "session-token".to_string(),
            expiration: DateTime::from_timestamp(1_735_787_045, 0).unwrap(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("ASIAEXAMPLE"));
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("session-token"));

        let request = WebIdentityRequest {
            role_arn: "arn:aws:iam::123456789012:role/Federated".to_string(),
            role_session_name: "gcp-session".to_string(),
            web_identity_token: "eyJhbGciOiJSUzI1NiJ9.payload.sig".to_string(),
            duration_seconds: 3600,
        };
        let rendered = format!("{request:?}");
        assert!(rendered.contains("gcp-session"));
        assert!(!rendered.contains("eyJhbGciOiJSUzI1NiJ9"));
    }

    #[test]
    fn test_error_code() {
        let err = RoleAssumptionError::Service {
            code: Some("AccessDenied".to_string()),
            message: "access denied".to_string(),
        };
        assert_eq!(err.code(), Some("AccessDenied"));
        assert_eq!(err.to_string(), "access denied");
        assert_eq!(RoleAssumptionError::MissingCredentials.code(), None);
    }
}
