use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::{
    Client as StsClient,
    config::{Config as StsConfig, retry::RetryConfig},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::assume_role_with_web_identity::AssumeRoleWithWebIdentityError,
};
use aws_smithy_types::DateTime;
use chrono::Utc;
use tracing::{debug, info};

use super::{RoleAssumer, RoleAssumptionError, TemporaryCredentials, WebIdentityRequest};

/// Role assumer backed by AWS STS.
///
/// The client is built without a credentials provider: AssumeRoleWithWebIdentity
/// is an unsigned call authenticated by the web identity token alone.
#[derive(Debug, Clone, Default)]
pub struct StsRoleAssumer {
    endpoint_url: Option<String>,
}

impl StsRoleAssumer {
    /// Creates an assumer that talks to the regional AWS STS endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an assumer that talks to an STS-compatible endpoint.
    pub fn with_endpoint(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(endpoint_url.into()),
        }
    }

    fn client(&self, region: &str) -> StsClient {
        let mut builder = StsConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .retry_config(RetryConfig::disabled());

        if let Some(endpoint_url) = &self.endpoint_url {
            debug!("STS endpoint override: {}", endpoint_url);
            builder = builder.endpoint_url(endpoint_url);
        }

        StsClient::from_conf(builder.build())
    }
}

#[async_trait]
impl RoleAssumer for StsRoleAssumer {
    async fn assume_role_with_web_identity(
        &self,
        region: &str,
        request: WebIdentityRequest,
    ) -> Result<TemporaryCredentials, RoleAssumptionError> {
        info!("Calling AWS STS AssumeRoleWithWebIdentity");
        debug!("Region: {}", region);
        debug!("Role ARN: {}", request.role_arn);
        debug!("Session name: {}", request.role_session_name);
        debug!("Duration: {} seconds", request.duration_seconds);

        let client = self.client(region);

        let response = client
            .assume_role_with_web_identity()
            .role_arn(request.role_arn)
            .role_session_name(request.role_session_name)
            .web_identity_token(request.web_identity_token)
            .duration_seconds(request.duration_seconds)
            .send()
            .await
            .map_err(service_error)?;

        if let Some(user) = response.assumed_role_user() {
            info!("Assumed role: {}", user.arn());
        }

        let sts_creds = response
            .credentials()
            .ok_or(RoleAssumptionError::MissingCredentials)?;

        let credentials = TemporaryCredentials {
            access_key_id: sts_creds.access_key_id().to_string(),
            secret_access_key: sts_creds.secret_access_key().to_string(),
            session_token: sts_creds.session_token().to_string(),
            expiration: to_utc(sts_creds.expiration())?,
        };

        info!("Successfully obtained AWS credentials");
        Ok(credentials)
    }
}

fn service_error<R: std::fmt::Debug>(
    err: SdkError<AssumeRoleWithWebIdentityError, R>,
) -> RoleAssumptionError {
    let code = err
        .as_service_error()
        .and_then(|e| e.code())
        .map(str::to_string);

    RoleAssumptionError::Service {
        code,
        message: DisplayErrorContext(&err).to_string(),
    }
}

fn to_utc(expiration: &DateTime) -> Result<chrono::DateTime<Utc>, RoleAssumptionError> {
    chrono::DateTime::from_timestamp(expiration.secs(), expiration.subsec_nanos())
        .ok_or_else(|| RoleAssumptionError::InvalidExpiration(format!("{expiration:?}")))
}
