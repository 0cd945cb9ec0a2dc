//! GCP identity token acquisition.
//!
//! A [`GoogleIdentityIssuer`] resolves credential material (an explicit
//! credential file, or Application Default Credentials) into a
//! [`GoogleTokenSource`] that mints audience-bound OIDC identity tokens.

use std::{fmt, path::Path, path::PathBuf};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use google_cloud_auth::build_errors::Error as BuildError;
use google_cloud_auth::credentials::idtoken::{self, IDTokenCredentials};
use google_cloud_auth::errors::CredentialsError;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub mod credentials;

use self::credentials::{CredentialFile, CredentialKind};

/// Errors raised while building a token source or minting a token.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("failed to read credential file {}: {source}", path.display())]
    ReadCredentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse credential file {}: {source}", path.display())]
    ParseCredentials {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "unsupported credential type '{0}': identity tokens need service_account or impersonated_service_account credentials"
    )]
    UnsupportedCredentialType(String),

    #[error("failed to load GCP credentials: {0}")]
    Credentials(#[from] BuildError),

    #[error("failed to mint identity token: {0}")]
    Mint(#[from] CredentialsError),

    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

/// A signed OIDC identity token bound to an audience.
///
/// The `Debug` implementation redacts the token.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken {
    token: String,
    audience: String,
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityToken")
            .field("token", &"****")
            .field("audience", &self.audience)
            .finish()
    }
}

/// Unverified claims of an identity token, used for diagnostics only.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub iss: Option<String>,
    pub sub: Option<String>,
    pub email: Option<String>,
    pub exp: Option<i64>,
}

impl IdentityToken {
    /// Wraps a raw token. Empty (or whitespace-only) tokens are rejected.
    pub fn new(token: impl Into<String>, audience: impl Into<String>) -> Result<Self, IdentityError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(IdentityError::InvalidResponse(
                "identity token is empty".to_string(),
            ));
        }
        Ok(Self {
            token,
            audience: audience.into(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Consumes the token, handing the raw string to the next stage.
    pub fn into_string(self) -> String {
        self.token
    }

    /// Decodes the payload segment without verifying the signature.
    pub fn claims(&self) -> Option<TokenClaims> {
        let payload = self.token.split('.').nth(1)?;
        let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&decoded).ok()
    }
}

/// Something that can mint a fresh identity token on demand.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<IdentityToken, IdentityError>;
}

/// Resolves credential material into a [`TokenSource`] for an audience.
#[async_trait]
pub trait IdentityIssuer: Send + Sync {
    type Source: TokenSource;

    /// Builds a token source from `credential_file` when given, otherwise
    /// from Application Default Credentials.
    async fn token_source(
        &self,
        audience: &str,
        credential_file: Option<&Path>,
    ) -> Result<Self::Source, IdentityError>;
}

/// Where a [`GoogleTokenSource`] got its credentials from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    /// Application Default Credentials: `GOOGLE_APPLICATION_CREDENTIALS`,
    /// the gcloud well-known file, then the metadata server.
    Ambient,
    ServiceAccount,
    ImpersonatedServiceAccount,
}

/// Mints identity tokens for one audience from Google credentials.
#[derive(Debug, Clone)]
pub struct GoogleTokenSource {
    credentials: IDTokenCredentials,
    audience: String,
    origin: CredentialOrigin,
}

impl GoogleTokenSource {
    pub fn origin(&self) -> CredentialOrigin {
        self.origin
    }
}

#[async_trait]
impl TokenSource for GoogleTokenSource {
    async fn token(&self) -> Result<IdentityToken, IdentityError> {
        let token = self.credentials.id_token().await?;
        IdentityToken::new(token, &self.audience)
    }
}

/// Identity issuer backed by Google credentials.
#[derive(Debug, Clone, Default)]
pub struct GoogleIdentityIssuer;

impl GoogleIdentityIssuer {
    pub fn new() -> Self {
        Self
    }

    fn from_file(&self, path: &Path, audience: &str) -> Result<GoogleTokenSource, IdentityError> {
        let file = CredentialFile::load(path)?;
        if let Some(principal) = file.principal() {
            info!("Using {} from {}", principal, path.display());
        }

        let (credentials, origin) = match file.kind {
            CredentialKind::ServiceAccount => (
                idtoken::service_account::Builder::new(audience, file.json).build()?,
                CredentialOrigin::ServiceAccount,
            ),
            CredentialKind::ImpersonatedServiceAccount => (
                idtoken::impersonated::Builder::new(audience, file.json)
                    .with_include_email()
                    .build()?,
                CredentialOrigin::ImpersonatedServiceAccount,
            ),
            CredentialKind::Other(kind) => return Err(IdentityError::UnsupportedCredentialType(kind)),
        };

        Ok(GoogleTokenSource {
            credentials,
            audience: audience.to_string(),
            origin,
        })
    }

    fn from_environment(&self, audience: &str) -> Result<GoogleTokenSource, IdentityError> {
        debug!("Using Application Default Credentials");
        let credentials = idtoken::Builder::new(audience).with_include_email().build()?;

        Ok(GoogleTokenSource {
            credentials,
            audience: audience.to_string(),
            origin: CredentialOrigin::Ambient,
        })
    }
}

#[async_trait]
impl IdentityIssuer for GoogleIdentityIssuer {
    type Source = GoogleTokenSource;

    async fn token_source(
        &self,
        audience: &str,
        credential_file: Option<&Path>,
    ) -> Result<GoogleTokenSource, IdentityError> {
        debug!("Identity token audience: {}", audience);
        match credential_file {
            Some(path) => self.from_file(path, audience),
            None => self.from_environment(audience),
        }
    }
}
