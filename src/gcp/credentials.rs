use std::{fs, path::Path};

use serde::Deserialize;
use serde_json::Value;

use super::IdentityError;

/// Credential types that can mint identity tokens from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialKind {
    ServiceAccount,
    ImpersonatedServiceAccount,
    /// Any other credential type (`authorized_user`, `external_account`, ...).
    Other(String),
}

impl CredentialKind {
    fn from_type(kind: Option<&str>) -> Self {
        match kind {
            Some("service_account") => Self::ServiceAccount,
            Some("impersonated_service_account") => Self::ImpersonatedServiceAccount,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other("<missing>".to_string()),
        }
    }
}

/// A Google JSON credential file, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialFile {
    pub kind: CredentialKind,
    pub json: Value,
}

#[derive(Deserialize)]
struct CredentialType {
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl CredentialFile {
    pub fn load(path: &Path) -> Result<Self, IdentityError> {
        let contents = fs::read_to_string(path).map_err(|source| IdentityError::ReadCredentials {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&contents).map_err(|source| IdentityError::ParseCredentials {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let json: Value = serde_json::from_str(contents)?;
        let CredentialType { kind } = CredentialType::deserialize(&json)?;

        Ok(Self {
            kind: CredentialKind::from_type(kind.as_deref()),
            json,
        })
    }

    /// The principal a token will be minted for, when the file names one.
    pub fn principal(&self) -> Option<&str> {
        match self.kind {
            CredentialKind::ServiceAccount => self.json.get("client_email")?.as_str(),
            CredentialKind::ImpersonatedServiceAccount => self
                .json
                .get("service_account_impersonation_url")?
                .as_str()?
                .rsplit('/')
                .next()?
                .split(':')
                .next(),
            CredentialKind::Other(_) => None,
        }
    }
}
