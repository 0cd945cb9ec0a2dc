//! Rendering of the AWS CLI `credential_process` document.
//!
//! <https://docs.aws.amazon.com/cli/latest/userguide/cli-configure-sourcing-external.html>

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aws::TemporaryCredentials;
use crate::constants::{EXPIRATION_FORMAT, PROCESS_CREDENTIALS_VERSION};
use crate::error::Result;

/// The document printed on stdout.
///
/// Field names and order are fixed by the consuming AWS tooling.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessCredentialsResponse {
    pub version: u8,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: String,
}

impl fmt::Debug for ProcessCredentialsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessCredentialsResponse")
            .field("version", &self.version)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"****")
            .field("session_token", &"****")
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl From<&TemporaryCredentials> for ProcessCredentialsResponse {
    fn from(creds: &TemporaryCredentials) -> Self {
        Self {
            version: PROCESS_CREDENTIALS_VERSION,
            access_key_id: creds.access_key_id.clone(),
            secret_access_key: creds.secret_access_key.clone(),
            session_token: creds.session_token.clone(),
            expiration: format_expiration(&creds.expiration),
        }
    }
}

impl ProcessCredentialsResponse {
    /// Serializes to a single-line JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS±HHMM`.
pub fn format_expiration(expiration: &DateTime<Utc>) -> String {
    expiration.format(EXPIRATION_FORMAT).to_string()
}

/// Renders temporary credentials as a credential_process document.
pub fn render(creds: &TemporaryCredentials) -> Result<String> {
    ProcessCredentialsResponse::from(creds).to_json()
}
