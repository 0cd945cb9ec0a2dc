use thiserror::Error;

use crate::aws::RoleAssumptionError;
use crate::gcp::IdentityError;

/// Errors that abort a credential exchange, one kind per pipeline stage.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Missing or invalid parameter, detected before any network activity.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The GCP identity token could not be obtained.
    #[error("failed to acquire GCP identity token: {0}")]
    IdentityAcquisition(#[from] IdentityError),

    /// STS refused or failed the web identity exchange.
    #[error("failed to assume AWS role: {0}")]
    RoleAssumption(#[from] RoleAssumptionError),

    /// The credential_process document could not be rendered.
    #[error("failed to render process credentials: {0}")]
    Output(#[from] serde_json::Error),
}

impl ExchangeError {
    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            ExchangeError::Configuration(_) => "configuration",
            ExchangeError::IdentityAcquisition(_) => "identity",
            ExchangeError::RoleAssumption(_) => "assume-role",
            ExchangeError::Output(_) => "output",
        }
    }
}

/// A specialized Result type for exchange operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;
